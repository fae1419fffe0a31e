//! Server-rendered HTML for the browser routes.
//!
//! Every piece of user or provider text goes through [`escape_html`].

use std::fmt::Write as _;

use time::PrimitiveDateTime;
use time::macros::format_description;

use pogoda_core::{WeatherSnapshot, describe};
use pogoda_store::{CityCount, HistoryEntry};

use crate::lookup::LookupOutcome;

/// Hourly rows shown under the current conditions.
pub const HOURLY_ROWS: usize = 24;

/// Escape text for use in HTML content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `/?city=...` for a city string.
pub fn city_href(city: &str) -> String {
    format!("/?city={}", urlencoding::encode(city))
}

/// `dd.mm HH:MM`.
pub fn short_datetime(at: PrimitiveDateTime) -> String {
    let format = format_description!("[day].[month] [hour]:[minute]");
    at.format(format).unwrap_or_else(|_| at.to_string())
}

/// Everything the index page shows.
pub struct IndexPage<'a> {
    pub outcome: &'a LookupOutcome,
    /// Value for the search box: the requested city, or the remembered one.
    pub search_value: &'a str,
    pub recent: &'a [HistoryEntry],
    /// Hourly rows before this time are skipped.
    pub hours_from: PrimitiveDateTime,
}

fn layout(theme: &str, title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="ru">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title}</title>
    <link rel="stylesheet" href="/static/style.css">
    <script src="https://unpkg.com/htmx.org@1.9.12"></script>
</head>
<body class="theme-{theme}">
{body}
</body>
</html>
"#,
        title = escape_html(title),
        theme = escape_html(theme),
        body = body,
    )
}

/// The main page: search form, weather or error, recent lookups.
pub fn render_index(page: &IndexPage<'_>) -> String {
    let outcome = page.outcome;
    let mut body = String::new();

    let _ = write!(
        body,
        r##"<header>
    <h1>Погода</h1>
    <nav><a href="/stats">Статистика</a></nav>
</header>
<form action="/" method="get" autocomplete="off">
    <input type="text" name="city" value="{value}" placeholder="Город"
           hx-get="/autocomplete" hx-trigger="keyup changed delay:300ms" hx-target="#suggestions" hx-swap="outerHTML">
    <button type="submit">Показать</button>
    <div id='suggestions'></div>
</form>
<main id="content">
"##,
        value = escape_html(page.search_value),
    );

    if let Some(error) = &outcome.error {
        let _ = writeln!(body, r#"    <p class="error">{}</p>"#, escape_html(&error.to_string()));
    } else if let Some(snapshot) = &outcome.weather {
        let heading = outcome.city.as_deref().unwrap_or_default();
        let _ = writeln!(body, "    <h2>{}</h2>", escape_html(heading));
        if let Some(place) = &outcome.place {
            let _ = writeln!(
                body,
                r#"    <p class="place">{} ({:.4}, {:.4})</p>"#,
                escape_html(&place.display_name),
                place.latitude,
                place.longitude
            );
        }
        render_weather(&mut body, snapshot, page.hours_from);
    }

    if !page.recent.is_empty() {
        body.push_str("    <section class=\"recent\">\n        <h3>Недавние запросы</h3>\n        <ul>\n");
        for entry in page.recent {
            let when = entry
                .recorded_at()
                .map(short_datetime)
                .unwrap_or_else(|| entry.timestamp.clone());
            let _ = writeln!(
                body,
                r#"            <li><a href="{href}">{city}</a> <span class="time">{when}</span></li>"#,
                href = escape_html(&city_href(&entry.city)),
                city = escape_html(&entry.city),
                when = escape_html(&when),
            );
        }
        body.push_str("        </ul>\n    </section>\n");
    }

    body.push_str("</main>");

    layout(outcome.theme(), "Погода", &body)
}

fn render_weather(body: &mut String, snapshot: &WeatherSnapshot, hours_from: PrimitiveDateTime) {
    match &snapshot.current {
        Some(current) => {
            let _ = write!(
                body,
                r#"    <section class="current">
        <p class="temperature">{:.1}°C</p>
        <p class="description">{}</p>
        <p class="wind">Ветер: {:.1} км/ч</p>
    </section>
"#,
                current.temperature,
                escape_html(describe(current.weather_code)),
                current.wind_speed,
            );
        }
        None => body.push_str("    <p class=\"notice\">Нет данных о текущей погоде</p>\n"),
    }

    let rows: Vec<_> = snapshot.hourly_from(hours_from, HOURLY_ROWS).collect();
    if rows.is_empty() {
        return;
    }

    body.push_str(
        "    <table class=\"hourly\">\n        <tr><th>Время</th><th>°C</th><th>Влажность</th><th>Ветер</th><th></th></tr>\n",
    );
    for point in rows {
        let _ = writeln!(
            body,
            "        <tr><td>{}</td><td>{:.1}</td><td>{}%</td><td>{:.1} км/ч</td><td>{}</td></tr>",
            short_datetime(point.time),
            point.temperature,
            point.humidity,
            point.wind_speed,
            escape_html(point.category().description()),
        );
    }
    body.push_str("    </table>\n");
}

/// Autocomplete fragment; empty input gives an empty container.
pub fn render_suggestions(names: &[String]) -> String {
    let mut html = String::from("<div id='suggestions'>");
    for name in names {
        let _ = write!(
            html,
            "<div class='suggestion' hx-get='{href}' hx-target='#content' hx-select='#content' hx-swap='outerHTML' hx-push-url='true'>{name}</div>",
            href = escape_html(&city_href(name)),
            name = escape_html(name),
        );
    }
    html.push_str("</div>");
    html
}

/// Lookup counts page.
pub fn render_stats(counts: &[CityCount]) -> String {
    let mut body = String::from(
        "<header>\n    <h1>Статистика запросов</h1>\n    <nav><a href=\"/\">На главную</a></nav>\n</header>\n<main>\n",
    );

    if counts.is_empty() {
        body.push_str("    <p>Запросов пока не было</p>\n");
    } else {
        body.push_str("    <table class=\"stats\">\n        <tr><th>Город</th><th>Запросов</th></tr>\n");
        for entry in counts {
            let _ = writeln!(
                body,
                r#"        <tr><td><a href="{href}">{city}</a></td><td>{count}</td></tr>"#,
                href = escape_html(&city_href(&entry.city)),
                city = escape_html(&entry.city),
                count = entry.count,
            );
        }
        body.push_str("    </table>\n");
    }
    body.push_str("</main>");

    layout("main", "Статистика", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pogoda_core::{MockForecaster, WeatherCategory};
    use time::macros::datetime;

    use crate::lookup::LookupError;

    fn page<'a>(outcome: &'a LookupOutcome, recent: &'a [HistoryEntry]) -> IndexPage<'a> {
        IndexPage {
            outcome,
            search_value: "",
            recent,
            hours_from: datetime!(2024-05-01 13:00),
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#39;y&#39;&lt;/script&gt;"
        );
        assert_eq!(escape_html("Москва"), "Москва");
    }

    #[test]
    fn test_city_href() {
        assert_eq!(city_href("Нью-Йорк, США"), "/?city=%D0%9D%D1%8C%D1%8E-%D0%99%D0%BE%D1%80%D0%BA%2C%20%D0%A1%D0%A8%D0%90");
        assert_eq!(city_href("a&b"), "/?city=a%26b");
    }

    #[test]
    fn test_short_datetime() {
        assert_eq!(short_datetime(datetime!(2024-05-01 09:05)), "01.05 09:05");
    }

    #[test]
    fn test_render_empty_index() {
        let outcome = LookupOutcome::default();
        let html = render_index(&page(&outcome, &[]));

        assert!(html.contains(r#"class="theme-main""#));
        assert!(html.contains(r#"value="""#));
        assert!(!html.contains("class=\"error\""));
        assert!(!html.contains("Недавние запросы"));
        assert!(html.contains(r##"hx-target="#suggestions" hx-swap="outerHTML">"##));
        assert!(html.contains(r#"<main id="content">"#));
    }

    #[test]
    fn test_render_weather() {
        let outcome = LookupOutcome {
            city: Some("Москва".to_string()),
            weather: Some(MockForecaster::default_snapshot(61)),
            category: WeatherCategory::Rain,
            ..Default::default()
        };
        let html = render_index(&page(&outcome, &[]));

        assert!(html.contains(r#"class="theme-rain""#));
        assert!(html.contains("<h2>Москва</h2>"));
        assert!(html.contains("14.8°C"));
        assert!(html.contains("Дождь"));
        assert!(html.contains("Ветер: 10.1 км/ч"));
        // Only the 13:00 and 14:00 rows are at or after `hours_from`.
        assert!(!html.contains("01.05 12:00"));
        assert!(html.contains("01.05 13:00"));
        assert!(html.contains("01.05 14:00"));
    }

    #[test]
    fn test_render_error_is_escaped() {
        let outcome = LookupOutcome {
            city: Some("<b>".to_string()),
            error: Some(LookupError::NotFound),
            ..Default::default()
        };
        let html = render_index(&IndexPage {
            search_value: "<b>",
            ..page(&outcome, &[])
        });

        assert!(html.contains(r#"<p class="error">city not found</p>"#));
        assert!(html.contains(r#"value="&lt;b&gt;""#));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn test_render_recent() {
        let outcome = LookupOutcome::default();
        let recent = vec![HistoryEntry {
            id: 1,
            city: "Санкт-Петербург".to_string(),
            timestamp: "2024-05-01 14:03:59".to_string(),
        }];
        let html = render_index(&page(&outcome, &recent));

        assert!(html.contains("Недавние запросы"));
        assert!(html.contains(">Санкт-Петербург</a>"));
        assert!(html.contains("01.05 14:03"));
        assert!(html.contains(&city_href("Санкт-Петербург")));
    }

    #[test]
    fn test_render_suggestions() {
        let html = render_suggestions(&["Paris".to_string(), "O'Hare".to_string()]);

        assert!(html.starts_with("<div id='suggestions'>"));
        assert!(html.ends_with("</div>"));
        assert!(html.contains("hx-get='/?city=Paris'"));
        assert!(html.contains("hx-target='#content'"));
        assert!(html.contains(">O&#39;Hare</div>"));
        assert!(html.contains("hx-get='/?city=O%27Hare'"));
    }

    #[test]
    fn test_render_empty_suggestions() {
        assert_eq!(render_suggestions(&[]), "<div id='suggestions'></div>");
    }

    #[test]
    fn test_render_stats() {
        let counts = vec![
            CityCount {
                city: "Paris".to_string(),
                count: 3,
            },
            CityCount {
                city: "Rome".to_string(),
                count: 1,
            },
        ];
        let html = render_stats(&counts);

        let paris = html.find(">Paris</a>").unwrap();
        let rome = html.find(">Rome</a>").unwrap();
        assert!(paris < rome);
        assert!(html.contains("<td>3</td>"));
    }

    #[test]
    fn test_render_empty_stats() {
        let html = render_stats(&[]);
        assert!(html.contains("Запросов пока не было"));
    }
}
