//! Weather code translation.
//!
//! [`CODE_TABLE`] is the only place that knows which provider codes exist.
//! Both the textual description and the page theme are derived from the
//! category it yields, so the two can never disagree.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Display category of a weather condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum WeatherCategory {
    Sun,
    Cloud,
    Rain,
    Snow,
    Storm,
    /// Code outside the table, or no weather at all.
    #[default]
    Unknown,
}

/// Every weather code the translator recognizes, with its category.
///
/// Fog (45, 48) is shown as cloud; drizzle (51-55) and showers (80-82)
/// are shown as rain.
pub const CODE_TABLE: &[(i32, WeatherCategory)] = &[
    (0, WeatherCategory::Sun),
    (1, WeatherCategory::Sun),
    (2, WeatherCategory::Cloud),
    (3, WeatherCategory::Cloud),
    (45, WeatherCategory::Cloud),
    (48, WeatherCategory::Cloud),
    (51, WeatherCategory::Rain),
    (53, WeatherCategory::Rain),
    (55, WeatherCategory::Rain),
    (61, WeatherCategory::Rain),
    (63, WeatherCategory::Rain),
    (65, WeatherCategory::Rain),
    (71, WeatherCategory::Snow),
    (73, WeatherCategory::Snow),
    (75, WeatherCategory::Snow),
    (80, WeatherCategory::Rain),
    (81, WeatherCategory::Rain),
    (82, WeatherCategory::Rain),
    (95, WeatherCategory::Storm),
    (96, WeatherCategory::Storm),
    (99, WeatherCategory::Storm),
];

impl WeatherCategory {
    /// Translate a provider weather code.
    ///
    /// # Examples
    ///
    /// ```
    /// use pogoda_types::WeatherCategory;
    ///
    /// assert_eq!(WeatherCategory::from_code(61), WeatherCategory::Rain);
    /// assert_eq!(WeatherCategory::from_code(77), WeatherCategory::Unknown);
    /// ```
    #[must_use]
    pub fn from_code(code: i32) -> Self {
        CODE_TABLE
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, category)| *category)
            .unwrap_or(Self::Unknown)
    }

    /// Lowercase identifier (`sun`, `cloud`, ..., `unknown`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sun => "sun",
            Self::Cloud => "cloud",
            Self::Rain => "rain",
            Self::Snow => "snow",
            Self::Storm => "storm",
            Self::Unknown => "unknown",
        }
    }

    /// Page theme name. Unknown weather uses the default `main` theme.
    pub fn theme(&self) -> &'static str {
        match self {
            Self::Unknown => "main",
            known => known.as_str(),
        }
    }

    /// Localized (Russian) description shown to the user.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Sun => "Солнечно",
            Self::Cloud => "Облачно",
            Self::Rain => "Дождь",
            Self::Snow => "Снег",
            Self::Storm => "Гроза",
            Self::Unknown => "Неизвестно",
        }
    }

    /// Whether this category came from a code in the table.
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Localized description of a provider weather code.
pub fn describe(code: i32) -> &'static str {
    WeatherCategory::from_code(code).description()
}
