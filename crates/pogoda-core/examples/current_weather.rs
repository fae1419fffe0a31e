//! Look up a place and print its current weather.
//!
//! Usage: cargo run -p pogoda-core --example current_weather -- "Санкт-Петербург"

use pogoda_core::{ForecastConfig, GeocodingConfig, NominatimClient, OpenMeteoClient, describe};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("pogoda_core=debug".parse()?),
        )
        .init();

    let query = std::env::args().nth(1).unwrap_or_else(|| "Москва".to_string());

    let geocoder = NominatimClient::new(&GeocodingConfig::default())?;
    let forecaster = OpenMeteoClient::new(&ForecastConfig::default())?;

    let Some(place) = geocoder.search(&query, 1).await?.into_iter().next() else {
        println!("No place found for {:?}", query);
        return Ok(());
    };

    println!("{}", place.display_name);
    println!("  {:.4}, {:.4}", place.latitude, place.longitude);

    let snapshot = forecaster.fetch(place.latitude, place.longitude).await?;
    match &snapshot.current {
        Some(current) => {
            println!(
                "  {:.1}°C, wind {:.1} km/h, {}",
                current.temperature,
                current.wind_speed,
                describe(current.weather_code)
            );
        }
        None => println!("  No current conditions reported"),
    }

    for point in snapshot.hourly.iter().take(6) {
        println!(
            "  {}  {:>5.1}°C  {:>3}%  {}",
            point.time,
            point.temperature,
            point.humidity,
            point.category().description()
        );
    }

    Ok(())
}
