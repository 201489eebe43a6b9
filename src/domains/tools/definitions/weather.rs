//! Weather tools backed by the Open-Meteo public APIs.
//!
//! A free-text location is geocoded first (first match wins), then current
//! conditions or a daily forecast are fetched. Numeric WMO weather codes are
//! mapped to text; any network or parse failure becomes an error string.

use rmcp::{
    handler::server::tool::ToolRoute,
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

use super::common::{blocking_route, error_result, success_result, tool_model};
use crate::core::config::Config;

const GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";
const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    #[serde(default)]
    results: Vec<GeocodingResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    current: CurrentWeather,
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    temperature_2m: f64,
    apparent_temperature: f64,
    relative_humidity_2m: f64,
    weather_code: i64,
    wind_speed_10m: f64,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    daily: DailyForecast,
}

#[derive(Debug, Deserialize)]
struct DailyForecast {
    time: Vec<String>,
    weather_code: Vec<i64>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    precipitation_probability_max: Vec<Option<f64>>,
}

/// WMO weather code to human-readable text. Unknown codes render as
/// `Unknown (<code>)`.
fn weather_code_text(code: i64) -> String {
    let text = match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        56 => "Light freezing drizzle",
        57 => "Dense freezing drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        66 => "Light freezing rain",
        67 => "Heavy freezing rain",
        71 => "Slight snow fall",
        73 => "Moderate snow fall",
        75 => "Heavy snow fall",
        77 => "Snow grains",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        85 => "Slight snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => return format!("Unknown ({})", code),
    };
    text.to_string()
}

fn http_client() -> Result<reqwest::blocking::Client, String> {
    reqwest::blocking::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(|e| e.to_string())
}

/// Geocode a free-text location to its first match.
fn geocode(client: &reqwest::blocking::Client, location: &str) -> Result<GeocodingResult, String> {
    let response: GeocodingResponse = client
        .get(GEOCODING_URL)
        .query(&[("name", location), ("count", "1")])
        .send()
        .map_err(|e| e.to_string())?
        .json()
        .map_err(|e| e.to_string())?;

    response
        .results
        .into_iter()
        .next()
        .ok_or_else(|| format!("Location '{}' not found", location))
}

fn place_label(place: &GeocodingResult) -> String {
    match &place.country {
        Some(country) => format!("{}, {}", place.name, country),
        None => place.name.clone(),
    }
}

/// Parameters for the get weather tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetWeatherParams {
    /// Free-text location, e.g. 'Lyon' or 'Lyon, France'.
    pub location: String,
}

/// Get weather tool - current conditions for a location.
pub struct GetWeatherTool;

impl GetWeatherTool {
    pub const NAME: &'static str = "get_weather";

    pub const DESCRIPTION: &'static str =
        "Get current weather conditions for a location.";

    #[instrument(skip_all, fields(location = %params.location))]
    pub fn execute(params: &GetWeatherParams, _config: &Config) -> CallToolResult {
        let outcome = (|| -> Result<String, String> {
            let client = http_client()?;
            let place = geocode(&client, &params.location)?;
            info!("Geocoded '{}' to {},{}", params.location, place.latitude, place.longitude);

            let response: CurrentWeatherResponse = client
                .get(FORECAST_URL)
                .query(&[
                    ("latitude", place.latitude.to_string()),
                    ("longitude", place.longitude.to_string()),
                    (
                        "current",
                        "temperature_2m,apparent_temperature,relative_humidity_2m,weather_code,wind_speed_10m"
                            .to_string(),
                    ),
                ])
                .send()
                .map_err(|e| e.to_string())?
                .json()
                .map_err(|e| e.to_string())?;

            let current = response.current;
            Ok(format!(
                "Weather in {}:\n  Conditions: {}\n  Temperature: {}°C (feels like {}°C)\n  Humidity: {}%\n  Wind: {} km/h",
                place_label(&place),
                weather_code_text(current.weather_code),
                current.temperature_2m,
                current.apparent_temperature,
                current.relative_humidity_2m,
                current.wind_speed_10m
            ))
        })();

        match outcome {
            Ok(report) => success_result(report),
            Err(e) => error_result(&format!("Error: {}", e)),
        }
    }

    pub fn to_tool() -> Tool {
        tool_model::<GetWeatherParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        blocking_route(Self::to_tool(), config, Self::execute)
    }
}

fn default_forecast_days() -> u32 {
    3
}

/// Parameters for the get forecast tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct GetForecastParams {
    /// Free-text location.
    pub location: String,

    /// Number of forecast days (1-7).
    #[serde(default = "default_forecast_days")]
    pub days: u32,
}

/// Get forecast tool - daily forecast for a location.
pub struct GetForecastTool;

impl GetForecastTool {
    pub const NAME: &'static str = "get_forecast";

    pub const DESCRIPTION: &'static str = "Get a 1-7 day weather forecast for a location.";

    #[instrument(skip_all, fields(location = %params.location, days = params.days))]
    pub fn execute(params: &GetForecastParams, _config: &Config) -> CallToolResult {
        if params.days < 1 || params.days > 7 {
            return error_result("Error: days must be between 1 and 7");
        }

        let outcome = (|| -> Result<String, String> {
            let client = http_client()?;
            let place = geocode(&client, &params.location)?;

            let response: ForecastResponse = client
                .get(FORECAST_URL)
                .query(&[
                    ("latitude", place.latitude.to_string()),
                    ("longitude", place.longitude.to_string()),
                    (
                        "daily",
                        "weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max"
                            .to_string(),
                    ),
                    ("forecast_days", params.days.to_string()),
                ])
                .send()
                .map_err(|e| e.to_string())?
                .json()
                .map_err(|e| e.to_string())?;

            let daily = response.daily;
            let mut lines = vec![format!("Forecast for {}:", place_label(&place))];
            for (i, date) in daily.time.iter().enumerate() {
                let code = daily.weather_code.get(i).copied().unwrap_or(-1);
                let max = daily.temperature_2m_max.get(i).copied().unwrap_or(0.0);
                let min = daily.temperature_2m_min.get(i).copied().unwrap_or(0.0);
                let precip = daily
                    .precipitation_probability_max
                    .get(i)
                    .copied()
                    .flatten();

                let mut line = format!(
                    "  {}: {}, low {}°C, high {}°C",
                    date,
                    weather_code_text(code),
                    min,
                    max
                );
                if let Some(precip) = precip {
                    line.push_str(&format!(", {}% precipitation", precip));
                }
                lines.push(line);
            }

            Ok(lines.join("\n"))
        })();

        match outcome {
            Ok(report) => success_result(report),
            Err(e) => error_result(&format!("Error: {}", e)),
        }
    }

    pub fn to_tool() -> Tool {
        tool_model::<GetForecastParams>(Self::NAME, Self::DESCRIPTION)
    }

    pub fn create_route<S>(config: Arc<Config>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        blocking_route(Self::to_tool(), config, Self::execute)
    }
}
