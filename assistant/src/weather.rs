//! Hourly forecast table for `get_weather_for_location`.
//!
//! Forecasts come from Open-Meteo shaped snapshots on disk:
//!
//! ```json
//! {"latitude": 52.52, "longitude": 13.41,
//!  "hourly": {"time": ["2024-05-01T10:00"], "temperature_2m": [14.2], "rain": [0.0]}}
//! ```

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use doctools::{FunctionDescriptor, ToolCollection, ToolError};
use serde::Deserialize;
use thiserror::Error;

pub const TOOL_NAME: &str = "get_weather_for_location";

const DOC: &str = "Return the weather forecast for the next 7 days for a specific location. Returns a table with the columns
    date, time, temperature, rainfall
    there will be a row for every hour in the next 7 days starting with the next hour.
    :param lat: float: The latitude of the location
    :param lon: float: The longitude of the location";

/// Largest distance in degrees between the requested point and a snapshot.
const MAX_OFFSET_DEG: f64 = 0.5;

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("cannot read forecast snapshot {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid forecast snapshot {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("no forecast available for {lat},{lon}")]
    OutOfRange { lat: f64, lon: f64 },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Forecast {
    pub latitude: f64,
    pub longitude: f64,
    pub hourly: Hourly,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Hourly {
    pub time: Vec<String>,
    pub temperature_2m: Vec<f64>,
    pub rain: Vec<f64>,
}

impl Forecast {
    pub fn covers(&self, lat: f64, lon: f64) -> bool {
        (self.latitude - lat).abs() <= MAX_OFFSET_DEG
            && (self.longitude - lon).abs() <= MAX_OFFSET_DEG
    }

    /// One `date: …, time: …, temperature: …, rainfall: …` line per hour.
    pub fn table(&self) -> String {
        let Hourly {
            time,
            temperature_2m,
            rain,
        } = &self.hourly;

        time.iter()
            .zip(temperature_2m)
            .zip(rain)
            .map(|((stamp, temperature), rainfall)| {
                let (date, clock) = stamp.split_once('T').unwrap_or((stamp.as_str(), ""));
                let clock = clock.get(..5).unwrap_or(clock);
                format!(
                    "date: {date}, time: {clock}, temperature: {temperature}, rainfall: {rainfall}\n"
                )
            })
            .collect()
    }
}

/// Where forecasts come from.
pub trait ForecastSource: Send + Sync {
    fn hourly(&self, lat: f64, lon: f64) -> Result<Forecast, ForecastError>;
}

/// A single snapshot file, valid near the coordinates it was taken for.
#[derive(Debug, Clone)]
pub struct ForecastFile {
    path: PathBuf,
}

impl ForecastFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ForecastSource for ForecastFile {
    fn hourly(&self, lat: f64, lon: f64) -> Result<Forecast, ForecastError> {
        let raw = fs::read_to_string(&self.path).map_err(|source| ForecastError::Read {
            path: self.path.clone(),
            source,
        })?;
        let forecast: Forecast =
            serde_json::from_str(&raw).map_err(|source| ForecastError::Parse {
                path: self.path.clone(),
                source,
            })?;
        if !forecast.covers(lat, lon) {
            return Err(ForecastError::OutOfRange { lat, lon });
        }
        Ok(forecast)
    }
}

#[derive(Debug, Deserialize)]
struct Location {
    lat: f64,
    lon: f64,
}

pub fn register(
    tools: &mut ToolCollection,
    source: Arc<dyn ForecastSource>,
) -> Result<(), ToolError> {
    let descriptor = FunctionDescriptor::new(TOOL_NAME, DOC)
        .param("lat", "float")
        .param("lon", "float");

    tools.register(descriptor, move |loc: Location| {
        let source = source.clone();
        async move {
            tracing::debug!(lat = loc.lat, lon = loc.lon, "looking up forecast");
            source.hourly(loc.lat, loc.lon).map(|f| f.table())
        }
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use doctools::{FunctionCall, JsonType};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const SNAPSHOT: &str = r#"{
        "latitude": 52.52,
        "longitude": 13.41,
        "hourly": {
            "time": ["2024-05-01T10:00", "2024-05-01T11:00"],
            "temperature_2m": [14.2, 15.0],
            "rain": [0.0, 0.4]
        }
    }"#;

    fn snapshot_tools() -> (tempfile::TempDir, ToolCollection) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("forecast.json");
        fs::write(&path, SNAPSHOT).unwrap();

        let mut tools = ToolCollection::new();
        register(&mut tools, Arc::new(ForecastFile::new(path))).unwrap();
        (dir, tools)
    }

    #[test]
    fn test_table_rows() {
        let forecast: Forecast = serde_json::from_str(SNAPSHOT).unwrap();
        assert_eq!(
            forecast.table(),
            "date: 2024-05-01, time: 10:00, temperature: 14.2, rainfall: 0\n\
             date: 2024-05-01, time: 11:00, temperature: 15, rainfall: 0.4\n"
        );
    }

    #[test]
    fn test_schema_uses_first_line_only() {
        let (_dir, tools) = snapshot_tools();
        let schema = tools.schema(TOOL_NAME).unwrap();
        assert_eq!(
            schema.description,
            "Return the weather forecast for the next 7 days for a specific location. Returns a table with the columns"
        );
        assert_eq!(schema.parameters.required(), ["lat", "lon"]);
        assert_eq!(
            schema.parameters.property("lat").unwrap().json_type,
            JsonType::Number
        );
    }

    #[tokio::test]
    async fn test_tool_call_renders_table() {
        let (_dir, tools) = snapshot_tools();
        let out = tools
            .call(FunctionCall::new(TOOL_NAME, json!({"lat": 52.5, "lon": 13.4})))
            .await
            .unwrap();
        assert_eq!(out.output.lines().count(), 2);
        assert!(out.output.starts_with("date: 2024-05-01, time: 10:00"));
    }

    #[tokio::test]
    async fn test_far_away_location_fails() {
        let (_dir, tools) = snapshot_tools();
        let err = tools
            .call(FunctionCall::new(TOOL_NAME, json!({"lat": -33.9, "lon": 18.4})))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Runtime(msg) if msg.contains("no forecast available")));
    }
}
