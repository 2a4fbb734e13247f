use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::icon::{IconCategory, classify};

/// Path of the data item the companion publishes weather on.
pub const DATA_PATH: &str = "/weather/weather-info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Changed,
    Deleted,
}

/// Payload of the weather data item. A `None` field means the key was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherItem {
    #[serde(rename = "weather-id", default, skip_serializing_if = "Option::is_none")]
    pub weather_id: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEvent {
    #[serde(rename = "type")]
    pub kind: EventKind,
    pub path: String,
    #[serde(default)]
    pub data: WeatherItem,
}

impl DataEvent {
    pub fn changed(data: WeatherItem) -> Self {
        Self { kind: EventKind::Changed, path: DATA_PATH.to_string(), data }
    }
}

/// Request for the companion to (re)publish weather.
///
/// The random uuid makes every request a distinct item so the companion
/// always sees a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRequest {
    pub path: String,
    pub uuid: String,
}

impl WeatherRequest {
    pub fn new() -> Self {
        Self { path: DATA_PATH.to_string(), uuid: Uuid::new_v4().to_string() }
    }
}

impl Default for WeatherRequest {
    fn default() -> Self {
        Self::new()
    }
}

/// Latest weather known to the face.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub high: Option<String>,
    pub low: Option<String>,
    pub icon: Option<IconCategory>,
}

impl WeatherSnapshot {
    /// Fold one data event into the snapshot.
    ///
    /// Returns `false` when the event is ignored (not a change, or another
    /// path). Only keys present in the item overwrite existing values.
    pub fn apply(&mut self, event: &DataEvent) -> bool {
        if event.kind != EventKind::Changed || event.path != DATA_PATH {
            return false;
        }

        if let Some(high) = &event.data.high {
            self.high = Some(high.clone());
        }
        if let Some(low) = &event.data.low {
            self.low = Some(low.clone());
        }

        if let Some(code) = event.data.weather_id {
            match classify(code) {
                IconCategory::Unknown => {
                    tracing::warn!(code, "unrecognised weather code, keeping previous icon");
                }
                category => self.icon = Some(category),
            }
        }

        tracing::debug!(path = %event.path, "weather data changed");
        true
    }

    /// High, low and icon, when all three are known.
    pub fn complete(&self) -> Option<(&str, &str, IconCategory)> {
        Some((self.high.as_deref()?, self.low.as_deref()?, self.icon?))
    }

    pub fn is_complete(&self) -> bool {
        self.complete().is_some()
    }
}
