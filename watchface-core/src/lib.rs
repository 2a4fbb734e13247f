//! Core library for the weather watch face.
//!
//! This crate defines:
//! - Weather-code to icon classification
//! - The watch-face engine and its draw sequence onto an abstract canvas
//! - The companion data model and pluggable weather data sources
//! - Configuration handling
//!
//! It is used by `watchface-cli`, but can be embedded by any host that can
//! forward lifecycle callbacks and provide a canvas.

pub mod clock;
pub mod config;
pub mod error;
pub mod face;
pub mod icon;
pub mod model;
pub mod render;
pub mod sync;

pub use clock::{FixedClock, SystemClock, TimeSource};
pub use config::{Config, DataConfig, DisplayConfig, LayoutConfig, LayoutMetrics, Palette};
pub use error::SyncError;
pub use face::{TapKind, WatchFace};
pub use icon::{IconCategory, classify};
pub use model::{DATA_PATH, DataEvent, EventKind, WeatherItem, WeatherRequest, WeatherSnapshot};
pub use render::{Bounds, Canvas, Color, DrawCommand, Paint, RecordingCanvas, WeatherIcon};
pub use sync::{FileDataSource, MemoryDataSource, WeatherDataSource, request_weather_or_log};
