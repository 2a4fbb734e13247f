use async_trait::async_trait;
use std::{
    collections::VecDeque,
    fmt::Debug,
    path::{Path, PathBuf},
};
use tokio::io::AsyncWriteExt;

use crate::{
    error::SyncError,
    model::{DataEvent, WeatherRequest},
};

/// Where the face gets weather from and sends refresh requests to.
#[async_trait]
pub trait WeatherDataSource: Send + Sync + Debug {
    async fn connect(&mut self) -> Result<(), SyncError>;

    async fn disconnect(&mut self);

    fn is_connected(&self) -> bool;

    /// Publish a refresh request. Delivery is not confirmed.
    async fn request_weather(&mut self, request: &WeatherRequest) -> Result<(), SyncError>;

    /// Events that arrived since the last poll.
    async fn poll_events(&mut self) -> Result<Vec<DataEvent>, SyncError>;
}

/// Send a fresh weather request, logging and dropping any failure.
pub async fn request_weather_or_log(source: &mut dyn WeatherDataSource) {
    let request = WeatherRequest::new();
    if let Err(err) = source.request_weather(&request).await {
        tracing::debug!(error = %err, "failed requesting weather data");
    }
}

/// Reads events from a JSON file holding an array of [`DataEvent`].
///
/// The file is delivered again only after its contents change.
/// Requests are appended as JSON lines to the outbox file, when one is set.
#[derive(Debug)]
pub struct FileDataSource {
    events_path: PathBuf,
    outbox_path: Option<PathBuf>,
    connected: bool,
    last_delivered: Option<String>,
}

impl FileDataSource {
    pub fn new(events_path: impl Into<PathBuf>) -> Self {
        Self {
            events_path: events_path.into(),
            outbox_path: None,
            connected: false,
            last_delivered: None,
        }
    }

    pub fn with_outbox(mut self, outbox_path: impl Into<PathBuf>) -> Self {
        self.outbox_path = Some(outbox_path.into());
        self
    }

    pub fn events_path(&self) -> &Path {
        &self.events_path
    }
}

fn io_error(path: &Path, source: std::io::Error) -> SyncError {
    SyncError::Io { path: path.to_path_buf(), source }
}

#[async_trait]
impl WeatherDataSource for FileDataSource {
    async fn connect(&mut self) -> Result<(), SyncError> {
        self.connected = true;
        tracing::info!(path = %self.events_path.display(), "connected to weather data file");
        Ok(())
    }

    async fn disconnect(&mut self) {
        if self.connected {
            self.connected = false;
            let path = self.events_path.display();
            tracing::info!(path = %path, "disconnected from weather data file");
        }
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn request_weather(&mut self, request: &WeatherRequest) -> Result<(), SyncError> {
        if !self.connected {
            return Err(SyncError::NotConnected);
        }

        let Some(outbox) = &self.outbox_path else {
            tracing::debug!(uuid = %request.uuid, "no outbox configured, request dropped");
            return Ok(());
        };

        let mut line = serde_json::to_string(request)?;
        line.push('\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(outbox)
            .await
            .map_err(|e| io_error(outbox, e))?;
        file.write_all(line.as_bytes()).await.map_err(|e| io_error(outbox, e))?;
        file.flush().await.map_err(|e| io_error(outbox, e))?;

        Ok(())
    }

    async fn poll_events(&mut self) -> Result<Vec<DataEvent>, SyncError> {
        if !self.connected {
            return Err(SyncError::NotConnected);
        }

        let contents = match tokio::fs::read_to_string(&self.events_path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(io_error(&self.events_path, e)),
        };

        if self.last_delivered.as_deref() == Some(contents.as_str()) {
            return Ok(Vec::new());
        }

        let events: Vec<DataEvent> = serde_json::from_str(&contents)?;

        self.last_delivered = Some(contents);
        Ok(events)
    }
}

/// In-process source; events are queued by the caller.
#[derive(Debug, Default)]
pub struct MemoryDataSource {
    connected: bool,
    pending: VecDeque<DataEvent>,
    requests: Vec<WeatherRequest>,
}

impl MemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: DataEvent) {
        self.pending.push_back(event);
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> &[WeatherRequest] {
        &self.requests
    }
}

#[async_trait]
impl WeatherDataSource for MemoryDataSource {
    async fn connect(&mut self) -> Result<(), SyncError> {
        self.connected = true;
        Ok(())
    }

    async fn disconnect(&mut self) {
        self.connected = false;
    }

    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn request_weather(&mut self, request: &WeatherRequest) -> Result<(), SyncError> {
        if !self.connected {
            return Err(SyncError::NotConnected);
        }
        self.requests.push(request.clone());
        Ok(())
    }

    async fn poll_events(&mut self) -> Result<Vec<DataEvent>, SyncError> {
        if !self.connected {
            return Err(SyncError::NotConnected);
        }
        Ok(self.pending.drain(..).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DATA_PATH, WeatherItem};
    use std::time::{Duration, SystemTime};

    const EVENTS: &str = r#"[
        {
            "type": "changed",
            "path": "/weather/weather-info",
            "data": {"weather-id": 802, "high": "19°", "low": "11°"}
        }
    ]"#;

    #[tokio::test]
    async fn file_source_delivers_each_revision_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, EVENTS).unwrap();

        let mut source = FileDataSource::new(&path);
        source.connect().await.unwrap();

        let first = source.poll_events().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].data.weather_id, Some(802));

        assert!(source.poll_events().await.unwrap().is_empty());

        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(SystemTime::now() + Duration::from_secs(5)).unwrap();

        // Touched but unchanged.
        assert!(source.poll_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_source_sees_rewrite_with_same_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, EVENTS).unwrap();
        let mtime = std::fs::metadata(&path).unwrap().modified().unwrap();

        let mut source = FileDataSource::new(&path);
        source.connect().await.unwrap();
        assert_eq!(source.poll_events().await.unwrap().len(), 1);

        let rewritten = r#"[
            {"type":"changed","path":"/weather/weather-info","data":{"high":"21°"}},
            {"type":"changed","path":"/weather/weather-info","data":{"low":"12°"}}
        ]"#;
        std::fs::write(&path, rewritten).unwrap();
        let file = std::fs::File::options().write(true).open(&path).unwrap();
        file.set_modified(mtime).unwrap();

        let events = source.poll_events().await.unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data.high.as_deref(), Some("21°"));
    }

    #[tokio::test]
    async fn file_source_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FileDataSource::new(dir.path().join("absent.json"));
        source.connect().await.unwrap();

        assert!(source.poll_events().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn file_source_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.json");
        std::fs::write(&path, "{not json").unwrap();

        let mut source = FileDataSource::new(&path);
        source.connect().await.unwrap();

        let err = source.poll_events().await.unwrap_err();
        assert!(matches!(err, SyncError::Decode(_)));
    }

    #[tokio::test]
    async fn file_source_requires_connection() {
        let mut source = FileDataSource::new("/nonexistent/events.json");

        let err = source.poll_events().await.unwrap_err();
        assert!(matches!(err, SyncError::NotConnected));
        assert!(source.request_weather(&WeatherRequest::new()).await.is_err());
    }

    #[tokio::test]
    async fn file_source_appends_requests_to_outbox() {
        let dir = tempfile::tempdir().unwrap();
        let outbox = dir.path().join("outbox.jsonl");

        let mut source =
            FileDataSource::new(dir.path().join("events.json")).with_outbox(&outbox);
        source.connect().await.unwrap();
        source.request_weather(&WeatherRequest::new()).await.unwrap();
        source.request_weather(&WeatherRequest::new()).await.unwrap();

        let written = std::fs::read_to_string(&outbox).unwrap();
        let requests: Vec<WeatherRequest> =
            written.lines().map(|l| serde_json::from_str(l).unwrap()).collect();

        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.path == DATA_PATH));
        assert_ne!(requests[0].uuid, requests[1].uuid);
    }

    #[tokio::test]
    async fn failed_request_is_swallowed() {
        let mut source = MemoryDataSource::new();

        request_weather_or_log(&mut source).await;
        assert!(source.requests().is_empty());

        source.connect().await.unwrap();
        request_weather_or_log(&mut source).await;
        assert_eq!(source.requests().len(), 1);
    }

    #[tokio::test]
    async fn memory_source_drains_queue() {
        let mut source = MemoryDataSource::new();
        source.connect().await.unwrap();
        source.push(DataEvent::changed(WeatherItem::default()));

        assert_eq!(source.poll_events().await.unwrap().len(), 1);
        assert!(source.poll_events().await.unwrap().is_empty());

        source.disconnect().await;
        assert!(!source.is_connected());
    }
}
