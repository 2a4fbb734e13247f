use std::path::PathBuf;

/// Errors raised by weather data sources.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("Data source is not connected")]
    NotConnected,
    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode data events: {0}")]
    Decode(#[from] serde_json::Error),
}
