use std::path::PathBuf;

use thiserror::Error;

/// Failures of the collaborators feeding the resolver.
///
/// The decision logic itself never fails; these errors only surface while
/// reading snapshots and are degraded to defaults by the callers.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to decode {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Project metadata unavailable for {}", .0.display())]
    MetadataUnavailable(PathBuf),
}
