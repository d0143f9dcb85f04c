use std::path::PathBuf;

use thiserror::Error;

/// Failures reported by the media engine or by the video widget.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// Playback start was pre-empted before the engine could honour it.
    #[error("playback interrupted")]
    Interrupted,
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("failed to open clip: {0}")]
    Mount(String),
    #[error("media engine error: {0}")]
    Engine(String),
}

impl PlaybackError {
    /// Benign errors are never surfaced to the viewer.
    pub fn is_benign(&self) -> bool {
        matches!(self, PlaybackError::Interrupted)
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid catalog json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("catalog has no clips")]
    Empty,
    #[error("duplicate clip id {0}")]
    DuplicateId(u32),
    #[error("clip {id} has an invalid video url {url:?}: {source}")]
    InvalidUrl {
        id: u32,
        url: String,
        #[source]
        source: url::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_interruption_is_benign() {
        assert!(PlaybackError::Interrupted.is_benign());
        assert!(!PlaybackError::Network("timeout".into()).is_benign());
        assert!(!PlaybackError::Decode("bad frame".into()).is_benign());
        assert!(!PlaybackError::Mount("missing".into()).is_benign());
        assert!(!PlaybackError::Engine("gst".into()).is_benign());
    }
}
