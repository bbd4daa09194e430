use std::path::PathBuf;

use thiserror::Error;

use ffmpeg_types::StreamType;

/**
    Errors returned by a [`WriteSession`](crate::WriteSession).
*/
#[derive(Debug, Error)]
pub enum WriteError {
    // ── Construction ──────────────────────────────────────────────────
    #[error("cannot write {}: {message}", .path.display())]
    Configuration { path: PathBuf, message: String },

    // ── Writing ───────────────────────────────────────────────────────
    #[error("{stream} encoding failed for {}", .path.display())]
    Encode {
        stream: StreamType,
        path: PathBuf,
        source: ffmpeg_types::Error,
    },
    #[error("finalizing {} failed", .path.display())]
    Finalize {
        path: PathBuf,
        source: ffmpeg_types::Error,
    },
    #[error("session for {} is unusable after an earlier error", .path.display())]
    Unusable { path: PathBuf },
    #[error("no {stream} stream was configured")]
    NoStream { stream: StreamType },
    #[error("invalid {stream} input")]
    InvalidInput {
        stream: StreamType,
        source: ffmpeg_types::Error,
    },
}

impl WriteError {
    pub(crate) fn configuration(path: &std::path::Path, message: impl ToString) -> Self {
        Self::Configuration {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    /**
        Returns true if the session that returned this error accepts no
        further writes.
    */
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Encode { .. } | Self::Finalize { .. } | Self::Unusable { .. }
        )
    }
}

/**
    Type alias for results that may return a [`WriteError`].
*/
pub type WriteResult<T> = std::result::Result<T, WriteError>;
