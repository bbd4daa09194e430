/*!
    Error types shared by the media writing crates.
*/

use thiserror::Error;

/**
    Error type for the media writing crates.
*/
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (unwritable path, missing preset file, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Codec error (encoder rejected a frame, packet retrieval failed)
    #[error("codec error: {message}")]
    Codec { message: String },
    /// Invalid data (buffer sizes that do not match their description)
    #[error("invalid data: {message}")]
    InvalidData { message: String },
    /// Unsupported format (valid but not handled)
    #[error("unsupported format: {message}")]
    UnsupportedFormat { message: String },
    /// Configuration that cannot be satisfied after all fallbacks
    #[error("configuration error: {message}")]
    Config { message: String },
    /// End of stream (control flow for the encoder drain loop)
    #[error("end of stream")]
    Eof,
}

impl Error {
    /**
        Create a codec error with the given message.
    */
    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec {
            message: message.into(),
        }
    }

    /**
        Create an invalid data error with the given message.
    */
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: message.into(),
        }
    }

    /**
        Create an unsupported format error with the given message.
    */
    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            message: message.into(),
        }
    }

    /**
        Create a configuration error with the given message.
    */
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /**
        Returns true if this is an EOF error.
    */
    pub fn is_eof(&self) -> bool {
        matches!(self, Self::Eof)
    }

    /**
        Returns true if this error was raised while configuring, as opposed
        to while processing data.
    */
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}

/**
    Result type alias for the media writing crates.
*/
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as StdError;

    #[test]
    fn error_display() {
        let e = Error::codec("send_frame rejected");
        assert_eq!(format!("{e}"), "codec error: send_frame rejected");

        let e = Error::invalid_data("short buffer");
        assert_eq!(format!("{e}"), "invalid data: short buffer");

        let e = Error::unsupported_format("yuv420p cannot be flipped");
        assert_eq!(format!("{e}"), "unsupported format: yuv420p cannot be flipped");

        let e = Error::config("no streams");
        assert_eq!(format!("{e}"), "configuration error: no streams");

        assert_eq!(format!("{}", Error::Eof), "end of stream");
    }

    #[test]
    fn error_from_io_keeps_source() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "preset missing");
        let e: Error = io_err.into();
        assert!(matches!(e, Error::Io(_)));
        assert!(format!("{e}").contains("preset missing"));
        assert!(StdError::source(&e).is_some());
        assert!(StdError::source(&Error::Eof).is_none());
    }

    #[test]
    fn error_kinds() {
        assert!(Error::Eof.is_eof());
        assert!(!Error::codec("x").is_eof());
        assert!(Error::config("x").is_config());
        assert!(!Error::invalid_data("x").is_config());
    }
}
