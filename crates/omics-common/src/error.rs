//! Error types shared across the omics crates

use thiserror::Error;

/// Result type alias for common operations
pub type Result<T> = std::result::Result<T, OmicsError>;

/// Error type for resource lookup and source registry handling
#[derive(Error, Debug)]
pub enum OmicsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_io_errors_convert_and_display() {
        let err: OmicsError = std::io::Error::new(std::io::ErrorKind::Other, "disk gone").into();
        assert!(matches!(err, OmicsError::Io(_)));
        assert_eq!(err.to_string(), "IO error: disk gone");
        assert_eq!(
            OmicsError::UnknownSource("pfam".to_string()).to_string(),
            "Unknown source: pfam"
        );
    }
}
