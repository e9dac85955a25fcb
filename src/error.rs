//! Error types for the watermark-demo-gen crate.

/// Errors that can occur while generating demo image pairs.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A remote base-image fetch failed (network, status, or decode).
    ///
    /// Callers of the batch driver never see this directly: the driver
    /// falls back to a synthesized placeholder instead.
    #[error("remote fetch failed: {0}")]
    Fetch(String),

    /// An I/O error occurred while writing output files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested output format is not supported.
    #[error("unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// An error occurred during image encode or decode.
    #[error("image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// The metadata sidecar could not be serialized.
    #[error("metadata serialization error: {0}")]
    Metadata(#[from] serde_json::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let io_err = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert!(io_err.to_string().contains("gone"));

        let unsupported = Error::UnsupportedFormat("tiff".to_string());
        assert!(unsupported.to_string().contains("tiff"));

        let fetch = Error::Fetch("status 503".to_string());
        assert!(fetch.to_string().contains("503"));
    }
}
