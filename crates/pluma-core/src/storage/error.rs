use std::path::PathBuf;

/// Errors raised by the storage/config layer.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error during '{operation}' on '{path}': {source}", path = .path.display())]
    Io {
        #[source]
        source: std::io::Error,
        path: PathBuf,
        operation: String,
    },

    #[error("Failed to deserialize {format} from '{path}': {message}", path = .path.display())]
    Deserialization {
        format: &'static str,
        path: PathBuf,
        message: String,
    },

    #[error("Failed to serialize {format}: {message}")]
    Serialization {
        format: &'static str,
        message: String,
    },

    #[error("Unknown or unsupported config format for path: {0}")]
    UnsupportedFormat(PathBuf),
}

impl StorageError {
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        StorageError::Io {
            source,
            path,
            operation: operation.into(),
        }
    }
}
