use thiserror::Error;

/// I/O failure against a text storage backend, with the locator involved
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read '{locator}': {source}")]
    Read {
        locator: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write '{locator}': {source}")]
    Write {
        locator: String,
        #[source]
        source: std::io::Error,
    },
}

impl StorageError {
    pub fn locator(&self) -> &str {
        match self {
            StorageError::Read { locator, .. } | StorageError::Write { locator, .. } => locator,
        }
    }
}
