use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Failed to read {size} bytes of remote memory at address {address:#x}")]
    MemoryReadFailed { address: u64, size: usize },

    #[error("Failed to write {size} bytes of remote memory at address {address:#x}")]
    MemoryWriteFailed { address: u64, size: usize },

    #[error("Null address")]
    NullAddress,

    #[error("Field '{field}' depends on '{dependency}', which is not a pointer field")]
    InvalidDependency { field: String, dependency: String },

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Duplicate field '{field}' in layout '{layout}'")]
    DuplicateField { layout: String, field: String },

    #[error("Cyclic dependency found at field '{0}'")]
    CyclicDependency(String),

    #[error("Unknown layout: {0}")]
    UnknownLayout(String),

    #[error("Layout already registered: {0}")]
    DuplicateLayout(String),

    #[error("Unknown value type: {0}")]
    UnknownValueType(String),

    #[error("Value type mismatch: expected {expected}, got {actual}")]
    ValueTypeMismatch { expected: String, actual: String },

    #[error("Invalid value size for {value_type}: expected {expected} bytes, got {actual}")]
    ValueSize {
        value_type: String,
        expected: usize,
        actual: usize,
    },

    #[error("Field '{0}' can't be written")]
    UnsupportedWrite(String),

    #[error("Layouts were built for {layouts}, accessor is configured for {accessor}")]
    ConfigMismatch { layouts: String, accessor: String },

    #[error("Invalid hex: {0}")]
    InvalidHex(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this error is a "file not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }

    /// Transport failures come from the remote target and are recoverable.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::MemoryReadFailed { .. } | Error::MemoryWriteFailed { .. } | Error::NullAddress
        )
    }

    /// Configuration errors point at a bug in a layout declaration or in the
    /// caller, never at the state of the remote target.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidDependency { .. }
                | Error::UnknownField(_)
                | Error::DuplicateField { .. }
                | Error::CyclicDependency(_)
                | Error::UnknownLayout(_)
                | Error::DuplicateLayout(_)
                | Error::UnknownValueType(_)
                | Error::ValueTypeMismatch { .. }
                | Error::ValueSize { .. }
                | Error::UnsupportedWrite(_)
                | Error::ConfigMismatch { .. }
        )
    }
}
