//! Error types for EMF+ decoding
//!
//! Structural and lookup failures are surfaced as `EmfPlusError` so a caller
//! processing a whole document can decide to abort or skip the record.
//! Image payload failures use the `Image` variant but are only logged by the
//! apply path, never propagated.

use thiserror::Error;

/// Custom error type for EMF+ decode/apply operations
#[derive(Error, Debug)]
pub enum EmfPlusError {
    #[error("Unexpected end of data: {0}")]
    Io(#[from] std::io::Error),

    #[error("Declared size {declared} exceeds the {available} bytes available for {context}")]
    SizeMismatch {
        context: &'static str,
        declared: u64,
        available: u64,
    },

    #[error("{what} length {value} outside of the allowed range 0..={limit}")]
    LimitExceeded {
        what: &'static str,
        value: i64,
        limit: u64,
    },

    #[error("Invalid flag combination: {0}")]
    InvalidFlags(String),

    #[error("Unknown {what} tag {tag:#x}")]
    UnknownTag { what: &'static str, tag: u32 },

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Object id {0} is outside of the object table")]
    ObjectIdOutOfRange(u32),

    #[error("Object table slot {0} is empty")]
    MissingObject(u8),

    #[error("Continuation for slot {slot} declares object type {expected:#x} but the table holds type {found:#x}")]
    ContinuationMismatch { slot: u8, expected: u8, found: u8 },

    #[error("Restore of state {0} without a matching save")]
    MissingSavedState(u32),

    #[error("Singular matrix: {0}")]
    SingularMatrix(String),

    #[error("Image error: {0}")]
    Image(String),
}

/// Result type alias for EMF+ operations
pub type EmfPlusResult<T> = Result<T, EmfPlusError>;

impl EmfPlusError {
    /// Structural errors leave subsequent byte offsets meaningless
    pub fn is_structural(&self) -> bool {
        !matches!(
            self,
            EmfPlusError::MissingObject(_)
                | EmfPlusError::ContinuationMismatch { .. }
                | EmfPlusError::MissingSavedState(_)
                | EmfPlusError::Image(_)
        )
    }
}

/// Conversion from EmfPlusError to PyErr
#[cfg(feature = "python")]
impl From<EmfPlusError> for pyo3::PyErr {
    fn from(err: EmfPlusError) -> Self {
        pyo3::PyErr::new::<pyo3::exceptions::PyValueError, _>(err.to_string())
    }
}

impl From<image::ImageError> for EmfPlusError {
    fn from(err: image::ImageError) -> Self {
        EmfPlusError::Image(err.to_string())
    }
}
