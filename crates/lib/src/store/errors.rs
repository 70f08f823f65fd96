//! Error types for store operations.

use thiserror::Error;

/// Structured error types for store operations.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum StoreError {
    /// The value at the target path is not a list.
    #[error("Value at {path} is not a list")]
    NotAList { path: String },

    /// The re-entrancy guard detected a dispatch cycle: a listener triggered
    /// a nested dispatch of the event/path pair it was invoked for.
    #[error("Dispatch cycle: '{event}' re-entered at {path}")]
    DispatchCycle { event: String, path: String },
}

impl StoreError {
    /// Check if this error is a container type mismatch.
    pub fn is_type_error(&self) -> bool {
        matches!(self, StoreError::NotAList { .. })
    }

    /// Check if this error is the re-entrancy guard tripping.
    pub fn is_dispatch_cycle(&self) -> bool {
        matches!(self, StoreError::DispatchCycle { .. })
    }

    /// Get the path if this is a path-related error.
    pub fn path(&self) -> Option<&str> {
        match self {
            StoreError::NotAList { path } | StoreError::DispatchCycle { path, .. } => Some(path),
        }
    }
}

impl From<StoreError> for crate::Error {
    fn from(err: StoreError) -> Self {
        crate::Error::Store(err)
    }
}
