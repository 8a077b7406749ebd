//! src/error.rs
//! ============================================================================
//! # `AppError`: Unified Error Type for the Configurator
//!
//! Every fallible library operation returns `Result<T, AppError>`. Parse
//! failures (`Allocation`, `MalformedList`) are reported before any
//! interactive session starts; `IndexOutOfRange` signals a broken caller
//! invariant. Ending a session without a selection is an outcome, not an
//! error, and is never represented here.

use std::io;
use thiserror::Error;

/// Unified error type for list parsing, navigation I/O and hardware commands.
#[derive(Debug, Error)]
pub enum AppError {
    /// Standard IO error, auto-converted from `io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Storage for the copied list could not be reserved.
    #[error("Allocation of {entries} file list entries failed")]
    Allocation { entries: usize },

    /// The end-of-list marker was not found inside the scanned bound.
    #[error("File list is malformed: no end-of-list marker within {scanned} bytes")]
    MalformedList { scanned: usize },

    /// An item index outside the list was requested.
    #[error("Index {index} out of range for list of {count} items")]
    IndexOutOfRange { index: usize, count: usize },

    /// Input validation errors
    #[error("Invalid input: {field} - {message}")]
    InvalidInput {
        field: String, // "page_size", "command", etc.
        message: String,
    },

    /// Terminal I/O or rendering error.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Register window access failure.
    #[error("Transport error at offset {offset:#06x}: {reason}")]
    Transport { offset: u16, reason: String },

    /// TOML config parsing error.
    #[error("Config parse error: {0}")]
    Config(#[from] toml::de::Error),
}

impl AppError {
    /// Create an input validation error
    pub fn invalid_input<S1: Into<String>, S2: Into<String>>(field: S1, message: S2) -> Self {
        Self::InvalidInput {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a transport failure error
    pub fn transport<S: Into<String>>(offset: u16, reason: S) -> Self {
        Self::Transport {
            offset,
            reason: reason.into(),
        }
    }

    /// True for failures caused by the list buffer itself. The caller may
    /// reacquire the buffer and try again.
    #[must_use]
    pub const fn is_list_error(&self) -> bool {
        matches!(self, Self::Allocation { .. } | Self::MalformedList { .. })
    }
}

// Terminal backends report through io::Error; keep them apart from file I/O.
impl AppError {
    pub fn terminal(e: &io::Error) -> Self {
        Self::Terminal(e.to_string())
    }
}
