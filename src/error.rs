//! Crate-wide error types.
//!
//! Mirrors the error kinds described in the kernel's error handling design:
//! capacity exhaustion and TBox inconsistency are fatal import-time errors
//! with derivation witnesses; parse failures report a file and an offset;
//! query compilation failures report why a query falls outside the
//! supported fragment; store errors wrap the underlying `rusqlite` failure.
//! Unknown-predicate occurrences are not represented here at all - they are
//! warnings, collected and logged, never a `Result::Err`.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the kernel.
pub type Result<T> = std::result::Result<T, KernelError>;

#[derive(Debug, Error)]
pub enum KernelError {
    #[error("relation capacity exceeded: capacity is {capacity}, attempted to add element '{element}'")]
    CapacityExceeded { capacity: usize, element: String },

    /// Raised when closure derives that an element is simultaneously a
    /// subclass of and disjoint from another. Carries the three indices
    /// involved in the derivation so the caller can print a witness.
    #[error(
        "TBox inconsistent: '{k}' is derived to be a subclass of '{i}' \
         (which is disjoint from '{j}'), yet '{k}' is also derived to be a \
         subclass of '{j}'"
    )]
    TboxInconsistent { i: String, j: String, k: String },

    #[error("parse error in {file}:{offset}: {message}")]
    Parse {
        file: PathBuf,
        offset: usize,
        message: String,
    },

    #[error("query not in supported fragment: {reason}")]
    QueryNotInFragment { reason: String },

    #[error("unknown element '{0}'")]
    UnknownElement(String),

    #[error(transparent)]
    Store(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
