//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `PfError` as one variant
//! via `#[from]`, so configuration failures surface unchanged at the planner
//! boundary.

use thiserror::Error;

/// The top-level error type for `pf-core`.
#[derive(Debug, Error)]
pub enum PfError {
    #[error("invalid configuration: {field} {reason}")]
    Config {
        field:  &'static str,
        reason: String,
    },
}

impl PfError {
    pub(crate) fn config(field: &'static str, reason: impl Into<String>) -> Self {
        PfError::Config { field, reason: reason.into() }
    }
}

/// Shorthand result type for `pf-core`.
pub type PfResult<T> = Result<T, PfError>;
