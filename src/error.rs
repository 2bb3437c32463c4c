//! # Error Types
//!
//! This module defines the error types used throughout the recibo library.
//!
//! Errors fall into four groups:
//!
//! - **Configuration**: bad construction input (unknown model, bad columns)
//! - **Context**: an operation invoked where it is not allowed (embedded
//!   encoders, font change mid-line)
//! - **Validation**: out-of-range or malformed data handed to an operation
//! - **Capability**: the active printer cannot perform the operation
//!
//! Capability errors are special: depending on the encoder's
//! [`Strictness`], they either surface as errors or are logged and skipped.

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ReciboError>;

/// Main error type for recibo operations.
#[derive(Debug, Error)]
pub enum ReciboError {
    /// Invalid construction-time configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation not permitted in the current encoder state.
    #[error("Context error: {0}")]
    Context(String),

    /// Parameter or input data out of range.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Operation unsupported by the active printer.
    #[error("Capability error: {0}")]
    Capability(String),
}

impl ReciboError {
    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub(crate) fn context(msg: impl Into<String>) -> Self {
        Self::Context(msg.into())
    }

    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn capability(msg: impl Into<String>) -> Self {
        Self::Capability(msg.into())
    }
}

/// How capability errors are handled.
///
/// In `Relaxed` mode (the default) an unsupported barcode, QR code or
/// PDF417 request is logged with `log::warn!` and skipped, keeping the
/// fluent chain usable across printer models. `Strict` mode raises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    #[default]
    Relaxed,
    Strict,
}
