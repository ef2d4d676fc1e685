//! Error types for the axis control core.

#![warn(missing_docs)]

use thiserror::Error;

/// Errors returned synchronously by the command surface.
///
/// A rejected command leaves the axis completely unchanged; faults that
/// arise asynchronously (the homing timeout) are reported through the
/// hardware port's error callout instead, not through this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AxisError {
    /// The command is incompatible with the current state or control
    /// mode.
    #[error("command rejected: {0}")]
    Rejected(&'static str),
    /// The configuration failed validation at construction.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
