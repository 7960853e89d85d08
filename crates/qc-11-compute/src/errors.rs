//! # Error Types
//!
//! All error types for the compute module message layer.
//!
//! Keeper errors carry stable ABCI-style codes in the `compute` codespace so
//! that every replaying node reports an identical result for the same input.

use crate::domain::value_objects::{AccAddress, CodeId};
use thiserror::Error;

/// Codespace reported alongside every error code of this module.
pub const CODESPACE: &str = "compute";

// =============================================================================
// KEEPER ERRORS
// =============================================================================

/// Errors surfaced by the execution backend (keeper).
///
/// The dispatcher never interprets these; they are handed back unchanged to
/// the transaction runtime together with the (possibly partial) response.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeeperError {
    /// Malformed or inadmissible input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Referenced code id does not exist.
    #[error("code not found: {0}")]
    CodeNotFound(CodeId),

    /// Referenced contract address does not exist.
    #[error("contract not found: {0}")]
    ContractNotFound(AccAddress),

    /// Contract-side logic failure.
    #[error("execution error: {0}")]
    Execution(String),

    /// Insufficient or invalid transferred value.
    #[error("insufficient funds: {0}")]
    Funds(String),

    /// Persistence failure in the backend.
    #[error("storage error: {0}")]
    Storage(String),
}

impl KeeperError {
    /// Stable numeric code within [`CODESPACE`].
    #[must_use]
    pub fn code(&self) -> u32 {
        match self {
            Self::Validation(_) => 2,
            Self::CodeNotFound(_) | Self::ContractNotFound(_) => 3,
            Self::Execution(_) => 4,
            Self::Funds(_) => 5,
            Self::Storage(_) => 6,
        }
    }

    /// Short label used in structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::CodeNotFound(_) | Self::ContractNotFound(_) => "not_found",
            Self::Execution(_) => "execution",
            Self::Funds(_) => "funds",
            Self::Storage(_) => "storage",
        }
    }
}

// =============================================================================
// DECODE ERRORS
// =============================================================================

/// Errors while decoding transaction bytes or wire values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Transaction bytes are not a valid encoded transaction.
    #[error("tx decode error: {0}")]
    Tx(String),

    /// Address string could not be parsed.
    #[error("invalid address: {0}")]
    Address(String),

    /// Coin amount is not a decimal 256-bit integer.
    #[error("invalid coin amount: {0}")]
    Amount(String),
}

impl DecodeError {
    /// Stable numeric code within [`CODESPACE`].
    #[must_use]
    pub fn code(&self) -> u32 {
        1
    }
}

// =============================================================================
// IPC ERRORS
// =============================================================================

/// Errors related to inbound/outbound transport of requests and receipts.
#[derive(Debug, Error, Clone)]
pub enum IpcError {
    /// Receipt could not be delivered (receiver closed).
    #[error("receipt channel closed")]
    ChannelClosed,
}

// =============================================================================
// CONFIGURATION ERRORS
// =============================================================================

/// Invalid configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A limit that must be positive was zero.
    #[error("{name} must be greater than zero")]
    ZeroLimit {
        /// Name of the offending field.
        name: &'static str,
    },

    /// An environment variable held an unparsable value.
    #[error("invalid value for {var}: {value}")]
    InvalidEnv {
        /// Environment variable name.
        var: &'static str,
        /// Raw value found.
        value: String,
    },
}

// =============================================================================
// TELEMETRY ERRORS
// =============================================================================

/// Errors while installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// Filter directive could not be parsed.
    #[error("invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber was already installed.
    #[error("subscriber init failed: {0}")]
    Init(String),
}

// =============================================================================
// TESTS
// =============================================================================
