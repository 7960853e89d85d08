//! # Outcomes
//!
//! Paired `(value, error)` results used between the dispatcher, the keeper
//! and the runtime. The value is always structurally valid, including on
//! failure, because reply consumers inspect it regardless of the error.

use crate::domain::messages::MsgResponse;
use crate::domain::value_objects::{AccAddress, Binary};
use crate::errors::KeeperError;
use serde::{Deserialize, Serialize};

/// A value paired with the failure (if any) that accompanied it.
#[derive(Clone, Debug, PartialEq, Eq)]
#[must_use]
pub struct Outcome<T> {
    /// Best-available value, present on success and failure alike.
    pub value: T,
    /// Backend failure, passed through untouched.
    pub error: Option<KeeperError>,
}

impl<T> Outcome<T> {
    /// Successful outcome.
    pub fn ok(value: T) -> Self {
        Self { value, error: None }
    }

    /// Failed outcome that still carries a value.
    pub fn failed(value: T, error: KeeperError) -> Self {
        Self {
            value,
            error: Some(error),
        }
    }

    /// Returns true when no error accompanied the value.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }

    /// Transforms the value, keeping the error as-is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        Outcome {
            value: f(self.value),
            error: self.error,
        }
    }

    /// Splits into value and error.
    pub fn into_parts(self) -> (T, Option<KeeperError>) {
        (self.value, self.error)
    }

    /// Drops the value on failure.
    pub fn into_result(self) -> Result<T, KeeperError> {
        match self.error {
            None => Ok(self.value),
            Some(err) => Err(err),
        }
    }
}

impl<T: Default> Outcome<T> {
    /// Failed outcome carrying the default (empty) value.
    pub fn empty_failure(error: KeeperError) -> Self {
        Self::failed(T::default(), error)
    }
}

/// Backend result of a contract instantiation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InstantiateResult {
    /// New contract address; absent when instantiation failed.
    pub address: Option<AccAddress>,
    /// Raw contract response data.
    pub data: Binary,
}

/// Backend result of a contract call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContractResult {
    /// Raw contract response data.
    pub data: Binary,
}

/// Payload echoed to the reply/callback consumer for one dispatched message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyPayload {
    /// Position of the message in its transaction.
    pub msg_index: usize,
    /// Response data, surfaced whether or not the message failed.
    pub data: Binary,
    /// Error text when the message failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ReplyPayload {
    /// Builds the echo for a dispatched message.
    #[must_use]
    pub fn from_outcome(msg_index: usize, outcome: &Outcome<MsgResponse>) -> Self {
        Self {
            msg_index,
            data: Binary::from_slice(outcome.value.data()),
            error: outcome.error.as_ref().map(ToString::to_string),
        }
    }

    /// Returns true if the echoed message succeeded.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
