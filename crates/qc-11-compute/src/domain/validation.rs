//! # Message Validation
//!
//! Stateless checks run before a message reaches the dispatcher. A message
//! failing here is never handled: no audit event, no keeper call.

use crate::config::ComputeConfig;
use crate::domain::messages::{Msg, MsgExecuteContract, MsgInstantiateContract, MsgStoreCode};
use crate::errors::KeeperError;

/// Stateless validation of a message against configured limits.
pub trait ValidateBasic {
    /// Returns `KeeperError::Validation` describing the first violation.
    fn validate_basic(&self, config: &ComputeConfig) -> Result<(), KeeperError>;
}

fn invalid(reason: impl Into<String>) -> KeeperError {
    KeeperError::Validation(reason.into())
}

fn check_len(field: &str, len: usize, max: usize) -> Result<(), KeeperError> {
    if len > max {
        return Err(invalid(format!("{field} exceeds {max} bytes (got {len})")));
    }
    Ok(())
}

impl ValidateBasic for MsgStoreCode {
    fn validate_basic(&self, config: &ComputeConfig) -> Result<(), KeeperError> {
        if self.sender.is_empty() {
            return Err(invalid("sender is required"));
        }
        if self.wasm_byte_code.is_empty() {
            return Err(invalid("wasm byte code is required"));
        }
        check_len("wasm byte code", self.wasm_byte_code.len(), config.max_wasm_size)?;
        check_len("source", self.source.len(), config.max_source_size)?;
        check_len("builder", self.builder.len(), config.max_builder_size)
    }
}

impl ValidateBasic for MsgInstantiateContract {
    fn validate_basic(&self, config: &ComputeConfig) -> Result<(), KeeperError> {
        if self.sender.is_empty() {
            return Err(invalid("sender is required"));
        }
        if self.code_id.is_none() {
            return Err(invalid("code id is required"));
        }
        if self.label.trim().is_empty() {
            return Err(invalid("label is required"));
        }
        check_len("label", self.label.len(), config.max_label_size)?;
        self.init_funds.validate().map_err(invalid)
    }
}

impl ValidateBasic for MsgExecuteContract {
    fn validate_basic(&self, _config: &ComputeConfig) -> Result<(), KeeperError> {
        if self.sender.is_empty() {
            return Err(invalid("sender is required"));
        }
        if self.contract.is_empty() {
            return Err(invalid("contract address is required"));
        }
        self.sent_funds.validate().map_err(invalid)
    }
}

impl ValidateBasic for Msg {
    fn validate_basic(&self, config: &ComputeConfig) -> Result<(), KeeperError> {
        match self {
            Self::StoreCode(m) => m.validate_basic(config),
            Self::InstantiateContract(m) => m.validate_basic(config),
            Self::ExecuteContract(m) => m.validate_basic(config),
        }
    }
}
