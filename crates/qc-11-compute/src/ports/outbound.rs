//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the compute message layer depends on:
//! - the execution backend (keeper) that owns code/contract storage
//! - the sandboxed contract engine the keeper runs bytecode on
//! - the publisher receiving transaction receipts
//!
//! Dependencies point INWARD: adapters implement these traits.

use crate::domain::context::{BlockInfo, Context};
use crate::domain::outcome::{ContractResult, InstantiateResult, Outcome};
use crate::domain::value_objects::{AccAddress, Binary, CodeId, Coins};
use crate::errors::IpcError;
use crate::events::TxReceipt;
use async_trait::async_trait;

// =============================================================================
// KEEPER (Execution Backend)
// =============================================================================

/// Execution backend: sole mutator of persistent code and contract storage.
///
/// Every operation is synchronous and deterministic. Failures are returned
/// alongside the best-available value; implementations must never panic on
/// absent addresses or empty payloads.
pub trait Keeper {
    /// Store bytecode and assign the next code id.
    ///
    /// # Returns
    ///
    /// * the assigned id, or [`CodeId::NONE`] together with a
    ///   `Validation`/`Storage` error. Failure mutates nothing.
    fn create_code(
        &mut self,
        ctx: &mut Context,
        creator: &AccAddress,
        wasm_code: &[u8],
        source: &str,
        builder: &str,
    ) -> Outcome<CodeId>;

    /// Instantiate a contract from stored code.
    ///
    /// # Returns
    ///
    /// * address and raw init response data; on failure the address is
    ///   absent and data holds whatever the contract produced.
    #[allow(clippy::too_many_arguments)]
    fn instantiate(
        &mut self,
        ctx: &mut Context,
        code_id: CodeId,
        creator: &AccAddress,
        init_msg: &[u8],
        label: &str,
        funds: &Coins,
        callback_sig: Option<&[u8]>,
    ) -> Outcome<InstantiateResult>;

    /// Call an instantiated contract.
    ///
    /// # Returns
    ///
    /// * raw response data, also populated with partial data on failure.
    fn execute(
        &mut self,
        ctx: &mut Context,
        contract: &AccAddress,
        caller: &AccAddress,
        msg: &[u8],
        funds: &Coins,
        callback_sig: Option<&[u8]>,
    ) -> Outcome<ContractResult>;
}

/// Checkpointing used by the runtime to make a transaction atomic.
pub trait Transactional {
    /// Opaque saved state.
    type Snapshot;

    /// Captures the current committed state.
    fn snapshot(&self) -> Self::Snapshot;

    /// Restores a previously captured state, discarding later writes.
    fn revert(&mut self, snapshot: Self::Snapshot);
}

// =============================================================================
// CONTRACT ENGINE (sandboxed bytecode interpreter)
// =============================================================================

/// Environment handed to contract code.
#[derive(Clone, Debug)]
pub struct Env {
    /// Current block.
    pub block: BlockInfo,
    /// Address of the contract being run.
    pub contract: AccAddress,
    /// Code id of the contract being run.
    pub code_id: CodeId,
}

/// Caller information handed to contract code.
#[derive(Clone, Debug)]
pub struct MessageInfo {
    /// Message signer.
    pub sender: AccAddress,
    /// Funds sent along.
    pub funds: Coins,
    /// Callback signature, if any.
    pub callback_sig: Option<Binary>,
}

/// Successful contract invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineResponse {
    /// Raw response data.
    pub data: Binary,
    /// Contract-emitted attributes, in order.
    pub attributes: Vec<(String, String)>,
}

/// Failed contract invocation, with whatever data was produced before failing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineFailure {
    /// Contract error text.
    pub error: String,
    /// Partial response data.
    pub data: Binary,
}

/// Sandboxed executor of contract bytecode.
pub trait ContractEngine {
    /// Run the contract's init entry point.
    fn instantiate(
        &self,
        code: &[u8],
        env: &Env,
        info: &MessageInfo,
        msg: &[u8],
    ) -> Result<EngineResponse, EngineFailure>;

    /// Run the contract's handle entry point.
    fn execute(
        &self,
        code: &[u8],
        env: &Env,
        info: &MessageInfo,
        msg: &[u8],
    ) -> Result<EngineResponse, EngineFailure>;
}

// =============================================================================
// RECEIPT PUBLISHER
// =============================================================================

/// Destination for per-transaction receipts produced by the service loop.
#[async_trait]
pub trait ReceiptPublisher: Send + Sync {
    /// Publish one receipt. Receipts are published in delivery order.
    async fn publish(&self, receipt: TxReceipt) -> Result<(), IpcError>;
}
