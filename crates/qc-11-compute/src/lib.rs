//! # QC-11 Compute - Contract Message Dispatch
//!
//! **Subsystem ID:** 11
//! **Module name:** `compute`
//!
//! ## Purpose
//!
//! Entry point through which signed transactions reach the contract
//! execution backend. Three message kinds are handled: storing bytecode,
//! instantiating a contract from stored code, and executing a call on an
//! instantiated contract. Each handler emits an audit event, delegates to
//! the keeper and returns a response that is structurally valid even when
//! the keeper fails, so reply consumers can still read partial data.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | `message` event emitted before the keeper call, on every path | `msg_server.rs` - `emit_message_event()` |
//! | Keeper errors passed through unchanged | `msg_server.rs` - `Outcome::map` |
//! | Missing instantiate address renders as `""` | `domain/value_objects.rs` - `AccAddress::render()` |
//! | Failed code upload reports code id `0` | `domain/value_objects.rs` - `CodeId::NONE` |
//! | Failed transaction leaves no state and no events | `service.rs` - `deliver_tx()` |
//!
//! ## Components
//!
//! | Component | Location | Purpose |
//! |-----------|----------|---------|
//! | Dispatcher | `msg_server.rs` | One handler per message kind |
//! | Validator | `domain/validation.rs` | Stateless limits and required fields |
//! | Keeper | `adapters/keeper.rs` | Reference code and contract storage |
//! | Engine | `adapters/json_engine.rs` | Deterministic contract stand-in |
//! | Runtime | `service.rs` | Atomic transactions, blocks, request loop |
//!
//! ## Error Codes (codespace `compute`)
//!
//! | Code | Error |
//! |------|-------|
//! | 1 | tx decode |
//! | 2 | validation |
//! | 3 | code / contract not found |
//! | 4 | contract execution |
//! | 5 | insufficient funds |
//! | 6 | storage |
//!
//! ## Usage Example
//!
//! ```ignore
//! use qc_11_compute::prelude::*;
//!
//! let mut service = create_test_service();
//! let result = service.deliver_tx(&BlockInfo::default(), 0, &tx);
//!
//! match result.failure {
//!     None => println!("committed {} messages", result.responses.len()),
//!     Some(f) => println!("message {} failed: {}", f.msg_index, f.error),
//! }
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod metrics;
pub mod msg_server;
pub mod ports;
pub mod service;
pub mod telemetry;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain
    pub use crate::domain::context::{BlockInfo, Context};
    pub use crate::domain::events::{Attribute, Event, EventManager};
    pub use crate::domain::messages::{
        Msg, MsgExecuteContract, MsgExecuteContractResponse, MsgInstantiateContract,
        MsgInstantiateContractResponse, MsgResponse, MsgStoreCode, MsgStoreCodeResponse, Tx,
    };
    pub use crate::domain::outcome::{ContractResult, InstantiateResult, Outcome, ReplyPayload};
    pub use crate::domain::validation::ValidateBasic;
    pub use crate::domain::value_objects::{
        AccAddress, Binary, CodeHash, CodeId, Coin, Coins, U256,
    };

    // Ports
    pub use crate::ports::inbound::ComputeMsgServer;
    pub use crate::ports::outbound::{
        ContractEngine, EngineFailure, EngineResponse, Env, Keeper, MessageInfo,
        ReceiptPublisher, Transactional,
    };

    // Events
    pub use crate::events::{topics, DeliverTxRequest, TxFailure, TxReceipt};

    // Errors
    pub use crate::errors::{
        ConfigError, DecodeError, IpcError, KeeperError, TelemetryError, CODESPACE,
    };

    // Adapters
    pub use crate::adapters::{ChannelPublisher, InMemoryKeeper, JsonCommandEngine};

    // Service
    pub use crate::config::ComputeConfig;
    pub use crate::msg_server::MsgServer;
    pub use crate::service::{
        create_test_service, BlockResult, ComputeService, ServiceStats, TxResult,
    };
    pub use crate::telemetry::{init_tracing, TelemetryConfig};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem ID for IPC.
pub const SUBSYSTEM_ID: u8 = 11;

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "compute";

/// Value of the `module` attribute on every `message` event.
pub const MODULE_NAME: &str = "compute";

// =============================================================================
// TESTS
// =============================================================================
