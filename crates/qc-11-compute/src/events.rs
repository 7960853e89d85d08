//! # Event Schema
//!
//! IPC payloads exchanged with the transaction runtime.
//!
//! - **Correlation IDs:** every request carries one; its receipt echoes it
//! - **Delivery order:** receipts are published in request order
//!
//! | Message Type | Direction |
//! |--------------|-----------|
//! | `DeliverTxRequest` | runtime → compute |
//! | `TxReceipt` | compute → runtime |

use crate::domain::context::BlockInfo;
use crate::domain::events::Event;
use crate::domain::messages::MsgResponse;
use crate::domain::outcome::ReplyPayload;
use crate::domain::value_objects::Binary;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// INBOUND EVENTS
// =============================================================================

/// Request to deliver one encoded transaction within a block.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DeliverTxRequest {
    /// Correlation id echoed in the receipt.
    pub correlation_id: Uuid,
    /// Block the transaction belongs to.
    pub block: BlockInfo,
    /// Position of the transaction within the block.
    #[serde(default)]
    pub tx_index: u32,
    /// Encoded transaction.
    pub tx_bytes: Binary,
}

impl DeliverTxRequest {
    /// New request with a fresh correlation id.
    #[must_use]
    pub fn new(block: BlockInfo, tx_index: u32, tx_bytes: impl Into<Binary>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            block,
            tx_index,
            tx_bytes: tx_bytes.into(),
        }
    }
}

// =============================================================================
// OUTBOUND EVENTS
// =============================================================================

/// First failing message of a rolled-back transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxFailure {
    /// Index of the failing message.
    pub msg_index: usize,
    /// ABCI-style error code within [`crate::errors::CODESPACE`].
    pub code: u32,
    /// Error text.
    pub error: String,
    /// Structurally valid response of the failing message, partial data included.
    pub response: Option<MsgResponse>,
}

/// Result of delivering one transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxReceipt {
    /// Correlation id of the request.
    pub correlation_id: Uuid,
    /// 0 on success.
    pub code: u32,
    /// Error codespace; empty on success.
    pub codespace: String,
    /// Human readable log.
    pub log: String,
    /// One response per message, committed transactions only.
    pub responses: Vec<MsgResponse>,
    /// Per-message reply echoes, up to and including a failing message.
    pub replies: Vec<ReplyPayload>,
    /// Failure details, if the transaction was rolled back.
    pub failure: Option<TxFailure>,
    /// Committed events; empty when rolled back.
    pub events: Vec<Event>,
}

impl TxReceipt {
    /// Returns true if the transaction committed.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

// =============================================================================
// EVENT TOPICS
// =============================================================================

/// Event topics for the compute subsystem.
pub mod topics {
    /// Inbound transaction delivery.
    pub const DELIVER_TX_REQUEST: &str = "compute.deliver_tx.request";

    /// Outbound transaction receipt.
    pub const TX_RECEIPT: &str = "compute.deliver_tx.receipt";
}
