//! # Execution Context
//!
//! Exclusively-owned per-transaction context: ambient chain state plus the
//! event log. Passed explicitly to every handler and keeper call.

use crate::domain::events::{Event, EventManager};
use serde::{Deserialize, Serialize};

/// Block-level information supplied by consensus.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    /// Block height.
    pub height: u64,
    /// Block time in unix nanoseconds (consensus time, never wall clock).
    pub time_nanos: u64,
    /// Chain identifier.
    pub chain_id: String,
}

impl Default for BlockInfo {
    fn default() -> Self {
        Self {
            height: 1,
            time_nanos: 0,
            chain_id: "secret-devnet-1".to_string(),
        }
    }
}

/// Context for executing the messages of a single transaction.
#[derive(Debug)]
pub struct Context {
    block: BlockInfo,
    tx_index: u32,
    events: EventManager,
}

impl Context {
    /// Creates a fresh context with an empty event log.
    #[must_use]
    pub fn new(block: BlockInfo, tx_index: u32) -> Self {
        Self {
            block,
            tx_index,
            events: EventManager::new(),
        }
    }

    /// Block information.
    #[must_use]
    pub fn block(&self) -> &BlockInfo {
        &self.block
    }

    /// Position of the transaction within its block.
    #[must_use]
    pub fn tx_index(&self) -> u32 {
        self.tx_index
    }

    /// Event log (read).
    #[must_use]
    pub fn event_manager(&self) -> &EventManager {
        &self.events
    }

    /// Appends an event to the log.
    pub fn emit_event(&mut self, event: Event) {
        self.events.emit(event);
    }

    /// Consumes the context, yielding its events.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events.into_events()
    }
}
