//! # Audit Events
//!
//! Ordered, append-only records attached to the executing transaction.
//! Events become part of replicated history only if the transaction commits;
//! the runtime discards the whole log on rollback.

use crate::domain::value_objects::AccAddress;
use serde::{Deserialize, Serialize};

/// Event type emitted once per handled message.
pub const EVENT_TYPE_MESSAGE: &str = "message";

/// Event type carrying contract-produced attributes.
pub const EVENT_TYPE_WASM: &str = "wasm";

/// Emitted by the keeper after bytecode is stored.
pub const EVENT_TYPE_STORE_CODE: &str = "store_code";

/// Emitted by the keeper after a contract is instantiated.
pub const EVENT_TYPE_INSTANTIATE: &str = "instantiate";

/// Emitted by the keeper after a contract call succeeds.
pub const EVENT_TYPE_EXECUTE: &str = "execute";

/// Attribute keys.
pub mod attribute_keys {
    /// Module that handled the message.
    pub const MODULE: &str = "module";
    /// Signer of the message.
    pub const SENDER: &str = "sender";
    /// Address of the contract that produced the event.
    pub const CONTRACT_ADDRESS: &str = "contract_address";
    /// Code id touched by the message.
    pub const CODE_ID: &str = "code_id";
}

/// A single key/value attribute.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    /// Attribute key.
    pub key: String,
    /// Attribute value.
    pub value: String,
}

impl Attribute {
    /// Creates an attribute.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A typed event with ordered attributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event type, e.g. `message`.
    #[serde(rename = "type")]
    pub ty: String,
    /// Ordered attributes.
    pub attributes: Vec<Attribute>,
}

impl Event {
    /// Creates an event without attributes.
    #[must_use]
    pub fn new(ty: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            attributes: Vec::new(),
        }
    }

    /// Appends an attribute.
    #[must_use]
    pub fn add_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute::new(key, value));
        self
    }

    /// The `message` audit event: `{module, sender}`.
    #[must_use]
    pub fn message(module: &str, sender: &AccAddress) -> Self {
        Self::new(EVENT_TYPE_MESSAGE)
            .add_attribute(attribute_keys::MODULE, module)
            .add_attribute(attribute_keys::SENDER, sender.to_string())
    }

    /// Looks up the first attribute value for `key`.
    #[must_use]
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }
}

/// Append-only event log for one transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventManager {
    events: Vec<Event>,
}

impl EventManager {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an event.
    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Appends several events, preserving their order.
    pub fn emit_all(&mut self, events: impl IntoIterator<Item = Event>) {
        self.events.extend(events);
    }

    /// Events emitted so far.
    #[must_use]
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of events emitted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if nothing was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Consumes the log.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }
}
