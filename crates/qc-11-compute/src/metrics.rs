//! # Compute Metrics
//!
//! Prometheus metrics for the message layer.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! qc-11-compute = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `compute_messages_total` - Counter of handled messages (by type)
//! - `compute_messages_failed_total` - Counter of messages whose keeper call failed (by type)
//! - `compute_txs_rolled_back_total` - Counter of rolled-back transactions

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{register_int_counter, register_int_counter_vec, IntCounter, IntCounterVec};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Handled messages, labeled by type
    pub static ref MESSAGES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "compute_messages_total",
        "Total number of compute messages handled",
        &["msg_type"]
    )
    .expect("Failed to create MESSAGES_TOTAL metric");

    /// Failed messages, labeled by type
    pub static ref MESSAGES_FAILED: IntCounterVec = register_int_counter_vec!(
        "compute_messages_failed_total",
        "Total number of compute messages whose keeper call failed",
        &["msg_type"]
    )
    .expect("Failed to create MESSAGES_FAILED metric");

    /// Rolled-back transactions
    pub static ref TXS_ROLLED_BACK: IntCounter = register_int_counter!(
        "compute_txs_rolled_back_total",
        "Total number of transactions rolled back"
    )
    .expect("Failed to create TXS_ROLLED_BACK metric");
}

/// Record a handled message
#[cfg(feature = "metrics")]
pub fn record_message(msg_type: &str) {
    MESSAGES_TOTAL.with_label_values(&[msg_type]).inc();
}

/// Record a failed message
#[cfg(feature = "metrics")]
pub fn record_message_failed(msg_type: &str) {
    MESSAGES_FAILED.with_label_values(&[msg_type]).inc();
}

/// Record a rolled-back transaction
#[cfg(feature = "metrics")]
pub fn record_tx_rolled_back() {
    TXS_ROLLED_BACK.inc();
}

#[cfg(not(feature = "metrics"))]
pub fn record_message(_msg_type: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_message_failed(_msg_type: &str) {}

#[cfg(not(feature = "metrics"))]
pub fn record_tx_rolled_back() {}
