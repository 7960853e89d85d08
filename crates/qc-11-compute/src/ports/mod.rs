//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the compute message layer.
//!
//! - **Driving Ports (Inbound)**: `ComputeMsgServer`
//! - **Driven Ports (Outbound)**: `Keeper`, `Transactional`, `ContractEngine`,
//!   `ReceiptPublisher`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
