//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the driven ports:
//!
//! - [`InMemoryKeeper`]: reference execution backend
//! - [`JsonCommandEngine`]: deterministic stand-in for the WASM runtime
//! - [`ChannelPublisher`]: receipts delivered over a tokio channel

pub mod json_engine;
pub mod keeper;
pub mod publisher;

pub use json_engine::*;
pub use keeper::*;
pub use publisher::*;
