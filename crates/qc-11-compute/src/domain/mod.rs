//! # Domain Layer (Inner Hexagon)
//!
//! Messages, responses, events and the execution context of the compute
//! module. NO I/O, NO async.
//!
//! Dependencies point INWARD only (ports and adapters depend on this, not
//! vice versa).

pub mod context;
pub mod events;
pub mod messages;
pub mod outcome;
pub mod validation;
pub mod value_objects;

pub use context::*;
pub use events::*;
pub use messages::*;
pub use outcome::*;
pub use validation::*;
pub use value_objects::*;
