//! Integration flows across the compute module's public API.

pub mod compute_flows;
