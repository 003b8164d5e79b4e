//! Side-effecting operations: configuration and snapshot persistence.

pub mod config;
pub mod mission_store;
