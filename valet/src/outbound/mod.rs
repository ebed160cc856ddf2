//! Adapters for the external services the assistant depends on.

pub mod persistence;
pub mod relay;
