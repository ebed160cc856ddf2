//! Tenant-scoped database access and model relay for the Valet assistant.
//!
//! The crate is organised around a small hexagonal boundary:
//!
//! - [`domain`]: chat types, the message-relay port, and the assistant
//!   service consumed by the CLI binary.
//! - [`outbound`]: adapters for external services, namely the
//!   PostgreSQL-backed tenant store and the invoke-model relay client.
//! - [`config`]: process configuration, read once at construction.

pub mod config;
pub mod domain;
pub mod outbound;
