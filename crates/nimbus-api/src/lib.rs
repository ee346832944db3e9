//! nimbus-api: Shared API types and schemas
//!
//! Contains the normalized endpoint record, snapshot type and response bodies
//! used across the daemon, client, and CLI.

pub mod endpoint;
pub mod responses;

pub use endpoint::{Endpoint, Snapshot};
