//! Domain modules organized as vertical slices.
//!
//! Each entity sub-module contains:
//! - `mod.rs`: Domain types and their snapshot identity
//! - `wire.rs`: Raw serde structs matching indexer responses
//! - `convert.rs`: `From` conversions from wire to domain types
//! - `client.rs`: Sub-client with HTTP methods (feature `http`)
//!
//! `snapshot` holds the cached-snapshot container shared by all three.

pub mod balance;
pub mod order;
pub mod position;
pub mod snapshot;
