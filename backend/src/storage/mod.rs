//! Storage layer.
//!
//! The authoritative state lives in process memory behind an explicit store
//! abstraction with per-key locking. The domain services are the only
//! callers; swapping in a persistent backend would replace this module
//! without touching them.

pub mod memory;

pub use memory::{DonorStore, InventoryStore, RequestStore};
