//! Blood bank record-keeping backend.
//!
//! Three stateful components sit behind the REST layer: the unit ledger
//! (per-blood-group counters with bounds and derived stock status), the
//! request lifecycle (state machine from PENDING to a terminal state, with
//! the ledger debited on fulfillment), and the donor registry. The
//! dashboard aggregator computes read-only rollups over all three.

pub mod domain;
pub mod error;
pub mod rest;
pub mod storage;
