//! Repository layer for the in-memory appointment collection.
//!
//! # Responsibility
//! - Define the storage contract the scheduling service depends on.
//! - Enforce the no-overlap invariant on every insertion path.
//!
//! # Invariants
//! - No two held appointments overlap under half-open semantics.
//! - Rejected writes leave the collection unchanged.

pub mod appointment_store;
