//! Persistence gateway for gardens.
//!
//! # Responsibility
//! - Define the garden-level data access contract.
//! - Isolate document-store details from the use-case services.
//!
//! # Invariants
//! - Writes enforce `Garden::validate()` / `GardenPatch::validate()` first.
//! - "Not found" on read is an absent value, not an error.

pub mod garden_repo;
