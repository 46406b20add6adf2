//! Garden record schema.
//!
//! # Responsibility
//! - Define the canonical garden shape and its embedded collections.
//! - Provide the plain-map document form used for storage and export.
//!
//! # Invariants
//! - A garden is identified by its `name`, which is also its document key.
//! - Plants, tasks and supplies live only inside their owning garden.

pub mod garden;
pub mod patch;
