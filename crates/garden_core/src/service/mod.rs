//! Garden use-case services.
//!
//! # Responsibility
//! - Orchestrate gateway calls into user-action level APIs.
//! - Keep the CLI decoupled from storage details.

pub mod garden_service;
