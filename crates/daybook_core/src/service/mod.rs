//! Core use-case services.
//!
//! # Responsibility
//! - Turn raw caller input into validated store operations.
//! - Keep UI/FFI/CLI layers decoupled from store and codec details.

pub mod scheduling_service;
