//! Flutter-facing bindings for daybook core.

pub mod api;
