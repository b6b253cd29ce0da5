//! # API Route Handlers
//!
//! This module organizes the Axum route handlers for the
//! `scriptlens-server`.

pub mod extract;
pub mod general;

// Re-export all handlers from the sub-modules to make them easily
// accessible to the router under a single `handlers::` path.
pub use extract::*;
pub use general::*;
