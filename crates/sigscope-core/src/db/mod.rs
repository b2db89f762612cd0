//! Series registry
//!
//! Holds every series under a unique name so the render loop can look up
//! what producers registered, and aggregates memory and sample counts for
//! diagnostic display.

pub mod registry;
pub mod stats;
