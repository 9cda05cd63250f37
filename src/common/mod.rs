//! Common types, geometry, traits, and error definitions for rrt_planner
//!
//! This module provides the foundational building blocks shared by the
//! workspace model, the tree store and the planner.

pub mod types;
pub mod geometry;
pub mod traits;
pub mod error;

pub use types::*;
pub use traits::*;
pub use error::*;
