// Workspace model: bounds and barrier obstacles

pub mod workspace;

pub use workspace::*;
