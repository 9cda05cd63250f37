//! rrt_planner - RRT path planning among axis-aligned barriers
//!
//! This crate grows a rapidly-exploring random tree from a start point to a
//! goal inside a bounded 2D workspace, optionally steered by waypoints from
//! an external suggestion source.

// Core modules
pub mod common;

// Algorithm modules
pub mod mapping;
pub mod guidance;
pub mod path_planning;

// Re-export common types for convenience
pub use common::{Point2D, Segment, Path2D};
pub use common::{PathPlanner, SamplingBasedPlanner, WaypointOracle, OracleContext};
pub use common::{PlanningError, OracleError, PlanResult};
pub use mapping::{Workspace, AreaBounds, HorizontalBarrier, VerticalBarrier};
pub use path_planning::{RRTPlanner, RRTConfig, PlannerMode, SeedPolicy, PlanningRequest, RunReport, PlanStatus};
