//! Common traits defining interfaces for planners and their collaborators

use crate::common::error::{OracleError, PlanningError};
use crate::common::types::*;
use crate::mapping::{HorizontalBarrier, VerticalBarrier};
use crate::path_planning::RunReport;

/// Trait for path planning algorithms
pub trait PathPlanner {
    /// Plan a path from start to goal
    fn plan(&self, start: Point2D, goal: Point2D) -> Result<RunReport, PlanningError>;
}

/// Trait for sampling-based path planning algorithms
pub trait SamplingBasedPlanner: PathPlanner {
    /// Switch to bounded mode with the given sample budget
    fn set_max_iterations(&mut self, max_iter: u64);
}

/// Task description handed to a waypoint oracle
#[derive(Debug, Clone, PartialEq)]
pub struct OracleContext {
    pub start: Point2D,
    pub goal: Point2D,
    pub horizontal_barriers: Vec<HorizontalBarrier>,
    pub vertical_barriers: Vec<VerticalBarrier>,
}

/// Source of candidate intermediate waypoints.
///
/// Implementations wrap a concrete backend; the planner only ever sees this
/// trait. Returned points are raw and still have to go through
/// [`WaypointSeed::normalize`](crate::guidance::WaypointSeed::normalize).
pub trait WaypointOracle {
    fn suggest(&self, context: &OracleContext) -> Result<Vec<Point2D>, OracleError>;
}
