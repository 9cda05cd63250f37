//! Planning request and run report records.

use serde::{Deserialize, Serialize};

use crate::common::{Path2D, PlanResult, Point2D};
use crate::mapping::{AreaBounds, HorizontalBarrier, VerticalBarrier, Workspace};
use crate::path_planning::rrt::{PlannerMode, RRTConfig, SeedPolicy};

fn default_step_size() -> f64 {
    2.0
}

/// Planning request, readable from the JSON query format
/// `{"start": [5, 5], "goal": [27, 15], "range_x": [0, 51], ...}`.
///
/// `max_iterations` selects bounded mode; without it the planner seeks the
/// goal up to `iteration_cap` samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanningRequest {
    pub start: Point2D,
    pub goal: Point2D,
    pub range_x: [f64; 2],
    pub range_y: [f64; 2],
    #[serde(default)]
    pub horizontal_barriers: Vec<HorizontalBarrier>,
    #[serde(default)]
    pub vertical_barriers: Vec<VerticalBarrier>,
    #[serde(default = "default_step_size")]
    pub step_size: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal_tolerance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iteration_cap: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub waypoint_seed: Option<Vec<Point2D>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed_bias: Option<f64>,
    #[serde(default)]
    pub integer_sampling: bool,
}

impl PlanningRequest {
    pub fn new(start: Point2D, goal: Point2D, range_x: [f64; 2], range_y: [f64; 2]) -> Self {
        PlanningRequest {
            start,
            goal,
            range_x,
            range_y,
            horizontal_barriers: Vec::new(),
            vertical_barriers: Vec::new(),
            step_size: default_step_size(),
            goal_tolerance: None,
            max_iterations: None,
            iteration_cap: None,
            waypoint_seed: None,
            seed_bias: None,
            integer_sampling: false,
        }
    }

    pub fn from_json(json: &str) -> PlanResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn workspace(&self) -> PlanResult<Workspace> {
        Workspace::new(
            AreaBounds::from_ranges(self.range_x, self.range_y),
            self.horizontal_barriers.clone(),
            self.vertical_barriers.clone(),
        )
    }

    pub fn config(&self) -> RRTConfig {
        let defaults = RRTConfig::default();
        let mode = match (self.max_iterations, self.iteration_cap) {
            (Some(max_iterations), _) => PlannerMode::Bounded { max_iterations },
            (None, Some(iteration_cap)) => PlannerMode::GoalSeeking { iteration_cap },
            (None, None) => defaults.mode,
        };
        let seed_policy = match self.seed_bias {
            Some(probability) => SeedPolicy::Bias { probability },
            None => SeedPolicy::ReportOnly,
        };
        RRTConfig {
            step_size: self.step_size,
            goal_tolerance: self.goal_tolerance,
            mode,
            seed_policy,
            integer_sampling: self.integer_sampling,
        }
    }
}

/// Terminal status of one planning run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    Success,
    BudgetExhausted,
    Cancelled,
}

/// Summary of one planning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub status: PlanStatus,
    /// Successful insertions of sampled nodes; root and goal excluded
    pub iterations: u64,
    /// Sampling rounds, rejected candidates included
    pub samples: u64,
    pub tree_size: usize,
    /// Empty unless the goal was reached
    pub path: Path2D,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path_length: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub waypoint_seed_echo: Option<Vec<Point2D>>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.status == PlanStatus::Success
    }

    pub fn to_json(&self) -> PlanResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
