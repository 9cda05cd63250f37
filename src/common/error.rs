//! Error types for rrt_planner

use thiserror::Error;

use crate::common::types::Point2D;

/// Failures reported by an external waypoint oracle.
///
/// Both variants are recoverable: the planner falls back to an unseeded run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    /// Backend could not be reached or refused to answer
    #[error("waypoint oracle unavailable: {0}")]
    Unavailable(String),

    /// Backend answered but no waypoint list could be read from it
    #[error("malformed waypoint oracle response: {0}")]
    MalformedResponse(String),
}

/// Main error type for planning
#[derive(Error, Debug)]
pub enum PlanningError {
    /// Start or goal outside the workspace, or on a barrier
    #[error("invalid workspace: {0}")]
    InvalidWorkspace(String),

    /// Invalid planner parameter
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A node was inserted twice into the tree
    #[error("node {0} is already in the tree")]
    DuplicateNode(Point2D),

    /// Insertion referenced a parent the tree does not hold
    #[error("parent {0} is not in the tree")]
    UnknownParent(Point2D),

    /// Backtracking from the goal could not reach the root
    #[error("goal {goal} is not connected to root {root}")]
    DisconnectedGoal { root: Point2D, goal: Point2D },

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for planning operations
pub type PlanResult<T> = Result<T, PlanningError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PlanningError::InvalidWorkspace("start is out of bounds".to_string());
        assert_eq!(format!("{}", err), "invalid workspace: start is out of bounds");

        let err = PlanningError::DisconnectedGoal {
            root: Point2D::new(5.0, 5.0),
            goal: Point2D::new(27.0, 15.0),
        };
        assert_eq!(
            err.to_string(),
            "goal (27.00, 15.00) is not connected to root (5.00, 5.00)"
        );
    }

    #[test]
    fn test_error_from_oracle() {
        let err: PlanningError = OracleError::Unavailable("timeout".to_string()).into();
        assert!(matches!(err, PlanningError::Oracle(OracleError::Unavailable(_))));
        assert_eq!(err.to_string(), "waypoint oracle unavailable: timeout");
    }
}
