//! Waypoint oracle adapter.
//!
//! Turns whatever an external suggestion source returns into a
//! [`WaypointSeed`] the planner can consume: points outside the workspace or
//! on a barrier are dropped, and the list is anchored at start and goal.

use log::{debug, warn};

use crate::common::{OracleContext, OracleError, Point2D, WaypointOracle};
use crate::mapping::Workspace;

/// Candidate filtering options
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterOptions {
    /// Candidates must lie strictly more than this far inside the range
    pub margin: f64,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self { margin: 1.0 }
    }
}

/// Validated waypoint list, always starting at start and ending at goal
#[derive(Debug, Clone, PartialEq)]
pub struct WaypointSeed {
    points: Vec<Point2D>,
}

impl WaypointSeed {
    /// Filter raw candidates against the workspace and anchor them.
    pub fn normalize(
        candidates: &[Point2D],
        start: Point2D,
        goal: Point2D,
        workspace: &Workspace,
        options: &FilterOptions,
    ) -> Self {
        let bounds = workspace.bounds();
        let m = options.margin;

        let mut points: Vec<Point2D> = candidates
            .iter()
            .copied()
            .filter(|p| {
                p.is_finite()
                    && workspace.in_bounds(p)
                    && !workspace.contains_obstacle(p)
                    && p.x > bounds.xmin + m
                    && p.x < bounds.xmax - m
                    && p.y > bounds.ymin + m
                    && p.y < bounds.ymax - m
            })
            .collect();

        let dropped = candidates.len() - points.len();
        if dropped > 0 {
            debug!("[WaypointSeed] dropped {} invalid candidate(s)", dropped);
        }

        if points.first() != Some(&start) {
            points.insert(0, start);
        }
        if points.last() != Some(&goal) {
            points.push(goal);
        }

        WaypointSeed { points }
    }

    pub fn points(&self) -> &[Point2D] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn into_points(self) -> Vec<Point2D> {
        self.points
    }
}

/// Ask the oracle once and normalize its answer.
///
/// Oracle failures are not fatal: they are logged and `None` is returned so
/// the caller runs unseeded.
pub fn resolve_seed(
    oracle: &dyn WaypointOracle,
    context: &OracleContext,
    workspace: &Workspace,
    options: &FilterOptions,
) -> Option<WaypointSeed> {
    match oracle.suggest(context) {
        Ok(candidates) => Some(WaypointSeed::normalize(
            &candidates,
            context.start,
            context.goal,
            workspace,
            options,
        )),
        Err(e) => {
            warn!("[WaypointSeed] {}, planning without a seed", e);
            None
        }
    }
}

/// Oracle that always suggests the same points
#[derive(Debug, Clone, Default)]
pub struct FixedWaypoints {
    pub points: Vec<Point2D>,
}

impl FixedWaypoints {
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }
}

impl WaypointOracle for FixedWaypoints {
    fn suggest(&self, _context: &OracleContext) -> Result<Vec<Point2D>, OracleError> {
        Ok(self.points.clone())
    }
}

/// Oracle backed by a text-producing backend.
///
/// The backend turns the context into a free-text answer; the first
/// `[[x, y], ...]` list found in it is taken as the suggestion.
pub struct ResponseOracle<F>
where
    F: Fn(&OracleContext) -> Result<String, OracleError>,
{
    backend: F,
}

impl<F> ResponseOracle<F>
where
    F: Fn(&OracleContext) -> Result<String, OracleError>,
{
    pub fn new(backend: F) -> Self {
        Self { backend }
    }
}

impl<F> WaypointOracle for ResponseOracle<F>
where
    F: Fn(&OracleContext) -> Result<String, OracleError>,
{
    fn suggest(&self, context: &OracleContext) -> Result<Vec<Point2D>, OracleError> {
        let response = (self.backend)(context)?;
        parse_waypoint_list(&response)
    }
}

/// Extracts the first nested `[[x, y], ...]` list from free text.
///
/// # Errors
///
/// `MalformedResponse` if no such list is present or it does not hold
/// numeric pairs.
pub fn parse_waypoint_list(text: &str) -> Result<Vec<Point2D>, OracleError> {
    let bytes = text.as_bytes();
    let open = (0..bytes.len())
        .find(|&i| {
            bytes[i] == b'['
                && bytes[i + 1..]
                    .iter()
                    .find(|b| !b.is_ascii_whitespace())
                    .map_or(false, |&b| b == b'[')
        })
        .ok_or_else(|| OracleError::MalformedResponse("no waypoint list found".to_string()))?;

    let mut depth = 0usize;
    let mut close = None;
    for (i, &b) in bytes.iter().enumerate().skip(open) {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            _ => {}
        }
    }
    let close = close
        .ok_or_else(|| OracleError::MalformedResponse("unterminated waypoint list".to_string()))?;

    let pairs: Vec<[f64; 2]> = serde_json::from_str(&text[open..=close])
        .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;
    Ok(pairs.into_iter().map(Point2D::from).collect())
}
