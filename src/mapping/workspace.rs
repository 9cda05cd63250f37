//! Bounded planar workspace obstructed by axis-aligned barrier segments.

use serde::{Deserialize, Serialize};

use crate::common::geometry::point_on_segment;
use crate::common::{PlanResult, PlanningError, Point2D, Segment};

/// Area bounds of the workspace rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AreaBounds {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl AreaBounds {
    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        AreaBounds { xmin, xmax, ymin, ymax }
    }

    pub fn from_ranges(range_x: [f64; 2], range_y: [f64; 2]) -> Self {
        AreaBounds {
            xmin: range_x[0],
            xmax: range_x[1],
            ymin: range_y[0],
            ymax: range_y[1],
        }
    }

    /// Inclusive containment
    pub fn contains(&self, p: &Point2D) -> bool {
        p.x >= self.xmin && p.x <= self.xmax && p.y >= self.ymin && p.y <= self.ymax
    }

    /// The four boundary edges: bottom, top, left, right
    pub fn edges(&self) -> [Segment; 4] {
        let bl = Point2D::new(self.xmin, self.ymin);
        let br = Point2D::new(self.xmax, self.ymin);
        let tl = Point2D::new(self.xmin, self.ymax);
        let tr = Point2D::new(self.xmax, self.ymax);
        [
            Segment::new(bl, br),
            Segment::new(tl, tr),
            Segment::new(bl, tl),
            Segment::new(br, tr),
        ]
    }
}

/// Horizontal barrier at height `y` spanning `[x_min, x_max]`.
///
/// Serialized as `[y, x_min, x_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct HorizontalBarrier {
    pub y: f64,
    pub x_min: f64,
    pub x_max: f64,
}

impl HorizontalBarrier {
    pub fn new(y: f64, x_min: f64, x_max: f64) -> Self {
        Self { y, x_min, x_max }
    }

    pub fn segment(&self) -> Segment {
        Segment::new(Point2D::new(self.x_min, self.y), Point2D::new(self.x_max, self.y))
    }
}

impl From<[f64; 3]> for HorizontalBarrier {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<HorizontalBarrier> for [f64; 3] {
    fn from(b: HorizontalBarrier) -> Self {
        [b.y, b.x_min, b.x_max]
    }
}

/// Vertical barrier at `x` spanning `[y_min, y_max]`.
///
/// Serialized as `[x, y_min, y_max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct VerticalBarrier {
    pub x: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl VerticalBarrier {
    pub fn new(x: f64, y_min: f64, y_max: f64) -> Self {
        Self { x, y_min, y_max }
    }

    pub fn segment(&self) -> Segment {
        Segment::new(Point2D::new(self.x, self.y_min), Point2D::new(self.x, self.y_max))
    }
}

impl From<[f64; 3]> for VerticalBarrier {
    fn from(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl From<VerticalBarrier> for [f64; 3] {
    fn from(b: VerticalBarrier) -> Self {
        [b.x, b.y_min, b.y_max]
    }
}

/// Bounded rectangle plus barrier registry
#[derive(Debug, Clone)]
pub struct Workspace {
    bounds: AreaBounds,
    horizontal_barriers: Vec<HorizontalBarrier>,
    vertical_barriers: Vec<VerticalBarrier>,
}

impl Workspace {
    /// Create a workspace.
    ///
    /// # Errors
    ///
    /// `InvalidWorkspace` if either range is empty, inverted or not finite.
    pub fn new(
        bounds: AreaBounds,
        horizontal_barriers: Vec<HorizontalBarrier>,
        vertical_barriers: Vec<VerticalBarrier>,
    ) -> PlanResult<Self> {
        let finite = [bounds.xmin, bounds.xmax, bounds.ymin, bounds.ymax]
            .iter()
            .all(|v| v.is_finite());
        if !finite || bounds.xmin >= bounds.xmax || bounds.ymin >= bounds.ymax {
            return Err(PlanningError::InvalidWorkspace(format!(
                "degenerate range x=[{}, {}] y=[{}, {}]",
                bounds.xmin, bounds.xmax, bounds.ymin, bounds.ymax
            )));
        }

        Ok(Workspace {
            bounds,
            horizontal_barriers,
            vertical_barriers,
        })
    }

    pub fn bounds(&self) -> &AreaBounds {
        &self.bounds
    }

    pub fn horizontal_barriers(&self) -> &[HorizontalBarrier] {
        &self.horizontal_barriers
    }

    pub fn vertical_barriers(&self) -> &[VerticalBarrier] {
        &self.vertical_barriers
    }

    /// Segments of every registered barrier, horizontal first
    pub fn barrier_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.horizontal_barriers
            .iter()
            .map(HorizontalBarrier::segment)
            .chain(self.vertical_barriers.iter().map(VerticalBarrier::segment))
    }

    pub fn in_bounds(&self, point: &Point2D) -> bool {
        self.bounds.contains(point)
    }

    /// Whether the point lies on any barrier segment
    pub fn contains_obstacle(&self, point: &Point2D) -> bool {
        self.barrier_segments().any(|s| point_on_segment(point, &s))
    }

    /// Whether the point lies on one of the four boundary edges
    pub fn on_boundary(&self, point: &Point2D) -> bool {
        self.bounds.edges().iter().any(|e| point_on_segment(point, e))
    }

    /// Tests the segment against every barrier and the workspace boundary.
    pub fn intersects_any_barrier(&self, segment: &Segment) -> bool {
        self.barrier_segments()
            .chain(self.bounds.edges())
            .any(|s| segment.intersects(&s))
    }

    /// Checks that `point` can serve as a start or goal.
    ///
    /// # Errors
    ///
    /// `InvalidWorkspace` naming `role` when the point is not finite, out of
    /// bounds, on the boundary or on a barrier.
    pub fn validate_endpoint(&self, role: &str, point: &Point2D) -> PlanResult<()> {
        if !point.is_finite() || !self.in_bounds(point) {
            return Err(PlanningError::InvalidWorkspace(format!(
                "{} {} is outside the workspace",
                role, point
            )));
        }
        if self.on_boundary(point) {
            return Err(PlanningError::InvalidWorkspace(format!(
                "{} {} lies on the workspace boundary",
                role, point
            )));
        }
        if self.contains_obstacle(point) {
            return Err(PlanningError::InvalidWorkspace(format!(
                "{} {} lies on a barrier",
                role, point
            )));
        }
        Ok(())
    }
}
