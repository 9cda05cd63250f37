//! RRT (Rapidly-exploring Random Tree) path planning algorithm
//!
//! Sampling-based path planning in a bounded workspace with barrier
//! obstacles. Each round samples a point, steers a bounded step from the
//! nearest tree node towards it, and keeps the new node only if the edge
//! clears every barrier and the workspace boundary.
//!
//! The random source is always passed in, so a seeded generator reproduces
//! a run exactly. An optional waypoint seed can bias sampling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, info, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Bernoulli, Distribution};
use serde::{Deserialize, Serialize};

use crate::common::{
    OracleContext, Path2D, PathPlanner, PlanResult, PlanningError, Point2D, SamplingBasedPlanner,
    Segment, WaypointOracle,
};
use crate::guidance::{resolve_seed, FilterOptions, WaypointSeed};
use crate::mapping::Workspace;
use crate::path_planning::report::{PlanStatus, PlanningRequest, RunReport};
use crate::path_planning::tree::RRTTree;

/// Goal tolerance used in goal-seeking mode when none is configured
pub const DEFAULT_GOAL_TOLERANCE: f64 = 5.0;

/// Sample cap used in goal-seeking mode when none is configured
pub const DEFAULT_ITERATION_CAP: u64 = 1_000_000;

/// Smallest accepted goal tolerance
pub const MIN_GOAL_TOLERANCE: f64 = 4.0 * f64::EPSILON;

/// Rejected extensions towards one seed point before the cursor skips it
pub const MAX_SEED_REJECTIONS: u32 = 8;

/// How a run terminates without reaching the goal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlannerMode {
    /// Fixed sample budget; failure is an expected outcome
    Bounded { max_iterations: u64 },
    /// Run until the goal is reached, with a safety cap on samples
    GoalSeeking { iteration_cap: u64 },
}

impl PlannerMode {
    pub fn budget(&self) -> u64 {
        match *self {
            PlannerMode::Bounded { max_iterations } => max_iterations,
            PlannerMode::GoalSeeking { iteration_cap } => iteration_cap,
        }
    }
}

/// What the planner does with a waypoint seed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SeedPolicy {
    /// Echo the seed in the report, sample uniformly
    ReportOnly,
    /// Sample the next unconsumed seed point with this probability
    Bias { probability: f64 },
}

/// Configuration for RRT planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RRTConfig {
    /// Maximum edge length per extension
    pub step_size: f64,
    /// Distance under which a node counts as reaching the goal.
    /// Defaults to `step_size` in bounded mode and
    /// [`DEFAULT_GOAL_TOLERANCE`] when goal-seeking.
    pub goal_tolerance: Option<f64>,
    pub mode: PlannerMode,
    pub seed_policy: SeedPolicy,
    /// Draw samples on the integer lattice instead of continuously
    pub integer_sampling: bool,
}

impl Default for RRTConfig {
    fn default() -> Self {
        Self {
            step_size: 2.0,
            goal_tolerance: None,
            mode: PlannerMode::GoalSeeking {
                iteration_cap: DEFAULT_ITERATION_CAP,
            },
            seed_policy: SeedPolicy::ReportOnly,
            integer_sampling: false,
        }
    }
}

impl RRTConfig {
    /// Effective goal tolerance
    pub fn goal_tolerance(&self) -> f64 {
        self.goal_tolerance.unwrap_or(match self.mode {
            PlannerMode::Bounded { .. } => self.step_size,
            PlannerMode::GoalSeeking { .. } => DEFAULT_GOAL_TOLERANCE,
        })
    }

    /// # Errors
    ///
    /// `InvalidParameter` for a non-positive step or tolerance, a zero
    /// budget, or a bias probability outside `[0, 1]`.
    pub fn validate(&self) -> PlanResult<()> {
        if !self.step_size.is_finite() || self.step_size <= 0.0 {
            return Err(PlanningError::InvalidParameter(format!(
                "step_size must be positive, got {}",
                self.step_size
            )));
        }
        let tolerance = self.goal_tolerance();
        if !tolerance.is_finite() || tolerance < MIN_GOAL_TOLERANCE {
            return Err(PlanningError::InvalidParameter(format!(
                "goal_tolerance must be at least {:e}, got {}",
                MIN_GOAL_TOLERANCE, tolerance
            )));
        }
        if self.mode.budget() == 0 {
            return Err(PlanningError::InvalidParameter(
                "iteration budget must be positive".to_string(),
            ));
        }
        if let SeedPolicy::Bias { probability } = self.seed_policy {
            if !(0.0..=1.0).contains(&probability) {
                return Err(PlanningError::InvalidParameter(format!(
                    "seed bias probability must be in [0, 1], got {}",
                    probability
                )));
            }
        }
        Ok(())
    }
}

/// Cooperative cancellation shared between a caller and a running planner
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Report together with the tree that produced it
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    pub report: RunReport,
    pub tree: RRTTree,
}

// Walks the seed in order; index 0 is the start and never sampled.
struct SeedCursor<'a> {
    points: &'a [Point2D],
    next: usize,
    rejections: u32,
    bias: Option<Bernoulli>,
}

impl<'a> SeedCursor<'a> {
    fn new(seed: Option<&'a WaypointSeed>, policy: SeedPolicy) -> PlanResult<Self> {
        let bias = match policy {
            SeedPolicy::Bias { probability } => Some(
                Bernoulli::new(probability)
                    .map_err(|e| PlanningError::InvalidParameter(e.to_string()))?,
            ),
            SeedPolicy::ReportOnly => None,
        };
        Ok(SeedCursor {
            points: seed.map(|s| s.points()).unwrap_or(&[]),
            next: 1,
            rejections: 0,
            bias,
        })
    }

    fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Point2D> {
        let bias = self.bias.as_ref()?;
        let target = *self.points.get(self.next)?;
        if bias.sample(rng) {
            Some(target)
        } else {
            None
        }
    }

    fn advance(&mut self, node: &Point2D, radius: f64) {
        while self
            .points
            .get(self.next)
            .map_or(false, |p| p.distance(node) <= radius)
        {
            self.next += 1;
            self.rejections = 0;
        }
    }

    // An extension towards the current seed point was kept
    fn extended(&mut self) {
        self.rejections = 0;
    }

    // An extension towards the current seed point was rejected
    fn reject(&mut self) {
        self.rejections += 1;
        if self.rejections >= MAX_SEED_REJECTIONS {
            if let Some(skipped) = self.points.get(self.next) {
                debug!("[RRT] skipping unreachable seed point {}", skipped);
            }
            self.next += 1;
            self.rejections = 0;
        }
    }
}

/// RRT path planner
pub struct RRTPlanner {
    config: RRTConfig,
    workspace: Workspace,
    waypoints: Option<Vec<Point2D>>,
    filter: FilterOptions,
    rng_seed: Option<u64>,
    cancellation: Option<CancellationFlag>,
}

impl RRTPlanner {
    /// Create a new RRT planner
    pub fn new(workspace: Workspace, config: RRTConfig) -> Self {
        RRTPlanner {
            config,
            workspace,
            waypoints: None,
            filter: FilterOptions::default(),
            rng_seed: None,
            cancellation: None,
        }
    }

    /// Build the planner described by a request
    pub fn from_request(request: &PlanningRequest) -> PlanResult<Self> {
        let mut planner = Self::new(request.workspace()?, request.config());
        planner.waypoints = request.waypoint_seed.clone();
        Ok(planner)
    }

    /// Seed the random source used by [`PathPlanner::plan`]
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Raw candidate waypoints, normalized against start and goal per run
    pub fn with_waypoints(mut self, waypoints: Vec<Point2D>) -> Self {
        self.waypoints = Some(waypoints);
        self
    }

    pub fn with_filter_options(mut self, filter: FilterOptions) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    pub fn config(&self) -> &RRTConfig {
        &self.config
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn oracle_context(&self, start: Point2D, goal: Point2D) -> OracleContext {
        OracleContext {
            start,
            goal,
            horizontal_barriers: self.workspace.horizontal_barriers().to_vec(),
            vertical_barriers: self.workspace.vertical_barriers().to_vec(),
        }
    }

    /// Ask `oracle` for waypoints once, then plan.
    ///
    /// An oracle failure only means the run is unseeded.
    pub fn plan_guided(
        &self,
        start: Point2D,
        goal: Point2D,
        oracle: &dyn WaypointOracle,
    ) -> PlanResult<RunReport> {
        self.workspace.validate_endpoint("start", &start)?;
        self.workspace.validate_endpoint("goal", &goal)?;
        let context = self.oracle_context(start, goal);
        let seed = resolve_seed(oracle, &context, &self.workspace, &self.filter);
        let mut rng = self.make_rng();
        Ok(self.grow(start, goal, seed, &mut rng)?.report)
    }

    /// Grow a tree from `start` until the goal is reached or the budget runs
    /// out.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` or `InvalidWorkspace` before any sampling; tree
    /// invariant violations are propagated as-is.
    pub fn grow<R: Rng + ?Sized>(
        &self,
        start: Point2D,
        goal: Point2D,
        seed: Option<WaypointSeed>,
        rng: &mut R,
    ) -> PlanResult<PlanOutcome> {
        self.config.validate()?;
        self.workspace.validate_endpoint("start", &start)?;
        self.workspace.validate_endpoint("goal", &goal)?;
        if self.config.integer_sampling {
            let b = self.workspace.bounds();
            if b.xmin.ceil() > b.xmax.floor() || b.ymin.ceil() > b.ymax.floor() {
                return Err(PlanningError::InvalidParameter(
                    "integer sampling needs an integer inside each range".to_string(),
                ));
            }
        }

        let step_size = self.config.step_size;
        let goal_tolerance = self.config.goal_tolerance();
        let budget = self.config.mode.budget();
        debug!(
            "[RRT] start={} goal={} step={} tolerance={} budget={} seed_points={}",
            start,
            goal,
            step_size,
            goal_tolerance,
            budget,
            seed.as_ref().map_or(0, |s| s.len())
        );

        let mut tree = RRTTree::new(start);
        let mut cursor = SeedCursor::new(seed.as_ref(), self.config.seed_policy)?;
        let mut status = PlanStatus::BudgetExhausted;
        let mut iterations: u64 = 0;
        let mut samples: u64 = 0;

        if start == goal {
            status = PlanStatus::Success;
        }

        while status != PlanStatus::Success && samples < budget {
            if self.cancellation.as_ref().map_or(false, |c| c.is_cancelled()) {
                status = PlanStatus::Cancelled;
                break;
            }
            samples += 1;

            let seeded = cursor.draw(rng);
            let rnd_point = match seeded {
                Some(target) => target,
                None => self.get_random_point(rng),
            };
            let nearest = tree.nearest(&rnd_point);
            let new_point = self.steer(&nearest, &rnd_point);

            // A zero-length edge adds nothing; the duplicate check rejects it
            let edge = Segment::new(nearest, new_point);
            let collides = !edge.is_degenerate() && self.workspace.intersects_any_barrier(&edge);
            let rejected = if collides {
                trace!("[RRT] rejected {} -> {}: collision", nearest, new_point);
                true
            } else if tree.contains(&new_point) {
                trace!("[RRT] rejected {}: already in tree", new_point);
                true
            } else {
                false
            };
            if rejected {
                if seeded.is_some() {
                    cursor.reject();
                }
                continue;
            }

            tree.insert(new_point, &nearest)?;
            iterations += 1;
            if seeded.is_some() {
                cursor.extended();
            }
            cursor.advance(&new_point, step_size);

            if new_point.distance(&goal) < goal_tolerance {
                if new_point != goal {
                    if self
                        .workspace
                        .intersects_any_barrier(&Segment::new(new_point, goal))
                    {
                        trace!("[RRT] goal within tolerance of {} but blocked", new_point);
                        continue;
                    }
                    tree.insert(goal, &new_point)?;
                }
                status = PlanStatus::Success;
                break;
            }
        }

        let (path, path_length) = if status == PlanStatus::Success {
            let path = tree.extract_path(&start, &goal)?;
            let length = path.total_length();
            (path, Some(length))
        } else {
            (Path2D::new(), None)
        };

        match status {
            PlanStatus::Success => info!(
                "[RRT] goal reached: iterations={} samples={} nodes={} length={:.3}",
                iterations,
                samples,
                tree.len(),
                path_length.unwrap_or_default()
            ),
            PlanStatus::BudgetExhausted => info!(
                "[RRT] budget exhausted: iterations={} samples={} nodes={}",
                iterations,
                samples,
                tree.len()
            ),
            PlanStatus::Cancelled => info!(
                "[RRT] cancelled: iterations={} samples={} nodes={}",
                iterations,
                samples,
                tree.len()
            ),
        }

        let report = RunReport {
            status,
            iterations,
            samples,
            tree_size: tree.len(),
            path,
            path_length,
            waypoint_seed_echo: seed.map(WaypointSeed::into_points),
        };
        Ok(PlanOutcome { report, tree })
    }

    fn make_rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    fn seed_for(&self, start: Point2D, goal: Point2D) -> Option<WaypointSeed> {
        self.waypoints
            .as_ref()
            .map(|w| WaypointSeed::normalize(w, start, goal, &self.workspace, &self.filter))
    }

    fn get_random_point<R: Rng + ?Sized>(&self, rng: &mut R) -> Point2D {
        let b = self.workspace.bounds();
        if self.config.integer_sampling {
            let x = rng.gen_range(b.xmin.ceil() as i64..=b.xmax.floor() as i64);
            let y = rng.gen_range(b.ymin.ceil() as i64..=b.ymax.floor() as i64);
            Point2D::new(x as f64, y as f64)
        } else {
            Point2D::new(rng.gen_range(b.xmin..=b.xmax), rng.gen_range(b.ymin..=b.ymax))
        }
    }

    /// Point at most `step_size` from `from_point` towards `to_point`
    pub fn steer(&self, from_point: &Point2D, to_point: &Point2D) -> Point2D {
        let (d, theta) = calc_distance_and_angle(from_point, to_point);
        if d <= self.config.step_size {
            return *to_point;
        }
        Point2D::new(
            from_point.x + self.config.step_size * theta.cos(),
            from_point.y + self.config.step_size * theta.sin(),
        )
    }
}

fn calc_distance_and_angle(from_point: &Point2D, to_point: &Point2D) -> (f64, f64) {
    let dx = to_point.x - from_point.x;
    let dy = to_point.y - from_point.y;
    (from_point.distance(to_point), dy.atan2(dx))
}

impl PathPlanner for RRTPlanner {
    fn plan(&self, start: Point2D, goal: Point2D) -> Result<RunReport, PlanningError> {
        let seed = self.seed_for(start, goal);
        let mut rng = self.make_rng();
        Ok(self.grow(start, goal, seed, &mut rng)?.report)
    }
}

impl SamplingBasedPlanner for RRTPlanner {
    fn set_max_iterations(&mut self, max_iter: u64) {
        self.config.mode = PlannerMode::Bounded {
            max_iterations: max_iter,
        };
    }
}

/// Plan the request end to end. `rng_seed` makes the run reproducible.
pub fn plan_request(request: &PlanningRequest, rng_seed: Option<u64>) -> PlanResult<RunReport> {
    let mut planner = RRTPlanner::from_request(request)?;
    planner.rng_seed = rng_seed;
    planner.plan(request.start, request.goal)
}
