use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rrt_planner::guidance::{FilterOptions, FixedWaypoints, ResponseOracle, WaypointSeed};
use rrt_planner::path_planning::{plan_request, PlanOutcome, RRTTree};
use rrt_planner::{
    AreaBounds, HorizontalBarrier, OracleContext, OracleError, PathPlanner, PlanStatus,
    PlannerMode, PlanningError, PlanningRequest, Point2D, RRTConfig, RRTPlanner, SeedPolicy,
    VerticalBarrier, Workspace,
};

fn scenario_workspace() -> Workspace {
    Workspace::new(
        AreaBounds::new(0.0, 51.0, 0.0, 31.0),
        vec![HorizontalBarrier::new(10.0, 0.0, 25.0)],
        vec![VerticalBarrier::new(25.0, 10.0, 22.0)],
    )
    .unwrap()
}

fn scenario_config() -> RRTConfig {
    RRTConfig {
        step_size: 2.0,
        goal_tolerance: Some(5.0),
        ..Default::default()
    }
}

fn start() -> Point2D {
    Point2D::new(5.0, 5.0)
}

fn goal() -> Point2D {
    Point2D::new(27.0, 15.0)
}

/// Random source that counts how often it is asked for bits
struct CountingRng {
    inner: StdRng,
    calls: usize,
}

impl RngCore for CountingRng {
    fn next_u32(&mut self) -> u32 {
        self.calls += 1;
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.calls += 1;
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.calls += 1;
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.calls += 1;
        self.inner.try_fill_bytes(dest)
    }
}

// Every node reaches the root by following parents, without revisiting
fn assert_valid_tree(tree: &RRTTree, root: &Point2D) {
    for node in tree.get_tree() {
        let mut cur = node.point;
        let mut steps = 0;
        while cur != *root {
            cur = tree.parent(&cur).expect("non-root node without parent");
            steps += 1;
            assert!(steps <= tree.len(), "cycle while backtracking from {}", node.point);
        }
    }
}

fn assert_collision_free(outcome: &PlanOutcome, workspace: &Workspace) {
    for edge in outcome.tree.edges() {
        assert!(
            !workspace.intersects_any_barrier(&edge),
            "tree edge {} -> {} collides",
            edge.start,
            edge.end
        );
    }
}

#[test]
fn test_scenario_two_barriers_reaches_goal() {
    let workspace = scenario_workspace();
    let planner = RRTPlanner::new(workspace.clone(), scenario_config());

    for seed in 0..5 {
        let mut rng = StdRng::seed_from_u64(seed);
        let outcome = planner.grow(start(), goal(), None, &mut rng).unwrap();
        let report = &outcome.report;

        assert_eq!(report.status, PlanStatus::Success);
        assert_eq!(report.path.first(), Some(&start()));
        assert_eq!(report.path.last(), Some(&goal()));
        for edge in report.path.segments() {
            assert!(!workspace.intersects_any_barrier(&edge));
            // Path edges are exactly tree edges
            assert_eq!(outcome.tree.parent(&edge.end), Some(edge.start));
        }

        let length = report.path_length.unwrap();
        assert!((length - report.path.total_length()).abs() < 1e-10);
        assert!(length >= start().distance(&goal()));

        // Root and goal are not counted as iterations
        assert_eq!(report.iterations as usize, report.tree_size - 2);
        assert!(report.samples >= report.iterations);
        assert_eq!(report.tree_size, outcome.tree.len());

        assert_valid_tree(&outcome.tree, &start());
        assert_collision_free(&outcome, &workspace);
    }
}

#[test]
fn test_scenario_endpoint_on_barrier_rejected_before_sampling() {
    let planner = RRTPlanner::new(scenario_workspace(), scenario_config());
    let mut rng = CountingRng {
        inner: StdRng::seed_from_u64(0),
        calls: 0,
    };

    let on_horizontal = Point2D::new(10.0, 10.0);
    let on_vertical = Point2D::new(25.0, 15.0);

    let result = planner.grow(on_horizontal, goal(), None, &mut rng);
    assert!(matches!(result, Err(PlanningError::InvalidWorkspace(_))));

    let result = planner.grow(start(), on_vertical, None, &mut rng);
    assert!(matches!(result, Err(PlanningError::InvalidWorkspace(_))));

    assert_eq!(rng.calls, 0);
}

#[test]
fn test_scenario_bounded_single_iteration_exhausts_budget() {
    let config = RRTConfig {
        mode: PlannerMode::Bounded { max_iterations: 1 },
        ..scenario_config()
    };
    let planner = RRTPlanner::new(scenario_workspace(), config).with_rng_seed(11);
    let far_goal = Point2D::new(45.0, 25.0);

    let report = planner.plan(start(), far_goal).unwrap();
    assert_eq!(report.status, PlanStatus::BudgetExhausted);
    assert!(report.path.is_empty());
    assert!(report.path_length.is_none());
    assert_eq!(report.samples, 1);
    assert!(report.tree_size <= 2);
    assert_eq!(report.iterations as usize, report.tree_size - 1);
}

#[test]
fn test_scenario_same_seed_same_tree() {
    let planner = RRTPlanner::new(scenario_workspace(), scenario_config());

    let run = |seed: u64| {
        let mut rng = StdRng::seed_from_u64(seed);
        planner.grow(start(), goal(), None, &mut rng).unwrap()
    };
    let a = run(42);
    let b = run(42);

    assert_eq!(a.report, b.report);
    let nodes = |o: &PlanOutcome| -> Vec<(Point2D, Option<usize>)> {
        o.tree.get_tree().iter().map(|n| (n.point, n.parent)).collect()
    };
    assert_eq!(nodes(&a), nodes(&b));
}

#[test]
fn test_scenario_coincident_samples_are_rejected() {
    // On a 4x4 integer lattice nearly every sample repeats a tree node
    let workspace = Workspace::new(AreaBounds::new(0.0, 4.0, 0.0, 4.0), Vec::new(), Vec::new()).unwrap();
    let config = RRTConfig {
        step_size: 10.0,
        goal_tolerance: Some(0.1),
        mode: PlannerMode::Bounded { max_iterations: 500 },
        integer_sampling: true,
        ..Default::default()
    };
    let planner = RRTPlanner::new(workspace.clone(), config);
    let root = Point2D::new(2.0, 2.0);
    let unreachable = Point2D::new(1.5, 1.5);

    let mut rng = StdRng::seed_from_u64(5);
    let outcome = planner.grow(root, unreachable, None, &mut rng).unwrap();

    assert_eq!(outcome.report.status, PlanStatus::BudgetExhausted);
    assert_eq!(outcome.report.samples, 500);
    // Only the 3x3 interior lattice is reachable without touching the boundary
    assert_eq!(outcome.report.tree_size, 9);
    assert_eq!(outcome.report.iterations, 8);
    assert_valid_tree(&outcome.tree, &root);
    assert_collision_free(&outcome, &workspace);
}

fn biased_config() -> RRTConfig {
    RRTConfig {
        seed_policy: SeedPolicy::Bias { probability: 1.0 },
        ..scenario_config()
    }
}

fn normalized_seed(workspace: &Workspace, candidates: &[Point2D]) -> WaypointSeed {
    WaypointSeed::normalize(candidates, start(), goal(), workspace, &FilterOptions::default())
}

#[test]
fn test_seed_bias_steers_tree_through_seed_points() {
    let workspace = scenario_workspace();
    let seed = normalized_seed(&workspace, &[Point2D::new(30.0, 5.0)]);

    let biased = RRTPlanner::new(workspace.clone(), biased_config());
    let mut rng = StdRng::seed_from_u64(4);
    let outcome = biased.grow(start(), goal(), Some(seed.clone()), &mut rng).unwrap();
    assert_eq!(outcome.report.status, PlanStatus::Success);

    // The first extension heads straight along y = 5 towards (30, 5)
    assert_eq!(outcome.tree.get_tree()[1].point, Point2D::new(7.0, 5.0));
    assert!(outcome
        .tree
        .get_tree()
        .iter()
        .any(|n| n.point.distance(&Point2D::new(30.0, 5.0)) <= 2.0));
    assert_collision_free(&outcome, &workspace);

    let report_only = RRTPlanner::new(workspace.clone(), scenario_config());
    let mut rng = StdRng::seed_from_u64(4);
    let uniform = report_only.grow(start(), goal(), Some(seed), &mut rng).unwrap();
    let nodes = |o: &PlanOutcome| -> Vec<Point2D> { o.tree.get_tree().iter().map(|n| n.point).collect() };
    assert_ne!(nodes(&outcome), nodes(&uniform));
}

#[test]
fn test_seed_bias_skips_unreachable_seed_point() {
    // (5, 15) passes the filter but lies behind the y = 10 barrier
    let workspace = scenario_workspace();
    let config = RRTConfig {
        mode: PlannerMode::Bounded { max_iterations: 20_000 },
        ..biased_config()
    };
    let planner = RRTPlanner::new(workspace.clone(), config)
        .with_waypoints(vec![Point2D::new(5.0, 15.0)])
        .with_rng_seed(1);

    let report = planner.plan(start(), goal()).unwrap();
    assert_eq!(report.status, PlanStatus::Success);
    assert!(report.samples < 20_000);
    assert!(report.iterations > 2);
    assert_eq!(
        report.waypoint_seed_echo,
        Some(vec![start(), Point2D::new(5.0, 15.0), goal()])
    );
}

#[test]
fn test_seed_is_echoed_in_report() {
    let oracle = FixedWaypoints::new(vec![Point2D::new(30.0, 5.0), Point2D::new(30.0, 12.0)]);
    let config = RRTConfig {
        seed_policy: SeedPolicy::Bias { probability: 0.5 },
        ..scenario_config()
    };
    let planner = RRTPlanner::new(scenario_workspace(), config).with_rng_seed(3);

    let report = planner.plan_guided(start(), goal(), &oracle).unwrap();
    assert_eq!(report.status, PlanStatus::Success);
    assert_eq!(
        report.waypoint_seed_echo,
        Some(vec![start(), Point2D::new(30.0, 5.0), Point2D::new(30.0, 12.0), goal()])
    );
}

#[test]
fn test_oracle_failure_falls_back_to_unseeded_run() {
    let oracle = ResponseOracle::new(|_: &OracleContext| {
        Err(OracleError::Unavailable("no backend configured".to_string()))
    });
    let planner = RRTPlanner::new(scenario_workspace(), scenario_config()).with_rng_seed(9);

    let report = planner.plan_guided(start(), goal(), &oracle).unwrap();
    assert_eq!(report.status, PlanStatus::Success);
    assert!(report.waypoint_seed_echo.is_none());
}

#[test]
fn test_plan_request_from_json() {
    let request = PlanningRequest::from_json(
        r#"{
            "start": [5, 5], "goal": [27, 15],
            "horizontal_barriers": [[10, 0, 25], [15, 30, 50]],
            "vertical_barriers": [[25, 10, 22]],
            "range_x": [0, 51], "range_y": [0, 31],
            "goal_tolerance": 5,
            "waypoint_seed": [[30, 5], [60, 60]]
        }"#,
    )
    .unwrap();

    let report = plan_request(&request, Some(1)).unwrap();
    assert!(report.is_success());
    // Out-of-bounds suggestion is dropped, start and goal are added
    assert_eq!(
        report.waypoint_seed_echo,
        Some(vec![start(), Point2D::new(30.0, 5.0), goal()])
    );
    assert_eq!(report, plan_request(&request, Some(1)).unwrap());
}
