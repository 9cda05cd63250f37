// RRT planning among barriers
//
// Without a request file the built-in two-barrier query is planned.
// Logging follows RUST_LOG (default: info).

use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::Parser;

use rrt_planner::path_planning::plan_request;
use rrt_planner::PlanningRequest;

const DEFAULT_QUERY: &str = r#"{
    "start": [5, 5], "goal": [27, 15],
    "horizontal_barriers": [[10, 0, 25], [15, 30, 50]],
    "vertical_barriers": [[25, 10, 22]],
    "range_x": [0, 51], "range_y": [0, 31],
    "goal_tolerance": 5
}"#;

/// Plan a path with RRT and print the run report as JSON
#[derive(Parser, Debug)]
#[command(name = "rrt_demo")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON planning request (default: built-in query)
    request: Option<PathBuf>,

    /// Seed for the random source, for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let query = match cli.request {
        Some(path) => fs::read_to_string(path)?,
        None => DEFAULT_QUERY.to_string(),
    };
    let request = PlanningRequest::from_json(&query)?;
    let report = plan_request(&request, cli.seed)?;

    println!("{}", report.to_json()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_request_and_seed() {
        let cli = Cli::try_parse_from(["rrt_demo", "query.json", "--seed", "7"]).unwrap();
        assert_eq!(cli.request, Some(PathBuf::from("query.json")));
        assert_eq!(cli.seed, Some(7));

        let cli = Cli::try_parse_from(["rrt_demo"]).unwrap();
        assert!(cli.request.is_none());
        assert!(cli.seed.is_none());

        assert!(Cli::try_parse_from(["rrt_demo", "--seed", "abc"]).is_err());
    }

    #[test]
    fn test_default_query_parses() {
        let request = PlanningRequest::from_json(DEFAULT_QUERY).unwrap();
        assert_eq!(request.goal_tolerance, Some(5.0));
    }
}
