use clap::Parser;
use log::{warn, LevelFilter};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use water_sort_solver::engine::Configuration;
use water_sort_solver::heuristics::{estimate, zero_heuristic};
use water_sort_solver::monitor::SearchLimits;
use water_sort_solver::solver::{IdaStarSolver, SearchOutcome, SearchStats};
use water_sort_solver::utils::{format_solution, parse_puzzle, sample_puzzle};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the puzzle file: one tube per line, colour ids bottom to top, 0 or '.' for empty slots.
    /// Solves the built-in sample puzzle when omitted.
    puzzle_file: Option<PathBuf>,

    /// Capacity shared by every tube (defaults to the row width)
    #[clap(short, long)]
    capacity: Option<usize>,

    /// Stop after expanding this many search nodes
    #[clap(long)]
    max_nodes: Option<u64>,

    /// Stop after this many milliseconds
    #[clap(long)]
    time_limit_ms: Option<u64>,

    /// Ignore the cost estimate and deepen one move at a time (shortest solutions, slower)
    #[clap(long)]
    plain_deepening: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(LevelFilter::Debug);
        }
        _ => {
            builder.filter_level(LevelFilter::Trace);
        }
    }
    builder.init();
}

fn read_puzzle(args: &Args) -> Result<Configuration, String> {
    match &args.puzzle_file {
        Some(path) => {
            let content = fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
            parse_puzzle(&content, args.capacity)
                .map_err(|e| format!("Invalid puzzle in {}: {}", path.display(), e))
        }
        None => sample_puzzle().map_err(|e| format!("Invalid built-in puzzle: {}", e)),
    }
}

fn print_stats(stats: &SearchStats) {
    println!(
        "Nodes: {}, iterations: {}, final threshold: {}, elapsed: {:.3}s",
        stats.nodes_expanded,
        stats.iterations,
        stats
            .thresholds
            .last()
            .map_or_else(|| "-".to_string(), |t| t.to_string()),
        stats.elapsed.as_secs_f64()
    );
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    let start = match read_puzzle(&args) {
        Ok(configuration) => configuration,
        Err(message) => {
            eprintln!("{}", message);
            std::process::exit(1);
        }
    };

    match &args.puzzle_file {
        Some(path) => println!("Loaded puzzle from {}\n", path.display()),
        None => println!("No puzzle file given, using the built-in sample\n"),
    }
    println!("Initial configuration:\n{}\n", start);
    if !start.is_balanced() {
        warn!("some colour does not fill a whole number of tubes; the puzzle cannot be solved");
    }

    let mut limits = SearchLimits::default();
    if let Some(max_nodes) = args.max_nodes {
        limits = limits.with_max_nodes(max_nodes);
    }
    if let Some(ms) = args.time_limit_ms {
        limits = limits.with_time_limit(Duration::from_millis(ms));
    }
    let solver = IdaStarSolver::new()
        .with_heuristic(if args.plain_deepening {
            zero_heuristic
        } else {
            estimate
        })
        .with_limits(limits);

    println!("Searching...\n");
    let outcome = solver.solve(&start);
    match &outcome {
        SearchOutcome::Solved(solution) => {
            println!("Solved within {} steps:", solution.moves.len());
            print!("{}", format_solution(&solution.moves));
            match start.replay(&solution.moves) {
                Ok(end) => println!("\nFinal configuration:\n{}\n", end),
                Err(e) => eprintln!("Solution failed to replay: {}", e),
            }
        }
        SearchOutcome::NoSolution(_) => println!("No solution found.\n"),
        SearchOutcome::Aborted { reason, .. } => {
            println!("Search stopped before an answer was found: {}\n", reason)
        }
    }
    print_stats(outcome.stats());
}
