mod logging;
mod problem_file;

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use logging::LogFormat;
use problem_file::ProblemFile;
use prodplan_model::{FillStrategy, Report, SceneOptions};

#[derive(Parser)]
#[command(name = "prodplan")]
#[command(about = "Profit-maximizing production planning with linear programming", long_about = None)]
struct Cli {
    /// Log level filter (RUST_LOG overrides this)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a problem file for errors
    Check {
        /// The problem file (JSON)
        file: PathBuf,
    },
    /// Solve a problem and print the optimal production plan
    Solve {
        /// The problem file (JSON)
        file: PathBuf,
        /// Show binding constraints and shadow prices
        #[arg(short, long)]
        analysis: bool,
        /// Currency symbol for the profit line
        #[arg(long, default_value = prodplan_model::report::DEFAULT_CURRENCY)]
        currency: String,
        /// Maximum simplex pivots per phase
        #[arg(long, default_value_t = 10000)]
        max_iterations: usize,
        /// Floating point tolerance for the simplex
        #[arg(long, default_value_t = 1e-9, value_parser = parse_tolerance)]
        tolerance: f64,
    },
    /// Solve a two-product problem and write its feasible-region scene as JSON
    Plot {
        /// The problem file (JSON)
        file: PathBuf,
        /// Samples per axis
        #[arg(short, long, default_value_t = prodplan_model::region::DEFAULT_RESOLUTION)]
        resolution: usize,
        /// Upper end of both axes (default: twice the largest limit)
        #[arg(short, long)]
        bound: Option<f64>,
        /// Sample every grid point instead of intersecting half-planes
        #[arg(long)]
        grid: bool,
        /// Write the scene here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Check { file } => {
            let problem = load_or_exit(&file);
            println!("✓ {} is valid", file.display());
            println!("  {} products", problem.products.len());
            println!("  {} constraints", problem.constraints.len());
        }
        Commands::Solve {
            file,
            analysis,
            currency,
            max_iterations,
            tolerance,
        } => {
            let problem = load_or_exit(&file);
            let solver = prodplan_solver::Solver::new()
                .with_max_iterations(max_iterations)
                .with_tolerance(tolerance);

            let solution = match prodplan_model::solve_with(&solver, &problem.products, &problem.constraints) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            print!(
                "{}",
                Report::new(&problem.products, &solution)
                    .with_currency(&currency)
                    .with_analysis(analysis)
            );

            if !solution.is_optimal() {
                std::process::exit(1);
            }
        }
        Commands::Plot {
            file,
            resolution,
            bound,
            grid,
            output,
        } => {
            let problem = load_or_exit(&file);
            let options = SceneOptions {
                resolution,
                strategy: if grid { FillStrategy::Grid } else { FillStrategy::Analytic },
            };

            let solution = match prodplan_model::solve(&problem.products, &problem.constraints) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            if !solution.is_optimal() {
                eprintln!("Status: {}", solution.status);
                eprintln!("{}", prodplan_model::status_message(&solution));
                std::process::exit(1);
            }

            let scene = match bound {
                Some(bound) => {
                    let names = problem.products.names();
                    match names.as_slice() {
                        [x, y] => prodplan_model::build_scene_with(
                            &problem.constraints,
                            &solution,
                            (x.clone(), y.clone()),
                            bound,
                            &options,
                        ),
                        _ => Err(prodplan_model::Error::NotTwoDimensional(names.len())),
                    }
                }
                None => prodplan_model::build_product_scene(&problem.products, &problem.constraints, &solution, &options),
            };
            let scene = match scene {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };

            let json = match serde_json::to_string_pretty(&scene) {
                Ok(j) => j,
                Err(e) => {
                    eprintln!("Error serializing scene: {}", e);
                    std::process::exit(1);
                }
            };
            write_or_exit(output.as_deref(), &json);
        }
    }
}

fn parse_tolerance(s: &str) -> Result<f64, String> {
    let tol: f64 = s.parse().map_err(|e| format!("{e}"))?;
    if tol.is_finite() && tol >= 0.0 {
        Ok(tol)
    } else {
        Err(format!("tolerance must be finite and non-negative, got {tol}"))
    }
}

fn load_or_exit(file: &Path) -> ProblemFile {
    match ProblemFile::load(file) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("✗ {}", e);
            std::process::exit(1);
        }
    }
}

fn write_or_exit(output: Option<&Path>, contents: &str) {
    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, contents) {
                eprintln!("Error writing {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
        None => println!("{}", contents),
    }
}
