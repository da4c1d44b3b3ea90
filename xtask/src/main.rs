use std::path::Path;
use std::process::{exit, Command, ExitStatus};

use clap::{Parser, Subcommand, ValueEnum};

// ── CLI definition ─────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "xtask",
    about = "Task runner for the social taxi workspace",
    long_about = "A unified CLI for running scenarios, budget sweeps, benchmarks,\n\
                  and CI checks in the social taxi workspace."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the default taxi-map scenario with and without detours
    Run,
    /// Compare social and direct routing through the CLI
    Compare {
        /// Deviation budget for the social run
        #[arg(long, default_value_t = 3)]
        budget: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Optional JSON output path for the full comparison
        #[arg(long)]
        output: Option<String>,
    },
    /// Run the deviation budget sweep example
    Sweep,
    /// Run Criterion benchmarks
    Bench,
    /// Compare benchmarks: stash changes, create baseline, restore, compare
    BenchCompare,
    /// Run CI checks (fmt, clippy, tests, examples, benchmarks)
    Ci {
        /// Job to run
        #[arg(value_enum, default_value_t = CiJob::Check)]
        job: CiJob,
    },
}

#[derive(Clone, ValueEnum)]
enum CiJob {
    /// Formatting, clippy, and tests
    Check,
    /// Build and run the examples
    Examples,
    /// Run benchmarks
    Bench,
    /// Run check + examples + bench
    All,
}

// ── helpers ────────────────────────────────────────────────────────

fn step(label: &str) {
    eprintln!("\n=== {label} ===");
}

fn spawn(program: &str, args: &[&str]) -> ExitStatus {
    eprintln!("+ {program} {}", args.join(" "));
    Command::new(program)
        .args(args)
        .status()
        .unwrap_or_else(|error| {
            eprintln!("failed to execute {program}: {error}");
            exit(1);
        })
}

fn run(program: &str, args: &[&str]) {
    let status = spawn(program, args);
    if !status.success() {
        exit(status.code().unwrap_or(1));
    }
}

fn run_cargo(args: &[&str]) {
    run("cargo", args);
}

fn run_git(args: &[&str]) {
    run("git", args);
}

fn bench_args<'a>(extra: &[&'a str]) -> Vec<&'a str> {
    let mut args = vec!["bench", "--package", "taxi_core", "--bench", "performance"];
    if !extra.is_empty() {
        args.push("--");
        args.extend_from_slice(extra);
    }
    args
}

// ── CI jobs ────────────────────────────────────────────────────────

fn ci_check() {
    step("Check formatting");
    run_cargo(&["fmt", "--all", "--", "--check"]);

    step("Clippy");
    run_cargo(&[
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ]);

    step("Test taxi_core");
    run_cargo(&["test", "-p", "taxi_core"]);

    step("Test taxi_experiments");
    run_cargo(&["test", "-p", "taxi_experiments"]);
}

fn ci_examples() {
    step("Run scenario_run");
    run_cargo(&["run", "-p", "taxi_core", "--example", "scenario_run", "--release"]);

    step("Run budget_sweep");
    run_cargo(&[
        "run",
        "-p",
        "taxi_experiments",
        "--example",
        "budget_sweep",
        "--release",
    ]);
}

fn ci_bench() {
    step("Run benchmarks");
    run_cargo(&bench_args(&[]));
}

// ── main ───────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run => {
            run_cargo(&["run", "-p", "taxi_core", "--example", "scenario_run", "--release"]);
        }
        Commands::Compare {
            budget,
            seed,
            output,
        } => {
            let budget = budget.to_string();
            let seed = seed.to_string();
            let mut args = vec![
                "run",
                "-p",
                "taxi_experiments",
                "--bin",
                "social_taxi",
                "--",
                "compare",
                "--budget",
                &budget,
                "--seed",
                &seed,
            ];
            if let Some(path) = output.as_deref() {
                args.extend_from_slice(&["--output", path]);
            }
            run_cargo(&args);
        }
        Commands::Sweep => {
            run_cargo(&[
                "run",
                "-p",
                "taxi_experiments",
                "--example",
                "budget_sweep",
                "--release",
            ]);
        }
        Commands::Bench => {
            run_cargo(&bench_args(&[]));
        }
        Commands::BenchCompare => {
            let baseline_dir = Path::new("target/criterion");
            if baseline_dir.exists() {
                step("Removing existing benchmark data");
                if let Err(error) = std::fs::remove_dir_all(baseline_dir) {
                    eprintln!("failed to remove target/criterion: {error}");
                    exit(1);
                }
            }

            step("Stashing current changes");
            run_git(&[
                "stash",
                "push",
                "-m",
                "Temporary stash for benchmark comparison",
            ]);

            step("Running benchmark to create baseline");
            run_cargo(&bench_args(&["--save-baseline", "main"]));

            step("Reapplying changes");
            run_git(&["stash", "pop"]);

            step("Running benchmark comparing against baseline");
            run_cargo(&bench_args(&["--baseline", "main"]));

            eprintln!("\nDone! Check the output above to see performance comparison.");
        }
        Commands::Ci { job } => {
            match job {
                CiJob::Check => ci_check(),
                CiJob::Examples => ci_examples(),
                CiJob::Bench => ci_bench(),
                CiJob::All => {
                    ci_check();
                    ci_examples();
                    ci_bench();
                }
            }
            eprintln!("\nCI job passed.");
        }
    }
}
