use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use taxi_core::matching::AssignmentStrategy;
use taxi_core::runner::{compare_routing, ScenarioRun};
use taxi_core::scenario::ScenarioParams;
use taxi_experiments::{
    export_comparison_to_json, export_to_csv, export_to_json, find_best_parameters,
    run_parallel_experiments_with_progress, summarize, ParameterSpace,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "social_taxi",
    about = "Plan taxi routes with opportunistic ride sharing",
    long_about = "Assigns one passenger per taxi, then lets taxis pick up an extra\n\
                  passenger when the detour fits a deviation budget. `compare` runs a\n\
                  single scenario with and without detours; `sweep` runs many in parallel."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one scenario in social and direct mode and print both
    Compare {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Write the full comparison (agent reports, final state) as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Run a parameter sweep in parallel
    Sweep {
        #[command(flatten)]
        scenario: ScenarioArgs,
        /// Deviation budgets to try
        #[arg(long, value_delimiter = ',', default_values_t = [0, 1, 2, 3, 4])]
        budgets: Vec<usize>,
        /// Fleet sizes to try (taxis = passengers)
        #[arg(long, value_delimiter = ',')]
        fleet_sizes: Vec<usize>,
        /// Assignment strategies to try
        #[arg(long, value_enum, value_delimiter = ',')]
        strategies: Vec<StrategyArg>,
        /// Number of seeds per combination
        #[arg(long, default_value_t = 10)]
        runs: usize,
        /// Worker threads (defaults to rayon's choice)
        #[arg(long)]
        threads: Option<usize>,
        #[arg(long)]
        csv: Option<PathBuf>,
        #[arg(long)]
        json: Option<PathBuf>,
        /// Hide the progress bar
        #[arg(long)]
        quiet: bool,
    },
}

#[derive(Args)]
struct ScenarioArgs {
    /// JSON scenario file; flags below override its values
    #[arg(long, env = "SOCIAL_TAXI_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long)]
    taxis: Option<usize>,
    #[arg(long)]
    passengers: Option<usize>,
    /// Maximum hops a taxi may travel to an extra pickup
    #[arg(long)]
    budget: Option<usize>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, value_enum)]
    strategy: Option<StrategyArg>,
    /// Per-agent action cap
    #[arg(long)]
    max_steps: Option<usize>,
}

#[derive(Clone, Copy, ValueEnum)]
enum StrategyArg {
    Exhaustive,
    Hungarian,
    Auction,
}

impl From<StrategyArg> for AssignmentStrategy {
    fn from(value: StrategyArg) -> Self {
        match value {
            StrategyArg::Exhaustive => AssignmentStrategy::Exhaustive,
            StrategyArg::Hungarian => AssignmentStrategy::Hungarian,
            StrategyArg::Auction => AssignmentStrategy::Auction,
        }
    }
}

impl ScenarioArgs {
    fn load(&self) -> Result<ScenarioParams, Box<dyn std::error::Error>> {
        let mut params = match &self.config {
            Some(path) => ScenarioParams::from_json_file(path)?,
            None => ScenarioParams::default(),
        };
        if let Some(taxis) = self.taxis {
            params.num_taxis = taxis;
            params.taxi_locations = None;
        }
        if let Some(passengers) = self.passengers {
            params.num_passengers = passengers;
            params.passengers = None;
        }
        if let Some(budget) = self.budget {
            params.deviation_budget = budget;
        }
        if let Some(seed) = self.seed {
            params.seed = Some(seed);
        }
        if let Some(strategy) = self.strategy {
            params.assignment_strategy = strategy.into();
        }
        if let Some(max_steps) = self.max_steps {
            params.max_agent_steps = max_steps;
        }
        params.validate()?;
        Ok(params)
    }
}

fn print_run(label: &str, run: &ScenarioRun) {
    println!(
        "{label:>6}: {} actions, {} detours, {}/{} delivered, {} pending",
        run.total_actions(),
        run.detours().count(),
        run.delivered_count(),
        run.final_state.passengers.len(),
        run.pending_action_count(),
    );
    for agent in &run.agents {
        println!(
            "        taxi {} -> passenger {:?}: {} actions, {} detours",
            agent.taxi.0,
            agent.passenger,
            agent.actions_issued,
            agent.detours.len()
        );
    }
}

fn compare(scenario: &ScenarioArgs, output: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let params = scenario.load()?;
    let comparison = compare_routing(&params)?;

    println!(
        "assignment ({}): {:?}, cost {}",
        params.assignment_strategy.as_str(),
        comparison.social.assignment.pairs().collect::<Vec<_>>(),
        comparison.social.assignment_cost
    );
    print_run("social", &comparison.social);
    print_run("direct", &comparison.direct);
    println!("actions saved: {}", comparison.actions_saved());

    if let Some(path) = output {
        export_comparison_to_json(&comparison, &path)?;
        info!(path = %path.display(), "comparison written");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn sweep(
    scenario: &ScenarioArgs,
    budgets: Vec<usize>,
    fleet_sizes: Vec<usize>,
    strategies: Vec<StrategyArg>,
    runs: usize,
    threads: Option<usize>,
    csv: Option<PathBuf>,
    json: Option<PathBuf>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let base = scenario.load()?;
    let first_seed = base.effective_seed();
    let space = ParameterSpace::grid()
        .with_base(base)
        .deviation_budget(budgets)
        .fleet_size(fleet_sizes)
        .assignment_strategy(strategies.into_iter().map(Into::into).collect())
        .seed_range(first_seed, runs.max(1));

    let parameter_sets = space.generate();
    info!(runs = parameter_sets.len(), "starting sweep");
    let results = run_parallel_experiments_with_progress(parameter_sets.clone(), threads, !quiet);

    let summary = summarize(&results);
    println!(
        "{} runs ({} failed), {} detours",
        summary.runs, summary.failed, summary.total_detours
    );
    println!(
        "social actions: avg {:.2}, median {:.1}, p90 {:.1}",
        summary.avg_social_actions, summary.median_social_actions, summary.p90_social_actions
    );
    println!(
        "direct actions: avg {:.2}, median {:.1}, p90 {:.1}",
        summary.avg_direct_actions, summary.median_direct_actions, summary.p90_direct_actions
    );
    println!(
        "actions saved: avg {:.2}, {} runs better than direct",
        summary.avg_actions_saved, summary.runs_with_savings
    );
    if let Some(best) = find_best_parameters(&results, &parameter_sets) {
        println!(
            "best: {} (budget {}, fleet {}, {}, seed {})",
            best.experiment_id,
            best.params.deviation_budget,
            best.params.num_taxis,
            best.params.assignment_strategy.as_str(),
            best.seed
        );
    }

    if let Some(path) = csv {
        export_to_csv(&results, &path)?;
        info!(path = %path.display(), "csv written");
    }
    if let Some(path) = json {
        export_to_json(&results, &path)?;
        info!(path = %path.display(), "json written");
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Commands::Compare { scenario, output } => compare(&scenario, output),
        Commands::Sweep {
            scenario,
            budgets,
            fleet_sizes,
            strategies,
            runs,
            threads,
            csv,
            json,
            quiet,
        } => sweep(
            &scenario,
            budgets,
            fleet_sizes,
            strategies,
            runs,
            threads,
            csv,
            json,
            quiet,
        ),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
