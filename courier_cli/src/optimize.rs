use std::path::PathBuf;

use clap::Args;
use courier_optimizer::{
    json::types::{DepotAssignment, FromProblem, JsonDeliveryProblem, JsonSchedule, build_problem},
    partition::partitioned_solver::{PartitionParams, PartitionedSolver},
    solver::{
        solver::Solver,
        solver_params::{SolverParams, Threads},
    },
};
use tracing::info;

use crate::{file_utils, parsers};

#[derive(Args)]
pub struct OptimizeArgs {
    /// The problem file
    #[arg(short = 'i', long)]
    input: PathBuf,

    /// Output file of the schedule, printed to stdout when omitted
    #[arg(long, short = 'o')]
    out: Option<PathBuf>,

    /// Solver parameters file, every field optional
    #[arg(long)]
    params: Option<PathBuf>,

    /// Solve each of K spatial clusters separately
    #[arg(long, short = 'k')]
    clusters: Option<usize>,

    /// Seed of the clustering
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Draw the starting site of couriers without one from this seed instead of round-robin
    #[arg(long)]
    depot_seed: Option<u64>,

    #[arg(short, long)]
    threads: Option<usize>,

    /// Maximum number of 2-opt passes per route
    #[arg(long)]
    max_passes: Option<usize>,

    /// Time budget of the 2-opt passes of a route (e.g., "500ms", "2s")
    #[arg(long, value_parser = parsers::parse_duration)]
    two_opt_budget: Option<jiff::SignedDuration>,

    #[arg(long)]
    no_local_search: bool,
}

impl OptimizeArgs {
    fn solver_params(&self) -> Result<SolverParams, anyhow::Error> {
        let mut params: SolverParams = match &self.params {
            Some(path) => file_utils::read_json(path)?,
            None => SolverParams::default(),
        };

        if let Some(threads) = self.threads {
            params.threads = Threads::Multi(threads);
        }
        if self.max_passes.is_some() {
            params.max_two_opt_passes = self.max_passes;
        }
        if self.two_opt_budget.is_some() {
            params.two_opt_time_budget = self.two_opt_budget;
        }
        if self.no_local_search {
            params.enable_local_search = false;
        }

        Ok(params)
    }

    fn depot_assignment(&self) -> DepotAssignment {
        match self.depot_seed {
            Some(seed) => DepotAssignment::Random { seed },
            None => DepotAssignment::RoundRobin,
        }
    }
}

pub fn run(args: OptimizeArgs) -> Result<(), anyhow::Error> {
    info!("Optimizing {:?}", args.input);

    let params = args.solver_params()?;
    let content: JsonDeliveryProblem = file_utils::read_json(&args.input)?;
    let problem = build_problem(&content, args.depot_assignment())?;

    let schedule = match args.clusters {
        Some(clusters) => {
            let mut solver = PartitionedSolver::new(
                problem,
                params,
                PartitionParams {
                    clusters,
                    seed: args.seed,
                    ..PartitionParams::default()
                },
            )?;
            let solution = solver.solve()?;
            JsonSchedule::from_problem(&solution, solver.problem())
        }
        None => {
            let solver = Solver::new(problem, params)?;
            let solution = solver.solve();
            JsonSchedule::from_problem(&solution, solver.problem())
        }
    };

    info!(
        "Finished: routes = {}, total time = {:.2} min, unassigned = {}",
        schedule
            .routes
            .iter()
            .filter(|route| route.stops.len() > 1)
            .count(),
        schedule.total_time,
        schedule.unassigned.len(),
    );

    let output = serde_json::to_string_pretty(&schedule)?;
    match &args.out {
        Some(out) => file_utils::write_file(out, output)?,
        None => println!("{output}"),
    }

    Ok(())
}
