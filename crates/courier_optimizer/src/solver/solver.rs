use tracing::{Level, info, instrument, warn};

use crate::{
    error::ProblemError,
    problem::delivery_problem::DeliveryProblem,
    solver::{
        construction::construct_solution::construct_solution,
        evaluator::RouteEvaluator,
        ls::local_search::LocalSearch,
        solution::solution::Solution,
        solver_params::{SolverParams, Threads},
    },
    timed_phase,
};

/// Runs construction then local search on a whole problem.
pub struct Solver {
    problem: DeliveryProblem,
    params: SolverParams,
}

impl Solver {
    pub fn new(problem: DeliveryProblem, params: SolverParams) -> Result<Self, ProblemError> {
        params.validate()?;

        Ok(Solver { problem, params })
    }

    pub fn problem(&self) -> &DeliveryProblem {
        &self.problem
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    pub fn solve(&self) -> Solution {
        in_thread_pool(&self.params.threads, || {
            solve_problem(&self.problem, &self.params)
        })
    }
}

/// Runs `f` inside a rayon pool sized by `threads`, or the global pool if
/// the dedicated one cannot be created.
pub(crate) fn in_thread_pool<R, F>(threads: &Threads, f: F) -> R
where
    F: FnOnce() -> R + Send,
    R: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.number_of_threads())
        .build()
    {
        Ok(pool) => pool.install(f),
        Err(error) => {
            warn!(%error, "failed to build thread pool, using the global one");
            f()
        }
    }
}

#[instrument(skip_all, level = Level::DEBUG)]
pub(crate) fn solve_problem(problem: &DeliveryProblem, params: &SolverParams) -> Solution {
    let evaluator = RouteEvaluator::new(problem, params);

    let mut solution = timed_phase!("construction", construct_solution(problem, params));

    if params.enable_local_search {
        let local_search = LocalSearch::new(evaluator);
        timed_phase!("local_search", local_search.run(solution.routes_mut()));
    }

    for route in solution.routes_mut() {
        route.evaluate(&evaluator);
    }

    for route in solution.routes() {
        info!(
            courier = problem.courier(route.courier_id()).external_id(),
            stops = route.len() - 1,
            total_time = route.total_time(),
            feasible = route.is_feasible(),
            penalty = route.evaluation().penalty,
            "route"
        );
    }

    info!(
        total_time = solution.total_time(),
        unassigned = solution.unassigned().len(),
        "solution"
    );

    solution
}
