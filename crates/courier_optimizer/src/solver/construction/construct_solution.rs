use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::{Level, debug, instrument, warn};

use crate::{
    problem::{courier::CourierIdx, delivery_problem::DeliveryProblem, job::JobIdx},
    solver::{
        evaluator::RouteEvaluator,
        solution::{
            route::{Route, RouteIdx},
            solution::{Solution, UnassignedJob, UnassignedReason},
        },
        solver_params::SolverParams,
    },
    utils::enumerate_idx::EnumerateIdx,
};

/// Cheapest route able to take `job` feasibly once appended. Ties go to the
/// lowest route index so the parallel scan picks what a sequential one would.
fn best_route(evaluator: &RouteEvaluator, routes: &[Route], job: JobIdx) -> Option<RouteIdx> {
    let job = evaluator.problem().job(job);

    routes
        .par_iter()
        .enumerate()
        .filter_map(|(index, route)| {
            let evaluation = evaluator.evaluate(&route.candidate_with(job));
            evaluation
                .feasible
                .then_some((RouteIdx::new(index), evaluation.cost()))
        })
        .min_by(|(a_idx, a_cost), (b_idx, b_cost)| {
            a_cost.total_cmp(b_cost).then_with(|| a_idx.cmp(b_idx))
        })
        .map(|(route, _)| route)
}

/// Greedy append: delivery-only jobs first, then O2O pairs, each job going
/// to the end of the route where it costs the least.
#[instrument(skip_all, level = Level::DEBUG)]
pub fn construct_solution(problem: &DeliveryProblem, params: &SolverParams) -> Solution {
    let evaluator = RouteEvaluator::new(problem, params);

    let mut routes: Vec<Route> = (0..problem.couriers().len())
        .map(|courier| Route::empty(problem, CourierIdx::new(courier)))
        .collect();
    let mut unassigned = Vec::new();

    for (job_id, job) in problem.jobs().iter().enumerate_idx::<JobIdx>() {
        match best_route(&evaluator, &routes, job_id) {
            Some(route_id) => {
                debug!(job = %job_id, route = %route_id, "job assigned");
                routes[route_id].append_job(&evaluator, job);
            }
            None => {
                let reason = if routes.is_empty() {
                    UnassignedReason::NoCouriers
                } else {
                    UnassignedReason::NoFeasibleRoute
                };

                warn!(
                    order_id = problem.job_order_id(job_id),
                    ?reason,
                    "job could not be assigned"
                );

                unassigned.push(UnassignedJob {
                    job: job_id,
                    reason,
                });
            }
        }
    }

    for route in &mut routes {
        route.evaluate(&evaluator);
    }

    Solution::new(routes, unassigned)
}
