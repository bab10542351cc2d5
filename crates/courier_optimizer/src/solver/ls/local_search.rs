use jiff::Timestamp;
use rayon::iter::{IntoParallelRefMutIterator, ParallelIterator};
use tracing::{Level, debug, instrument};

use crate::{
    problem::stop::StopIdx,
    solver::{
        evaluator::RouteEvaluator,
        ls::{operator::IntraRouteOperator, swap::SwapOperator, two_opt::TwoOptOperator},
        solution::route::Route,
    },
};

/// Single first-improvement pass of `O` over `activities`.
///
/// A move is adopted as soon as its candidate is valid, feasible and strictly
/// cheaper than the current sequence; the rest of the scan then continues on
/// the adopted sequence. Returns the number of adopted moves.
pub fn improve_sequence<O>(evaluator: &RouteEvaluator, activities: &mut Vec<StopIdx>) -> usize
where
    O: IntraRouteOperator,
{
    let problem = evaluator.problem();
    let mut best_cost = evaluator.route_cost(activities);
    let mut candidate = Vec::with_capacity(activities.len());
    let mut accepted = 0;

    O::generate_moves(activities.len(), |op| {
        candidate.clone_from(activities);
        op.apply(&mut candidate);

        if !op.is_valid(problem, &candidate) {
            return;
        }

        let evaluation = evaluator.evaluate(&candidate);
        if evaluation.feasible && evaluation.cost() < best_cost {
            debug!(
                operator = O::NAME,
                from = best_cost,
                to = evaluation.cost(),
                "move accepted"
            );
            best_cost = evaluation.cost();
            std::mem::swap(activities, &mut candidate);
            accepted += 1;
        }
    });

    accepted
}

/// Per-route improvement: repeated 2-opt passes, then one swap pass.
pub struct LocalSearch<'a> {
    evaluator: RouteEvaluator<'a>,
}

impl<'a> LocalSearch<'a> {
    pub fn new(evaluator: RouteEvaluator<'a>) -> Self {
        LocalSearch { evaluator }
    }

    /// Runs 2-opt passes until one adopts nothing, or a configured bound is hit.
    pub fn two_opt(&self, route: &Route) -> Route {
        let params = self.evaluator.params();
        let started = Timestamp::now();
        let mut activities = route.activities().to_vec();
        let mut passes = 0;

        loop {
            if params
                .max_two_opt_passes
                .is_some_and(|max_passes| passes >= max_passes)
            {
                break;
            }

            passes += 1;
            if improve_sequence::<TwoOptOperator>(&self.evaluator, &mut activities) == 0 {
                break;
            }

            if params
                .two_opt_time_budget
                .is_some_and(|budget| Timestamp::now().duration_since(started) >= budget)
            {
                debug!(passes, "2-opt time budget exhausted");
                break;
            }
        }

        self.rebuild(route, activities)
    }

    pub fn swap(&self, route: &Route) -> Route {
        let mut activities = route.activities().to_vec();
        improve_sequence::<SwapOperator>(&self.evaluator, &mut activities);
        self.rebuild(route, activities)
    }

    pub fn improve_route(&self, route: &Route) -> Route {
        let improved = self.two_opt(route);
        self.swap(&improved)
    }

    /// Improves every route independently, in parallel.
    #[instrument(skip_all, level = Level::DEBUG)]
    pub fn run(&self, routes: &mut [Route]) {
        routes.par_iter_mut().for_each(|route| {
            let before = route.cost();
            *route = self.improve_route(route);

            debug!(
                courier = %route.courier_id(),
                before,
                after = route.cost(),
                "route improved"
            );
        });
    }

    fn rebuild(&self, route: &Route, activities: Vec<StopIdx>) -> Route {
        let mut improved = route.clone();
        improved.replace_activities(&self.evaluator, activities);
        improved
    }
}
