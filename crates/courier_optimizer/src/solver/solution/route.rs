use crate::{
    define_index_newtype,
    problem::{courier::CourierIdx, delivery_problem::DeliveryProblem, job::Job, stop::StopIdx},
    solver::evaluator::{RouteEvaluation, RouteEvaluator, ScheduledStop},
};

define_index_newtype!(RouteIdx, Route);

/// Ordered stops of one courier. The first activity is always the courier's depot.
///
/// `schedule` and `evaluation` reflect `activities` as of the last mutation:
/// every method changing the sequence re-evaluates it.
#[derive(Debug, Clone)]
pub struct Route {
    courier_id: CourierIdx,
    activities: Vec<StopIdx>,
    schedule: Vec<ScheduledStop>,
    evaluation: RouteEvaluation,
}

impl Route {
    pub fn empty(problem: &DeliveryProblem, courier_id: CourierIdx) -> Self {
        let depot = problem.courier(courier_id).depot();

        Route {
            courier_id,
            activities: vec![depot],
            schedule: vec![ScheduledStop {
                stop: depot,
                arrival: 0.0,
                departure: 0.0,
                load: 0.0,
            }],
            evaluation: RouteEvaluation::EMPTY,
        }
    }

    pub fn with_activities(
        evaluator: &RouteEvaluator,
        courier_id: CourierIdx,
        activities: Vec<StopIdx>,
    ) -> Self {
        let mut route = Route {
            courier_id,
            activities,
            schedule: Vec::new(),
            evaluation: RouteEvaluation::EMPTY,
        };
        route.evaluate(evaluator);
        route
    }

    pub fn courier_id(&self) -> CourierIdx {
        self.courier_id
    }

    pub(crate) fn set_courier_id(&mut self, courier_id: CourierIdx) {
        self.courier_id = courier_id;
    }

    pub fn activities(&self) -> &[StopIdx] {
        &self.activities
    }

    pub fn schedule(&self) -> &[ScheduledStop] {
        &self.schedule
    }

    pub fn evaluation(&self) -> &RouteEvaluation {
        &self.evaluation
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// A route holding only its depot.
    pub fn is_empty(&self) -> bool {
        self.activities.len() <= 1
    }

    pub fn total_time(&self) -> f64 {
        self.schedule.last().map_or(0.0, |last| last.departure)
    }

    pub fn cost(&self) -> f64 {
        self.evaluation.cost()
    }

    pub fn is_feasible(&self) -> bool {
        self.evaluation.feasible
    }

    /// Builds the sequence obtained by appending `job`, without touching the route.
    pub fn candidate_with(&self, job: &Job) -> Vec<StopIdx> {
        let mut candidate = Vec::with_capacity(self.activities.len() + job.len());
        candidate.extend_from_slice(&self.activities);
        job.append_to(&mut candidate);
        candidate
    }

    pub fn append_job(&mut self, evaluator: &RouteEvaluator, job: &Job) {
        job.append_to(&mut self.activities);
        self.evaluate(evaluator);
    }

    pub fn replace_activities(&mut self, evaluator: &RouteEvaluator, activities: Vec<StopIdx>) {
        self.activities = activities;
        self.evaluate(evaluator);
    }

    pub fn evaluate(&mut self, evaluator: &RouteEvaluator) -> RouteEvaluation {
        self.evaluation = evaluator.evaluate_into(&self.activities, &mut self.schedule);
        self.evaluation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        problem::job::JobIdx,
        solver::solver_params::SolverParams,
        test_utils::{self, assert_close},
    };

    #[test]
    fn test_empty_route() {
        let (problem, depot) = test_utils::create_single_depot_problem(vec![]);
        let route = Route::empty(&problem, CourierIdx::new(0));

        assert_eq!(route.activities(), &[depot]);
        assert!(route.is_empty());
        assert_eq!(route.total_time(), 0.0);
        assert_eq!(*route.evaluation(), RouteEvaluation::EMPTY);
    }

    #[test]
    fn test_append_job_refreshes_schedule() {
        let problem = test_utils::create_problem(
            1,
            vec![test_utils::ecommerce_stop("o1", 10.0, 4.0, None)],
            vec![test_utils::pair_stops("p1", 2.0, 11.0, 12.0)],
        );
        let params = SolverParams::default();
        let evaluator = RouteEvaluator::new(&problem, &params);

        let mut route = Route::empty(&problem, CourierIdx::new(0));
        route.append_job(&evaluator, problem.job(JobIdx::new(0)));
        assert_close(route.total_time(), 51.0);

        route.append_job(&evaluator, problem.job(JobIdx::new(1)));

        assert_eq!(test_utils::stop_indices(&route), vec![0, 1, 2, 3]);
        assert_eq!(route.schedule().len(), 4);
        assert_eq!(route.schedule()[2].load, 2.0);
        assert_eq!(route.schedule()[3].load, 0.0);
        assert!(route.is_feasible());
        assert_close(route.total_time(), route.evaluation().total_time);
    }

    #[test]
    fn test_candidate_leaves_route_untouched() {
        let problem = test_utils::create_problem(
            1,
            vec![],
            vec![test_utils::pair_stops("p1", 2.0, 1.0, 2.0)],
        );
        let route = Route::empty(&problem, CourierIdx::new(0));

        let candidate = route.candidate_with(problem.job(JobIdx::new(0)));

        assert_eq!(
            candidate,
            vec![StopIdx::new(0), StopIdx::new(1), StopIdx::new(2)]
        );
        assert_eq!(route.len(), 1);
    }
}
