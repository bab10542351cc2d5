use serde::Serialize;

use crate::{
    problem::{
        delivery_problem::DeliveryProblem,
        stop::{StopIdx, StopKind},
        travel::{service_time, travel_time},
    },
    solver::solver_params::SolverParams,
};

/// Outcome of simulating a stop sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RouteEvaluation {
    /// Departure time of the last stop, in minutes from the shift start.
    pub total_time: f64,
    pub feasible: bool,
    pub penalty: f64,
}

impl RouteEvaluation {
    pub const EMPTY: RouteEvaluation = RouteEvaluation {
        total_time: 0.0,
        feasible: true,
        penalty: 0.0,
    };

    pub fn cost(&self) -> f64 {
        self.total_time + self.penalty
    }
}

/// Timing and load of one position of a route, as computed by the last evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScheduledStop {
    pub stop: StopIdx,
    pub arrival: f64,
    pub departure: f64,
    /// Packages on board when leaving the stop.
    pub load: f64,
}

/// Walks a stop sequence and derives times, load and constraint violations.
///
/// The evaluator never mutates anything it reads: the same sequence always
/// yields the same [`RouteEvaluation`].
#[derive(Clone, Copy)]
pub struct RouteEvaluator<'a> {
    problem: &'a DeliveryProblem,
    params: &'a SolverParams,
}

impl<'a> RouteEvaluator<'a> {
    pub fn new(problem: &'a DeliveryProblem, params: &'a SolverParams) -> Self {
        RouteEvaluator { problem, params }
    }

    pub fn problem(&self) -> &'a DeliveryProblem {
        self.problem
    }

    pub fn params(&self) -> &'a SolverParams {
        self.params
    }

    pub fn evaluate(&self, activities: &[StopIdx]) -> RouteEvaluation {
        self.simulate(activities, |_| {})
    }

    /// Same as [`RouteEvaluator::evaluate`], also recording every position into `schedule`.
    pub fn evaluate_into(
        &self,
        activities: &[StopIdx],
        schedule: &mut Vec<ScheduledStop>,
    ) -> RouteEvaluation {
        schedule.clear();
        schedule.reserve(activities.len());
        self.simulate(activities, |scheduled| schedule.push(scheduled))
    }

    pub fn route_cost(&self, activities: &[StopIdx]) -> f64 {
        self.evaluate(activities).cost()
    }

    pub fn is_feasible(&self, activities: &[StopIdx]) -> bool {
        self.evaluate(activities).feasible
    }

    fn simulate<F>(&self, activities: &[StopIdx], mut visit: F) -> RouteEvaluation
    where
        F: FnMut(ScheduledStop),
    {
        let Some((&first, rest)) = activities.split_first() else {
            return RouteEvaluation::EMPTY;
        };

        let penalties = &self.params.penalties;
        let mut feasible = true;
        let mut penalty = 0.0;
        let mut load = 0.0;

        visit(ScheduledStop {
            stop: first,
            arrival: 0.0,
            departure: 0.0,
            load,
        });

        let mut previous = first;
        let mut departure = 0.0;

        for &current in rest {
            let stop = self.problem.stop(current);
            let travel = travel_time(self.problem.distance_km(previous, current), self.params.speed);
            let arrival = stop.time_window().service_start(departure + travel);

            departure = if stop.kind().has_service_time() {
                arrival + service_time(stop.packages())
            } else {
                arrival
            };

            match stop.kind() {
                StopKind::ShopPickup => {
                    load += stop.packages();
                    if load > self.params.max_capacity {
                        feasible = false;
                        penalty += (load - self.params.max_capacity) * penalties.capacity;
                    }
                }
                StopKind::Delivery => {
                    load -= stop.packages();
                    if load < 0.0 {
                        feasible = false;
                        penalty += penalties.negative_load;
                    }
                }
                StopKind::Depot | StopKind::EcommerceDelivery => {}
            }

            if !stop.time_window().is_satisfied(arrival) {
                feasible = false;
                penalty += stop.time_window().lateness(arrival) * penalties.late_arrival;
            }

            visit(ScheduledStop {
                stop: current,
                arrival,
                departure,
                load,
            });

            previous = current;
        }

        let total_time = departure;
        if total_time > self.params.max_working_minutes {
            feasible = false;
            penalty += (total_time - self.params.max_working_minutes) * penalties.overtime;
        }

        RouteEvaluation {
            total_time,
            feasible,
            penalty,
        }
    }
}
