use jiff::SignedDuration;
use serde::{Deserialize, Serialize};

use crate::{error::ProblemError, problem::kmh::Kmh};

/// Weights turning each kind of constraint violation into penalty minutes.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltyWeights {
    /// Per package above the capacity.
    pub capacity: f64,
    /// Flat, each time a delivery drives the load below zero.
    pub negative_load: f64,
    /// Per minute of arrival past the latest allowed arrival.
    pub late_arrival: f64,
    /// Per minute the route ends past the shift length.
    pub overtime: f64,
}

impl Default for PenaltyWeights {
    fn default() -> Self {
        PenaltyWeights {
            capacity: 100.0,
            negative_load: 1000.0,
            late_arrival: 50.0,
            overtime: 100.0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverParams {
    pub speed: Kmh,
    pub max_capacity: f64,
    pub max_working_minutes: f64,
    pub penalties: PenaltyWeights,

    /// Upper bound on full 2-opt passes per route, `None` runs to a local optimum.
    pub max_two_opt_passes: Option<usize>,
    /// Wall clock bound for the 2-opt passes of a single route.
    pub two_opt_time_budget: Option<SignedDuration>,

    pub enable_local_search: bool,
    pub threads: Threads,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Threads {
    Single,
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => (*num).max(1),
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            speed: Kmh::default(),
            max_capacity: 140.0,
            max_working_minutes: 720.0,
            penalties: PenaltyWeights::default(),
            max_two_opt_passes: None,
            two_opt_time_budget: None,
            enable_local_search: true,
            threads: Threads::Auto,
        }
    }
}

impl SolverParams {
    pub fn validate(&self) -> Result<(), ProblemError> {
        let speed = self.speed.value();
        if !speed.is_finite() || speed <= 0.0 {
            return Err(ProblemError::InvalidParameter {
                name: "speed",
                reason: "must be a positive number",
            });
        }

        let non_negative = [
            ("max_capacity", self.max_capacity),
            ("max_working_minutes", self.max_working_minutes),
            ("penalties.capacity", self.penalties.capacity),
            ("penalties.negative_load", self.penalties.negative_load),
            ("penalties.late_arrival", self.penalties.late_arrival),
            ("penalties.overtime", self.penalties.overtime),
        ];

        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ProblemError::InvalidParameter {
                    name,
                    reason: "must be a non-negative number",
                });
            }
        }

        if self
            .two_opt_time_budget
            .is_some_and(|budget| budget.is_negative())
        {
            return Err(ProblemError::InvalidParameter {
                name: "two_opt_time_budget",
                reason: "must not be negative",
            });
        }

        Ok(())
    }
}
