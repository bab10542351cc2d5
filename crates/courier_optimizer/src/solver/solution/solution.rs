use serde::Serialize;

use crate::{
    problem::{delivery_problem::DeliveryProblem, job::JobIdx},
    solver::solution::route::Route,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnassignedReason {
    /// Every route became infeasible with the job appended.
    NoFeasibleRoute,
    /// No courier was available to take the job.
    NoCouriers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnassignedJob {
    pub job: JobIdx,
    pub reason: UnassignedReason,
}

/// Routes (one per courier, in courier order) and the jobs left out.
#[derive(Debug, Clone, Default)]
pub struct Solution {
    routes: Vec<Route>,
    unassigned: Vec<UnassignedJob>,
}

impl Solution {
    pub fn new(routes: Vec<Route>, unassigned: Vec<UnassignedJob>) -> Self {
        Solution { routes, unassigned }
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn routes_mut(&mut self) -> &mut [Route] {
        &mut self.routes
    }

    pub fn into_parts(self) -> (Vec<Route>, Vec<UnassignedJob>) {
        (self.routes, self.unassigned)
    }

    pub fn unassigned(&self) -> &[UnassignedJob] {
        &self.unassigned
    }

    pub fn unassigned_order_ids<'a>(
        &'a self,
        problem: &'a DeliveryProblem,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.unassigned
            .iter()
            .map(|unassigned| problem.job_order_id(unassigned.job))
    }

    /// Sum of the route durations, penalties excluded.
    pub fn total_time(&self) -> f64 {
        self.routes.iter().map(Route::total_time).sum()
    }

    pub fn is_feasible(&self) -> bool {
        self.routes.iter().all(Route::is_feasible)
    }
}
