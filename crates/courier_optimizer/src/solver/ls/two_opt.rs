use crate::{
    problem::{delivery_problem::DeliveryProblem, stop::StopIdx},
    solver::ls::operator::{IntraRouteOperator, respects_precedence},
};

/// **Intra-Route 2-Opt**
///
/// Reverses the stops between `from` and `to` (inclusive).
///
/// ```text
/// BEFORE:
///    ... (prev) --x--> [from] -> ... -> [to] --x--> (next) ...
///
/// AFTER:
///    ... (prev) -----> [to] -> ... -> [from] -----> (next) ...
/// ```
///
/// The depot at position 0 and the last stop never move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoOptOperator {
    from: usize,
    to: usize,
}

impl TwoOptOperator {
    pub fn new(from: usize, to: usize) -> Self {
        if from >= to {
            panic!("TwoOpt: cannot have from >= to")
        }

        TwoOptOperator { from, to }
    }
}

impl IntraRouteOperator for TwoOptOperator {
    const NAME: &'static str = "two_opt";

    fn generate_moves<C>(len: usize, mut consumer: C)
    where
        C: FnMut(Self),
    {
        if len < 4 {
            return;
        }

        for from in 1..len - 2 {
            for to in from + 1..=len - 2 {
                consumer(TwoOptOperator::new(from, to));
            }
        }
    }

    fn apply(&self, activities: &mut [StopIdx]) {
        activities[self.from..=self.to].reverse();
    }

    fn is_valid(&self, problem: &DeliveryProblem, activities: &[StopIdx]) -> bool {
        respects_precedence(problem, activities)
    }
}
