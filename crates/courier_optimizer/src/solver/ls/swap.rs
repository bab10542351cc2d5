use crate::{
    problem::{delivery_problem::DeliveryProblem, stop::StopIdx},
    solver::ls::operator::{IntraRouteOperator, respects_precedence},
};

/// **Intra-Route Swap**
///
/// Exchanges the positions of two stops (`first` and `second`) within the same route.
///
/// ```text
/// BEFORE:
///    ... (A) -> [first] -> (B) ... (X) -> [second] -> (Y) ...
///
/// AFTER:
///    ... (A) -> [second] -> (B) ... (X) -> [first] -> (Y) ...
/// ```
///
/// Moves putting a delivery ahead of its pickup are rejected without being evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOperator {
    first: usize,
    second: usize,
}

impl SwapOperator {
    pub fn new(first: usize, second: usize) -> Self {
        if first == second {
            panic!("SwapOperator: 'first' and 'second' positions must be different.");
        }

        SwapOperator { first, second }
    }
}

impl IntraRouteOperator for SwapOperator {
    const NAME: &'static str = "swap";

    fn generate_moves<C>(len: usize, mut consumer: C)
    where
        C: FnMut(Self),
    {
        for first in 1..len {
            for second in first + 1..len {
                consumer(SwapOperator::new(first, second));
            }
        }
    }

    fn apply(&self, activities: &mut [StopIdx]) {
        activities.swap(self.first, self.second);
    }

    fn is_valid(&self, problem: &DeliveryProblem, activities: &[StopIdx]) -> bool {
        respects_precedence(problem, activities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_generate_moves() {
        let mut moves = Vec::new();
        SwapOperator::generate_moves(4, |op| moves.push((op.first, op.second)));

        assert_eq!(moves, vec![(1, 2), (1, 3), (2, 3)]);
    }

    #[test]
    fn test_depot_never_moves() {
        let mut moves = Vec::new();
        SwapOperator::generate_moves(2, |op| moves.push((op.first, op.second)));
        SwapOperator::generate_moves(1, |op| moves.push((op.first, op.second)));

        assert!(moves.is_empty());
    }

    #[test]
    fn test_swap_breaking_precedence_is_invalid() {
        let (problem, pickup, delivery) = test_utils::create_pair_problem(1.0, 1.0, 2.0);
        let op = SwapOperator::new(1, 2);

        let mut activities = vec![StopIdx::new(0), pickup, delivery];
        op.apply(&mut activities);

        assert_eq!(activities, vec![StopIdx::new(0), delivery, pickup]);
        assert!(!op.is_valid(&problem, &activities));
    }
}
