use fxhash::FxHashMap;

use crate::problem::{
    delivery_problem::DeliveryProblem,
    stop::{StopIdx, StopKind},
};

/// A rearrangement of the stops of a single route.
///
/// Operators only describe the move; evaluating and adopting it is left to
/// [`crate::solver::ls::local_search::improve_sequence`].
pub trait IntraRouteOperator: Sized {
    const NAME: &'static str;

    /// Calls `consumer` with every move applicable to a route of `len` stops.
    fn generate_moves<C>(len: usize, consumer: C)
    where
        C: FnMut(Self);

    fn apply(&self, activities: &mut [StopIdx]);

    /// Cheap structural check on the sequence produced by [`IntraRouteOperator::apply`],
    /// run before the candidate is evaluated.
    fn is_valid(&self, _problem: &DeliveryProblem, _activities: &[StopIdx]) -> bool {
        true
    }
}

/// Every paired delivery comes after its pickup.
///
/// Only stops carrying both an order id and a paired order id are considered.
pub fn respects_precedence(problem: &DeliveryProblem, activities: &[StopIdx]) -> bool {
    let mut pickups: FxHashMap<&str, usize> = FxHashMap::default();

    for (position, &stop) in activities.iter().enumerate() {
        let stop = problem.stop(stop);
        if !stop.is_paired() {
            continue;
        }

        let Some(order_id) = stop.order_id() else {
            continue;
        };

        match stop.kind() {
            StopKind::ShopPickup => {
                pickups.insert(order_id, position);
            }
            StopKind::Delivery => match pickups.get(order_id) {
                Some(&pickup) if pickup < position => {}
                _ => return false,
            },
            StopKind::Depot | StopKind::EcommerceDelivery => {}
        }
    }

    true
}
