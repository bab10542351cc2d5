use crate::{
    problem::{
        courier::CourierIdx,
        delivery_problem::{DeliveryProblem, DeliveryProblemBuilder},
        location::{EARTH_RADIUS_KM, Location},
        stop::{Stop, StopBuilder, StopIdx, StopKind},
    },
    solver::{
        evaluator::RouteEvaluator, solution::route::Route, solver_params::SolverParams,
    },
};

pub const SHIFT_LENGTH: f64 = 720.0;

/// Location `km` kilometers north of (0, 0). Distances between two such
/// locations are the difference of their offsets.
pub fn at_km(km: f64) -> Location {
    Location::from_lat_lng((km / EARTH_RADIUS_KM).to_degrees(), 0.0)
}

pub fn stop_builder(order_id: &str, km: f64, kind: StopKind) -> StopBuilder {
    StopBuilder::new(format!("loc-{order_id}"), at_km(km), kind).with_order_id(order_id)
}

pub fn ecommerce_stop(order_id: &str, km: f64, packages: f64, latest: Option<f64>) -> Stop {
    let builder =
        stop_builder(order_id, km, StopKind::EcommerceDelivery).with_packages(packages);

    let builder = match latest {
        Some(latest) => builder.with_time_window(0.0, latest),
        None => builder,
    };

    builder.build(SHIFT_LENGTH).unwrap()
}

pub fn pair_stops(order_id: &str, packages: f64, pickup_km: f64, delivery_km: f64) -> (Stop, Stop) {
    let pickup = stop_builder(order_id, pickup_km, StopKind::ShopPickup)
        .with_paired_order_id(order_id)
        .with_packages(packages)
        .build(SHIFT_LENGTH)
        .unwrap();

    let delivery = stop_builder(order_id, delivery_km, StopKind::Delivery)
        .with_paired_order_id(order_id)
        .with_packages(packages)
        .build(SHIFT_LENGTH)
        .unwrap();

    (pickup, delivery)
}

/// Problem with one depot at km 0 (always `StopIdx(0)`) shared by `couriers` couriers.
pub fn create_problem(couriers: usize, singles: Vec<Stop>, pairs: Vec<(Stop, Stop)>) -> DeliveryProblem {
    let mut builder = DeliveryProblemBuilder::new(SHIFT_LENGTH);
    let depot = builder.add_depot("site", at_km(0.0));

    for courier in 0..couriers {
        builder.add_courier(format!("c{courier}"), depot).unwrap();
    }

    for stop in singles {
        builder.add_single(stop).unwrap();
    }

    for (pickup, delivery) in pairs {
        builder.add_pair(pickup, delivery).unwrap();
    }

    builder.build()
}

/// One courier, the given delivery-only stops at `StopIdx(1..)`.
pub fn create_single_depot_problem(stops: Vec<Stop>) -> (DeliveryProblem, StopIdx) {
    (create_problem(1, stops, vec![]), StopIdx::new(0))
}

/// One courier and a single O2O order, returns the pickup and delivery indices.
pub fn create_pair_problem(
    packages: f64,
    pickup_km: f64,
    delivery_km: f64,
) -> (DeliveryProblem, StopIdx, StopIdx) {
    let problem = create_problem(
        1,
        vec![],
        vec![pair_stops("p1", packages, pickup_km, delivery_km)],
    );

    (problem, StopIdx::new(1), StopIdx::new(2))
}

pub fn create_route(problem: &DeliveryProblem, params: &SolverParams, stops: &[usize]) -> Route {
    let evaluator = RouteEvaluator::new(problem, params);
    Route::with_activities(
        &evaluator,
        CourierIdx::new(0),
        stops.iter().map(|&stop| StopIdx::new(stop)).collect(),
    )
}

pub fn stop_indices(route: &Route) -> Vec<usize> {
    route.activities().iter().map(|stop| stop.get()).collect()
}

#[track_caller]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "expected {expected}, got {actual}"
    );
}
