use fxhash::FxHashMap;
use rand::{Rng, SeedableRng, rngs::SmallRng};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::{
    error::ProblemError,
    problem::{
        delivery_problem::{DeliveryProblem, DeliveryProblemBuilder},
        location::Location,
        stop::{StopBuilder, StopIdx, StopKind},
        time_window::{minutes_from_shift_start, parse_clock_time},
    },
    solver::{
        evaluator::ScheduledStop,
        solution::{route::Route, solution::Solution},
    },
};

pub trait FromProblem<T> {
    fn from_problem(value: T, problem: &DeliveryProblem) -> Self;
}

fn default_shift_start() -> String {
    "08:00".to_owned()
}

fn default_shift_length() -> f64 {
    720.0
}

/// Sites, spots and shops with the orders to serve and the couriers available.
/// Clock times are `HH:MM`.
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "DeliveryProblem")]
pub struct JsonDeliveryProblem {
    #[serde(default = "default_shift_start")]
    pub shift_start: String,
    /// Minutes.
    #[serde(default = "default_shift_length")]
    pub shift_length: f64,
    pub sites: Vec<JsonPlace>,
    #[serde(default)]
    pub spots: Vec<JsonPlace>,
    #[serde(default)]
    pub shops: Vec<JsonPlace>,
    #[serde(default)]
    pub ecommerce_orders: Vec<JsonEcommerceOrder>,
    #[serde(default)]
    pub o2o_orders: Vec<JsonO2oOrder>,
    pub couriers: Vec<JsonCourier>,
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Place")]
pub struct JsonPlace {
    pub id: String,
    pub lat: f64,
    pub lng: f64,
}

impl From<&JsonPlace> for Location {
    fn from(value: &JsonPlace) -> Self {
        Location::from_lat_lng(value.lat, value.lng)
    }
}

/// Parcels preloaded at the site and dropped at a spot.
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "EcommerceOrder")]
pub struct JsonEcommerceOrder {
    pub order_id: String,
    pub spot_id: String,
    pub packages: f64,
    /// Latest delivery time, the end of the shift when omitted.
    pub latest: Option<String>,
}

/// Parcels picked up at a shop, not before `pickup_time`, and delivered to a
/// spot no later than `delivery_time`.
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "O2oOrder")]
pub struct JsonO2oOrder {
    pub order_id: String,
    pub shop_id: String,
    pub spot_id: String,
    pub pickup_time: String,
    pub delivery_time: String,
    pub packages: f64,
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Courier")]
pub struct JsonCourier {
    pub id: String,
    /// Starting site, assigned by [`DepotAssignment`] when omitted.
    pub site_id: Option<String>,
}

/// How couriers without a `site_id` get their starting site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepotAssignment {
    /// Courier `i` starts at site `i % sites`.
    #[default]
    RoundRobin,
    /// Uniformly drawn site, reproducible for a given seed.
    Random { seed: u64 },
}

fn lookup<'a>(
    places: &FxHashMap<&str, &'a JsonPlace>,
    id: &str,
    error: fn(String) -> ProblemError,
) -> Result<&'a JsonPlace, ProblemError> {
    places
        .get(id)
        .copied()
        .ok_or_else(|| error(id.to_owned()))
}

fn index_places(
    places: &[JsonPlace],
    duplicate: fn(String) -> ProblemError,
) -> Result<FxHashMap<&str, &JsonPlace>, ProblemError> {
    let mut index = FxHashMap::default();

    for place in places {
        if index.insert(place.id.as_str(), place).is_some() {
            return Err(duplicate(place.id.clone()));
        }
    }

    Ok(index)
}

#[instrument(skip_all)]
pub fn build_problem(
    json: &JsonDeliveryProblem,
    depot_assignment: DepotAssignment,
) -> Result<DeliveryProblem, ProblemError> {
    let shift_start = parse_clock_time(&json.shift_start)?;
    let shift_length = json.shift_length;
    if !shift_length.is_finite() || shift_length < 0.0 {
        return Err(ProblemError::InvalidParameter {
            name: "shift_length",
            reason: "must be a finite, non-negative number of minutes",
        });
    }

    let mut builder = DeliveryProblemBuilder::new(shift_length);

    index_places(&json.sites, ProblemError::DuplicateSite)?;
    let spots = index_places(&json.spots, ProblemError::DuplicateSpot)?;
    let shops = index_places(&json.shops, ProblemError::DuplicateShop)?;

    let sites: Vec<StopIdx> = json
        .sites
        .iter()
        .map(|site| builder.add_depot(&site.id, Location::from(site)))
        .collect();
    let site_ids: FxHashMap<&str, StopIdx> = json
        .sites
        .iter()
        .zip(&sites)
        .map(|(site, &depot)| (site.id.as_str(), depot))
        .collect();

    for order in &json.ecommerce_orders {
        let spot = lookup(&spots, &order.spot_id, ProblemError::UnknownSpot)?;
        let latest = match &order.latest {
            Some(latest) => minutes_from_shift_start(latest, shift_start)?,
            None => shift_length,
        };

        let stop = StopBuilder::new(&spot.id, spot.into(), StopKind::EcommerceDelivery)
            .with_order_id(&order.order_id)
            .with_packages(order.packages)
            .with_time_window(0.0, latest)
            .build(shift_length)?;

        builder.add_single(stop)?;
    }

    for order in &json.o2o_orders {
        let shop = lookup(&shops, &order.shop_id, ProblemError::UnknownShop)?;
        let spot = lookup(&spots, &order.spot_id, ProblemError::UnknownSpot)?;

        let pickup = StopBuilder::new(&shop.id, shop.into(), StopKind::ShopPickup)
            .with_order_id(&order.order_id)
            .with_paired_order_id(&order.order_id)
            .with_packages(order.packages)
            .with_time_window(
                minutes_from_shift_start(&order.pickup_time, shift_start)?,
                shift_length,
            )
            .build(shift_length)?;

        let delivery = StopBuilder::new(&spot.id, spot.into(), StopKind::Delivery)
            .with_order_id(&order.order_id)
            .with_paired_order_id(&order.order_id)
            .with_packages(order.packages)
            .with_time_window(
                0.0,
                minutes_from_shift_start(&order.delivery_time, shift_start)?,
            )
            .build(shift_length)?;

        builder.add_pair(pickup, delivery)?;
    }

    if !json.couriers.is_empty() && sites.is_empty() {
        return Err(ProblemError::NoSites);
    }

    let mut rng = match depot_assignment {
        DepotAssignment::Random { seed } => Some(SmallRng::seed_from_u64(seed)),
        DepotAssignment::RoundRobin => None,
    };

    for (index, courier) in json.couriers.iter().enumerate() {
        let depot = match &courier.site_id {
            Some(site_id) => *site_ids
                .get(site_id.as_str())
                .ok_or_else(|| ProblemError::UnknownSite(site_id.clone()))?,
            None => match rng.as_mut() {
                Some(rng) => sites[rng.random_range(0..sites.len())],
                None => sites[index % sites.len()],
            },
        };

        builder.add_courier(&courier.id, depot)?;
    }

    let problem = builder.build();

    debug!(
        stops = problem.stops().len(),
        jobs = problem.jobs().len(),
        couriers = problem.couriers().len(),
        "problem built"
    );

    Ok(problem)
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename = "Schedule")]
pub struct JsonSchedule {
    pub routes: Vec<JsonRoute>,
    /// Order ids of the jobs no courier could take.
    pub unassigned: Vec<String>,
    /// Minutes, sum over all routes.
    pub total_time: f64,
}

impl FromProblem<&Solution> for JsonSchedule {
    fn from_problem(value: &Solution, problem: &DeliveryProblem) -> Self {
        JsonSchedule {
            routes: value
                .routes()
                .iter()
                .map(|route| JsonRoute::from_problem(route, problem))
                .collect(),
            unassigned: value
                .unassigned_order_ids(problem)
                .map(str::to_owned)
                .collect(),
            total_time: value.total_time(),
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename = "Route")]
pub struct JsonRoute {
    pub courier_id: String,
    pub total_time: f64,
    pub feasible: bool,
    pub penalty: f64,
    /// Sorted by arrival.
    pub stops: Vec<JsonScheduledStop>,
}

impl FromProblem<&Route> for JsonRoute {
    fn from_problem(value: &Route, problem: &DeliveryProblem) -> Self {
        let mut schedule = value.schedule().to_vec();
        schedule.sort_by(|a, b| a.arrival.total_cmp(&b.arrival));

        JsonRoute {
            courier_id: problem
                .courier(value.courier_id())
                .external_id()
                .to_owned(),
            total_time: value.total_time(),
            feasible: value.is_feasible(),
            penalty: value.evaluation().penalty,
            stops: schedule
                .iter()
                .map(|scheduled| JsonScheduledStop::from_problem(scheduled, problem))
                .collect(),
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename = "ScheduledStop")]
pub struct JsonScheduledStop {
    pub location_id: String,
    pub kind: StopKind,
    /// Whole minutes from the shift start.
    pub arrival: i64,
    pub departure: i64,
    pub packages: f64,
    pub order_id: Option<String>,
}

impl FromProblem<&ScheduledStop> for JsonScheduledStop {
    fn from_problem(value: &ScheduledStop, problem: &DeliveryProblem) -> Self {
        let stop = problem.stop(value.stop);

        JsonScheduledStop {
            location_id: stop.location_id().to_owned(),
            kind: stop.kind(),
            arrival: value.arrival.round() as i64,
            departure: value.departure.round() as i64,
            packages: stop.packages(),
            order_id: stop.order_id().map(str::to_owned),
        }
    }
}
