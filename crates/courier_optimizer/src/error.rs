use thiserror::Error;

use crate::problem::stop::StopKind;

/// Malformed input detected while building a [`crate::problem::delivery_problem::DeliveryProblem`]
/// or its parameters. Constraint violations of a route are never reported through this type.
#[derive(Error, Debug)]
pub enum ProblemError {
    #[error("stop {location_id} has negative packages ({packages})")]
    NegativePackages { location_id: String, packages: f64 },

    #[error("stop {location_id} has a non-finite package count")]
    InvalidPackages { location_id: String },

    #[error("stop {location_id} has an invalid time window [{earliest}, {latest}]")]
    InvalidTimeWindow {
        location_id: String,
        earliest: f64,
        latest: f64,
    },

    #[error("order {0} is missing its paired stop")]
    MissingPairedStop(String),

    #[error("pickup of order {pickup} is paired with the delivery of order {delivery}")]
    MismatchedPair { pickup: String, delivery: String },

    #[error("stop {location_id} has kind {actual:?}, expected {expected:?}")]
    UnexpectedStopKind {
        location_id: String,
        expected: StopKind,
        actual: StopKind,
    },

    #[error("order id {0} is used by more than one order")]
    DuplicateOrderId(String),

    #[error("courier {courier_id} starts at stop {depot}, which is not a depot")]
    InvalidDepot { courier_id: String, depot: usize },

    #[error("unknown stop kind: {0}")]
    UnknownStopKind(String),

    #[error("stop {0} requires an order id")]
    MissingOrderId(String),

    #[error("unknown site: {0}")]
    UnknownSite(String),

    #[error("unknown spot: {0}")]
    UnknownSpot(String),

    #[error("unknown shop: {0}")]
    UnknownShop(String),

    #[error("duplicate site: {0}")]
    DuplicateSite(String),

    #[error("duplicate spot: {0}")]
    DuplicateSpot(String),

    #[error("duplicate shop: {0}")]
    DuplicateShop(String),

    #[error("at least one site is required to place couriers")]
    NoSites,

    #[error("invalid clock time {value:?}")]
    InvalidTime {
        value: String,
        #[source]
        source: jiff::Error,
    },

    #[error("clustering of delivery stops failed")]
    Clustering(#[from] linfa_clustering::KMeansError),

    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: &'static str,
    },
}
