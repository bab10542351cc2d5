use std::{fmt::Display, str::FromStr};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    define_index_newtype,
    error::ProblemError,
    partition::kmeans::ClusterIdx,
    problem::{location::Location, time_window::TimeWindow},
};

define_index_newtype!(StopIdx, Stop);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum StopKind {
    /// Courier start site. No demand, no service time.
    #[serde(rename = "site")]
    Depot,
    /// E-commerce parcel preloaded at the site, handed over at a spot.
    #[serde(rename = "ecommerce_delivery")]
    EcommerceDelivery,
    /// O2O pickup at a shop; loads the courier.
    #[serde(rename = "shop")]
    ShopPickup,
    /// O2O delivery at a spot; unloads what the paired pickup loaded.
    #[serde(rename = "delivery")]
    Delivery,
}

impl StopKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StopKind::Depot => "site",
            StopKind::EcommerceDelivery => "ecommerce_delivery",
            StopKind::ShopPickup => "shop",
            StopKind::Delivery => "delivery",
        }
    }

    pub fn has_service_time(&self) -> bool {
        !matches!(self, StopKind::Depot)
    }
}

impl Display for StopKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StopKind {
    type Err = ProblemError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "site" | "depot" => Ok(StopKind::Depot),
            "ecommerce_delivery" => Ok(StopKind::EcommerceDelivery),
            "shop" | "shop_pickup" => Ok(StopKind::ShopPickup),
            "delivery" => Ok(StopKind::Delivery),
            other => Err(ProblemError::UnknownStopKind(other.to_owned())),
        }
    }
}

/// A point a courier has to visit. Immutable once built; the timing computed
/// for a stop lives on the route that visits it.
#[derive(Debug, Clone)]
pub struct Stop {
    location_id: String,
    location: Location,
    kind: StopKind,
    order_id: Option<String>,
    paired_order_id: Option<String>,
    packages: f64,
    time_window: TimeWindow,
    cluster_id: Option<ClusterIdx>,
}

impl Stop {
    pub fn depot(location_id: impl Into<String>, location: Location, shift_length: f64) -> Self {
        Stop {
            location_id: location_id.into(),
            location,
            kind: StopKind::Depot,
            order_id: None,
            paired_order_id: None,
            packages: 0.0,
            time_window: TimeWindow::new(0.0, shift_length),
            cluster_id: None,
        }
    }

    pub fn location_id(&self) -> &str {
        &self.location_id
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn kind(&self) -> StopKind {
        self.kind
    }

    pub fn order_id(&self) -> Option<&str> {
        self.order_id.as_deref()
    }

    pub fn paired_order_id(&self) -> Option<&str> {
        self.paired_order_id.as_deref()
    }

    /// Whether this stop takes part in pickup-before-delivery precedence.
    pub fn is_paired(&self) -> bool {
        self.order_id.is_some() && self.paired_order_id.is_some()
    }

    pub fn packages(&self) -> f64 {
        self.packages
    }

    pub fn time_window(&self) -> &TimeWindow {
        &self.time_window
    }

    pub fn cluster_id(&self) -> Option<ClusterIdx> {
        self.cluster_id
    }

    pub(crate) fn set_cluster_id(&mut self, cluster_id: ClusterIdx) {
        self.cluster_id = Some(cluster_id);
    }
}

pub struct StopBuilder {
    location_id: String,
    location: Location,
    kind: StopKind,
    order_id: Option<String>,
    paired_order_id: Option<String>,
    packages: f64,
    time_window: Option<TimeWindow>,
}

impl StopBuilder {
    pub fn new(location_id: impl Into<String>, location: Location, kind: StopKind) -> Self {
        StopBuilder {
            location_id: location_id.into(),
            location,
            kind,
            order_id: None,
            paired_order_id: None,
            packages: 0.0,
            time_window: None,
        }
    }

    pub fn with_order_id(mut self, order_id: impl Into<String>) -> Self {
        self.order_id = Some(order_id.into());
        self
    }

    pub fn with_paired_order_id(mut self, paired_order_id: impl Into<String>) -> Self {
        self.paired_order_id = Some(paired_order_id.into());
        self
    }

    pub fn with_packages(mut self, packages: f64) -> Self {
        self.packages = packages;
        self
    }

    pub fn with_time_window(mut self, earliest: f64, latest: f64) -> Self {
        self.time_window = Some(TimeWindow::new(earliest, latest));
        self
    }

    /// Validates the stop. Depots drop any demand and order reference.
    pub fn build(self, shift_length: f64) -> Result<Stop, ProblemError> {
        if self.kind == StopKind::Depot {
            return Ok(Stop::depot(self.location_id, self.location, shift_length));
        }

        if !self.packages.is_finite() {
            return Err(ProblemError::InvalidPackages {
                location_id: self.location_id,
            });
        }

        if self.packages < 0.0 {
            return Err(ProblemError::NegativePackages {
                location_id: self.location_id,
                packages: self.packages,
            });
        }

        if self.order_id.is_none() {
            return Err(ProblemError::MissingOrderId(self.location_id));
        }

        let time_window = self
            .time_window
            .unwrap_or_else(|| TimeWindow::new(0.0, shift_length));

        if !time_window.is_valid() {
            return Err(ProblemError::InvalidTimeWindow {
                location_id: self.location_id,
                earliest: time_window.earliest(),
                latest: time_window.latest(),
            });
        }

        Ok(Stop {
            location_id: self.location_id,
            location: self.location,
            kind: self.kind,
            order_id: self.order_id,
            paired_order_id: self.paired_order_id,
            packages: self.packages,
            time_window,
            cluster_id: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn location() -> Location {
        Location::from_lat_lng(31.2, 121.4)
    }

    #[test]
    fn test_stop_kind_from_str() {
        assert_eq!("site".parse::<StopKind>().unwrap(), StopKind::Depot);
        assert_eq!("shop".parse::<StopKind>().unwrap(), StopKind::ShopPickup);
        assert_eq!(
            "ecommerce_delivery".parse::<StopKind>().unwrap(),
            StopKind::EcommerceDelivery
        );
        assert!(matches!(
            "warehouse".parse::<StopKind>(),
            Err(ProblemError::UnknownStopKind(kind)) if kind == "warehouse"
        ));
    }

    #[test]
    fn test_stop_kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&StopKind::ShopPickup).unwrap(),
            "\"shop\""
        );
        assert_eq!(
            serde_json::from_str::<StopKind>("\"site\"").unwrap(),
            StopKind::Depot
        );
    }

    #[test]
    fn test_build_defaults_window_to_shift() {
        let stop = StopBuilder::new("spot-1", location(), StopKind::EcommerceDelivery)
            .with_order_id("o-1")
            .with_packages(3.0)
            .build(720.0)
            .unwrap();

        assert_eq!(stop.time_window().earliest(), 0.0);
        assert_eq!(stop.time_window().latest(), 720.0);
        assert!(!stop.is_paired());
    }

    #[test]
    fn test_build_rejects_negative_packages() {
        let result = StopBuilder::new("spot-1", location(), StopKind::EcommerceDelivery)
            .with_order_id("o-1")
            .with_packages(-1.0)
            .build(720.0);

        assert!(matches!(
            result,
            Err(ProblemError::NegativePackages { packages, .. }) if packages == -1.0
        ));
    }

    #[test]
    fn test_build_rejects_inverted_window() {
        let result = StopBuilder::new("spot-1", location(), StopKind::Delivery)
            .with_order_id("o-1")
            .with_time_window(200.0, 100.0)
            .build(720.0);

        assert!(matches!(
            result,
            Err(ProblemError::InvalidTimeWindow { .. })
        ));
    }

    #[test]
    fn test_build_requires_order_id() {
        let result = StopBuilder::new("spot-1", location(), StopKind::Delivery).build(720.0);

        assert!(matches!(result, Err(ProblemError::MissingOrderId(_))));
    }

    #[test]
    fn test_depot_ignores_demand() {
        let stop = StopBuilder::new("site-1", location(), StopKind::Depot)
            .with_packages(12.0)
            .with_order_id("ignored")
            .build(720.0)
            .unwrap();

        assert_eq!(stop.packages(), 0.0);
        assert_eq!(stop.order_id(), None);
        assert_eq!(stop.time_window().latest(), 720.0);
    }
}
