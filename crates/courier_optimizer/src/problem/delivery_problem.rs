use fxhash::FxHashSet;

use crate::{
    error::ProblemError,
    partition::kmeans::ClusterIdx,
    problem::{
        courier::{Courier, CourierIdx},
        job::{Job, JobIdx},
        location::Location,
        stop::{Stop, StopIdx, StopKind},
    },
};

/// Validated input of the optimizer: stops, couriers and the jobs to assign.
///
/// Jobs keep their input order, delivery-only stops first, then O2O pairs.
#[derive(Debug, Clone)]
pub struct DeliveryProblem {
    stops: Vec<Stop>,
    couriers: Vec<Courier>,
    jobs: Vec<Job>,
}

impl DeliveryProblem {
    pub fn stops(&self) -> &[Stop] {
        &self.stops
    }

    pub fn stop(&self, idx: StopIdx) -> &Stop {
        &self.stops[idx]
    }

    pub fn couriers(&self) -> &[Courier] {
        &self.couriers
    }

    pub fn courier(&self, idx: CourierIdx) -> &Courier {
        &self.couriers[idx]
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job(&self, idx: JobIdx) -> &Job {
        &self.jobs[idx]
    }

    pub fn distance_km(&self, from: StopIdx, to: StopIdx) -> f64 {
        self.stop(from).location().haversine_km(self.stop(to).location())
    }

    /// Order reference of a job, used when reporting unassigned work.
    pub fn job_order_id(&self, idx: JobIdx) -> &str {
        self.stop(self.job(idx).delivery())
            .order_id()
            .unwrap_or_default()
    }

    pub(crate) fn set_cluster_id(&mut self, stop: StopIdx, cluster_id: ClusterIdx) {
        self.stops[stop].set_cluster_id(cluster_id);
    }

    /// Copy of the problem limited to `couriers` and `jobs`, in the given order.
    /// Stop indices stay valid across the original and the restricted problem.
    pub fn restrict(&self, couriers: &[CourierIdx], jobs: &[JobIdx]) -> DeliveryProblem {
        DeliveryProblem {
            stops: self.stops.clone(),
            couriers: couriers
                .iter()
                .map(|&courier| self.courier(courier).clone())
                .collect(),
            jobs: jobs.iter().map(|&job| *self.job(job)).collect(),
        }
    }
}

pub struct DeliveryProblemBuilder {
    shift_length: f64,
    stops: Vec<Stop>,
    couriers: Vec<Courier>,
    singles: Vec<Job>,
    pairs: Vec<Job>,
    order_ids: FxHashSet<String>,
}

impl DeliveryProblemBuilder {
    pub fn new(shift_length: f64) -> Self {
        DeliveryProblemBuilder {
            shift_length,
            stops: Vec::new(),
            couriers: Vec::new(),
            singles: Vec::new(),
            pairs: Vec::new(),
            order_ids: FxHashSet::default(),
        }
    }

    fn push_stop(&mut self, stop: Stop) -> StopIdx {
        self.stops.push(stop);
        StopIdx::new(self.stops.len() - 1)
    }

    pub fn add_depot(&mut self, location_id: impl Into<String>, location: Location) -> StopIdx {
        let depot = Stop::depot(location_id, location, self.shift_length);
        self.push_stop(depot)
    }

    /// `depot` must be a stop added with [`Self::add_depot`].
    pub fn add_courier(
        &mut self,
        external_id: impl Into<String>,
        depot: StopIdx,
    ) -> Result<CourierIdx, ProblemError> {
        let external_id = external_id.into();
        let is_depot = self
            .stops
            .get(depot.get())
            .is_some_and(|stop| stop.kind() == StopKind::Depot);

        if !is_depot {
            return Err(ProblemError::InvalidDepot {
                courier_id: external_id,
                depot: depot.get(),
            });
        }

        self.couriers.push(Courier::new(external_id, depot));
        Ok(CourierIdx::new(self.couriers.len() - 1))
    }

    /// Order ids identify pickups when checking precedence, they must be unique.
    fn claim_order_id(&mut self, order_id: Option<&str>) -> Result<(), ProblemError> {
        match order_id {
            Some(order_id) if !self.order_ids.insert(order_id.to_owned()) => {
                Err(ProblemError::DuplicateOrderId(order_id.to_owned()))
            }
            _ => Ok(()),
        }
    }

    /// Adds a delivery-only stop.
    pub fn add_single(&mut self, stop: Stop) -> Result<StopIdx, ProblemError> {
        expect_kind(&stop, StopKind::EcommerceDelivery)?;
        self.claim_order_id(stop.order_id())?;

        let stop = self.push_stop(stop);
        self.singles.push(Job::Single(stop));

        Ok(stop)
    }

    /// Adds an O2O order. Both stops must carry the same order id, the
    /// delivery unloads exactly what the pickup loaded.
    pub fn add_pair(
        &mut self,
        pickup: Stop,
        delivery: Stop,
    ) -> Result<(StopIdx, StopIdx), ProblemError> {
        expect_kind(&pickup, StopKind::ShopPickup)?;
        expect_kind(&delivery, StopKind::Delivery)?;

        let (Some(pickup_order), Some(delivery_order)) = (pickup.order_id(), delivery.order_id())
        else {
            let location_id = if pickup.order_id().is_none() {
                pickup.location_id()
            } else {
                delivery.location_id()
            };
            return Err(ProblemError::MissingOrderId(location_id.to_owned()));
        };

        if pickup_order != delivery_order {
            return Err(ProblemError::MismatchedPair {
                pickup: pickup_order.to_owned(),
                delivery: delivery_order.to_owned(),
            });
        }

        for stop in [&pickup, &delivery] {
            match stop.paired_order_id() {
                None => return Err(ProblemError::MissingPairedStop(pickup_order.to_owned())),
                Some(paired) if paired != pickup_order => {
                    return Err(ProblemError::MismatchedPair {
                        pickup: pickup_order.to_owned(),
                        delivery: paired.to_owned(),
                    });
                }
                Some(_) => {}
            }
        }

        if pickup.packages() != delivery.packages() {
            return Err(ProblemError::MismatchedPair {
                pickup: pickup_order.to_owned(),
                delivery: delivery_order.to_owned(),
            });
        }

        self.claim_order_id(Some(pickup_order))?;

        let pickup = self.push_stop(pickup);
        let delivery = self.push_stop(delivery);
        self.pairs.push(Job::Pair { pickup, delivery });

        Ok((pickup, delivery))
    }

    pub fn build(self) -> DeliveryProblem {
        let mut jobs = self.singles;
        jobs.extend(self.pairs);

        DeliveryProblem {
            stops: self.stops,
            couriers: self.couriers,
            jobs,
        }
    }
}

fn expect_kind(stop: &Stop, expected: StopKind) -> Result<(), ProblemError> {
    if stop.kind() != expected {
        return Err(ProblemError::UnexpectedStopKind {
            location_id: stop.location_id().to_owned(),
            expected,
            actual: stop.kind(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::stop::StopBuilder;

    fn location() -> Location {
        Location::from_lat_lng(0.0, 0.0)
    }

    fn pickup(order_id: &str, paired: Option<&str>) -> Stop {
        let builder = StopBuilder::new("shop", location(), StopKind::ShopPickup)
            .with_order_id(order_id)
            .with_packages(2.0);

        let builder = match paired {
            Some(paired) => builder.with_paired_order_id(paired),
            None => builder,
        };

        builder.build(720.0).unwrap()
    }

    fn delivery(order_id: &str) -> Stop {
        StopBuilder::new("spot", location(), StopKind::Delivery)
            .with_order_id(order_id)
            .with_paired_order_id(order_id)
            .with_packages(2.0)
            .build(720.0)
            .unwrap()
    }

    #[test]
    fn test_jobs_keep_singles_before_pairs() {
        let mut builder = DeliveryProblemBuilder::new(720.0);
        let depot = builder.add_depot("site", location());
        builder.add_courier("c1", depot).unwrap();

        builder
            .add_pair(pickup("o2", Some("o2")), delivery("o2"))
            .unwrap();
        builder
            .add_single(
                StopBuilder::new("spot", location(), StopKind::EcommerceDelivery)
                    .with_order_id("o1")
                    .build(720.0)
                    .unwrap(),
            )
            .unwrap();

        let problem = builder.build();

        assert_eq!(problem.jobs().len(), 2);
        assert!(matches!(problem.jobs()[0], Job::Single(_)));
        assert!(problem.jobs()[1].is_pair());
        assert_eq!(problem.job_order_id(JobIdx::new(1)), "o2");
    }

    #[test]
    fn test_pair_without_paired_id_is_rejected() {
        let mut builder = DeliveryProblemBuilder::new(720.0);
        let result = builder.add_pair(pickup("o1", None), delivery("o1"));

        assert!(matches!(result, Err(ProblemError::MissingPairedStop(order)) if order == "o1"));
    }

    #[test]
    fn test_pair_with_different_orders_is_rejected() {
        let mut builder = DeliveryProblemBuilder::new(720.0);
        let result = builder.add_pair(pickup("o1", Some("o1")), delivery("o2"));

        assert!(matches!(result, Err(ProblemError::MismatchedPair { .. })));
    }

    #[test]
    fn test_pair_with_swapped_kinds_is_rejected() {
        let mut builder = DeliveryProblemBuilder::new(720.0);
        let result = builder.add_pair(delivery("o1"), pickup("o1", Some("o1")));

        assert!(matches!(
            result,
            Err(ProblemError::UnexpectedStopKind {
                expected: StopKind::ShopPickup,
                actual: StopKind::Delivery,
                ..
            })
        ));
    }

    #[test]
    fn test_single_must_be_ecommerce_delivery() {
        let mut builder = DeliveryProblemBuilder::new(720.0);
        let result = builder.add_single(delivery("o1"));

        assert!(matches!(
            result,
            Err(ProblemError::UnexpectedStopKind { .. })
        ));
    }

    #[test]
    fn test_restrict_keeps_stop_indices() {
        let mut builder = DeliveryProblemBuilder::new(720.0);
        let depot = builder.add_depot("site", location());
        builder.add_courier("c1", depot).unwrap();
        builder.add_courier("c2", depot).unwrap();
        builder
            .add_pair(pickup("o1", Some("o1")), delivery("o1"))
            .unwrap();
        let problem = builder.build();

        let restricted = problem.restrict(&[CourierIdx::new(1)], &[JobIdx::new(0)]);

        assert_eq!(restricted.couriers().len(), 1);
        assert_eq!(restricted.couriers()[0].external_id(), "c2");
        assert_eq!(restricted.stops().len(), problem.stops().len());
        assert_eq!(restricted.jobs()[0], problem.jobs()[0]);
    }

    #[test]
    fn test_courier_depot_out_of_range() {
        let mut builder = DeliveryProblemBuilder::new(720.0);
        builder.add_depot("site", location());

        let result = builder.add_courier("c1", StopIdx::new(99));

        assert!(matches!(
            result,
            Err(ProblemError::InvalidDepot { courier_id, depot: 99 }) if courier_id == "c1"
        ));
    }

    #[test]
    fn test_courier_depot_must_be_a_depot() {
        let mut builder = DeliveryProblemBuilder::new(720.0);
        builder.add_depot("site", location());
        let (pickup, _) = builder
            .add_pair(pickup("o1", Some("o1")), delivery("o1"))
            .unwrap();

        let result = builder.add_courier("c1", pickup);

        assert!(matches!(result, Err(ProblemError::InvalidDepot { .. })));
        assert!(builder.build().couriers().is_empty());
    }

    #[test]
    fn test_duplicate_order_id_is_rejected() {
        let mut builder = DeliveryProblemBuilder::new(720.0);
        builder
            .add_pair(pickup("x", Some("x")), delivery("x"))
            .unwrap();

        let result = builder.add_pair(pickup("x", Some("x")), delivery("x"));

        assert!(matches!(result, Err(ProblemError::DuplicateOrderId(order)) if order == "x"));
    }

    #[test]
    fn test_single_reusing_pair_order_id_is_rejected() {
        let mut builder = DeliveryProblemBuilder::new(720.0);
        builder
            .add_pair(pickup("x", Some("x")), delivery("x"))
            .unwrap();

        let result = builder.add_single(
            StopBuilder::new("spot", location(), StopKind::EcommerceDelivery)
                .with_order_id("x")
                .build(720.0)
                .unwrap(),
        );

        assert!(matches!(result, Err(ProblemError::DuplicateOrderId(_))));
        assert_eq!(builder.build().jobs().len(), 1);
    }
}
