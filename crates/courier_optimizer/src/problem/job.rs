use crate::{define_index_newtype, problem::stop::StopIdx};

define_index_newtype!(JobIdx, Job);

/// Unit of assignment: every stop of a job goes to the same courier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// Delivery-only stop, parcels preloaded at the site.
    Single(StopIdx),
    /// O2O order, the pickup always precedes the delivery.
    Pair { pickup: StopIdx, delivery: StopIdx },
}

impl Job {
    /// The stop where the parcels end up.
    pub fn delivery(&self) -> StopIdx {
        match self {
            Job::Single(stop) => *stop,
            Job::Pair { delivery, .. } => *delivery,
        }
    }

    pub fn stop_ids(&self) -> impl Iterator<Item = StopIdx> + use<> {
        let (first, second) = match *self {
            Job::Single(stop) => (stop, None),
            Job::Pair { pickup, delivery } => (pickup, Some(delivery)),
        };

        std::iter::once(first).chain(second)
    }

    /// Appends the job at the end of `activities`, pickup first.
    pub fn append_to(&self, activities: &mut Vec<StopIdx>) {
        activities.extend(self.stop_ids());
    }

    pub fn len(&self) -> usize {
        match self {
            Job::Single(_) => 1,
            Job::Pair { .. } => 2,
        }
    }

    pub fn is_pair(&self) -> bool {
        matches!(self, Job::Pair { .. })
    }
}
