use crate::{define_index_newtype, problem::stop::StopIdx};

define_index_newtype!(CourierIdx, Courier);

#[derive(Debug, Clone)]
pub struct Courier {
    external_id: String,
    depot: StopIdx,
}

impl Courier {
    pub fn new(external_id: impl Into<String>, depot: StopIdx) -> Self {
        Courier {
            external_id: external_id.into(),
            depot,
        }
    }

    pub fn external_id(&self) -> &str {
        &self.external_id
    }

    /// Stop every route of this courier starts from.
    pub fn depot(&self) -> StopIdx {
        self.depot
    }
}
