//! Write acknowledgments returned to clients in place of the written document.

use crate::model::Id;
use derive_where::derive_where;
use serde::{Deserialize, Serialize};

#[derive_where(Copy, Clone, Eq, PartialEq, Debug, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct InsertAck<Marker> {
    pub acknowledged: bool,
    pub inserted_id: Id<Marker>,
}

impl<Marker> InsertAck<Marker> {
    #[must_use]
    pub fn new(inserted_id: Id<Marker>) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive_where(Copy, Clone, Eq, PartialEq, Debug, Hash)]
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct UpdateAck<Marker> {
    pub acknowledged: bool,
    pub matched_count: u64,
    pub modified_count: u64,
    pub upserted_count: u64,
    pub upserted_id: Option<Id<Marker>>,
}

impl<Marker> UpdateAck<Marker> {
    #[must_use]
    pub fn replaced(modified: bool) -> Self {
        Self {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_count: 0,
            upserted_id: None,
        }
    }

    #[must_use]
    pub fn upserted(id: Id<Marker>) -> Self {
        Self {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(id),
        }
    }
}
