//! Business units, their administrators and seat allocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::params::{Pagination, QueryParams, SortOrder, ToQuery};
use crate::types::common::{null_as_default, CustomAttributes, ListMeta};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessUnit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub licensed_seats: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub used_seats: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub available_seats: u64,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(
        skip_serializing_if = "CustomAttributes::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub custom_attributes: CustomAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Body for creating or replacing a business unit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusinessUnitRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "CustomAttributes::is_empty")]
    pub custom_attributes: CustomAttributes,
}

impl BusinessUnitRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessUnitAdmin {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessUnitAdminRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LicensedSeats {
    #[serde(deserialize_with = "null_as_default")]
    pub total_seats: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub used_seats: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub available_seats: u64,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub seat_types: Vec<SeatTypeAllocation>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatTypeAllocation {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub seat_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub used: u64,
    #[serde(deserialize_with = "null_as_default")]
    pub available: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BusinessUnitListOptions {
    pub pagination: Pagination,
    pub name: Option<String>,
    pub parent_id: Option<String>,
    pub is_active: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ToQuery for BusinessUnitListOptions {
    fn to_query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.push_str("name", self.name.as_deref())
            .push_str("parent_id", self.parent_id.as_deref())
            .push_bool("is_active", self.is_active)
            .push_page(&self.pagination)
            .push_sort(self.sort_by.as_deref(), self.sort_order);
        q
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessUnitListResponse {
    #[serde(flatten)]
    pub meta: ListMeta,
    #[serde(deserialize_with = "null_as_default")]
    pub business_units: Vec<BusinessUnit>,
}

impl BusinessUnitListResponse {
    pub fn next_page(&self) -> Option<Pagination> {
        self.meta.next_page(self.business_units.len())
    }
}
