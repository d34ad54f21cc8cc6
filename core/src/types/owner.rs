//! Certificate owners: people accountable for a certificate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::params::{Pagination, QueryParams, SortOrder, ToQuery};
use crate::types::common::{null_as_default, ListMeta};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateOwner {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateOwnerRequest {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

impl CertificateOwnerRequest {
    pub fn new(
        email: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateOwnerListOptions {
    pub pagination: Pagination,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ToQuery for CertificateOwnerListOptions {
    fn to_query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.push_str("email", self.email.as_deref())
            .push_str("first_name", self.first_name.as_deref())
            .push_str("last_name", self.last_name.as_deref())
            .push_bool("is_active", self.is_active)
            .push_page(&self.pagination)
            .push_sort(self.sort_by.as_deref(), self.sort_order);
        q
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateOwnerListResponse {
    #[serde(flatten)]
    pub meta: ListMeta,
    #[serde(rename = "certificate_owners", deserialize_with = "null_as_default")]
    pub owners: Vec<CertificateOwner>,
}

impl CertificateOwnerListResponse {
    pub fn next_page(&self) -> Option<Pagination> {
        self.meta.next_page(self.owners.len())
    }
}

/// Body of `PUT certificate-owners/certificate/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerAssignment {
    pub owner_ids: Vec<String>,
}
