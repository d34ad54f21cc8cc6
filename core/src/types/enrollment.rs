//! Enrollments: issuance requests awaiting redemption or approval.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::params::{Pagination, QueryParams, SortOrder, ToQuery};
use crate::types::common::{
    null_as_default, CustomAttribute, CustomAttributes, DeliveryFormat, ListMeta, ProfileReference,
    SeatReference, SubjectAttributes, Validity,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Enrollment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(
        skip_serializing_if = "CustomAttributes::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub custom_attributes: CustomAttributes,
}

/// Body of `POST enrollment`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    pub profile: ProfileReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat: Option<SeatReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity: Option<Validity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<SubjectAttributes>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_attributes: Vec<CustomAttribute>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notification_emails: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentStatusResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Body of `POST enrollment/redeem`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedeemEnrollmentRequest {
    pub enrollment_code: String,
    pub csr: String,
}

/// Body of `POST manual-enrollment` and its renewal variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEnrollmentRequest {
    pub profile: ProfileReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat: Option<SeatReference>,
    pub csr: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validity: Option<Validity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_format: Option<DeliveryFormat>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub include_ca_chain: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<SubjectAttributes>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cert_owner_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_attributes: Vec<CustomAttribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnrollmentDetailsOptions {
    pub pagination: Pagination,
    pub status: Option<String>,
    pub profile_id: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ToQuery for EnrollmentDetailsOptions {
    fn to_query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.push_str("status", self.status.as_deref())
            .push_str("profile_id", self.profile_id.as_deref())
            .push_page(&self.pagination)
            .push_sort(self.sort_by.as_deref(), self.sort_order);
        q
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrollmentDetailsResponse {
    #[serde(flatten)]
    pub meta: ListMeta,
    #[serde(deserialize_with = "null_as_default")]
    pub enrollments: Vec<Enrollment>,
}

impl EnrollmentDetailsResponse {
    pub fn next_page(&self) -> Option<Pagination> {
        self.meta.next_page(self.enrollments.len())
    }
}
