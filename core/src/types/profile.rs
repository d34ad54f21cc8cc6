//! Certificate profiles (issuance policy templates) and profile templates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::params::{Pagination, QueryParams, SortOrder, ToQuery};
use crate::types::common::{null_as_default, ListMeta};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub profile_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enrollment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validity: Option<ProfileValidity>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub subject_dn_fields: Vec<DnField>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub san_fields: Vec<SanField>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub extensions: Vec<Extension>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub custom_fields: Vec<CustomFieldDef>,
    #[serde(deserialize_with = "null_as_default")]
    pub require_approval: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub auto_renew: bool,
    #[serde(rename = "allow_duplicate_cn", deserialize_with = "null_as_default")]
    pub allow_duplicate_cn: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileValidity {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub validity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub years: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub months: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_days: Option<u32>,
}

/// Subject DN field rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DnField {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Subject alternative name rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanField {
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub san_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub source: String,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub values: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Extension {
    #[serde(deserialize_with = "null_as_default")]
    pub oid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub critical: bool,
    #[serde(deserialize_with = "null_as_default")]
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CustomFieldDef {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub field_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub required: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileListOptions {
    pub pagination: Pagination,
    pub name: Option<String>,
    pub profile_type: Option<String>,
    pub status: Option<String>,
    pub enrollment_method: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ToQuery for ProfileListOptions {
    fn to_query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.push_str("name", self.name.as_deref())
            .push_str("type", self.profile_type.as_deref())
            .push_str("status", self.status.as_deref())
            .push_str("enrollment_method", self.enrollment_method.as_deref())
            .push_page(&self.pagination)
            .push_sort(self.sort_by.as_deref(), self.sort_order);
        q
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileListResponse {
    #[serde(flatten)]
    pub meta: ListMeta,
    #[serde(deserialize_with = "null_as_default")]
    pub profiles: Vec<Profile>,
}

impl ProfileListResponse {
    pub fn next_page(&self) -> Option<Pagination> {
        self.meta.next_page(self.profiles.len())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileTemplate {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub template_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub provider: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileTemplateListResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub templates: Vec<ProfileTemplate>,
}
