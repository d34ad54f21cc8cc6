//! Certificate records, issuance/renewal payloads and search options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::params::{Pagination, QueryParams, SortOrder, ToQuery};
use crate::types::business_unit::BusinessUnit;
use crate::types::common::{
    null_as_default, CustomAttribute, CustomAttributes, DeliveryFormat, ListMeta, ProfileReference,
    SeatReference, SubjectAttributes, Validity,
};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Seat {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeatType {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Account {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Issuing CA reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ica {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Distinguished name as reported back by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Subject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub organization_units: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// A managed certificate. Validity bounds are kept as delivered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Certificate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub profile: ProfileReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<Seat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_type: Option<SeatType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_unit: Option<BusinessUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<Account>,
    /// Base64 DER (or PEM, depending on delivery format).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ica: Option<Ica>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbprint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuing_ca_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature_algorithm: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Subject>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in_days: Option<i64>,
    #[serde(deserialize_with = "null_as_default")]
    pub pqc_vulnerable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_key_usage: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub escrow: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attributes: Option<String>,
    #[serde(
        skip_serializing_if = "CustomAttributes::is_empty",
        deserialize_with = "null_as_default"
    )]
    pub custom_attributes: CustomAttributes,
}

/// CA-specific attributes, passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaAttributes {
    #[serde(default)]
    pub schema: BTreeMap<String, serde_json::Value>,
}

/// Body of `POST certificate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificateRequest {
    pub profile: ProfileReference,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seat: Option<SeatReference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csr: Option<String>,
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
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_attributes: Option<CaAttributes>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_attributes: Vec<CustomAttribute>,
}

/// Body of `POST certificate/{serial}/renew`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csr: Option<String>,
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
    pub custom_attributes: Vec<CustomAttribute>,
}

/// Result of issuance, renewal, pickup and enrollment redemption.
///
/// CAs that issue asynchronously return only `request_id`; poll with
/// [`Certificates::pickup`](crate::services::Certificates::pickup).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub chain: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

/// Body of `PUT certificate/{serial}/revoke`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevokeRequest {
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

impl RevokeRequest {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
            comment: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdditionalFormatsResponse {
    #[serde(deserialize_with = "null_as_default")]
    pub formats: BTreeMap<String, String>,
}

/// Filters for `GET certificate-search`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateSearchOptions {
    pub pagination: Pagination,
    pub common_name: Option<String>,
    pub serial_number: Option<String>,
    pub status: Option<String>,
    pub profile_id: Option<String>,
    pub tags: Vec<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<SortOrder>,
}

impl ToQuery for CertificateSearchOptions {
    fn to_query(&self) -> QueryParams {
        let mut q = QueryParams::new();
        q.push_str("common_name", self.common_name.as_deref())
            .push_str("serial_number", self.serial_number.as_deref())
            .push_str("status", self.status.as_deref())
            .push_str("profile_id", self.profile_id.as_deref())
            .push_all("tags", &self.tags)
            .push_page(&self.pagination)
            .push_sort(self.sort_by.as_deref(), self.sort_order);
        q
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateSearchResponse {
    #[serde(flatten)]
    pub meta: ListMeta,
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<Certificate>,
}

impl CertificateSearchResponse {
    pub fn next_page(&self) -> Option<Pagination> {
        self.meta.next_page(self.items.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CERTIFICATE_FIXTURE: &str = r#"{
        "id": "386e7879-df28-427b-b8ae-58205a8b87df",
        "profile": {},
        "seat": {"seat_id": "helix-dev.example.com_25Jun16_FiJNMw"},
        "seat_type": {"id": "2688787a-983a-45c7-8a5d-4261721cbf38", "name": "DISCOVERY_SEAT"},
        "business_unit": {"id": "276e9968-b34a-477c-b2d2-e63cdb77f09e", "name": "Default Business Unit"},
        "account": {"id": "fce887a9-58a7-4c1c-a47c-a25c54d0de83"},
        "certificate": "MIIJUTCCCDmgAwIBAgITUgAAquvd5NDuv2cD2gACAACq6zANBgkqhkiG9w0BAQsFADBoMRMwEQ",
        "ica": {"id": "EXTERNAL_CA"},
        "common_name": "helix-dev.example.com",
        "status": "issued",
        "serial_number": "520000AAEBDDE4D0EEBF6703DA00020000AAEB",
        "thumbprint": "F28D04DDE45ADFBAEDF1B3A364227B17F89623FCC12489D858D14C5457A72547",
        "valid_from": "2023-12-06T04:42:39Z",
        "valid_to": "2025-12-05T04:42:39Z",
        "issuing_ca_name": "Example-EntCA-01",
        "key_size": "RSA_2048",
        "signature_algorithm": "SHA256withRSA",
        "subject": {
            "common_name": "helix-dev.example.com",
            "organization_name": "EXAMPLE UK LIMITED",
            "organization_units": ["Operations"],
            "locality": "Slough",
            "country": "GB"
        },
        "ca_vendor": "Unknown",
        "connector": "common-services proxy nonprod",
        "source": "KEY_VAULT_IMPORT",
        "expires_in_days": 128,
        "pqc_vulnerable": true,
        "extended_key_usage": "Server Authentication, Client Authentication",
        "escrow": false,
        "custom_attributes": {}
    }"#;

    #[test]
    fn certificate_fixture_decodes() {
        let cert: Certificate = serde_json::from_str(CERTIFICATE_FIXTURE).unwrap();

        assert_eq!(cert.id.as_deref(), Some("386e7879-df28-427b-b8ae-58205a8b87df"));
        assert!(cert.profile.id.is_empty());
        assert_eq!(cert.status.as_deref(), Some("issued"));
        assert_eq!(
            cert.serial_number.as_deref(),
            Some("520000AAEBDDE4D0EEBF6703DA00020000AAEB")
        );
        assert_eq!(cert.valid_to.as_deref(), Some("2025-12-05T04:42:39Z"));
        assert_eq!(
            cert.seat.and_then(|s| s.seat_id).as_deref(),
            Some("helix-dev.example.com_25Jun16_FiJNMw")
        );
        assert_eq!(
            cert.seat_type.and_then(|s| s.name).as_deref(),
            Some("DISCOVERY_SEAT")
        );
        assert_eq!(
            cert.business_unit.and_then(|b| b.name).as_deref(),
            Some("Default Business Unit")
        );

        let subject = cert.subject.unwrap();
        assert_eq!(subject.organization_name.as_deref(), Some("EXAMPLE UK LIMITED"));
        assert_eq!(subject.country.as_deref(), Some("GB"));
        assert_eq!(subject.organization_units, ["Operations"]);

        assert!(cert.pqc_vulnerable);
        assert!(!cert.escrow);
        assert_eq!(cert.expires_in_days, Some(128));
        assert!(cert.custom_attributes.is_empty());
    }

    #[test]
    fn issuance_request_omits_unset_fields() {
        let request = CertificateRequest {
            profile: ProfileReference::new("profile-123"),
            csr: Some("-----BEGIN CERTIFICATE REQUEST-----".to_string()),
            validity: Some(Validity::years(1)),
            ..Default::default()
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "profile": {"id": "profile-123"},
                "csr": "-----BEGIN CERTIFICATE REQUEST-----",
                "validity": {"years": 1}
            })
        );
    }

    #[test]
    fn search_options_default_to_empty_query() {
        assert!(CertificateSearchOptions::default().to_query().is_empty());
    }

    #[test]
    fn search_options_emit_filters_in_order() {
        let opts = CertificateSearchOptions {
            common_name: Some("test.com".to_string()),
            serial_number: Some("ABCD1234".to_string()),
            status: Some("issued".to_string()),
            profile_id: Some("profile-456".to_string()),
            tags: vec!["production".to_string(), "web-server".to_string()],
            pagination: Pagination::new(10, 25),
            ..Default::default()
        };
        let q = opts.to_query();
        let pairs: Vec<_> = q.iter().collect();
        assert_eq!(
            pairs,
            [
                ("common_name", "test.com"),
                ("serial_number", "ABCD1234"),
                ("status", "issued"),
                ("profile_id", "profile-456"),
                ("tags", "production"),
                ("tags", "web-server"),
                ("offset", "10"),
                ("limit", "25"),
            ]
        );
    }

    #[test]
    fn search_response_flattens_list_meta() {
        let body = r#"{"total":150,"offset":50,"limit":50,"items":[{"common_name":"a.example.com"}]}"#;
        let parsed: CertificateSearchResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.meta.total, 150);
        assert_eq!(parsed.meta.offset, 50);
        assert_eq!(parsed.items.len(), 1);
        assert_eq!(parsed.next_page(), Some(Pagination::new(51, 50)));
    }

    #[test]
    fn null_collections_and_references_decode_as_empty() {
        let page: CertificateSearchResponse =
            serde_json::from_str(r#"{"total":0,"offset":0,"limit":20,"items":null}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.meta.limit, 20);
        assert_eq!(page.next_page(), None);

        let cert: Certificate = serde_json::from_str(
            r#"{"id":"c","profile":null,"escrow":null,"custom_attributes":null,"subject":{"organization_units":null}}"#,
        )
        .unwrap();
        assert_eq!(cert.id.as_deref(), Some("c"));
        assert!(cert.profile.id.is_empty());
        assert!(!cert.escrow);
        assert!(cert.custom_attributes.is_empty());
        assert!(cert.subject.unwrap().organization_units.is_empty());

        let issued: CertificateResponse =
            serde_json::from_str(r#"{"request_id":"req-1","chain":null}"#).unwrap();
        assert!(issued.chain.is_empty());
    }
}
