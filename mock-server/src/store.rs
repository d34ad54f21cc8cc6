//! In-memory records and seed data.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub const DEFAULT_BUSINESS_UNIT_ID: &str = "bu-default";
pub const DEFAULT_BUSINESS_UNIT_NAME: &str = "Default Business Unit";

/// Profile whose issuance completes only through certificate pickup.
pub const DEFERRED_PROFILE_ID: &str = "profile-deferred";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default)]
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitReference {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeatReference {
    #[serde(default)]
    pub seat_id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub id: String,
    pub serial_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    pub status: String,
    pub profile: Reference,
    pub business_unit: UnitReference,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat: Option<SeatReference>,
    pub subject: Subject,
    pub certificate: String,
    pub valid_from: String,
    pub valid_to: String,
    pub issuing_ca_name: String,
    pub signature_algorithm: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub custom_attributes: BTreeMap<String, Value>,
    #[serde(skip)]
    pub revocation_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessUnit {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub account_id: String,
    pub is_active: bool,
    pub licensed_seats: u64,
    pub used_seats: u64,
    pub available_seats: u64,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub custom_attributes: BTreeMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Admin {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Owner {
    pub id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: String,
    pub enrollment_code: String,
    pub status: String,
    pub profile_id: String,
    pub profile_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub common_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub profile_type: String,
    pub status: String,
    pub enrollment_method: String,
    pub authentication_method: String,
    pub key_algorithm: String,
    pub key_size: u32,
    pub signature_algorithm: String,
    pub require_approval: bool,
    pub auto_renew: bool,
    pub allow_duplicate_cn: bool,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    pub public: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub template_type: String,
    pub provider: String,
}

/// Everything the server knows. Collections keep insertion order.
#[derive(Debug, Default)]
pub struct Store {
    pub certificates: Vec<Certificate>,
    /// Issued but not yet collected, keyed by pickup request id.
    pub pending: HashMap<String, Certificate>,
    pub business_units: Vec<BusinessUnit>,
    pub admins: HashMap<String, Vec<Admin>>,
    pub owners: Vec<Owner>,
    /// Certificate id to owner ids.
    pub assignments: HashMap<String, Vec<String>>,
    pub enrollments: Vec<Enrollment>,
    pub profiles: Vec<Profile>,
    pub templates: Vec<Template>,
}

impl Store {
    pub fn seeded() -> Self {
        let now = Utc::now();
        let profile = |id: &str, name: &str, profile_type: &str, method: &str| Profile {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{name} issuance policy"),
            profile_type: profile_type.to_string(),
            status: "active".to_string(),
            enrollment_method: method.to_string(),
            authentication_method: "API_KEY".to_string(),
            key_algorithm: "RSA".to_string(),
            key_size: 2048,
            signature_algorithm: "SHA256withRSA".to_string(),
            require_approval: false,
            auto_renew: false,
            allow_duplicate_cn: true,
            created_at: now,
            public: false,
        };

        let mut profiles = vec![
            profile("profile-ssl", "Standard SSL", "SERVER_CERTIFICATE", "API"),
            profile("profile-client", "Client Auth", "CLIENT_CERTIFICATE", "ENROLLMENT_CODE"),
            profile("profile-code", "Code Signing", "CODE_SIGNING", "API"),
            profile(DEFERRED_PROFILE_ID, "Deferred SSL", "SERVER_CERTIFICATE", "API"),
            profile("profile-approval", "Approved S/MIME", "SMIME", "MANUAL"),
            profile("profile-legacy", "Legacy SHA-1", "SERVER_CERTIFICATE", "API"),
        ];
        profiles[1].public = true;
        profiles[1].authentication_method = "ENROLLMENT_CODE".to_string();
        profiles[4].require_approval = true;
        profiles[5].status = "disabled".to_string();

        let template = |id: &str, name: &str, template_type: &str| Template {
            id: id.to_string(),
            name: name.to_string(),
            description: format!("{name} template"),
            template_type: template_type.to_string(),
            provider: "DigiCert".to_string(),
        };

        Self {
            business_units: vec![BusinessUnit {
                id: DEFAULT_BUSINESS_UNIT_ID.to_string(),
                name: DEFAULT_BUSINESS_UNIT_NAME.to_string(),
                description: None,
                parent_id: None,
                account_id: "account-1".to_string(),
                is_active: true,
                licensed_seats: 500,
                used_seats: 0,
                available_seats: 500,
                tags: Vec::new(),
                custom_attributes: BTreeMap::new(),
                created_at: now,
                updated_at: now,
            }],
            profiles,
            templates: vec![
                template("template-tls", "Public TLS", "SSL"),
                template("template-private", "Private TLS", "SSL"),
                template("template-smime", "S/MIME", "SMIME"),
            ],
            ..Self::default()
        }
    }

    pub fn profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    pub fn certificate_by_id(&self, id: &str) -> Option<&Certificate> {
        self.certificates.iter().find(|c| c.id == id)
    }

    pub fn certificate_by_serial(&self, serial: &str) -> Option<&Certificate> {
        self.certificates.iter().find(|c| c.serial_number == serial)
    }

    pub fn certificate_by_serial_mut(&mut self, serial: &str) -> Option<&mut Certificate> {
        self.certificates
            .iter_mut()
            .find(|c| c.serial_number == serial)
    }

    pub fn business_unit(&self, id: &str) -> Option<&BusinessUnit> {
        self.business_units.iter().find(|b| b.id == id)
    }

    /// Mint a certificate and charge one seat to the default business unit.
    pub fn mint(&mut self, draft: CertificateDraft) -> Certificate {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let serial = id.simple().to_string().to_uppercase();

        if let Some(unit) = self
            .business_units
            .iter_mut()
            .find(|b| b.id == DEFAULT_BUSINESS_UNIT_ID)
        {
            unit.used_seats += 1;
            unit.available_seats = unit.licensed_seats.saturating_sub(unit.used_seats);
        }

        Certificate {
            id: id.to_string(),
            certificate: format!("MIIB{serial}"),
            serial_number: serial,
            common_name: draft.common_name.clone(),
            status: "issued".to_string(),
            profile: Reference {
                id: draft.profile_id,
            },
            business_unit: UnitReference {
                id: DEFAULT_BUSINESS_UNIT_ID.to_string(),
                name: DEFAULT_BUSINESS_UNIT_NAME.to_string(),
            },
            seat: draft.seat_id.map(|seat_id| SeatReference { seat_id }),
            subject: Subject {
                common_name: draft.common_name,
            },
            valid_from: timestamp(now),
            valid_to: timestamp(
                TimeDelta::try_days(draft.validity_days)
                    .and_then(|lifetime| now.checked_add_signed(lifetime))
                    .unwrap_or(DateTime::<Utc>::MAX_UTC),
            ),
            issuing_ca_name: "Mock Issuing CA".to_string(),
            signature_algorithm: "SHA256withRSA".to_string(),
            tags: draft.tags,
            custom_attributes: draft.custom_attributes,
            revocation_reason: None,
        }
    }
}

/// Inputs for [`Store::mint`].
#[derive(Debug, Default)]
pub struct CertificateDraft {
    pub profile_id: String,
    pub common_name: Option<String>,
    pub seat_id: Option<String>,
    pub validity_days: i64,
    pub tags: Vec<String>,
    pub custom_attributes: BTreeMap<String, Value>,
}

pub fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}
