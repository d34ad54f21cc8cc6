//! JSON records exchanged with the API.
//!
//! # Design
//! These mirror the vendor schema and enforce nothing. Response records
//! default every missing or `null` field, so a sparse payload
//! (`"profile": {}` or `"items": null`) still decodes. Request records omit unset optional fields when serialized.
//! Relationship fields (profile, seat, business unit, owner ids) are opaque
//! references passed through as delivered.

pub mod business_unit;
pub mod certificate;
pub mod common;
pub mod enrollment;
pub mod owner;
pub mod profile;

pub use business_unit::{
    BusinessUnit, BusinessUnitAdmin, BusinessUnitAdminRequest, BusinessUnitListOptions,
    BusinessUnitListResponse, BusinessUnitRequest, LicensedSeats, SeatTypeAllocation,
};
pub use certificate::{
    Account, AdditionalFormatsResponse, CaAttributes, Certificate, CertificateRequest,
    CertificateResponse, CertificateSearchOptions, CertificateSearchResponse, Ica, RenewRequest,
    RevokeRequest, Seat, SeatType, Subject,
};
pub use common::{
    CustomAttribute, CustomAttributes, DeliveryFormat, ListMeta, ProfileReference, SeatReference,
    SubjectAltNames, SubjectAttributes, Validity,
};
pub use enrollment::{
    Enrollment, EnrollmentDetailsOptions, EnrollmentDetailsResponse, EnrollmentRequest,
    EnrollmentResponse, EnrollmentStatusResponse, ManualEnrollmentRequest,
    RedeemEnrollmentRequest,
};
pub use owner::{
    CertificateOwner, CertificateOwnerListOptions, CertificateOwnerListResponse,
    CertificateOwnerRequest, OwnerAssignment,
};
pub use profile::{
    CustomFieldDef, DnField, Extension, Profile, ProfileListOptions, ProfileListResponse,
    ProfileTemplate, ProfileTemplateListResponse, ProfileValidity, SanField,
};
