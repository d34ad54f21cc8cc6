//! Typed views over the endpoint groups.
//!
//! Each view borrows the [`Client`](crate::Client) it came from and maps one
//! method to one verb and path. Views are `Copy`; obtain them with
//! `client.certificates()`, `client.profiles()` and so on.

mod business_units;
mod certificate_owners;
mod certificates;
mod enrollments;
mod profiles;

pub use business_units::BusinessUnits;
pub use certificate_owners::CertificateOwners;
pub use certificates::Certificates;
pub use enrollments::Enrollments;
pub use profiles::Profiles;
