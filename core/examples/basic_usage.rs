//! Issue, inspect and revoke a certificate.
//!
//! Reads `DIGICERT_API_KEY` and optionally `DIGICERT_BASE_URL`. Point the
//! base URL at a running mock server (`cargo run -p mock-server`) with
//! `DIGICERT_API_KEY=mock-api-key` to try it locally.

use tlm_core::types::{
    CertificateRequest, CertificateSearchOptions, ProfileListOptions, ProfileReference, RevokeRequest,
    SubjectAttributes, Validity,
};
use tlm_core::Client;
use tracing_subscriber::EnvFilter;

fn main() -> tlm_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let client = Client::from_env()?;

    let profiles = client.profiles().list(&ProfileListOptions {
        status: Some("active".to_string()),
        ..Default::default()
    })?;
    let Some(profile_id) = profiles.profiles.iter().find_map(|p| p.id.clone()) else {
        tracing::warn!("no active profiles");
        return Ok(());
    };
    tracing::info!(%profile_id, total = profiles.meta.total, "using profile");

    let issued = client.certificates().issue(&CertificateRequest {
        profile: ProfileReference::new(profile_id),
        validity: Some(Validity::years(1)),
        attributes: Some(SubjectAttributes {
            common_name: Some("demo.example.com".to_string()),
            ..Default::default()
        }),
        tags: vec!["demo".to_string()],
        ..Default::default()
    })?;

    let Some(serial) = issued.certificate.and_then(|c| c.serial_number) else {
        tracing::info!(request_id = ?issued.request_id, "issuance deferred");
        return Ok(());
    };
    tracing::info!(%serial, "certificate issued");

    let tagged = client.certificates().search(&CertificateSearchOptions {
        tags: vec!["demo".to_string()],
        ..Default::default()
    })?;
    tracing::info!(count = tagged.meta.total, "demo certificates");

    match client
        .certificates()
        .revoke(&serial, &RevokeRequest::new("cessation_of_operation"))
    {
        Ok(()) => tracing::info!(%serial, "revoked"),
        Err(err) if err.status() == Some(409) => tracing::warn!(%err, "already revoked"),
        Err(err) => return Err(err),
    }

    Ok(())
}
