use crate::client::Client;
use crate::params::{path_segment, QueryParams, ToQuery};
use crate::types::{
    CertificateOwner, CertificateOwnerListOptions, CertificateOwnerListResponse,
    CertificateOwnerRequest, OwnerAssignment,
};
use crate::Result;

/// People registered as owners of certificates.
#[derive(Debug, Clone, Copy)]
pub struct CertificateOwners<'a> {
    client: &'a Client,
}

impl<'a> CertificateOwners<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn create(&self, request: &CertificateOwnerRequest) -> Result<CertificateOwner> {
        self.client.post("certificate-owners", request)
    }

    pub fn get(&self, id: &str) -> Result<CertificateOwner> {
        self.client.get(&owner_path(id)?, &QueryParams::new())
    }

    pub fn update(&self, id: &str, request: &CertificateOwnerRequest) -> Result<CertificateOwner> {
        self.client.put(&owner_path(id)?, request)
    }

    pub fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&owner_path(id)?)
    }

    pub fn list(&self, options: &CertificateOwnerListOptions) -> Result<CertificateOwnerListResponse> {
        self.client.get("certificate-owners", &options.to_query())
    }

    /// Replace the owners recorded on a certificate.
    pub fn assign_to_certificate(&self, certificate_id: &str, owner_ids: &[String]) -> Result<()> {
        let body = OwnerAssignment {
            owner_ids: owner_ids.to_vec(),
        };
        self.client
            .put_no_content(&assignment_path(certificate_id)?, &body)
    }

    /// Clear every owner from a certificate.
    pub fn remove_from_certificate(&self, certificate_id: &str) -> Result<()> {
        self.client.delete(&assignment_path(certificate_id)?)
    }
}

fn owner_path(id: &str) -> Result<String> {
    Ok(format!("certificate-owners/{}", path_segment(id)?))
}

fn assignment_path(certificate_id: &str) -> Result<String> {
    Ok(format!(
        "certificate-owners/certificate/{}",
        path_segment(certificate_id)?
    ))
}
