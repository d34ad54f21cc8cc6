use crate::client::Client;
use crate::params::{path_segment, QueryParams, ToQuery};
use crate::types::{
    AdditionalFormatsResponse, Certificate, CertificateRequest, CertificateResponse,
    CertificateSearchOptions, CertificateSearchResponse, RenewRequest, RevokeRequest,
};
use crate::Result;

/// Issuance, lookup, search, revocation and renewal of certificates.
#[derive(Debug, Clone, Copy)]
pub struct Certificates<'a> {
    client: &'a Client,
}

impl<'a> Certificates<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Request a new certificate.
    pub fn issue(&self, request: &CertificateRequest) -> Result<CertificateResponse> {
        self.client.post("certificate", request)
    }

    /// Look up a certificate by serial number.
    pub fn get(&self, serial_number: &str) -> Result<Certificate> {
        let path = format!("certificate/{}", path_segment(serial_number)?);
        self.client.get(&path, &QueryParams::new())
    }

    /// Look up a certificate by its TLM identifier.
    pub fn get_by_id(&self, id: &str) -> Result<Certificate> {
        let path = format!("certificate-by-id/{}", path_segment(id)?);
        self.client.get(&path, &QueryParams::new())
    }

    pub fn search(&self, options: &CertificateSearchOptions) -> Result<CertificateSearchResponse> {
        self.client.get("certificate-search", &options.to_query())
    }

    pub fn revoke(&self, serial_number: &str, request: &RevokeRequest) -> Result<()> {
        let path = format!("certificate/{}/revoke", path_segment(serial_number)?);
        self.client.put_no_content(&path, request)
    }

    /// Lift a revocation (only meaningful for `certificate_hold`).
    pub fn unrevoke(&self, serial_number: &str) -> Result<()> {
        let path = format!("certificate/{}/revoke", path_segment(serial_number)?);
        self.client.delete(&path)
    }

    pub fn renew(&self, serial_number: &str, request: &RenewRequest) -> Result<CertificateResponse> {
        let path = format!("certificate/{}/renew", path_segment(serial_number)?);
        self.client.post(&path, request)
    }

    /// The certificate encoded in every other format the CA offers.
    pub fn additional_formats(&self, serial_number: &str) -> Result<AdditionalFormatsResponse> {
        let path = format!("certificate/{}/additional-formats", path_segment(serial_number)?);
        self.client.get(&path, &QueryParams::new())
    }

    /// Collect a certificate whose issuance completed asynchronously.
    pub fn pickup(&self, request_id: &str) -> Result<CertificateResponse> {
        let path = format!("certificate-pickup/{}", path_segment(request_id)?);
        self.client.post_empty(&path)
    }
}
