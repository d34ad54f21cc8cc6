use crate::client::Client;
use crate::params::{path_segment, QueryParams, ToQuery};
use crate::types::{
    CertificateResponse, Enrollment, EnrollmentDetailsOptions, EnrollmentDetailsResponse,
    EnrollmentRequest, EnrollmentResponse, EnrollmentStatusResponse, ManualEnrollmentRequest,
    RedeemEnrollmentRequest,
};
use crate::Result;

/// Enrollment codes, manual enrollments and their status.
#[derive(Debug, Clone, Copy)]
pub struct Enrollments<'a> {
    client: &'a Client,
}

impl<'a> Enrollments<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Open an enrollment; the response carries the code to redeem.
    pub fn create(&self, request: &EnrollmentRequest) -> Result<EnrollmentResponse> {
        self.client.post("enrollment", request)
    }

    /// Look up an enrollment by its enrollment code.
    pub fn get(&self, enrollment_code: &str) -> Result<Enrollment> {
        let path = format!("enrollment/{}", path_segment(enrollment_code)?);
        self.client.get(&path, &QueryParams::new())
    }

    pub fn status(&self, enrollment_id: &str) -> Result<EnrollmentStatusResponse> {
        let path = format!("enrollment/{}/status", path_segment(enrollment_id)?);
        self.client.get(&path, &QueryParams::new())
    }

    /// Exchange an enrollment code and CSR for a certificate.
    pub fn redeem(&self, request: &RedeemEnrollmentRequest) -> Result<CertificateResponse> {
        self.client.post("enrollment/redeem", request)
    }

    pub fn create_manual(&self, request: &ManualEnrollmentRequest) -> Result<EnrollmentResponse> {
        self.client.post("manual-enrollment", request)
    }

    /// Manual enrollment renewing an existing certificate.
    pub fn renew_manual(
        &self,
        certificate_id: &str,
        request: &ManualEnrollmentRequest,
    ) -> Result<EnrollmentResponse> {
        let path = format!("manual-enrollment/renew/{}", path_segment(certificate_id)?);
        self.client.post(&path, request)
    }

    pub fn list_details(&self, options: &EnrollmentDetailsOptions) -> Result<EnrollmentDetailsResponse> {
        self.client.get("enrollment-details", &options.to_query())
    }

    pub fn get_details(&self, enrollment_id: &str) -> Result<Enrollment> {
        let path = format!("enrollment-details/{}", path_segment(enrollment_id)?);
        self.client.get(&path, &QueryParams::new())
    }

    /// The enrollment that produced a certificate.
    pub fn get_by_certificate(&self, certificate_id: &str) -> Result<Enrollment> {
        let path = format!("enrollment/certificate/{}", path_segment(certificate_id)?);
        self.client.get(&path, &QueryParams::new())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::http::HttpMethod;
    use crate::params::Pagination;
    use crate::transport::mock::{api_url, MockTransport};
    use crate::types::{ProfileReference, SeatReference};

    use super::*;

    #[test]
    fn create_then_redeem() {
        let mock = MockTransport::new();
        mock.respond_json(
            201,
            &json!({"enrollment_id": "enroll-1", "enrollment_code": "ABC-123", "status": "pending"}),
        );
        mock.respond_json(200, &json!({"certificate": {"id": "cert-1", "status": "issued"}}));
        let client = mock.client();

        let request = EnrollmentRequest {
            profile: ProfileReference::new("profile-123"),
            seat: Some(SeatReference::new("seat-1")),
            email: Some("user@example.com".to_string()),
            ..Default::default()
        };
        let created = client.enrollments().create(&request).unwrap();
        let sent = mock.last_request();
        assert_eq!(sent.url, api_url("enrollment"));
        assert_eq!(
            sent.body.as_deref(),
            Some(r#"{"profile":{"id":"profile-123"},"seat":{"seat_id":"seat-1"},"email":"user@example.com"}"#)
        );
        let code = created.enrollment_code.unwrap();

        let redeemed = client
            .enrollments()
            .redeem(&RedeemEnrollmentRequest {
                enrollment_code: code,
                csr: "csr".to_string(),
            })
            .unwrap();
        assert_eq!(mock.last_request().url, api_url("enrollment/redeem"));
        assert_eq!(
            mock.last_request().body.as_deref(),
            Some(r#"{"enrollment_code":"ABC-123","csr":"csr"}"#)
        );
        assert_eq!(
            redeemed.certificate.and_then(|c| c.status).as_deref(),
            Some("issued")
        );
    }

    #[test]
    fn lookups_use_distinct_paths() {
        let mock = MockTransport::new();
        let client = mock.client();
        let enrollments = client.enrollments();

        enrollments.get("ABC-123").unwrap();
        assert_eq!(mock.last_request().url, api_url("enrollment/ABC-123"));

        enrollments.get_details("enroll-1").unwrap();
        assert_eq!(mock.last_request().url, api_url("enrollment-details/enroll-1"));

        enrollments.get_by_certificate("cert-1").unwrap();
        assert_eq!(mock.last_request().url, api_url("enrollment/certificate/cert-1"));
        assert_eq!(mock.last_request().method, HttpMethod::Get);
    }

    #[test]
    fn status_decodes_timestamp() {
        let mock = MockTransport::new();
        mock.respond_json(
            200,
            &json!({"status": "approved", "certificate_id": "cert-1", "last_updated": "2024-03-01T12:00:00Z"}),
        );
        let status = mock.client().enrollments().status("enroll-1").unwrap();
        assert_eq!(mock.last_request().url, api_url("enrollment/enroll-1/status"));
        assert_eq!(status.status, "approved");
        assert_eq!(
            status.last_updated.unwrap().to_rfc3339(),
            "2024-03-01T12:00:00+00:00"
        );
    }

    #[test]
    fn manual_enrollment_and_renewal() {
        let mock = MockTransport::new();
        let client = mock.client();

        let request = ManualEnrollmentRequest {
            profile: ProfileReference::new("profile-123"),
            csr: "csr".to_string(),
            approver_email: Some("approver@example.com".to_string()),
            ..Default::default()
        };
        client.enrollments().create_manual(&request).unwrap();
        let sent = mock.last_request();
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.url, api_url("manual-enrollment"));
        assert_eq!(
            sent.body.as_deref(),
            Some(r#"{"profile":{"id":"profile-123"},"csr":"csr","approver_email":"approver@example.com"}"#)
        );

        client.enrollments().renew_manual("cert-9", &request).unwrap();
        assert_eq!(mock.last_request().url, api_url("manual-enrollment/renew/cert-9"));
    }

    #[test]
    fn list_details_filters() {
        let mock = MockTransport::new();
        mock.respond_json(
            200,
            &json!({"total": 3, "offset": 0, "limit": 2, "enrollments": [{"id": "e1"}, {"id": "e2"}]}),
        );
        let options = EnrollmentDetailsOptions {
            status: Some("pending".to_string()),
            profile_id: Some("profile-123".to_string()),
            pagination: Pagination::new(0, 2),
            ..Default::default()
        };
        let list = mock.client().enrollments().list_details(&options).unwrap();

        // offset is zero, so neither paging key is sent
        assert_eq!(
            mock.last_request().url,
            format!("{}?status=pending&profile_id=profile-123", api_url("enrollment-details"))
        );
        assert_eq!(list.enrollments.len(), 2);
        assert_eq!(list.next_page(), Some(Pagination::new(2, 2)));
    }

    #[test]
    fn dot_segment_ids_send_nothing() {
        let mock = MockTransport::new();
        let client = mock.client();
        let enrollments = client.enrollments();
        assert!(matches!(
            enrollments.status("..").unwrap_err(),
            crate::error::Error::InvalidArgument(_)
        ));
        assert!(enrollments.get(".").is_err());
        assert!(enrollments
            .renew_manual("..", &ManualEnrollmentRequest::default())
            .is_err());
        assert!(enrollments.get_by_certificate("").is_err());
        assert_eq!(mock.request_count(), 0);
    }
}
