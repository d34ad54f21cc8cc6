//! Request construction, execution and response classification.
//!
//! # Design
//! `Client` holds the parsed base URL, the credentials and a shared
//! [`Transport`]. Every service operation funnels through the same three
//! steps: [`Client::new_request`] builds an [`HttpRequest`],
//! [`Client::execute`] performs the round-trip and rejects non-2xx
//! statuses, and [`parse_response`] decodes the JSON body. Each step is
//! public so callers can drive endpoints the typed services do not cover.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::{ClientConfig, API_VERSION};
use crate::error::{ApiError, Error};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::QueryParams;
use crate::services::{BusinessUnits, CertificateOwners, Certificates, Enrollments, Profiles};
use crate::transport::{Transport, UreqTransport};
use crate::Result;

/// Blocking client for the Trust Lifecycle Manager API.
///
/// Cheap to clone; clones share the transport and may be used from several
/// threads at once.
#[derive(Clone)]
pub struct Client {
    base_url: Url,
    api_key: String,
    user_agent: String,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Client over a ureq transport honouring `config.timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration does not validate.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = UreqTransport::new(config.timeout);
        Self::with_transport(config, transport)
    }

    /// Client over a caller-supplied transport.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the configuration does not validate.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Result<Self> {
        let mut base_url = config.validate()?;
        base_url.set_query(None);
        base_url.set_fragment(None);
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        tracing::debug!(base_url = %base_url, "client configured");

        Ok(Self {
            base_url,
            api_key: config.api_key,
            user_agent: config.user_agent,
            transport: Arc::new(transport),
        })
    }

    /// Client configured from `DIGICERT_*` environment variables.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`] and [`ClientConfig::validate`].
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env()?)
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn certificates(&self) -> Certificates<'_> {
        Certificates::new(self)
    }

    pub fn business_units(&self) -> BusinessUnits<'_> {
        BusinessUnits::new(self)
    }

    pub fn certificate_owners(&self) -> CertificateOwners<'_> {
        CertificateOwners::new(self)
    }

    pub fn enrollments(&self) -> Enrollments<'_> {
        Enrollments::new(self)
    }

    pub fn profiles(&self) -> Profiles<'_> {
        Profiles::new(self)
    }

    /// Absolute URL of `path` under `mpki/api/v1/`, with `query` appended.
    ///
    /// A leading `/` on `path` is ignored. Identifiers inside `path` must
    /// already be encoded with [`path_segment`](crate::params::path_segment).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the joined URL is not valid.
    pub fn endpoint(&self, path: &str, query: &QueryParams) -> Result<Url> {
        let relative = format!("mpki/api/{API_VERSION}/{}", path.trim_start_matches('/'));
        let mut url = self
            .base_url
            .join(&relative)
            .map_err(|e| Error::Config(format!("invalid endpoint path {path:?}: {e}")))?;

        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query.iter() {
                pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Build a request with the standard headers attached.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the URL cannot be built.
    pub fn new_request(
        &self,
        method: HttpMethod,
        path: &str,
        query: &QueryParams,
        body: Option<String>,
    ) -> Result<HttpRequest> {
        let url = self.endpoint(path, query)?;

        let mut headers = vec![
            ("Accept".to_string(), "application/json".to_string()),
            ("X-API-Key".to_string(), self.api_key.clone()),
        ];
        if !self.user_agent.is_empty() {
            headers.push(("User-Agent".to_string(), self.user_agent.clone()));
        }
        if body.is_some() {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        })
    }

    /// Send `request` and return the response if its status is 2xx.
    ///
    /// # Errors
    ///
    /// Transport failures as returned by the transport; non-2xx statuses as
    /// classified by [`check_status`].
    pub fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        tracing::debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        check_status(&response)?;
        Ok(response)
    }

    fn call(
        &self,
        method: HttpMethod,
        path: &str,
        query: &QueryParams,
        body: Option<String>,
    ) -> Result<HttpResponse> {
        let request = self.new_request(method, path, query, body)?;
        self.execute(request)
    }

    pub(crate) fn get<T: DeserializeOwned + Default>(
        &self,
        path: &str,
        query: &QueryParams,
    ) -> Result<T> {
        let response = self.call(HttpMethod::Get, path, query, None)?;
        parse_response(&response)
    }

    pub(crate) fn post<B: Serialize, T: DeserializeOwned + Default>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.call(HttpMethod::Post, path, &QueryParams::new(), Some(encode(body)?))?;
        parse_response(&response)
    }

    /// POST without a request body.
    pub(crate) fn post_empty<T: DeserializeOwned + Default>(&self, path: &str) -> Result<T> {
        let response = self.call(HttpMethod::Post, path, &QueryParams::new(), None)?;
        parse_response(&response)
    }

    pub(crate) fn put<B: Serialize, T: DeserializeOwned + Default>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let response = self.call(HttpMethod::Put, path, &QueryParams::new(), Some(encode(body)?))?;
        parse_response(&response)
    }

    /// PUT whose response body is ignored.
    pub(crate) fn put_no_content<B: Serialize>(&self, path: &str, body: &B) -> Result<()> {
        self.call(HttpMethod::Put, path, &QueryParams::new(), Some(encode(body)?))?;
        Ok(())
    }

    pub(crate) fn delete(&self, path: &str) -> Result<()> {
        self.call(HttpMethod::Delete, path, &QueryParams::new(), None)?;
        Ok(())
    }
}

fn encode<B: Serialize>(body: &B) -> Result<String> {
    serde_json::to_string(body).map_err(|e| Error::Encode(e.to_string()))
}

/// Map a non-2xx response to [`Error::Api`] when its body is a JSON error
/// object, otherwise to [`Error::Http`] carrying the raw body.
///
/// # Errors
///
/// Returns the classified error for any status outside `200..300`.
pub fn check_status(response: &HttpResponse) -> Result<()> {
    if response.is_success() {
        return Ok(());
    }

    tracing::debug!(status = response.status, "request failed");

    let api_error = serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .filter(serde_json::Value::is_object)
        .and_then(|body| serde_json::from_value::<ApiError>(body).ok());

    Err(match api_error {
        Some(mut err) => {
            err.status = response.status;
            Error::Api(err)
        }
        None => Error::Http {
            status: response.status,
            message: response.body.clone(),
        },
    })
}

/// Decode the body of a 2xx response. An empty body yields `T::default()`.
///
/// # Errors
///
/// Non-2xx statuses as classified by [`check_status`]; [`Error::Decode`]
/// when the body does not match `T`.
pub fn parse_response<T: DeserializeOwned + Default>(response: &HttpResponse) -> Result<T> {
    check_status(response)?;
    if response.body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&response.body).map_err(|e| Error::Decode(e.to_string()))
}
