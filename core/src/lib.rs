//! Blocking client for the DigiCert Trust Lifecycle Manager REST API.
//!
//! # Overview
//! Every operation maps one method call to one verb, one path under
//! `mpki/api/v1/` and at most one JSON body. The [`Client`] attaches the
//! `X-API-Key` header, encodes the body, classifies the status code and
//! decodes the reply into the typed records in [`types`].
//!
//! ```no_run
//! use tlm_core::{Client, ClientConfig};
//! use tlm_core::types::CertificateSearchOptions;
//!
//! # fn main() -> tlm_core::Result<()> {
//! let client = Client::new(ClientConfig::new("api-key"))?;
//! let page = client.certificates().search(&CertificateSearchOptions {
//!     common_name: Some("example.com".to_string()),
//!     ..Default::default()
//! })?;
//! println!("{} certificates", page.meta.total);
//! # Ok(())
//! # }
//! ```
//!
//! # Design
//! - Requests and responses are plain data ([`http`]); a [`Transport`]
//!   performs the round-trip. [`UreqTransport`] is the default; tests plug
//!   in a recording transport instead.
//! - No retries, caching or rate limiting. One call is one HTTP request.
//! - Models are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod services;
pub mod transport;
pub mod types;

pub use client::{check_status, parse_response, Client};
pub use config::ClientConfig;
pub use error::{ApiError, Error};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::{Pagination, QueryParams, SortOrder, ToQuery};
pub use transport::{Transport, UreqTransport};

pub type Result<T> = std::result::Result<T, Error>;
