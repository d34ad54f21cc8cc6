//! Executes one `HttpRequest` and hands back one `HttpResponse`.
//!
//! The client never interprets transport details: status codes come back as
//! data and are classified by [`check_status`](crate::client::check_status).

use std::time::Duration;

use crate::error::Error;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// A blocking HTTP round-trip.
pub trait Transport: Send + Sync {
    /// Perform `request`. Non-2xx statuses are returned as `Ok`.
    ///
    /// # Errors
    ///
    /// [`Error::Timeout`] when the deadline elapses, [`Error::Transport`]
    /// for any other failure below HTTP.
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error>;
}

/// Default transport backed by a ureq agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    /// Agent with a global per-call `timeout`.
    ///
    /// ureq's status-as-error behavior is disabled so 4xx/5xx responses
    /// reach the client's classifier with their bodies intact.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }

    pub fn from_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let result = match method {
            HttpMethod::Get => with_headers(self.agent.get(&url), &headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), &headers).call(),
            HttpMethod::Post => send(with_headers(self.agent.post(&url), &headers), body),
            HttpMethod::Put => send(with_headers(self.agent.put(&url), &headers), body),
        };

        let mut response = result.map_err(map_ureq_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(map_ureq_error)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<String>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

fn map_ureq_error(err: ureq::Error) -> Error {
    if matches!(err, ureq::Error::Timeout(_)) {
        Error::Timeout(err.to_string())
    } else {
        Error::Transport(err.to_string())
    }
}

#[cfg(test)]
pub(crate) mod mock {
    //! Recording transport for unit tests.

    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use super::Transport;
    use crate::error::Error;
    use crate::http::{HttpRequest, HttpResponse};

    /// Replies with queued responses (default: `200 {}`) and keeps every
    /// request it saw.
    #[derive(Clone, Default)]
    pub struct MockTransport {
        requests: Arc<Mutex<Vec<HttpRequest>>>,
        responses: Arc<Mutex<VecDeque<HttpResponse>>>,
    }

    impl MockTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond(&self, status: u16, body: &str) -> &Self {
            self.responses.lock().unwrap().push_back(HttpResponse {
                status,
                headers: vec![("content-type".to_string(), "application/json".to_string())],
                body: body.to_string(),
            });
            self
        }

        pub fn respond_json(&self, status: u16, body: &serde_json::Value) -> &Self {
            self.respond(status, &body.to_string())
        }

        pub fn last_request(&self) -> HttpRequest {
            self.requests
                .lock()
                .unwrap()
                .last()
                .cloned()
                .expect("no request was sent")
        }

        pub fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        /// Client against `https://tlm.example.com` wired to this transport.
        pub fn client(&self) -> crate::Client {
            let config = crate::ClientConfig::new("test-api-key")
                .with_base_url("https://tlm.example.com");
            crate::Client::with_transport(config, self.clone()).unwrap()
        }
    }

    /// URL of `path` under the test client's API root.
    pub fn api_url(path: &str) -> String {
        format!("https://tlm.example.com/mpki/api/v1/{path}")
    }

    impl Transport for MockTransport {
        fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
            self.requests.lock().unwrap().push(request);
            Ok(self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| HttpResponse {
                    status: 200,
                    headers: Vec::new(),
                    body: "{}".to_string(),
                }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::net::TcpListener;

    #[test]
    fn unreachable_host_is_a_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let transport = UreqTransport::new(Duration::from_secs(2));
        let err = transport
            .execute(HttpRequest {
                method: HttpMethod::Get,
                url: format!("http://127.0.0.1:{port}/"),
                headers: Vec::new(),
                body: None,
            })
            .unwrap_err();
        assert!(matches!(err, Error::Transport(_) | Error::Timeout(_)), "{err}");
    }

    #[test]
    fn silent_server_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            // Accept and read, never answer.
            if let Ok((mut stream, _)) = listener.accept() {
                let mut buf = [0u8; 1024];
                let _ = stream.read(&mut buf);
                std::thread::sleep(Duration::from_secs(2));
            }
        });

        let transport = UreqTransport::new(Duration::from_millis(100));
        let err = transport
            .execute(HttpRequest {
                method: HttpMethod::Get,
                url: format!("http://{addr}/mpki/api/v1/certificate-search"),
                headers: Vec::new(),
                body: None,
            })
            .unwrap_err();
        assert!(matches!(err, Error::Timeout(_)), "{err}");
        assert!(err.to_string().contains("timeout"));
    }
}
