//! Native transport for the session runtime.
//!
//! A `reqwest` client with a shared cookie jar stands in for the browser: the
//! `Set-Cookie` from `POST /session` is replayed on later calls, and a cookie
//! passed on the command line can seed the jar up front.

use std::sync::Arc;

use coachhub::net::http::{Method, RawResponse, RequestContext, Transport, TransportError};
use reqwest::Url;
use reqwest::cookie::{CookieStore, Jar};

#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
    jar: Arc<Jar>,
    origin: Url,
}

impl ReqwestTransport {
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialized.
    pub fn new(origin: Url) -> Result<Self, reqwest::Error> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder().cookie_provider(Arc::clone(&jar)).build()?;
        Ok(Self { client, jar, origin })
    }

    /// Add a raw `name=value` cookie for the backend origin.
    pub fn seed_cookie(&self, cookie: &str) {
        self.jar.add_cookie_str(cookie, &self.origin);
    }

    /// Cookie header the jar would send to the backend, if any.
    pub fn session_cookie(&self) -> Option<String> {
        let header = self.jar.cookies(&self.origin)?;
        match header.to_str() {
            Ok(value) => Some(value.to_owned()),
            Err(e) => {
                tracing::warn!(error = %e, "session cookie is not printable");
                None
            }
        }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: RequestContext) -> Result<RawResponse, TransportError> {
        // The jar is always attached; `with_credentials` is never false from `HttpClient`.
        let mut builder = self.client.request(reqwest_method(request.method), &request.url);
        for (key, value) in &request.headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await.map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(method = %request.method, url = %request.url, status, "backend replied");
        Ok(RawResponse { status, body })
    }
}

fn reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
    }
}
