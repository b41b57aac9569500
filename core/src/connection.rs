//! Connection state and method invocation against the directory service.
//!
//! # Design
//! A `Connection` owns everything one logical endpoint needs: host, port,
//! normalized base path, TLS trust policy, a credential pair and a reusable
//! HTTP agent. `prepare` is pure — it coerces parameters, builds the
//! absolute URL and computes the headers (credentials are read here, so
//! each call gets a snapshot). `invoke` wraps `prepare`, one blocking
//! round trip, and classification. Credential setters take `&mut self`;
//! two connections never share credential state.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tracing::{debug, warn};

use crate::error::ClientError;
use crate::http::{HttpRequest, HttpResponse, Method};
use crate::params::{coerce, Params};
use crate::response::{classify, CallResult};
use crate::urlbuilder;

/// Whether to verify the server's TLS certificate chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TlsPolicy {
    /// Verify certificates (the only sensible production setting).
    Verify,
    /// Accept any certificate. Intended for a self-signed local
    /// development server only.
    TrustAny,
}

/// A connection to one directory service endpoint.
///
/// Connections start anonymous, which gives read-only access to public
/// data. Authenticating as a group with [`set_username`](Self::set_username)
/// and [`set_password`](Self::set_password) enables write access and
/// non-public data according to the group's privileges. Changing
/// credentials affects only subsequent calls on this instance.
#[derive(Debug)]
pub struct Connection {
    host: String,
    port: u16,
    base_path: String,
    tls: TlsPolicy,
    username: String,
    password: String,
    agent: ureq::Agent,
}

impl Connection {
    /// Open a connection to `host:port` with the given base path.
    ///
    /// The base path is normalized to start and end with `/`.
    pub fn new(host: &str, port: u16, base_path: &str, tls: TlsPolicy) -> Self {
        let mut base_path = base_path.to_string();
        if !base_path.starts_with('/') {
            base_path.insert(0, '/');
        }
        if !base_path.ends_with('/') {
            base_path.push('/');
        }

        if tls == TlsPolicy::TrustAny {
            warn!(host, "TLS certificate verification is disabled");
        }

        let mut config = ureq::Agent::config_builder()
            // Non-2xx responses are classified here, not treated as
            // transport errors.
            .http_status_as_error(false);
        if tls == TlsPolicy::TrustAny {
            config = config.tls_config(
                ureq::tls::TlsConfig::builder()
                    .disable_verification(true)
                    .build(),
            );
        }
        let agent = config.build().new_agent();

        Self {
            host: host.to_string(),
            port,
            base_path,
            tls,
            username: "anonymous".to_string(),
            password: String::new(),
            agent,
        }
    }

    /// Connection to the production service at `www.lookup.cam.ac.uk`.
    pub fn production() -> Self {
        Self::new("www.lookup.cam.ac.uk", 443, "", TlsPolicy::Verify)
    }

    /// Connection to the test service at `lookup-test.srv.uis.cam.ac.uk`.
    ///
    /// The test server is not always available and its data may lag the
    /// live system.
    pub fn test_server() -> Self {
        Self::new("lookup-test.srv.uis.cam.ac.uk", 443, "", TlsPolicy::Verify)
    }

    /// Connection to a development server on `localhost:8443/ibis/`,
    /// assumed to use a self-signed certificate.
    pub fn local() -> Self {
        Self::new("localhost", 8443, "ibis", TlsPolicy::TrustAny)
    }

    /// The username for subsequent calls: `"anonymous"` (the default) or
    /// the name of a group.
    pub fn set_username(&mut self, username: &str) {
        self.username = username.to_string();
    }

    /// The password for subsequent calls; only needed when connecting as
    /// a group.
    pub fn set_password(&mut self, password: &str) {
        self.password = password.to_string();
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn tls_policy(&self) -> TlsPolicy {
        self.tls
    }

    /// Build the fully-prepared request for a method invocation without
    /// touching the network.
    ///
    /// Parameter maps are coerced to wire strings, path parameters are
    /// encoded and substituted into the template, `flatten=true` is
    /// injected unless overridden, and the current credentials become the
    /// request's basic-authentication header.
    pub fn prepare(
        &self,
        method: Method,
        template: &str,
        path_params: &Params,
        query_params: &Params,
        form_params: &Params,
    ) -> Result<HttpRequest, ClientError> {
        let path_params = coerce(path_params);
        let query_params = coerce(query_params);
        let form_params = coerce(form_params);

        let relative = urlbuilder::build(&self.base_path, template, &path_params, &query_params)?;
        let url = format!("https://{}:{}{}", self.host, self.port, relative);

        let authorization = format!(
            "Basic {}",
            BASE64.encode(format!("{}:{}", self.username, self.password))
        );

        Ok(HttpRequest {
            method,
            url,
            headers: vec![
                ("Accept".to_string(), "application/xml".to_string()),
                ("Authorization".to_string(), authorization),
            ],
            form: form_params.into_iter().collect(),
        })
    }

    /// Invoke a web service method: one blocking request-response
    /// exchange, no retries.
    ///
    /// Recoverable failures (an error payload, or a response whose framing
    /// is not XML) come back as [`CallResult::Failure`]; connectivity
    /// faults and malformed payloads are raised as [`ClientError`].
    pub fn invoke(
        &self,
        method: Method,
        template: &str,
        path_params: &Params,
        query_params: &Params,
        form_params: &Params,
    ) -> Result<CallResult, ClientError> {
        let request = self.prepare(method, template, path_params, query_params, form_params)?;
        debug!(method = method.as_str(), url = %request.url, "invoking");
        let response = execute(&self.agent, request)?;
        classify(response)
    }
}

fn with_headers<Any>(
    mut builder: ureq::RequestBuilder<Any>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<Any> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Perform the single HTTP round trip for a prepared request.
///
/// Non-empty form parameters are sent as a form-encoded body with the
/// chosen verb; otherwise the request goes out with no body.
fn execute(agent: &ureq::Agent, request: HttpRequest) -> Result<HttpResponse, ClientError> {
    let HttpRequest {
        method,
        url,
        headers,
        form,
    } = request;

    let mut response = match (method, form.is_empty()) {
        (Method::Get, true) => with_headers(agent.get(&url), &headers).call()?,
        (Method::Get, false) => {
            with_headers(agent.get(&url), &headers).force_send_body().send_form(form)?
        }
        (Method::Delete, true) => with_headers(agent.delete(&url), &headers).call()?,
        (Method::Delete, false) => {
            with_headers(agent.delete(&url), &headers).force_send_body().send_form(form)?
        }
        (Method::Post, true) => with_headers(agent.post(&url), &headers).send_empty()?,
        (Method::Post, false) => with_headers(agent.post(&url), &headers).send_form(form)?,
        (Method::Put, true) => with_headers(agent.put(&url), &headers).send_empty()?,
        (Method::Put, false) => with_headers(agent.put(&url), &headers).send_form(form)?,
    };

    let status = response.status();
    let content_type = response
        .headers()
        .get("Content-Type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let body = response.body_mut().read_to_string()?;

    Ok(HttpResponse {
        status: status.as_u16(),
        reason: status.canonical_reason().unwrap_or("").to_string(),
        content_type,
        body,
    })
}
