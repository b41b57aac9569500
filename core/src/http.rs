//! Plain-data HTTP request and response types at the I/O seam.
//!
//! # Design
//! The connection builds an `HttpRequest` and classifies an `HttpResponse`
//! as pure steps; the single blocking round trip between them is isolated
//! in one small function. Tests exercise the pure steps directly and supply
//! their own transport, so no TLS server is needed to cover the core.
//! All fields are owned (`String`, `Vec`) so values move freely between
//! threads and test helpers.

/// HTTP verb for a method invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

/// A fully-prepared request: absolute URL, headers, and any form body.
///
/// Produced by `Connection::prepare`; executing it is the only step that
/// touches the network.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    /// Absolute URL, `https://{host}:{port}{base}{path}?{query}`.
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Coerced form parameters; sent form-encoded as the body when
    /// non-empty on POST/PUT.
    pub form: Vec<(String, String)>,
}

/// A received response reduced to the fields classification needs.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    /// HTTP reason phrase, e.g. `"Internal Server Error"`.
    pub reason: String,
    /// Declared `Content-Type` header value, possibly with parameters.
    pub content_type: String,
    pub body: String,
}
