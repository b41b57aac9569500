//! Client transport core for the Lookup/Ibis directory web service.
//!
//! # Overview
//! Builds correctly encoded request URLs and bodies from typed parameters,
//! performs one blocking HTTPS exchange per call with basic authentication,
//! and deterministically classifies every response into a typed success
//! payload or a typed error.
//!
//! # Design
//! - [`Connection`] owns endpoint and credential state; `prepare` is the
//!   pure request-construction step, `invoke` adds the single round trip
//!   and classification.
//! - Parameters are a closed variant type ([`ParamValue`]) coerced to wire
//!   strings by a pure function — no runtime type probing.
//! - Recoverable failures (error payloads, non-XML framing) are data
//!   ([`CallResult::Failure`]); only connectivity faults and malformed
//!   payloads are raised ([`ClientError`]).
//! - The remote method catalogue and the domain DTO parsers are external:
//!   call sites supply a path template and parameters, and consume the
//!   structured [`XmlNode`] payload.

pub mod connection;
pub mod error;
pub mod http;
pub mod params;
pub mod response;
pub mod urlbuilder;

pub use connection::{Connection, TlsPolicy};
pub use error::{ClientError, ServerError};
pub use http::{HttpRequest, HttpResponse, Method};
pub use params::{coerce, params, EntityRef, ParamValue, Params};
pub use response::{classify, CallResult, XmlNode};
