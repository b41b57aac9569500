//! Response classification: transport framing check and payload parsing.
//!
//! # Design
//! Classification is a pure function of (status, content type, body) and
//! makes exactly one pass over the body. A response that does not declare
//! `application/xml` cannot carry a protocol payload, so it becomes a
//! synthesized [`ServerError`] with the raw body kept for diagnostics. An
//! XML response is parsed into a generic [`XmlNode`] tree: an `error`
//! child under the root decodes into a [`ServerError`], anything else is
//! the success payload handed on to the domain parsers. Malformed XML is
//! the one case not recovered locally — it is a protocol contract
//! violation and propagates as [`ClientError::MalformedXml`].

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{ClientError, ServerError};
use crate::http::HttpResponse;

/// Fixed message used when the response framing is not interpretable.
const UNEXPECTED_RESULT: &str = "Unexpected result from server";

/// A parsed XML element: name, attributes, text content and child elements.
///
/// Domain parsers (person, institution, group — external to this crate)
/// consume this structure out of a successful [`CallResult`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    /// Concatenated character data directly inside this element.
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    fn new(name: String) -> Self {
        Self {
            name,
            attrs: Vec::new(),
            text: String::new(),
            children: Vec::new(),
        }
    }

    /// First child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Text content of the first child element with the given name.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// Value of the named attribute.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Outcome of one method invocation: a structured payload or a structured
/// failure. Never both.
#[derive(Debug, Clone, PartialEq)]
pub enum CallResult {
    Success(XmlNode),
    Failure(ServerError),
}

impl CallResult {
    pub fn is_success(&self) -> bool {
        matches!(self, CallResult::Success(_))
    }

    /// The payload, if this is a success.
    pub fn success(self) -> Option<XmlNode> {
        match self {
            CallResult::Success(node) => Some(node),
            CallResult::Failure(_) => None,
        }
    }

    /// The server error, if this is a failure.
    pub fn failure(self) -> Option<ServerError> {
        match self {
            CallResult::Success(_) => None,
            CallResult::Failure(err) => Some(err),
        }
    }
}

fn malformed(err: impl std::fmt::Display) -> ClientError {
    ClientError::MalformedXml(err.to_string())
}

fn element(e: &quick_xml::events::BytesStart<'_>) -> Result<XmlNode, ClientError> {
    let mut node = XmlNode::new(String::from_utf8_lossy(e.name().as_ref()).into_owned());
    for attr in e.attributes() {
        let attr = attr.map_err(malformed)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(malformed)?.into_owned();
        node.attrs.push((key, value));
    }
    Ok(node)
}

/// Parse an XML document into its root element in a single streaming pass.
pub fn parse_xml(body: &str) -> Result<XmlNode, ClientError> {
    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event().map_err(malformed)? {
            Event::Start(e) => stack.push(element(&e)?),
            Event::Empty(e) => {
                let node = element(&e)?;
                attach(node, &mut stack, &mut root)?;
            }
            Event::End(_) => {
                // Mismatched end tags are rejected by the reader itself.
                let node = stack
                    .pop()
                    .ok_or_else(|| ClientError::MalformedXml("unexpected end tag".to_string()))?;
                attach(node, &mut stack, &mut root)?;
            }
            Event::Text(t) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&t.unescape().map_err(malformed)?);
                }
            }
            Event::CData(t) => {
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&t.into_inner()));
                }
            }
            Event::Eof => break,
            // Declarations, comments, processing instructions and doctypes
            // carry no payload content.
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ClientError::MalformedXml(format!(
            "unclosed element `{}`",
            stack[stack.len() - 1].name
        )));
    }
    root.ok_or_else(|| ClientError::MalformedXml("no root element".to_string()))
}

fn attach(
    node: XmlNode,
    stack: &mut Vec<XmlNode>,
    root: &mut Option<XmlNode>,
) -> Result<(), ClientError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(node);
    } else if root.is_some() {
        return Err(ClientError::MalformedXml(
            "multiple root elements".to_string(),
        ));
    } else {
        *root = Some(node);
    }
    Ok(())
}

/// Decode the server's own error payload into a [`ServerError`].
///
/// A well-formed error element must carry `status`, `code` and `message`;
/// a violation of that schema is fatal, not a recoverable failure.
fn decode_error(node: &XmlNode) -> Result<ServerError, ClientError> {
    let status = node
        .child_text("status")
        .ok_or_else(|| ClientError::Payload("error element missing <status>".to_string()))?;
    let status = status
        .trim()
        .parse::<u16>()
        .map_err(|_| ClientError::Payload(format!("non-numeric error status `{status}`")))?;
    let code = node
        .child_text("code")
        .ok_or_else(|| ClientError::Payload("error element missing <code>".to_string()))?
        .to_string();
    let message = node
        .child_text("message")
        .ok_or_else(|| ClientError::Payload("error element missing <message>".to_string()))?
        .to_string();
    let details = node
        .child_text("details")
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    Ok(ServerError {
        status,
        code,
        message,
        details,
    })
}

/// Classify a raw response into a [`CallResult`].
pub fn classify(response: HttpResponse) -> Result<CallResult, ClientError> {
    let media_type = response
        .content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim();

    if media_type != "application/xml" {
        return Ok(CallResult::Failure(ServerError {
            status: response.status,
            code: response.reason,
            message: UNEXPECTED_RESULT.to_string(),
            details: Some(response.body),
        }));
    }

    let root = parse_xml(&response.body)?;
    if let Some(error) = root.child("error") {
        return Ok(CallResult::Failure(decode_error(error)?));
    }
    Ok(CallResult::Success(root))
}
