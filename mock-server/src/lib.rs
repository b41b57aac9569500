//! Mock of the Lookup directory web service for client tests.
//!
//! Speaks the XML wire contract the client core expects: every protocol
//! response is `application/xml` with a `<result>` root, and server-side
//! failures are `<error>` payloads inside that root. One deliberately
//! broken route returns `text/html` so the transport-framing path can be
//! exercised. Writes require Basic authentication as a known group;
//! anonymous access is read-only.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, put},
    Form, Router,
};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use tokio::{net::TcpListener, sync::RwLock};

/// One directory entry.
#[derive(Clone, Debug)]
pub struct Person {
    pub scheme: String,
    pub identifier: String,
    pub name: String,
    pub email: String,
}

/// The writable group and its password.
pub const GROUP: &str = "devgroup";
pub const GROUP_PASSWORD: &str = "secret";

#[derive(Clone)]
struct Directory {
    people: Arc<Vec<Person>>,
    notes: Arc<RwLock<HashMap<String, String>>>,
}

fn seed_people() -> Vec<Person> {
    vec![
        Person {
            scheme: "crsid".to_string(),
            identifier: "dar17".to_string(),
            name: "D. Rasheed".to_string(),
            email: "dar17@example.org".to_string(),
        },
        Person {
            scheme: "crsid".to_string(),
            identifier: "abc12".to_string(),
            name: "A. B. Charles".to_string(),
            email: "abc12@example.org".to_string(),
        },
    ]
}

pub fn app() -> Router {
    let directory = Directory {
        people: Arc::new(seed_people()),
        notes: Arc::new(RwLock::new(HashMap::new())),
    };
    Router::new()
        .route("/api/v1/person/search", get(search_people))
        .route("/api/v1/person/{scheme}/{identifier}", get(get_person))
        .route("/api/v1/group/{name}/notes", put(put_group_notes))
        .route("/broken", get(broken))
        .with_state(directory)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Escape character data for inclusion in an XML text node or attribute.
fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn xml(status: StatusCode, body: String) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/xml")],
        body,
    )
        .into_response()
}

fn error_xml(status: StatusCode, code: &str, message: &str) -> Response {
    xml(
        status,
        format!(
            "<result><error><status>{}</status><code>{}</code><message>{}</message></error></result>",
            status.as_u16(),
            escape(code),
            escape(message),
        ),
    )
}

fn person_xml(person: &Person) -> String {
    format!(
        "<person><identifier scheme=\"{}\">{}</identifier><name>{}</name><email>{}</email></person>",
        escape(&person.scheme),
        escape(&person.identifier),
        escape(&person.name),
        escape(&person.email),
    )
}

/// Decode the Basic credentials from the request, if any.
fn credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = BASE64.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

async fn get_person(
    State(directory): State<Directory>,
    Path((scheme, identifier)): Path<(String, String)>,
    Query(_query): Query<HashMap<String, String>>,
) -> Response {
    match directory
        .people
        .iter()
        .find(|p| p.scheme == scheme && p.identifier == identifier)
    {
        Some(person) => xml(
            StatusCode::OK,
            format!("<result>{}</result>", person_xml(person)),
        ),
        None => error_xml(StatusCode::NOT_FOUND, "NotFound", "No such person"),
    }
}

async fn search_people(
    State(directory): State<Directory>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let Some(needle) = query.get("query") else {
        return error_xml(StatusCode::BAD_REQUEST, "BadRequest", "query parameter required");
    };
    let needle = needle.to_lowercase();
    let matches: String = directory
        .people
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .map(person_xml)
        .collect();
    xml(
        StatusCode::OK,
        format!("<result><people>{matches}</people></result>"),
    )
}

async fn put_group_notes(
    State(directory): State<Directory>,
    Path(name): Path<String>,
    headers: HeaderMap,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    match credentials(&headers) {
        Some((user, pass)) if user == GROUP && pass == GROUP_PASSWORD => {}
        Some((user, _)) if user != "anonymous" => {
            return error_xml(StatusCode::UNAUTHORIZED, "Unauthorized", "Bad group credentials");
        }
        _ => {
            return error_xml(
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                "Write access requires group authentication",
            );
        }
    }

    let Some(note) = form.get("note") else {
        return error_xml(StatusCode::BAD_REQUEST, "BadRequest", "note parameter required");
    };
    directory.notes.write().await.insert(name, note.clone());
    xml(
        StatusCode::OK,
        format!("<result><note>{}</note></result>", escape(note)),
    )
}

/// Deliberately non-protocol response used to test transport framing.
async fn broken() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        [(header::CONTENT_TYPE, "text/html")],
        "<html>boom</html>",
    )
        .into_response()
}
