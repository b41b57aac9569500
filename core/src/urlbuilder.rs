//! Relative URL construction from a path template and coerced parameters.
//!
//! # Design
//! Templates use `%(name)s` placeholders, matching the web service's
//! documented method paths (e.g. `api/v1/person/%(scheme)s/%(identifier)s`).
//! Every substituted value is form-encoded (space becomes `+`, reserved
//! characters become `%XX`) before insertion, so a caller-supplied value can
//! never change the URL structure. Template problems are reported before
//! any network activity. Inputs are read-only; the query map with the
//! injected `flatten` default is built fresh on every call.

use std::collections::BTreeMap;

use url::form_urlencoded;

use crate::error::ClientError;

/// Form-encode a single value: space to `+`, reserved characters to `%XX`.
fn quote_plus(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

/// Substitute `%(name)s` placeholders in `template` with encoded values.
fn substitute(template: &str, path_params: &BTreeMap<String, String>) -> Result<String, ClientError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("%(") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after.find(')').ok_or_else(|| {
            ClientError::Template(format!("unterminated placeholder in `{template}`"))
        })?;
        let name = &after[..end];
        if !after[end + 1..].starts_with('s') {
            return Err(ClientError::Template(format!(
                "placeholder `{name}` must end with `)s` in `{template}`"
            )));
        }
        let value = path_params.get(name).ok_or_else(|| {
            ClientError::Template(format!("no value for placeholder `{name}`"))
        })?;
        out.push_str(&quote_plus(value));
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    Ok(out)
}

/// Build the relative URL for a method invocation.
///
/// `base_path` must start and end with `/` (the connection normalizes it).
/// Unless the caller supplied their own `flatten` query parameter,
/// `flatten=true` is added — the protocol default requesting simplified,
/// non-nested XML from the server.
pub fn build(
    base_path: &str,
    template: &str,
    path_params: &BTreeMap<String, String>,
    query_params: &BTreeMap<String, String>,
) -> Result<String, ClientError> {
    let path = substitute(template, path_params)?;

    let mut query = query_params.clone();
    query
        .entry("flatten".to_string())
        .or_insert_with(|| "true".to_string());

    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in &query {
        serializer.append_pair(key, value);
    }
    let query_string = serializer.finish();

    let path = path.strip_prefix('/').unwrap_or(&path);
    Ok(format!("{base_path}{path}?{query_string}"))
}
