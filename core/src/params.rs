//! Typed request parameters and their coercion to wire-format strings.
//!
//! # Design
//! The server takes every parameter as a string, but call sites deal in
//! booleans, dates, lists and entity references. `ParamValue` is a closed
//! variant type covering exactly the kinds the protocol accepts, so adding
//! a new kind is a compile-time-checked change rather than a runtime type
//! probe. Coercion is a pure function from a typed map to a string map;
//! absent (`None`) values are dropped rather than sent as empty strings.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};

/// Three-letter English month abbreviations for the wire date format.
/// Fixed table so the output never depends on the process locale.
const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun",
    "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Reference to a directory entity that encodes itself as a single
/// wire-format string, e.g. `person/dar17`.
///
/// The full DTO catalogue (people, institutions, groups) lives outside this
/// crate; only the canonical encoding matters here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRef {
    /// Entity kind, e.g. `"person"`, `"institution"`, `"group"`.
    pub kind: String,
    /// The entity's identifier within its kind.
    pub id: String,
}

impl EntityRef {
    pub fn new(kind: &str, id: &str) -> Self {
        Self {
            kind: kind.to_string(),
            id: id.to_string(),
        }
    }

    /// The canonical single-string encoding sent to the server.
    pub fn encoded(&self) -> String {
        format!("{}/{}", self.kind, self.id)
    }
}

/// A single request parameter value, before coercion to its wire form.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// Sent as the literal `"true"` or `"false"`.
    Bool(bool),
    /// Sent as `DD Mon YYYY`, e.g. `02 Jan 2024`.
    Date(NaiveDate),
    /// Elements joined with a single comma. Embedded commas are not
    /// escaped; that is the caller's responsibility.
    List(Vec<String>),
    /// A directory entity reference; sent as its canonical encoding.
    Ref(EntityRef),
    /// A numeric identifier; sent in decimal.
    Int(i64),
    /// Passed through unchanged.
    Text(String),
}

impl From<bool> for ParamValue {
    fn from(v: bool) -> Self {
        ParamValue::Bool(v)
    }
}

impl From<NaiveDate> for ParamValue {
    fn from(v: NaiveDate) -> Self {
        ParamValue::Date(v)
    }
}

impl From<i64> for ParamValue {
    fn from(v: i64) -> Self {
        ParamValue::Int(v)
    }
}

impl From<&str> for ParamValue {
    fn from(v: &str) -> Self {
        ParamValue::Text(v.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(v: String) -> Self {
        ParamValue::Text(v)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(v: Vec<String>) -> Self {
        ParamValue::List(v)
    }
}

impl From<EntityRef> for ParamValue {
    fn from(v: EntityRef) -> Self {
        ParamValue::Ref(v)
    }
}

/// An ordered parameter map as supplied by call sites. `None` marks an
/// optional parameter the caller chose not to send.
pub type Params = BTreeMap<String, Option<ParamValue>>;

/// Convenience constructor for a parameter map from literal pairs.
pub fn params<K: Into<String>, const N: usize>(pairs: [(K, Option<ParamValue>); N]) -> Params {
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

/// Convert a typed parameter map into the string map sent to the server.
///
/// Keys whose value is `None` are omitted. The input is not modified; each
/// call produces a fresh map.
pub fn coerce(params: &Params) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (key, value) in params {
        let Some(value) = value else { continue };
        let coerced = match value {
            ParamValue::Bool(true) => "true".to_string(),
            ParamValue::Bool(false) => "false".to_string(),
            ParamValue::Date(d) => format!(
                "{:02} {} {}",
                d.day(),
                MONTHS[d.month0() as usize],
                d.year()
            ),
            ParamValue::List(items) => items.join(","),
            ParamValue::Ref(entity) => entity.encoded(),
            ParamValue::Int(n) => n.to_string(),
            ParamValue::Text(s) => s.clone(),
        };
        out.insert(key.clone(), coerced);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans_coerce_to_literal_true_false() {
        let input = params([
            ("yes", Some(ParamValue::Bool(true))),
            ("no", Some(ParamValue::Bool(false))),
        ]);
        let out = coerce(&input);
        assert_eq!(out["yes"], "true");
        assert_eq!(out["no"], "false");
    }

    #[test]
    fn dates_coerce_to_fixed_day_month_year() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let input = params([("since", Some(ParamValue::Date(date)))]);
        assert_eq!(coerce(&input)["since"], "02 Jan 2024");
    }

    #[test]
    fn date_month_roundtrips_through_abbreviation_table() {
        for month in 1..=12u32 {
            let date = NaiveDate::from_ymd_opt(2023, month, 15).unwrap();
            let input = params([("d", Some(ParamValue::Date(date)))]);
            let wire = coerce(&input)["d"].clone();
            let abbr = wire.split(' ').nth(1).unwrap();
            let recovered = MONTHS.iter().position(|m| *m == abbr).unwrap() as u32 + 1;
            assert_eq!(recovered, month);
        }
    }

    #[test]
    fn lists_join_with_single_comma() {
        let input = params([(
            "fetch",
            Some(ParamValue::List(vec![
                "email".to_string(),
                "title".to_string(),
                "phone".to_string(),
            ])),
        )]);
        let out = coerce(&input);
        assert_eq!(out["fetch"], "email,title,phone");
        let split: Vec<&str> = out["fetch"].split(',').collect();
        assert_eq!(split, vec!["email", "title", "phone"]);
    }

    #[test]
    fn entity_refs_use_canonical_encoding() {
        let input = params([(
            "member",
            Some(ParamValue::Ref(EntityRef::new("person", "dar17"))),
        )]);
        assert_eq!(coerce(&input)["member"], "person/dar17");
    }

    #[test]
    fn integers_coerce_to_decimal() {
        let input = params([("instid", Some(ParamValue::Int(12345)))]);
        assert_eq!(coerce(&input)["instid"], "12345");
    }

    #[test]
    fn text_passes_through_unchanged() {
        let input = params([("name", Some(ParamValue::from("J. Smith, Esq.")))]);
        assert_eq!(coerce(&input)["name"], "J. Smith, Esq.");
    }

    #[test]
    fn absent_values_are_dropped() {
        let input = params([
            ("present", Some(ParamValue::from("x"))),
            ("absent", None),
        ]);
        let out = coerce(&input);
        assert!(out.contains_key("present"));
        assert!(!out.contains_key("absent"));
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn coerce_does_not_modify_input() {
        let input = params([("a", Some(ParamValue::Bool(true))), ("b", None)]);
        let before = input.clone();
        let _ = coerce(&input);
        let _ = coerce(&input);
        assert_eq!(input, before);
    }
}
