//! Verify URL building and response classification against the JSON test
//! vectors stored in `test-vectors/`.
//!
//! Each vector file describes inputs and the expected output or failure
//! kind, so the wire-format contract is pinned down in data rather than
//! scattered across assertions.

use std::collections::BTreeMap;

use lookup_core::{classify, urlbuilder, CallResult, ClientError, HttpResponse};

fn string_map(value: &serde_json::Value) -> BTreeMap<String, String> {
    value
        .as_object()
        .unwrap()
        .iter()
        .map(|(k, v)| (k.clone(), v.as_str().unwrap().to_string()))
        .collect()
}

#[test]
fn url_test_vectors() {
    let raw = include_str!("../../test-vectors/url.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let base_path = case["base_path"].as_str().unwrap();
        let template = case["template"].as_str().unwrap();
        let path_params = string_map(&case["path_params"]);
        let query_params = string_map(&case["query_params"]);

        let result = urlbuilder::build(base_path, template, &path_params, &query_params);

        if let Some(expected_error) = case.get("expected_error") {
            let err = result.unwrap_err();
            match expected_error.as_str().unwrap() {
                "Template" => {
                    assert!(matches!(err, ClientError::Template(_)), "{name}: expected Template")
                }
                other => panic!("{name}: unknown expected_error: {other}"),
            }
        } else {
            let url = result.unwrap();
            assert_eq!(url, case["expected"].as_str().unwrap(), "{name}: url");
        }
    }
}

#[test]
fn classify_test_vectors() {
    let raw = include_str!("../../test-vectors/classify.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let sim = &case["response"];
        let response = HttpResponse {
            status: sim["status"].as_u64().unwrap() as u16,
            reason: sim["reason"].as_str().unwrap().to_string(),
            content_type: sim["content_type"].as_str().unwrap().to_string(),
            body: sim["body"].as_str().unwrap().to_string(),
        };

        let expected = &case["expected"];
        match expected["kind"].as_str().unwrap() {
            "success" => {
                let payload = classify(response).unwrap().success();
                let payload = payload.unwrap_or_else(|| panic!("{name}: expected success"));
                assert_eq!(payload.name, expected["root"].as_str().unwrap(), "{name}: root");
            }
            "failure" => {
                let result = classify(response).unwrap();
                let err = match result {
                    CallResult::Failure(err) => err,
                    CallResult::Success(_) => panic!("{name}: expected failure"),
                };
                assert_eq!(u64::from(err.status), expected["status"].as_u64().unwrap(), "{name}: status");
                assert_eq!(err.code, expected["code"].as_str().unwrap(), "{name}: code");
                assert_eq!(err.message, expected["message"].as_str().unwrap(), "{name}: message");
                match expected.get("details") {
                    Some(details) => {
                        assert_eq!(err.details.as_deref(), details.as_str(), "{name}: details")
                    }
                    None => assert_eq!(err.details, None, "{name}: details"),
                }
            }
            "fatal" => {
                assert!(classify(response).is_err(), "{name}: expected fatal error");
            }
            other => panic!("{name}: unknown expected kind: {other}"),
        }
    }
}
