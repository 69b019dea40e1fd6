//! Verify encoding, option merging and normalization against JSON test
//! vectors stored in `test-vectors/`.
//!
//! Comparing parsed JSON (not raw strings) avoids false negatives from
//! field-ordering differences.

use entity_core::{build_options, encode_query, ApiResponse, EntityRegistry, Normalized, Query, RequestOptions};

// ---------------------------------------------------------------------------
// Query encoding
// ---------------------------------------------------------------------------

#[test]
fn query_test_vectors() {
    let raw = include_str!("../../test-vectors/query.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let query: Query = serde_json::from_value(case["query"].clone()).unwrap();
        assert_eq!(encode_query(&query), case["expected"].as_str().unwrap(), "{name}");
    }
}

// ---------------------------------------------------------------------------
// Option merging
// ---------------------------------------------------------------------------

#[test]
fn options_test_vectors() {
    let raw = include_str!("../../test-vectors/options.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let token = case["token"].as_str();
        let options: RequestOptions = serde_json::from_value(case["options"].clone()).unwrap();

        let merged = build_options(token, options);

        let method = serde_json::to_value(merged.method).unwrap();
        assert_eq!(method, case["expected_method"], "{name}: method");

        let expected_headers: Vec<(String, String)> =
            serde_json::from_value(case["expected_headers"].clone()).unwrap();
        assert_eq!(merged.headers, expected_headers, "{name}: headers");
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

#[test]
fn normalize_test_vectors() {
    let raw = include_str!("../../test-vectors/normalize.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();
    let registry: EntityRegistry = serde_json::from_value(vectors["registry"].clone()).unwrap();

    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let entity_type = case["entity_type"].as_str().unwrap();
        let response = ApiResponse::Json(case["response"].clone());

        let normalized = match case["form"].as_str().unwrap() {
            "single" => registry.normalize_single(&response, entity_type),
            "collection" => registry.normalize_collection(&response, entity_type),
            other => panic!("{name}: unknown form {other}"),
        }
        .unwrap();

        if case.get("expected_passthrough").is_some() {
            assert_eq!(normalized, Normalized::PassThrough(response), "{name}: pass-through");
            continue;
        }

        assert_eq!(serde_json::to_value(&normalized).unwrap(), case["expected"], "{name}: graph");

        // Reassembling the graph must reproduce the response.
        let graph = normalized.graph().unwrap();
        assert_eq!(registry.denormalize(graph, entity_type), case["response"], "{name}: round trip");
    }
}
