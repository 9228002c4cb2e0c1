//! Normalize a structured specification into endpoint descriptors.
//!
//! Also resolves the example request bodies and query parameters a
//! specification embeds, used to pre-fill live test requests.

use super::spec_fetcher::SpecDocument;
use crate::endpoint::{EndpointDescriptor, HttpMethod};
use serde_json::{Map, Value};

/// One descriptor per `paths × method` entry, in document order.
///
/// Methods are upper-cased. The summary is `summary` when non-empty, else
/// `description`, else empty, trimmed.
pub fn extract_endpoints(spec: &SpecDocument) -> Vec<EndpointDescriptor> {
    let Some(paths) = spec.paths() else {
        return Vec::new();
    };

    let mut endpoints = Vec::new();
    for (path, methods) in paths {
        let Some(methods) = methods.as_object() else {
            continue;
        };
        for (method, info) in methods {
            // Path-item fields such as `parameters` or `servers` are not operations.
            if !info.is_object() {
                continue;
            }
            endpoints.push(EndpointDescriptor::new(
                HttpMethod::from_name(method),
                path.clone(),
                operation_summary(info),
            ));
        }
    }
    endpoints
}

fn operation_summary(info: &Value) -> String {
    let non_empty = |key: &str| {
        info.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    };
    non_empty("summary")
        .or_else(|| non_empty("description"))
        .unwrap_or("")
        .trim()
        .to_string()
}

/// Locate the operation object for an exact path and a case-insensitive method.
fn find_operation<'a>(spec: &'a SpecDocument, path: &str, method: &str) -> Option<&'a Value> {
    let item = spec.paths()?.get(path)?.as_object()?;
    item.iter()
        .find(|(m, _)| m.eq_ignore_ascii_case(method))
        .map(|(_, op)| op)
}

/// Example request body for `(path, method)`, if the specification declares one.
///
/// OpenAPI 3 media examples are preferred over schema examples; Swagger 2
/// `in: body` parameters are consulted last.
pub fn example_request_body(spec: &SpecDocument, path: &str, method: &str) -> Option<Value> {
    let op = find_operation(spec, path, method)?;

    if let Some(content) = op
        .get("requestBody")
        .and_then(|b| b.get("content"))
        .and_then(Value::as_object)
    {
        for media in content.values() {
            if let Some(example) = media.get("example") {
                return Some(example.clone());
            }
            if let Some(value) = media
                .get("examples")
                .and_then(Value::as_object)
                .and_then(|examples| examples.values().find_map(|e| e.get("value")))
            {
                return Some(value.clone());
            }
            if let Some(example) = media.get("schema").and_then(|s| s.get("example")) {
                return Some(example.clone());
            }
        }
    }

    merged_parameters(spec, path, op)
        .into_iter()
        .filter(|p| p.get("in").and_then(Value::as_str) == Some("body"))
        .find_map(|p| {
            p.get("schema")
                .and_then(|s| s.get("example"))
                .or_else(|| p.get("x-example"))
                .cloned()
        })
}

/// Example query parameters for `(path, method)` as a `{name: value}` object.
///
/// Absent when no query parameter carries an example or default.
pub fn example_query_params(spec: &SpecDocument, path: &str, method: &str) -> Option<Value> {
    let op = find_operation(spec, path, method)?;

    let mut params = Map::new();
    for p in merged_parameters(spec, path, op) {
        if p.get("in").and_then(Value::as_str) != Some("query") {
            continue;
        }
        let Some(name) = p.get("name").and_then(Value::as_str) else {
            continue;
        };
        let schema = p.get("schema");
        let example = p
            .get("example")
            .or_else(|| schema.and_then(|s| s.get("example")))
            .or_else(|| p.get("x-example"))
            .or_else(|| schema.and_then(|s| s.get("default")));
        if let Some(example) = example {
            params.insert(name.to_string(), example.clone());
        }
    }

    if params.is_empty() {
        None
    } else {
        Some(Value::Object(params))
    }
}

/// Path-level parameters followed by operation-level ones; an operation
/// parameter replaces a path parameter with the same `(name, in)`.
fn merged_parameters<'a>(spec: &'a SpecDocument, path: &str, op: &'a Value) -> Vec<&'a Value> {
    let key = |p: &Value| {
        (
            p.get("name").and_then(Value::as_str).unwrap_or("").to_string(),
            p.get("in").and_then(Value::as_str).unwrap_or("").to_string(),
        )
    };

    let path_level = spec
        .paths()
        .and_then(|paths| paths.get(path))
        .and_then(|item| item.get("parameters"))
        .and_then(Value::as_array);
    let op_level = op.get("parameters").and_then(Value::as_array);

    let mut merged: Vec<&Value> = Vec::new();
    for p in path_level.into_iter().flatten() {
        merged.push(p);
    }
    for p in op_level.into_iter().flatten() {
        let k = key(p);
        merged.retain(|existing| key(*existing) != k);
        merged.push(p);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn spec(raw: &str) -> SpecDocument {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_extract_mirrors_document_order() {
        let doc = spec(
            r#"{
                "openapi": "3.0.0",
                "paths": {
                    "/zoo": {"post": {"summary": "add"}, "get": {"summary": "list"}},
                    "/alpha": {"delete": {"description": "  remove it  "}},
                    "/hello": {"get": {"summary": "say hello"}}
                }
            }"#,
        );
        let eps = extract_endpoints(&doc);
        let lines: Vec<String> = eps.iter().map(|e| e.one_line()).collect();
        assert_eq!(
            lines,
            vec![
                "POST /zoo - add",
                "GET /zoo - list",
                "DELETE /alpha - remove it",
                "GET /hello - say hello",
            ]
        );
    }

    #[test]
    fn test_extract_counts_every_entry_and_upper_cases() {
        let doc = spec(
            r#"{"paths": {
                "/a": {"get": {}, "head": {}, "options": {}},
                "/b": {"patch": {"summary": ""}}
            }}"#,
        );
        let eps = extract_endpoints(&doc);
        assert_eq!(eps.len(), 4);
        let methods: Vec<&str> = eps.iter().map(|e| e.method.as_str()).collect();
        assert_eq!(methods, vec!["GET", "HEAD", "OPTIONS", "PATCH"]);
        assert!(eps.iter().all(|e| e.summary.is_empty()));
    }

    #[test]
    fn test_empty_summary_falls_back_to_description() {
        let doc = spec(r#"{"paths": {"/x": {"get": {"summary": "", "description": "desc"}}}}"#);
        assert_eq!(extract_endpoints(&doc)[0].summary, "desc");
    }

    #[test]
    fn test_path_item_fields_are_not_operations() {
        let doc = spec(
            r#"{"paths": {"/x": {
                "summary": "shared",
                "parameters": [{"in": "query", "name": "q"}],
                "get": {"summary": "read"}
            }}}"#,
        );
        let eps = extract_endpoints(&doc);
        assert_eq!(eps.len(), 1);
        assert_eq!(eps[0].one_line(), "GET /x - read");
    }

    #[test]
    fn test_missing_paths_yields_nothing() {
        assert!(extract_endpoints(&spec(r#"{"openapi": "3.1.0"}"#)).is_empty());
        assert!(extract_endpoints(&spec(r#"{"paths": {"/x": "bogus"}}"#)).is_empty());
    }

    #[test]
    fn test_example_request_body_openapi3() {
        let doc = spec(
            r#"{"paths": {"/items": {"post": {"requestBody": {"content": {
                "application/json": {"example": {"name": "widget"}}
            }}}}}}"#,
        );
        assert_eq!(
            example_request_body(&doc, "/items", "POST"),
            Some(json!({"name": "widget"}))
        );
        assert_eq!(example_request_body(&doc, "/items", "get"), None);
        assert_eq!(example_request_body(&doc, "/other", "post"), None);
    }

    #[test]
    fn test_example_request_body_named_examples_and_schema() {
        let named = spec(
            r#"{"paths": {"/a": {"put": {"requestBody": {"content": {"application/json": {
                "examples": {"first": {"value": {"id": 1}}, "second": {"value": {"id": 2}}}
            }}}}}}}"#,
        );
        assert_eq!(example_request_body(&named, "/a", "put"), Some(json!({"id": 1})));

        let schema = spec(
            r#"{"paths": {"/a": {"put": {"requestBody": {"content": {"application/json": {
                "schema": {"type": "object", "example": {"id": 9}}
            }}}}}}}"#,
        );
        assert_eq!(example_request_body(&schema, "/a", "put"), Some(json!({"id": 9})));
    }

    #[test]
    fn test_example_request_body_swagger2() {
        let doc = spec(
            r#"{"swagger": "2.0", "paths": {"/pets": {"post": {"parameters": [
                {"in": "body", "name": "pet", "schema": {"example": {"name": "rex"}}}
            ]}}}}"#,
        );
        assert_eq!(
            example_request_body(&doc, "/pets", "post"),
            Some(json!({"name": "rex"}))
        );
    }

    #[test]
    fn test_example_query_params() {
        let doc = spec(
            r#"{"paths": {"/search": {
                "parameters": [
                    {"in": "query", "name": "limit", "schema": {"default": 10}},
                    {"in": "query", "name": "page", "example": 1}
                ],
                "get": {"parameters": [
                    {"in": "query", "name": "q", "example": "shoes"},
                    {"in": "query", "name": "limit", "example": 5},
                    {"in": "query", "name": "sort"},
                    {"in": "header", "name": "X-Trace", "example": "abc"}
                ]}
            }}}"#,
        );
        assert_eq!(
            example_query_params(&doc, "/search", "GET"),
            Some(json!({"page": 1, "q": "shoes", "limit": 5}))
        );
    }

    #[test]
    fn test_example_query_params_absent() {
        let doc = spec(
            r#"{"paths": {"/search": {"get": {"parameters": [
                {"in": "query", "name": "q"}
            ]}}}}"#,
        );
        assert_eq!(example_query_params(&doc, "/search", "get"), None);
        assert_eq!(example_query_params(&doc, "/missing", "get"), None);
    }
}
