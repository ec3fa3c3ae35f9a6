//! Shared test utilities for building raw manifests

use serde_json::{json, Value};

/// A top-level document around `modules`.
pub fn document(modules: Vec<Value>) -> Value {
    json!({ "schemaVersion": "1.0.0", "modules": modules })
}

/// A module holding `declarations` and no exports.
pub fn module(path: &str, declarations: Vec<Value>) -> Value {
    json!({ "kind": "javascript-module", "path": path, "declarations": declarations })
}

/// A custom element class with no features.
pub fn custom_element(name: &str, tag: &str) -> Value {
    json!({ "kind": "class", "name": name, "customElement": true, "tagName": tag })
}
