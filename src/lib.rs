//! # custom-elements-manifest-parser
//!
//! A Rust library for turning a decoded [custom elements manifest] into a typed, cross-linked
//! tree of modules, declarations, and exports.
//!
//! ## Overview
//!
//! A manifest is a deeply recursive, polymorphic document: modules hold declarations and exports
//! of several unrelated shapes in shared array fields, and each of those may hold further nested
//! nodes and small value objects. This crate builds that tree in two steps:
//!
//! 1. **Construction**: each entity's raw attributes are checked against a strict declarative
//!    contract ([`schema::Schema`]). Missing required fields, wrongly shaped values and (by
//!    default) unknown fields abort the whole parse.
//! 2. **Resolution**: nested node lists are dispatched on their `kind` through the engine's
//!    [`registry::NodeRegistry`], and auxiliary value fields are built through the engine's
//!    [`roles::ValueTypeTable`]. Every declaration and export receives a weak back-reference to
//!    the module that contains it.
//!
//! Both tables belong to one [`engine::Engine`], so callers can replace the constructor for a
//! single kind or value role without affecting any other engine.
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//!
//! let manifest = cem_parser::parse(&json!({
//!     "schemaVersion": "1.0.0",
//!     "modules": [{
//!         "kind": "javascript-module",
//!         "path": "src/light-pen.js",
//!         "declarations": [{
//!             "kind": "class",
//!             "name": "LightPen",
//!             "customElement": true,
//!             "tagName": "light-pen",
//!             "slots": [{ "name": "title" }]
//!         }],
//!         "exports": [{
//!             "kind": "custom-element-definition",
//!             "name": "light-pen",
//!             "declaration": { "name": "LightPen", "module": "src/light-pen.js" }
//!         }]
//!     }]
//! }))
//! .unwrap();
//!
//! let elements = manifest.find_all_tag_names();
//! let pen = elements["light-pen"];
//! assert_eq!(pen.parent_module().unwrap().path, "src/light-pen.js");
//! ```
//!
//! ## Module Guide
//!
//! - **[`engine`]**: the public entry point (`Engine::parse`, queries, overrides)
//! - **[`manifest`]**: the manifest root, resolution, and query helpers
//! - **[`nodes`]**: the `kind`-discriminated entities
//! - **[`traits`]**: field groups shared between node kinds
//! - **[`values`]**: auxiliary value types (references, types, events, slots, ...)
//! - **[`registry`]** / **[`roles`]**: the two override tables
//! - **[`schema`]**: attribute contracts
//! - **[`config`]**: parser switches
//!
//! [custom elements manifest]: https://github.com/webcomponents/custom-elements-manifest

pub mod config;
pub mod engine;
pub mod error;
pub mod manifest;
pub mod nodes;
pub mod registry;
pub mod roles;
pub mod schema;
#[cfg(test)]
mod tests;
pub mod traits;
pub mod values;

pub use error::*;

use manifest::Manifest;
use serde_json::Value;

/// Parse a decoded manifest with the stock tables and default configuration.
pub fn parse(raw: &Value) -> Result<Manifest, ManifestError> {
    let engine = engine::Engine::new();
    let root = engine.build_manifest(raw)?;
    engine.resolve(root)
}
