//! Schema documents.
//!
//! A schema is a JSON object with an optional `meta` object and a `types`
//! array. Each type may be written in the compact array form
//!
//! ```json
//! ["Point", "Record", [], "A point", [[1, "x", "Integer", [], ""], [2, "y", "Integer", [], ""]]]
//! ```
//!
//! or the verbose object form
//!
//! ```json
//! {"name": "Point", "type": "Record", "description": "A point",
//!  "fields": [{"id": 1, "name": "x", "type": "Integer"}, {"id": 2, "name": "y", "type": "Integer"}]}
//! ```
//!
//! and both read into the same [`TypeModel`].

pub(crate) mod reader;
mod writer;

use crate::lint::{self, LintError, LintErrorKind, LintErrors};
use crate::type_def::{Meta, TypeModel};

/// Textual form of a written schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Form {
    /// Objects with named keys and named options.
    #[default]
    Verbose,
    /// Arrays with option strings.
    Compact,
}

/// Reads and lints a schema document.
pub fn load(doc: &serde_json::Value) -> Result<TypeModel, LintErrors> {
    let parsed = reader::parse(doc);
    lint::check(parsed.meta, parsed.defs, parsed.errors, &parsed.placeholders)
}

pub fn load_str(text: &str) -> Result<TypeModel, LintErrors> {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(doc) => load(&doc),
        Err(e) => Err(syntax_error(e)),
    }
}

pub fn load_slice(bytes: &[u8]) -> Result<TypeModel, LintErrors> {
    match serde_json::from_slice::<serde_json::Value>(bytes) {
        Ok(doc) => load(&doc),
        Err(e) => Err(syntax_error(e)),
    }
}

fn syntax_error(e: serde_json::Error) -> LintErrors {
    let error = LintError::new(
        LintErrorKind::Document,
        format!("line {}, column {}", e.line(), e.column()),
        e.to_string(),
    );
    LintErrors::from_errors(vec![error])
}

/// Writes a model back out as a schema document.
pub fn to_document(model: &TypeModel, form: Form) -> serde_json::Value {
    writer::write(model, form)
}

pub fn to_string_pretty(model: &TypeModel, form: Form) -> String {
    let doc = to_document(model, form);
    serde_json::to_string_pretty(&doc).unwrap_or_else(|_| doc.to_string())
}

/// The `meta` object of a written schema, with defaults left out.
pub fn meta_to_json(meta: &Meta) -> serde_json::Map<String, serde_json::Value> {
    writer::meta(meta)
}

/// Reads a `meta` object on its own, for notations that carry schema
/// metadata outside a JSON document.
pub fn meta_from_json(obj: &serde_json::Map<String, serde_json::Value>) -> Result<Meta, LintErrors> {
    let parsed = reader::parse_meta(obj);
    if parsed.errors.is_empty() {
        Ok(parsed.meta)
    } else {
        Err(LintErrors::from_errors(parsed.errors))
    }
}
