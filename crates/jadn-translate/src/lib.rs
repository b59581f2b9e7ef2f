//! `jadn-translate` — schema translators for [`jadn_type`] models.
//!
//! Each notation is a [`Translator`]: JADN JSON in both textual forms,
//! JADN-IDL in both directions, and JSON Schema and Markdown tables for
//! export only.
//!
//! ```
//! use jadn_translate::registry;
//! use jadn_type::schema;
//! use serde_json::json;
//!
//! let model = schema::load(&json!({"types": [
//!     ["Size", "Integer", ["{0", "}100"], ""]
//! ]}))
//! .unwrap();
//!
//! let translators = registry();
//! let idl = translators.get("jidl").unwrap();
//! let text = idl.export_schema(&model).unwrap().output;
//! assert_eq!(text, "Size = Integer{0..100}\n");
//! ```

pub mod idl;
pub mod jadn;
pub mod json_schema;
pub mod markdown;

pub use idl::Idl;
pub use jadn::Jadn;
pub use json_schema::JsonSchema;
pub use markdown::Markdown;

use jadn_type::{Registry, Translator};

/// Every translator in this crate, by name.
pub fn registry() -> Registry {
    let mut registry = Registry::new();
    registry
        .register(Jadn::verbose())
        .register(Jadn::compact())
        .register(Idl)
        .register(JsonSchema)
        .register(Markdown);
    registry
}

/// Looks up a translator that can read schemas.
pub fn importer<'r>(registry: &'r Registry, name: &str) -> Option<&'r dyn Translator> {
    registry.get(name).filter(|t| t.features().import)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_lists_every_notation() {
        let r = registry();
        assert_eq!(r.names(), vec!["jadn", "jadn-compact", "jidl", "json-schema", "md"]);
        assert!(importer(&r, "jidl").is_some());
        assert!(importer(&r, "json-schema").is_none());
        assert!(importer(&r, "md").is_none());
        assert!(importer(&r, "xsd").is_none());
    }
}
