//! `jadn-type` — schema engine for JADN-style abstract data types.
//!
//! A schema declares named types built from twelve base kinds. The crate
//! loads and lints schema documents into an immutable [`TypeModel`], checks
//! data against it with the [`validator`], and moves data between the generic
//! [`Value`] tree and three wire profiles with the [`codec`]. The
//! [`translator`] module is the boundary for plugins that map schemas to and
//! from other notations.
//!
//! ```
//! use jadn_type::{codec, schema, validate, Profile, Value, ValidatorOptions};
//! use serde_json::json;
//!
//! let model = schema::load(&json!({"types": [
//!     ["Point", "Record", [], "", [[1, "x", "Integer", [], ""], [2, "y", "Integer", [], ""]]]
//! ]}))
//! .unwrap();
//!
//! let point = Value::from(json!({"x": 3, "y": 5}));
//! assert!(validate(&model, "Point", &point, &ValidatorOptions::default()).unwrap().is_valid());
//!
//! let bytes = codec::encode(&model, "Point", &point, Profile::Concise).unwrap();
//! assert_eq!(bytes, b"[3,5]");
//! assert_eq!(codec::decode(&model, "Point", &bytes, Profile::Concise).unwrap(), point);
//! ```

pub mod codec;
pub mod document;
pub mod format;
pub mod lint;
pub mod schema;
pub mod translator;
pub mod type_def;
pub mod validator;

pub use codec::{CodecError, CodecOptions, Profile, StructuralError};
pub use document::validate_document;
pub use jadn_pack::{Mapping, Value};
pub use lint::{LintError, LintErrorKind, LintErrors};
pub use translator::{
    FeatureSet, ModelBuilder, ModelVisitor, Registry, TranslateError, Translation,
    TranslationLoss, Translator,
};
pub use type_def::{
    BaseKind, Field, Item, Multiplicity, TypeDefinition, TypeModel, TypeOption, TypeRef,
};
pub use validator::{
    validate, ConformanceError, ErrorCode, ValidateError, ValidationReport, ValidatorOptions,
};
