//! Schema-free building blocks for the JADN schema engine.
//!
//! [`Value`] is the dynamically shaped interchange tree handed between the
//! validator and the codec. It carries no schema information of its own.
//! [`BinaryWriter`] and [`BinaryReader`] provide the primitive encodings the
//! compact-binary profile is assembled from: varints, zigzag integers,
//! length-prefixed strings and byte strings, and a self-describing encoding
//! for values that have no schema to guide them.
//!
//! # Example
//!
//! ```
//! use jadn_pack::{BinaryReader, BinaryWriter, Value};
//!
//! let mut writer = BinaryWriter::new();
//! writer.zigzag(-3);
//! writer.str("hi");
//! let bytes = writer.into_bytes();
//!
//! let mut reader = BinaryReader::new(&bytes);
//! assert_eq!(reader.zigzag().unwrap(), -3);
//! assert_eq!(reader.str().unwrap(), "hi");
//! assert!(reader.finish().is_ok());
//!
//! let v = Value::from(serde_json::json!({"x": 3}));
//! assert_eq!(v.as_mapping().unwrap().get_text("x"), Some(&Value::Int(3)));
//! ```

pub mod binary;
pub mod json;
mod mapping;
mod value;

pub use binary::{BinaryReader, BinaryWriter, ReadError};
pub use json::{to_json, JsonError};
pub use mapping::Mapping;
pub use value::Value;
