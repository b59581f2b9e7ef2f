//! Schema-guided serialization.
//!
//! One structural walker ([`encode`](self::encode) / [`decode`](self::decode)
//! modules) drives every profile. The walker decides the wire shape (keyed or
//! positional, names or tags) from the type model and the [`Layout`]; a leaf
//! backend decides how scalars, containers and keys are spelled:
//!
//! | profile          | layout  | backend        |
//! |------------------|---------|----------------|
//! | `Verbose`        | verbose | JSON text      |
//! | `Concise`        | concise | JSON text      |
//! | `CompactBinary`  | concise | binary         |
//!
//! Decoding checks structure only: a value that decodes has the declared
//! shape, but ranges, patterns and formats are checked only when
//! [`CodecOptions::verify`] is set.

mod binary;
mod decode;
mod encode;
mod json;

use std::fmt;

use jadn_pack::Value;
use thiserror::Error;

use crate::type_def::{TypeModel, TypeRef, UnknownType};
use crate::validator::{self, PathSegment, ValidationReport, ValidatorOptions};

/// A concrete serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Profile {
    /// JSON keyed by field names, enumerations by name.
    Verbose,
    /// JSON keyed by tags, records positional, enumerations by tag.
    Concise,
    /// The concise layout packed into length-prefixed binary.
    CompactBinary,
}

impl Profile {
    pub const ALL: [Profile; 3] = [Self::Verbose, Self::Concise, Self::CompactBinary];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Verbose => "verbose",
            Self::Concise => "concise",
            Self::CompactBinary => "compact-binary",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    pub fn layout(self) -> Layout {
        match self {
            Self::Verbose => Layout::Verbose,
            Self::Concise | Self::CompactBinary => Layout::Concise,
        }
    }

    pub fn is_text(self) -> bool {
        self != Self::CompactBinary
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wire shape chosen by the structural walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Verbose,
    Concise,
}

#[derive(Debug, Clone)]
pub struct CodecOptions {
    /// Maximum nesting of containers.
    pub max_depth: usize,
    /// Run the validator on the value (before encoding, after decoding).
    pub verify: bool,
}

impl Default for CodecOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            verify: false,
        }
    }
}

/// Input or value whose shape cannot match the declared type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub struct StructuralError {
    /// Where the walker was when the mismatch surfaced.
    pub path: Vec<PathSegment>,
    pub reason: String,
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        let segs: Vec<String> = self.path.iter().map(ToString::to_string).collect();
        write!(f, "{}: {}", segs.join("/"), self.reason)
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodecError {
    #[error("structural error at {0}")]
    Structural(#[from] StructuralError),
    #[error("nesting exceeds {limit} levels")]
    LimitExceeded { limit: usize },
    #[error(transparent)]
    UnknownType(#[from] UnknownType),
    #[error("{0}")]
    Nonconformant(ValidationReport),
}

impl From<validator::ValidateError> for CodecError {
    fn from(e: validator::ValidateError) -> Self {
        match e {
            validator::ValidateError::UnknownType(t) => Self::UnknownType(t),
            validator::ValidateError::LimitExceeded { limit } => Self::LimitExceeded { limit },
        }
    }
}

/// Low-level failure reported by a backend, located by the walker.
#[derive(Debug)]
pub(crate) enum Fault {
    Invalid(String),
    TooDeep,
}

impl Fault {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::Invalid(reason.into())
    }

    /// Attaches the walker's position.
    pub(crate) fn at(self, path: &[PathSegment], max_depth: usize) -> CodecError {
        match self {
            Self::Invalid(reason) => CodecError::Structural(StructuralError {
                path: path.to_vec(),
                reason,
            }),
            Self::TooDeep => CodecError::LimitExceeded { limit: max_depth },
        }
    }
}

impl From<jadn_pack::ReadError> for Fault {
    fn from(e: jadn_pack::ReadError) -> Self {
        match e {
            jadn_pack::ReadError::TooDeep(_) => Self::TooDeep,
            other => Self::Invalid(other.to_string()),
        }
    }
}

/// A map key on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum WireKey {
    Tag(u64),
    Text(String),
}

impl WireKey {
    /// Tag spelled by this key. JSON objects spell tags as decimal text.
    pub(crate) fn tag(&self) -> Option<u64> {
        match self {
            Self::Tag(t) => Some(*t),
            Self::Text(s) if is_decimal(s) => s.parse().ok(),
            Self::Text(_) => None,
        }
    }
}

fn is_decimal(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| b.is_ascii_digit())
        && (s == "0" || !s.starts_with('0'))
}

fn check(
    model: &TypeModel,
    type_name: &str,
    value: &Value,
    opts: &CodecOptions,
) -> Result<(), CodecError> {
    let vopts = ValidatorOptions {
        max_depth: opts.max_depth,
        ..ValidatorOptions::default()
    };
    let report = validator::validate(model, type_name, value, &vopts)?;
    if report.is_valid() {
        Ok(())
    } else {
        Err(CodecError::Nonconformant(report))
    }
}

/// Serializes `value` as the type named `type_name`.
pub fn encode(
    model: &TypeModel,
    type_name: &str,
    value: &Value,
    profile: Profile,
) -> Result<Vec<u8>, CodecError> {
    encode_with(model, type_name, value, profile, &CodecOptions::default())
}

pub fn encode_with(
    model: &TypeModel,
    type_name: &str,
    value: &Value,
    profile: Profile,
    opts: &CodecOptions,
) -> Result<Vec<u8>, CodecError> {
    tracing::trace!(type_name, %profile, "encode");
    if opts.verify {
        check(model, type_name, value, opts)?;
    }
    let ty = model.resolve_ref(&TypeRef::parse(type_name), None)?;
    match profile {
        Profile::CompactBinary => {
            let backend = binary::BinaryEncoder::new();
            let mut w = encode::Encode::new(model, Layout::Concise, backend, opts);
            w.value(&ty, value, 0)?;
            Ok(w.into_backend().into_bytes())
        }
        _ => {
            let json = to_json_with(model, type_name, value, profile.layout(), opts)?;
            serde_json::to_vec(&json).map_err(|e| {
                CodecError::Structural(StructuralError {
                    path: Vec::new(),
                    reason: e.to_string(),
                })
            })
        }
    }
}

/// Parses `input` as the type named `type_name`.
pub fn decode(
    model: &TypeModel,
    type_name: &str,
    input: &[u8],
    profile: Profile,
) -> Result<Value, CodecError> {
    decode_with(model, type_name, input, profile, &CodecOptions::default())
}

pub fn decode_with(
    model: &TypeModel,
    type_name: &str,
    input: &[u8],
    profile: Profile,
    opts: &CodecOptions,
) -> Result<Value, CodecError> {
    tracing::trace!(type_name, %profile, bytes = input.len(), "decode");
    let value = match profile {
        Profile::CompactBinary => {
            let ty = model.resolve_ref(&TypeRef::parse(type_name), None)?;
            let backend = binary::BinaryDecoder::new(input);
            let mut r = decode::Decode::new(model, Layout::Concise, backend, opts);
            let value = r.value(&ty, 0)?;
            r.finish()?;
            value
        }
        _ => {
            let json: serde_json::Value = serde_json::from_slice(input).map_err(|e| {
                CodecError::Structural(StructuralError {
                    path: Vec::new(),
                    reason: format!("invalid JSON: {e}"),
                })
            })?;
            from_json_inner(model, type_name, json, profile.layout(), opts)?
        }
    };
    if opts.verify {
        check(model, type_name, &value, opts)?;
    }
    Ok(value)
}

/// Encodes into a JSON tree instead of text.
pub fn to_json(
    model: &TypeModel,
    type_name: &str,
    value: &Value,
    layout: Layout,
) -> Result<serde_json::Value, CodecError> {
    to_json_with(model, type_name, value, layout, &CodecOptions::default())
}

fn to_json_with(
    model: &TypeModel,
    type_name: &str,
    value: &Value,
    layout: Layout,
    opts: &CodecOptions,
) -> Result<serde_json::Value, CodecError> {
    let ty = model.resolve_ref(&TypeRef::parse(type_name), None)?;
    let mut w = encode::Encode::new(model, layout, json::JsonEncoder::new(), opts);
    w.value(&ty, value, 0)?;
    Ok(w.into_backend().finish())
}

/// Decodes from a JSON tree instead of text.
pub fn from_json(
    model: &TypeModel,
    type_name: &str,
    json: serde_json::Value,
    layout: Layout,
) -> Result<Value, CodecError> {
    from_json_inner(model, type_name, json, layout, &CodecOptions::default())
}

fn from_json_inner(
    model: &TypeModel,
    type_name: &str,
    json: serde_json::Value,
    layout: Layout,
    opts: &CodecOptions,
) -> Result<Value, CodecError> {
    let ty = model.resolve_ref(&TypeRef::parse(type_name), None)?;
    let mut r = decode::Decode::new(model, layout, json::JsonDecoder::new(json), opts);
    let value = r.value(&ty, 0)?;
    r.finish()?;
    Ok(value)
}
