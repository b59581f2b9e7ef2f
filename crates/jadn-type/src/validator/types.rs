use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::type_def::UnknownType;

/// Call-level validator settings.
#[derive(Debug, Clone)]
pub struct ValidatorOptions {
    /// Maximum nesting of containers before validation gives up.
    pub max_depth: usize,
    /// Check `format` options (dates, addresses, ...).
    pub check_formats: bool,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            check_formats: true,
        }
    }
}

/// One step from the validation root to an offending value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// A declared field of a Record, Map, Choice or Array.
    Field { tag: u64, name: String },
    /// Element of an ArrayOf or of a repeated field.
    Index(usize),
    /// Key of a MapOf entry or an undeclared key.
    Key(String),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field { name, .. } => f.write_str(name),
            Self::Index(i) => write!(f, "{i}"),
            Self::Key(k) => f.write_str(k),
        }
    }
}

/// Field segments serialize as their name, indices as numbers.
impl Serialize for PathSegment {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Field { name, .. } => serializer.serialize_str(name),
            Self::Index(i) => serializer.serialize_u64(*i as u64),
            Self::Key(k) => serializer.serialize_str(k),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The value has the wrong dynamic shape for the type.
    TypeMismatch,
    MissingField,
    UnknownField,
    /// More than one alternative of a Choice is present.
    MultipleFields,
    /// No alternative of a Choice is present.
    NoField,
    UnknownEnum,
    TooShort,
    TooLong,
    BelowMinimum,
    AboveMaximum,
    TooFew,
    TooMany,
    PatternMismatch,
    FormatViolation,
    DuplicateElement,
    /// Encoded input could not be decoded into the declared shape.
    Structure,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TypeMismatch => "type_mismatch",
            Self::MissingField => "missing_field",
            Self::UnknownField => "unknown_field",
            Self::MultipleFields => "multiple_fields",
            Self::NoField => "no_field",
            Self::UnknownEnum => "unknown_enum",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::BelowMinimum => "below_minimum",
            Self::AboveMaximum => "above_maximum",
            Self::TooFew => "too_few",
            Self::TooMany => "too_many",
            Self::PatternMismatch => "pattern_mismatch",
            Self::FormatViolation => "format_violation",
            Self::DuplicateElement => "duplicate_element",
            Self::Structure => "structure",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A constraint the data violates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConformanceError {
    pub path: Vec<PathSegment>,
    pub code: ErrorCode,
    /// The type or option the value failed, e.g. `Integer` or `maxv 10`.
    pub expected: String,
    pub message: String,
}

impl ConformanceError {
    /// Path segments joined by `separator`, rooted at `separator`.
    pub fn path_string(&self, separator: &str) -> String {
        let mut out = String::new();
        for seg in &self.path {
            out.push_str(separator);
            out.push_str(&seg.to_string());
        }
        if out.is_empty() {
            out.push_str(separator);
        }
        out
    }
}

impl fmt::Display for ConformanceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.path_string("/"), self.code, self.message)
    }
}

/// Outcome of one validation: every violation found, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ConformanceError>,
}

impl ValidationReport {
    pub fn new(errors: Vec<ConformanceError>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn codes(&self) -> Vec<ErrorCode> {
        self.errors.iter().map(|e| e.code).collect()
    }

    /// `{"valid": bool, "errors": [{"path", "code", "message"}]}` with paths
    /// joined by `separator`.
    pub fn to_json(&self, separator: &str) -> serde_json::Value {
        let errors: Vec<serde_json::Value> = self
            .errors
            .iter()
            .map(|e| {
                serde_json::json!({
                    "path": e.path_string(separator),
                    "code": e.code.as_str(),
                    "message": e.message,
                })
            })
            .collect();
        serde_json::json!({ "valid": self.valid, "errors": errors })
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.valid {
            return f.write_str("valid");
        }
        write!(f, "{} conformance error(s)", self.errors.len())?;
        for e in &self.errors {
            write!(f, "\n  {e}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidateError {
    #[error(transparent)]
    UnknownType(#[from] UnknownType),
    #[error("nesting exceeds {limit} levels")]
    LimitExceeded { limit: usize },
}
