//! Type Model: base kinds, type references, options, fields and the
//! name-keyed arena of definitions.
//!
//! Definitions never own each other. Every reference between types is a
//! [`TypeRef`] resolved by name through [`TypeModel`] at use time, so cyclic
//! schemas need no special representation.

pub mod definition;
pub mod field;
pub mod model;
pub mod options;

pub use definition::{Members, TypeDefinition};
pub use field::{Field, Item, Multiplicity};
pub use model::{Analysis, Config, Meta, Resolved, TypeModel, UnknownType};
pub use options::{OptionError, Options, TypeOption};

use std::fmt;

/// The fixed set of base kinds every definition is built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseKind {
    Binary,
    Boolean,
    Integer,
    Number,
    String,
    Enumerated,
    Choice,
    Array,
    ArrayOf,
    Map,
    MapOf,
    Record,
}

impl BaseKind {
    pub const ALL: [BaseKind; 12] = [
        Self::Binary,
        Self::Boolean,
        Self::Integer,
        Self::Number,
        Self::String,
        Self::Enumerated,
        Self::Choice,
        Self::Array,
        Self::ArrayOf,
        Self::Map,
        Self::MapOf,
        Self::Record,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Binary => "Binary",
            Self::Boolean => "Boolean",
            Self::Integer => "Integer",
            Self::Number => "Number",
            Self::String => "String",
            Self::Enumerated => "Enumerated",
            Self::Choice => "Choice",
            Self::Array => "Array",
            Self::ArrayOf => "ArrayOf",
            Self::Map => "Map",
            Self::MapOf => "MapOf",
            Self::Record => "Record",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }

    pub fn is_primitive(self) -> bool {
        matches!(
            self,
            Self::Binary | Self::Boolean | Self::Integer | Self::Number | Self::String
        )
    }

    /// Kinds whose definitions carry a member list (items or fields).
    pub fn has_members(self) -> bool {
        matches!(
            self,
            Self::Enumerated | Self::Choice | Self::Array | Self::Map | Self::Record
        )
    }

    /// Kinds whose members are typed fields.
    pub fn has_fields(self) -> bool {
        matches!(self, Self::Choice | Self::Array | Self::Map | Self::Record)
    }

    /// Kinds whose values contain other values.
    pub fn is_compound(self) -> bool {
        !self.is_primitive() && self != Self::Enumerated
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reference from a field or option to a type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeRef {
    /// One of the base kinds used anonymously.
    Base(BaseKind),
    /// A defined type, looked up by name.
    Named(String),
    /// The enumeration derived from the fields of the named type
    /// (`$Name` or `Enum(Name)`).
    Derived(String),
}

impl TypeRef {
    pub fn parse(s: &str) -> Self {
        if let Some(kind) = BaseKind::parse(s) {
            return Self::Base(kind);
        }
        if let Some(source) = s.strip_prefix('$') {
            return Self::Derived(source.to_string());
        }
        let enum_call = s
            .strip_prefix("Enum(")
            .or_else(|| s.strip_prefix("enum("))
            .and_then(|rest| rest.strip_suffix(')'));
        match enum_call {
            Some(source) => Self::Derived(source.to_string()),
            None => Self::Named(s.to_string()),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// The defined type this reference depends on, if any.
    pub fn dependency(&self) -> Option<&str> {
        match self {
            Self::Base(_) => None,
            Self::Named(n) | Self::Derived(n) => Some(n),
        }
    }
}

impl From<BaseKind> for TypeRef {
    fn from(kind: BaseKind) -> Self {
        Self::Base(kind)
    }
}

impl From<&str> for TypeRef {
    fn from(s: &str) -> Self {
        Self::parse(s)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Base(k) => f.write_str(k.as_str()),
            Self::Named(n) => f.write_str(n),
            Self::Derived(n) => write!(f, "${n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_kind_names_round_trip() {
        for kind in BaseKind::ALL {
            assert_eq!(BaseKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(BaseKind::parse("record"), None);
    }

    #[test]
    fn type_ref_forms() {
        assert_eq!(TypeRef::parse("Integer"), TypeRef::Base(BaseKind::Integer));
        assert_eq!(TypeRef::parse("Point"), TypeRef::named("Point"));
        assert_eq!(TypeRef::parse("$Point"), TypeRef::Derived("Point".into()));
        assert_eq!(TypeRef::parse("Enum(Point)"), TypeRef::Derived("Point".into()));
        assert_eq!(TypeRef::Derived("Point".into()).to_string(), "$Point");
    }

    #[test]
    fn kind_classes() {
        assert!(BaseKind::String.is_primitive());
        assert!(!BaseKind::Enumerated.is_compound());
        assert!(BaseKind::ArrayOf.is_compound());
        assert!(!BaseKind::ArrayOf.has_members());
        assert!(BaseKind::Enumerated.has_members());
        assert!(!BaseKind::Enumerated.has_fields());
    }
}
