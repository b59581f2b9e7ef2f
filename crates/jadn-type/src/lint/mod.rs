//! Schema linter.
//!
//! [`check`] turns parsed definitions into a [`TypeModel`] or reports every
//! violation it finds. Errors come out in a fixed order: document-shape
//! problems found while parsing, then each type in declaration order, then
//! exports and imports, then reference cycles.

mod cycles;

use std::collections::{HashMap, HashSet};
use std::fmt;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::format::Format;
use crate::type_def::{
    BaseKind, Field, Members, Meta, Options, TypeDefinition, TypeModel, TypeOption, TypeRef,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LintErrorKind {
    /// The schema document does not have the expected shape.
    Document,
    InvalidName,
    DuplicateTypeName,
    UnknownBaseKind,
    DuplicateFieldTag,
    DuplicateFieldName,
    /// Record or Array tags not strictly increasing.
    NonMonotonicTag,
    NegativeTag,
    /// Tag beyond the signed 64-bit range the wire profiles carry.
    TagOutOfRange,
    InvalidOption,
    DuplicateOption,
    MissingOption,
    InvalidMultiplicity,
    InvalidRange,
    InvalidPattern,
    InvalidFormat,
    InvalidMembers,
    UnresolvedReference,
    InvalidEnumSource,
    UnknownExport,
    NonOptionalCycle,
}

/// One schema violation.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize)]
#[error("{location}: {message}")]
pub struct LintError {
    pub kind: LintErrorKind,
    /// `Type`, `Type.field`, `meta.exports`, `types[3]`, ...
    pub location: String,
    pub message: String,
}

impl LintError {
    pub fn new(kind: LintErrorKind, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
            message: message.into(),
        }
    }
}

/// Every violation found in a schema, in deterministic order. Never empty.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub struct LintErrors(Vec<LintError>);

impl LintErrors {
    pub(crate) fn from_errors(errors: Vec<LintError>) -> Self {
        Self(errors)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LintError> {
        self.0.iter()
    }

    pub fn kinds(&self) -> Vec<LintErrorKind> {
        self.0.iter().map(|e| e.kind).collect()
    }

    pub fn into_vec(self) -> Vec<LintError> {
        self.0
    }
}

impl fmt::Display for LintErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "schema has {} lint error(s)", self.0.len())?;
        for e in &self.0 {
            write!(f, "\n  {e}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a LintErrors {
    type Item = &'a LintError;
    type IntoIter = std::slice::Iter<'a, LintError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Option ids a type of each base kind may carry.
/// Largest tag a field or item may carry.
pub const MAX_TAG: u64 = i64::MAX as u64;

fn valid_type_options(kind: BaseKind) -> &'static [char] {
    match kind {
        BaseKind::Binary | BaseKind::Integer | BaseKind::Number => &['/', '{', '}'],
        BaseKind::String => &['/', '{', '}', '%'],
        BaseKind::Boolean => &[],
        BaseKind::Array => &['/', '{', '}'],
        BaseKind::ArrayOf => &['{', '}', '*', 'q'],
        BaseKind::Choice => &['='],
        BaseKind::Enumerated => &['=', '#'],
        BaseKind::Map => &['=', '{', '}', '~'],
        BaseKind::MapOf => &['+', '*', '{', '}'],
        BaseKind::Record => &['{', '}', '~'],
    }
}

/// Links parsed definitions into a model.
///
/// `prior` holds errors already found while parsing the document and
/// `placeholders` the names of types that were declared but could not be
/// parsed; references to them are not reported again.
pub fn check(
    meta: Meta,
    defs: Vec<TypeDefinition>,
    prior: Vec<LintError>,
    placeholders: &[String],
) -> Result<TypeModel, LintErrors> {
    let (mut errors, patterns) = {
        let mut linter = Linter::new(&meta, &defs, placeholders, prior);
        for def in &defs {
            linter.definition(def);
        }
        linter.meta(&meta);
        (linter.errors, linter.patterns)
    };

    let mut types: IndexMap<String, TypeDefinition> = IndexMap::with_capacity(defs.len());
    for def in defs {
        types.entry(def.name.clone()).or_insert(def);
    }
    for cycle in cycles::non_optional_cycles(&types) {
        let location = cycle.first().cloned().unwrap_or_default();
        errors.push(LintError::new(
            LintErrorKind::NonOptionalCycle,
            location,
            format!(
                "types {} reference each other through required fields only",
                cycle.join(" -> ")
            ),
        ));
    }

    tracing::debug!(types = types.len(), errors = errors.len(), "schema linted");
    if !errors.is_empty() {
        return Err(LintErrors(errors));
    }
    Ok(TypeModel::from_parts(meta, types, patterns))
}

struct Linter<'a> {
    errors: Vec<LintError>,
    /// First definition of every declared name.
    index: HashMap<&'a str, &'a TypeDefinition>,
    placeholders: &'a [String],
    seen: HashSet<&'a str>,
    type_name: Option<Regex>,
    field_name: Option<Regex>,
    nsid: Option<Regex>,
    patterns: HashMap<String, Regex>,
}

impl<'a> Linter<'a> {
    fn new(
        meta: &Meta,
        defs: &'a [TypeDefinition],
        placeholders: &'a [String],
        prior: Vec<LintError>,
    ) -> Self {
        let mut index = HashMap::with_capacity(defs.len());
        for def in defs {
            index.entry(def.name.as_str()).or_insert(def);
        }
        let mut linter = Self {
            errors: prior,
            index,
            placeholders,
            seen: HashSet::new(),
            type_name: None,
            field_name: None,
            nsid: None,
            patterns: HashMap::new(),
        };
        let config = &meta.config;
        linter.type_name = linter.config_regex("$TypeName", &config.type_name);
        linter.field_name = linter.config_regex("$FieldName", &config.field_name);
        linter.nsid = linter.config_regex("$NSID", &config.nsid);
        linter
    }

    fn config_regex(&mut self, key: &str, pattern: &str) -> Option<Regex> {
        match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                self.error(
                    LintErrorKind::InvalidPattern,
                    format!("meta.config.{key}"),
                    format!("invalid name pattern: {e}"),
                );
                None
            }
        }
    }

    fn error(&mut self, kind: LintErrorKind, location: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LintError::new(kind, location, message));
    }

    fn tag_range(&mut self, tag: u64, loc: &str) {
        if tag > MAX_TAG {
            self.error(
                LintErrorKind::TagOutOfRange,
                loc,
                format!("tag {tag} exceeds {MAX_TAG}"),
            );
        }
    }

    fn is_declared(&self, name: &str) -> bool {
        self.index.contains_key(name) || self.placeholders.iter().any(|p| p == name)
    }

    fn definition(&mut self, def: &'a TypeDefinition) {
        let loc = def.name.as_str();

        if BaseKind::parse(&def.name).is_some() {
            self.error(
                LintErrorKind::InvalidName,
                loc,
                "type name is a reserved base kind name",
            );
        } else if !self.type_name.as_ref().map_or(true, |re| re.is_match(&def.name)) {
            self.error(
                LintErrorKind::InvalidName,
                loc,
                format!("type name '{}' does not match $TypeName", def.name),
            );
        }
        if !self.seen.insert(&def.name) {
            self.error(
                LintErrorKind::DuplicateTypeName,
                loc,
                format!("type '{}' is defined more than once", def.name),
            );
        }

        self.type_options(def);
        self.type_option_values(def.kind, &def.options, loc);
        self.members(def);
    }

    fn type_options(&mut self, def: &TypeDefinition) {
        let loc = def.name.as_str();
        let valid = valid_type_options(def.kind);
        let mut ids = Vec::new();
        for opt in &def.options {
            if ids.contains(&opt.id()) {
                self.error(
                    LintErrorKind::DuplicateOption,
                    loc,
                    format!("option {} given more than once", opt.name()),
                );
                continue;
            }
            ids.push(opt.id());
            if opt.is_field_only() {
                self.error(
                    LintErrorKind::InvalidOption,
                    loc,
                    format!("field option {} is not allowed on a type", opt.name()),
                );
            } else if !valid.contains(&opt.id()) {
                self.error(
                    LintErrorKind::InvalidOption,
                    loc,
                    format!("option {} is not valid for {}", opt.name(), def.kind),
                );
            }
        }
        self.required_options(def.kind, &def.options, loc);
        if def.options.enum_source().is_some() && !def.items().is_empty() {
            self.error(
                LintErrorKind::InvalidMembers,
                loc,
                "derived enumeration must not list its own items",
            );
        }
    }

    fn required_options(&mut self, kind: BaseKind, options: &Options, loc: &str) {
        if matches!(kind, BaseKind::ArrayOf | BaseKind::MapOf) && options.vtype().is_none() {
            self.error(
                LintErrorKind::MissingOption,
                loc,
                format!("{kind} requires a vtype option"),
            );
        }
        if kind == BaseKind::MapOf && options.ktype().is_none() {
            self.error(
                LintErrorKind::MissingOption,
                loc,
                "MapOf requires a ktype option",
            );
        }
    }

    /// Checks option values against a base kind. Used for type options and
    /// for the anonymous type options of a field.
    fn type_option_values(&mut self, kind: BaseKind, options: &Options, loc: &str) {
        let minv = options.minv();
        let maxv = options.maxv();
        let numeric = matches!(kind, BaseKind::Integer | BaseKind::Number);
        if !numeric && minv.is_some_and(|n| n < 0) {
            self.error(
                LintErrorKind::InvalidRange,
                loc,
                "minimum length or count must not be negative",
            );
        }
        if !numeric && maxv.is_some_and(|n| n < 0) {
            self.error(
                LintErrorKind::InvalidRange,
                loc,
                "maximum length or count must not be negative",
            );
        }
        if let (Some(min), Some(max)) = (minv, maxv) {
            if max < min && (numeric || max != 0) {
                self.error(
                    LintErrorKind::InvalidRange,
                    loc,
                    format!("maxv {max} is less than minv {min}"),
                );
            }
        }

        if let Some(name) = options.format() {
            match Format::parse(name) {
                None => self.error(
                    LintErrorKind::InvalidFormat,
                    loc,
                    format!("unknown format '{name}'"),
                ),
                Some(f) if !f.applies_to(kind) => self.error(
                    LintErrorKind::InvalidFormat,
                    loc,
                    format!("format '{name}' does not apply to {kind}"),
                ),
                Some(_) => {}
            }
        }

        if let Some(pattern) = options.pattern() {
            if !self.patterns.contains_key(pattern) {
                match Regex::new(pattern) {
                    Ok(re) => {
                        self.patterns.insert(pattern.to_string(), re);
                    }
                    Err(e) => self.error(
                        LintErrorKind::InvalidPattern,
                        loc,
                        format!("pattern does not compile: {e}"),
                    ),
                }
            }
        }

        for r in [options.ktype(), options.vtype()].into_iter().flatten() {
            self.reference(r, loc);
        }
        if let Some(source) = options.enum_source() {
            self.enum_source(source, loc);
        }
    }

    fn reference(&mut self, r: &TypeRef, loc: &str) {
        match r {
            TypeRef::Base(_) => {}
            TypeRef::Named(name) => {
                if !self.is_declared(name) {
                    self.error(
                        LintErrorKind::UnresolvedReference,
                        loc,
                        format!("reference to undefined type '{name}'"),
                    );
                }
            }
            TypeRef::Derived(source) => self.enum_source(source, loc),
        }
    }

    fn enum_source(&mut self, source: &str, loc: &str) {
        match self.index.get(source).map(|d| d.kind) {
            Some(kind) if kind.has_fields() => {}
            Some(kind) => self.error(
                LintErrorKind::InvalidEnumSource,
                loc,
                format!("cannot derive an enumeration from {kind} type '{source}'"),
            ),
            None if self.placeholders.iter().any(|p| p == source) => {}
            None => self.error(
                LintErrorKind::UnresolvedReference,
                loc,
                format!("enumeration derived from undefined type '{source}'"),
            ),
        }
    }

    fn members(&mut self, def: &TypeDefinition) {
        let loc = def.name.as_str();
        match (&def.members, def.kind) {
            (Members::None, _) => {}
            (Members::Items(items), BaseKind::Enumerated) => {
                let mut tags = HashSet::new();
                let mut names = HashSet::new();
                for item in items {
                    let item_loc = format!("{loc}.{}", item.name);
                    if item.name.is_empty() {
                        self.error(LintErrorKind::InvalidName, &item_loc, "empty item name");
                    }
                    self.tag_range(item.tag, &item_loc);
                    if !tags.insert(item.tag) {
                        self.error(
                            LintErrorKind::DuplicateFieldTag,
                            &item_loc,
                            format!("tag {} is used more than once", item.tag),
                        );
                    }
                    if !names.insert(item.name.as_str()) {
                        self.error(
                            LintErrorKind::DuplicateFieldName,
                            &item_loc,
                            format!("item name '{}' is used more than once", item.name),
                        );
                    }
                }
            }
            (Members::Fields(fields), kind) if kind.has_fields() => self.fields(def, fields),
            (Members::Items(items), kind) if !items.is_empty() => self.error(
                LintErrorKind::InvalidMembers,
                loc,
                format!("{kind} cannot have enumerated items"),
            ),
            (Members::Fields(fields), kind) if !fields.is_empty() => self.error(
                LintErrorKind::InvalidMembers,
                loc,
                format!("{kind} cannot have fields"),
            ),
            _ => {}
        }
    }

    fn fields(&mut self, def: &TypeDefinition, fields: &[Field]) {
        let ordered = matches!(def.kind, BaseKind::Record | BaseKind::Array);
        let mut tags = HashSet::new();
        let mut names = HashSet::new();
        let mut previous: Option<u64> = None;
        for field in fields {
            let loc = format!("{}.{}", def.name, field.name);

            if !self.field_name.as_ref().map_or(true, |re| re.is_match(&field.name)) {
                self.error(
                    LintErrorKind::InvalidName,
                    &loc,
                    format!("field name '{}' does not match $FieldName", field.name),
                );
            }
            self.tag_range(field.tag, &loc);
            let fresh_tag = tags.insert(field.tag);
            if !fresh_tag {
                self.error(
                    LintErrorKind::DuplicateFieldTag,
                    &loc,
                    format!("tag {} is used more than once", field.tag),
                );
            }
            if !names.insert(field.name.as_str()) {
                self.error(
                    LintErrorKind::DuplicateFieldName,
                    &loc,
                    format!("field name '{}' is used more than once", field.name),
                );
            }
            if ordered && fresh_tag && previous.is_some_and(|p| field.tag <= p) {
                self.error(
                    LintErrorKind::NonMonotonicTag,
                    &loc,
                    format!("{} tags must be strictly increasing", def.kind),
                );
            }
            previous = Some(field.tag);

            let m = field.multiplicity;
            if m.max.is_some_and(|max| max < m.min) {
                self.error(
                    LintErrorKind::InvalidMultiplicity,
                    &loc,
                    format!("maximum count is less than minimum count {}", m.min),
                );
            }

            self.field_type(field, &loc);
        }
    }

    fn field_type(&mut self, field: &Field, loc: &str) {
        let kind = match &field.type_ref {
            TypeRef::Base(kind) => {
                if kind.has_members() {
                    self.error(
                        LintErrorKind::InvalidMembers,
                        loc,
                        format!("anonymous {kind} has no members; define a named type"),
                    );
                }
                Some(*kind)
            }
            TypeRef::Named(name) => {
                let kind = self.index.get(name.as_str()).map(|d| d.kind);
                self.reference(&field.type_ref, loc);
                kind
            }
            TypeRef::Derived(_) => {
                self.reference(&field.type_ref, loc);
                Some(BaseKind::Enumerated)
            }
        };

        let mut ids = Vec::new();
        for opt in &field.options {
            if ids.contains(&opt.id()) {
                self.error(
                    LintErrorKind::DuplicateOption,
                    loc,
                    format!("option {} given more than once", opt.name()),
                );
                continue;
            }
            ids.push(opt.id());
            if matches!(opt, TypeOption::MinCount(_) | TypeOption::MaxCount(_)) {
                self.error(
                    LintErrorKind::InvalidOption,
                    loc,
                    "cardinality belongs in the field multiplicity",
                );
            } else if let Some(kind) = kind {
                if !opt.is_field_only() && !valid_type_options(kind).contains(&opt.id()) {
                    self.error(
                        LintErrorKind::InvalidOption,
                        loc,
                        format!("option {} is not valid for a field of kind {kind}", opt.name()),
                    );
                }
            }
        }

        if let Some(kind) = kind {
            if matches!(field.type_ref, TypeRef::Base(_)) {
                self.required_options(kind, &field.options, loc);
            }
            self.type_option_values(kind, &field.options, loc);
        }
    }

    fn meta(&mut self, meta: &Meta) {
        for name in &meta.exports {
            if !self.is_declared(name) {
                self.error(
                    LintErrorKind::UnknownExport,
                    "meta.exports",
                    format!("exported type '{name}' is not defined"),
                );
            }
        }
        for prefix in meta.imports.keys() {
            if !self.nsid.as_ref().map_or(true, |re| re.is_match(prefix)) {
                self.error(
                    LintErrorKind::InvalidName,
                    "meta.imports",
                    format!("namespace prefix '{prefix}' does not match $NSID"),
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_def::{Item, Multiplicity};

    fn lint(defs: Vec<TypeDefinition>) -> Result<TypeModel, LintErrors> {
        check(Meta::default(), defs, Vec::new(), &[])
    }

    fn kinds(defs: Vec<TypeDefinition>) -> Vec<LintErrorKind> {
        lint(defs).err().map(|e| e.kinds()).unwrap_or_default()
    }

    #[test]
    fn valid_model_links() {
        let model = lint(vec![
            TypeDefinition::new("Point", BaseKind::Record)
                .with_field(Field::new(1, "x", BaseKind::Integer))
                .with_field(Field::new(2, "y", BaseKind::Integer)),
            TypeDefinition::new("Name", BaseKind::String)
                .with_option(TypeOption::Pattern("^[a-z]+$".into())),
        ])
        .unwrap();
        assert_eq!(model.len(), 2);
        assert!(model.pattern("^[a-z]+$").is_some());
    }

    #[test]
    fn pattern_on_boolean_is_invalid_option() {
        let got = kinds(vec![TypeDefinition::new("Flag", BaseKind::Boolean)
            .with_option(TypeOption::Pattern("x".into()))]);
        assert_eq!(got, vec![LintErrorKind::InvalidOption]);
    }

    #[test]
    fn duplicate_names_and_tags() {
        let got = kinds(vec![
            TypeDefinition::new("Point", BaseKind::Map)
                .with_field(Field::new(1, "x", BaseKind::Integer))
                .with_field(Field::new(1, "y", BaseKind::Integer))
                .with_field(Field::new(2, "y", BaseKind::Integer)),
            TypeDefinition::new("Point", BaseKind::String),
        ]);
        assert_eq!(
            got,
            vec![
                LintErrorKind::DuplicateFieldTag,
                LintErrorKind::DuplicateFieldName,
                LintErrorKind::DuplicateTypeName,
            ]
        );
    }

    #[test]
    fn record_tags_must_increase_but_map_tags_need_not() {
        let record = TypeDefinition::new("R", BaseKind::Record)
            .with_field(Field::new(2, "a", BaseKind::Integer))
            .with_field(Field::new(1, "b", BaseKind::Integer));
        assert_eq!(kinds(vec![record]), vec![LintErrorKind::NonMonotonicTag]);
        let map = TypeDefinition::new("M", BaseKind::Map)
            .with_field(Field::new(2, "a", BaseKind::Integer))
            .with_field(Field::new(1, "b", BaseKind::Integer));
        assert!(lint(vec![map]).is_ok());
    }

    #[test]
    fn unresolved_reference_and_missing_vtype() {
        let got = kinds(vec![
            TypeDefinition::new("R", BaseKind::Record).with_field(Field::new(1, "a", "Nowhere")),
            TypeDefinition::new("L", BaseKind::ArrayOf),
        ]);
        assert_eq!(
            got,
            vec![
                LintErrorKind::UnresolvedReference,
                LintErrorKind::MissingOption,
            ]
        );
    }

    #[test]
    fn non_optional_cycle_is_rejected() {
        let err = lint(vec![TypeDefinition::new("R", BaseKind::Record)
            .with_field(Field::new(1, "next", "R"))])
        .unwrap_err();
        assert_eq!(err.kinds(), vec![LintErrorKind::NonOptionalCycle]);
        assert_eq!(err.iter().next().map(|e| e.location.as_str()), Some("R"));
    }

    #[test]
    fn cycles_are_reported_alongside_other_errors() {
        let got = kinds(vec![
            TypeDefinition::new("lower", BaseKind::String),
            TypeDefinition::new("R", BaseKind::Record).with_field(Field::new(1, "next", "R")),
        ]);
        assert_eq!(
            got,
            vec![LintErrorKind::InvalidName, LintErrorKind::NonOptionalCycle]
        );
    }

    #[test]
    fn tags_fit_a_signed_integer() {
        let got = kinds(vec![
            TypeDefinition::new("Big", BaseKind::Enumerated).with_item(Item::new(MAX_TAG + 1, "BIG")),
            TypeDefinition::new("Wide", BaseKind::Map)
                .with_field(Field::new(u64::MAX, "far", BaseKind::Integer)),
            TypeDefinition::new("Edge", BaseKind::Enumerated).with_item(Item::new(MAX_TAG, "EDGE")),
        ]);
        assert_eq!(
            got,
            vec![LintErrorKind::TagOutOfRange, LintErrorKind::TagOutOfRange]
        );
    }

    #[test]
    fn format_and_range_checks() {
        let got = kinds(vec![
            TypeDefinition::new("When", BaseKind::Integer)
                .with_option(TypeOption::Format("date-time".into())),
            TypeDefinition::new("Odd", BaseKind::String)
                .with_option(TypeOption::Format("nope".into())),
            TypeDefinition::new("Range", BaseKind::Integer)
                .with_option(TypeOption::MinValue(5))
                .with_option(TypeOption::MaxValue(1)),
            TypeDefinition::new("Short", BaseKind::String)
                .with_option(TypeOption::MinValue(5))
                .with_option(TypeOption::MaxValue(0)),
        ]);
        assert_eq!(
            got,
            vec![
                LintErrorKind::InvalidFormat,
                LintErrorKind::InvalidFormat,
                LintErrorKind::InvalidRange,
            ]
        );
    }

    #[test]
    fn field_options_follow_field_kind() {
        let ok = TypeDefinition::new("R", BaseKind::Record).with_field(
            Field::new(1, "name", BaseKind::String).with_option(TypeOption::MaxValue(10)),
        );
        assert!(lint(vec![ok]).is_ok());
        let bad = TypeDefinition::new("R", BaseKind::Record).with_field(
            Field::new(1, "on", BaseKind::Boolean).with_option(TypeOption::MaxValue(10)),
        );
        assert_eq!(kinds(vec![bad]), vec![LintErrorKind::InvalidOption]);
        let list = TypeDefinition::new("R", BaseKind::Record).with_field(
            Field::new(1, "ids", BaseKind::ArrayOf)
                .with_option(TypeOption::ValueType(TypeRef::Base(BaseKind::Integer))),
        );
        assert!(lint(vec![list]).is_ok());
    }

    #[test]
    fn bad_multiplicity() {
        let mut f = Field::new(1, "a", BaseKind::Integer);
        f.multiplicity = Multiplicity {
            min: 3,
            max: Some(2),
        };
        let def = TypeDefinition::new("R", BaseKind::Record).with_field(f);
        assert_eq!(kinds(vec![def]), vec![LintErrorKind::InvalidMultiplicity]);
    }

    #[test]
    fn derived_enumerations() {
        let point = TypeDefinition::new("Point", BaseKind::Record)
            .with_field(Field::new(1, "x", BaseKind::Integer));
        let axis = TypeDefinition::new("Axis", BaseKind::Enumerated)
            .with_option(TypeOption::Enum("Point".into()));
        assert!(lint(vec![point.clone(), axis]).is_ok());

        let bad = TypeDefinition::new("Axis", BaseKind::Enumerated)
            .with_option(TypeOption::Enum("Point".into()))
            .with_item(Item::new(1, "x"));
        assert_eq!(
            kinds(vec![point, bad]),
            vec![LintErrorKind::InvalidMembers]
        );

        let name = TypeDefinition::new("Name", BaseKind::String);
        let anon = TypeDefinition::new("R", BaseKind::Record)
            .with_field(Field::new(1, "k", TypeRef::Derived("Name".into())));
        assert_eq!(
            kinds(vec![name, anon]),
            vec![LintErrorKind::InvalidEnumSource]
        );
    }

    #[test]
    fn names_follow_config_rules() {
        let got = kinds(vec![
            TypeDefinition::new("lower", BaseKind::String),
            TypeDefinition::new("Record", BaseKind::String),
            TypeDefinition::new("R", BaseKind::Record)
                .with_field(Field::new(1, "Upper", BaseKind::String)),
        ]);
        assert_eq!(
            got,
            vec![
                LintErrorKind::InvalidName,
                LintErrorKind::InvalidName,
                LintErrorKind::InvalidName,
            ]
        );
    }

    #[test]
    fn unknown_export() {
        let meta = Meta {
            exports: vec!["Missing".into()],
            ..Meta::default()
        };
        let err = check(meta, vec![], Vec::new(), &[]).unwrap_err();
        assert_eq!(err.kinds(), vec![LintErrorKind::UnknownExport]);
    }

    #[test]
    fn linting_is_deterministic() {
        let defs = || {
            vec![
                TypeDefinition::new("A", BaseKind::Record)
                    .with_field(Field::new(1, "x", "B"))
                    .with_field(Field::new(1, "y", "C")),
                TypeDefinition::new("Flag", BaseKind::Boolean)
                    .with_option(TypeOption::MinValue(1)),
            ]
        };
        assert_eq!(lint(defs()).unwrap_err(), lint(defs()).unwrap_err());
    }
}
