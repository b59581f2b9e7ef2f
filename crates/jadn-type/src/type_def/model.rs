//! [`TypeModel`]: the read-only arena of definitions produced by the linter.

use std::borrow::Cow;
use std::collections::HashMap;

use indexmap::IndexMap;
use regex::Regex;
use thiserror::Error;

use super::{BaseKind, Field, Item, Options, TypeDefinition, TypeRef};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown type '{0}'")]
pub struct UnknownType(pub String);

/// Schema-level limits and naming rules carried in `meta.config`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Default maximum octet count of Binary values.
    pub max_binary: u64,
    /// Default maximum character count of String values.
    pub max_string: u64,
    /// Default maximum element count of containers.
    pub max_elements: u64,
    /// Field path separator.
    pub fs: String,
    /// Reserved character for generated type names.
    pub sys: String,
    pub type_name: String,
    pub field_name: String,
    pub nsid: String,
}

impl Config {
    pub const DEFAULT_TYPE_NAME: &'static str = "^[A-Z][-$A-Za-z0-9]{0,31}$";
    pub const DEFAULT_FIELD_NAME: &'static str = "^[a-z][_A-Za-z0-9]{0,31}$";
    pub const DEFAULT_NSID: &'static str = "^[A-Za-z][A-Za-z0-9]{0,7}$";

    /// The length or count bound used when a type has no explicit `maxv`.
    pub fn default_max(&self, kind: BaseKind) -> u64 {
        match kind {
            BaseKind::Binary => self.max_binary,
            BaseKind::String => self.max_string,
            _ => self.max_elements,
        }
    }

    /// The `$`-prefixed keys whose values differ from the defaults.
    pub fn overrides(&self) -> serde_json::Map<String, serde_json::Value> {
        let d = Self::default();
        let mut out = serde_json::Map::new();
        if self.max_binary != d.max_binary {
            out.insert("$MaxBinary".into(), self.max_binary.into());
        }
        if self.max_string != d.max_string {
            out.insert("$MaxString".into(), self.max_string.into());
        }
        if self.max_elements != d.max_elements {
            out.insert("$MaxElements".into(), self.max_elements.into());
        }
        let text = [
            ("$FS", &self.fs, &d.fs),
            ("$Sys", &self.sys, &d.sys),
            ("$TypeName", &self.type_name, &d.type_name),
            ("$FieldName", &self.field_name, &d.field_name),
            ("$NSID", &self.nsid, &d.nsid),
        ];
        for (key, value, default) in text {
            if value != default {
                out.insert(key.into(), value.clone().into());
            }
        }
        out
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_binary: 255,
            max_string: 255,
            max_elements: 100,
            fs: "/".into(),
            sys: "$".into(),
            type_name: Self::DEFAULT_TYPE_NAME.into(),
            field_name: Self::DEFAULT_FIELD_NAME.into(),
            nsid: Self::DEFAULT_NSID.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    /// Namespace identifier of the schema.
    pub module: Option<String>,
    /// Version of the schema.
    pub patch: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Namespace prefix to module id.
    pub imports: IndexMap<String, String>,
    pub exports: Vec<String>,
    pub config: Config,
}

/// A type reference resolved against the model, with any anonymous field
/// options laid over the referenced type's own options.
#[derive(Debug, Clone)]
pub struct Resolved<'m> {
    /// Defined type name, base kind name, or `$Source` for a derived
    /// enumeration.
    pub label: Cow<'m, str>,
    pub kind: BaseKind,
    pub options: Cow<'m, Options>,
    pub fields: &'m [Field],
    pub items: Cow<'m, [Item]>,
}

impl Resolved<'_> {
    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_by_tag(&self, tag: u64) -> Option<&Field> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    pub fn item_by_name(&self, name: &str) -> Option<&Item> {
        self.items.iter().find(|i| i.name == name)
    }

    pub fn item_by_tag(&self, tag: u64) -> Option<&Item> {
        self.items.iter().find(|i| i.tag == tag)
    }
}

/// Result of [`TypeModel::analyze`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Analysis {
    /// Types neither exported nor referenced by another type.
    pub unreferenced: Vec<String>,
    /// Defined types each type refers to, in order of first reference.
    pub dependencies: IndexMap<String, Vec<String>>,
}

/// A linted schema. Immutable, and safe to share between threads.
#[derive(Debug, Clone)]
pub struct TypeModel {
    meta: Meta,
    types: IndexMap<String, TypeDefinition>,
    patterns: HashMap<String, Regex>,
}

impl TypeModel {
    pub(crate) fn from_parts(
        meta: Meta,
        types: IndexMap<String, TypeDefinition>,
        patterns: HashMap<String, Regex>,
    ) -> Self {
        Self {
            meta,
            types,
            patterns,
        }
    }

    pub fn meta(&self) -> &Meta {
        &self.meta
    }

    pub fn config(&self) -> &Config {
        &self.meta.config
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Definitions in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &TypeDefinition> {
        self.types.values()
    }

    pub fn get(&self, name: &str) -> Option<&TypeDefinition> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn resolve(&self, name: &str) -> Result<&TypeDefinition, UnknownType> {
        self.get(name).ok_or_else(|| UnknownType(name.to_string()))
    }

    /// Base kind behind a type name, following one level of indirection:
    /// a defined type, a base kind name or a `$Source` derived enumeration.
    pub fn base_kind(&self, name: &str) -> Result<BaseKind, UnknownType> {
        if let Some(kind) = BaseKind::parse(name) {
            return Ok(kind);
        }
        match TypeRef::parse(name) {
            TypeRef::Derived(source) => self.resolve(&source).map(|_| BaseKind::Enumerated),
            _ => self.resolve(name).map(|def| def.kind),
        }
    }

    pub(crate) fn pattern(&self, pattern: &str) -> Option<&Regex> {
        self.patterns.get(pattern)
    }

    /// View of a definition with its effective items.
    pub fn resolve_def<'m>(&'m self, def: &'m TypeDefinition) -> Resolved<'m> {
        Resolved {
            label: Cow::Borrowed(&def.name),
            kind: def.kind,
            options: Cow::Borrowed(&def.options),
            fields: def.fields(),
            items: self.items_of(def),
        }
    }

    /// Resolves a reference from a field (or an option) to a type.
    pub fn resolve_ref<'m>(
        &'m self,
        type_ref: &TypeRef,
        field_options: Option<&Options>,
    ) -> Result<Resolved<'m>, UnknownType> {
        let has_type_options = field_options.is_some_and(|o| o.type_options().next().is_some());
        let anonymous = || -> Options {
            field_options
                .map(|o| o.type_options().cloned().collect())
                .unwrap_or_default()
        };
        match type_ref {
            TypeRef::Base(kind) => Ok(Resolved {
                label: Cow::Borrowed(kind.as_str()),
                kind: *kind,
                options: Cow::Owned(anonymous()),
                fields: &[],
                items: Cow::Borrowed(&[]),
            }),
            TypeRef::Named(name) => {
                let def = self.resolve(name)?;
                let mut resolved = self.resolve_def(def);
                if let (true, Some(field)) = (has_type_options, field_options) {
                    resolved.options = Cow::Owned(def.options.overlay(field));
                }
                Ok(resolved)
            }
            TypeRef::Derived(source) => {
                let src = self.resolve(source)?;
                Ok(Resolved {
                    label: Cow::Owned(format!("${source}")),
                    kind: BaseKind::Enumerated,
                    options: Cow::Owned(anonymous()),
                    fields: &[],
                    items: Cow::Owned(derived_items(src)),
                })
            }
        }
    }

    pub fn resolve_field<'m>(&'m self, field: &'m Field) -> Result<Resolved<'m>, UnknownType> {
        self.resolve_ref(&field.type_ref, Some(&field.options))
    }

    fn items_of<'m>(&'m self, def: &'m TypeDefinition) -> Cow<'m, [Item]> {
        match def.options.enum_source().and_then(|s| self.get(s)) {
            Some(src) if def.kind == BaseKind::Enumerated => Cow::Owned(derived_items(src)),
            _ => Cow::Borrowed(def.items()),
        }
    }

    /// Defined types `def` refers to through fields and options.
    pub fn dependencies(&self, def: &TypeDefinition) -> Vec<String> {
        let mut refs = Vec::new();
        option_dependencies(&def.options, &mut refs);
        for field in def.fields() {
            refs.extend(field.type_ref.dependency());
            option_dependencies(&field.options, &mut refs);
        }
        let mut out: Vec<String> = Vec::new();
        for name in refs {
            if !out.iter().any(|n| n == name) {
                out.push(name.to_string());
            }
        }
        out
    }

    /// Reference analysis over the whole model.
    pub fn analyze(&self) -> Analysis {
        let mut dependencies = IndexMap::new();
        let mut referenced: Vec<&str> = Vec::new();
        for def in self.types() {
            let deps = self.dependencies(def);
            for dep in &deps {
                if *dep != def.name {
                    if let Some((name, _)) = self.types.get_key_value(dep.as_str()) {
                        referenced.push(name);
                    }
                }
            }
            dependencies.insert(def.name.clone(), deps);
        }
        let unreferenced = self
            .types()
            .map(|def| def.name.as_str())
            .filter(|name| !referenced.contains(name))
            .filter(|name| !self.meta.exports.iter().any(|e| e == name))
            .map(str::to_string)
            .collect();
        Analysis {
            unreferenced,
            dependencies,
        }
    }
}

fn option_dependencies<'a>(options: &'a Options, out: &mut Vec<&'a str>) {
    for r in [options.ktype(), options.vtype()].into_iter().flatten() {
        out.extend(r.dependency());
    }
    out.extend(options.enum_source());
}

fn derived_items(src: &TypeDefinition) -> Vec<Item> {
    src.fields()
        .iter()
        .map(|f| Item {
            tag: f.tag,
            name: f.name.clone(),
            description: f.description.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::type_def::{Field, TypeOption};

    fn model() -> TypeModel {
        let defs = [
            TypeDefinition::new("Point", BaseKind::Record)
                .with_field(Field::new(1, "x", BaseKind::Integer))
                .with_field(Field::new(2, "y", BaseKind::Integer)),
            TypeDefinition::new("Points", BaseKind::ArrayOf)
                .with_option(TypeOption::ValueType(TypeRef::named("Point"))),
            TypeDefinition::new("Axis", BaseKind::Enumerated)
                .with_option(TypeOption::Enum("Point".into())),
            TypeDefinition::new("Orphan", BaseKind::String),
        ];
        let types = defs.into_iter().map(|d| (d.name.clone(), d)).collect();
        let meta = Meta {
            exports: vec!["Points".into()],
            ..Meta::default()
        };
        TypeModel::from_parts(meta, types, HashMap::new())
    }

    #[test]
    fn resolve_and_base_kind() {
        let m = model();
        assert_eq!(m.resolve("Point").map(|d| d.kind), Ok(BaseKind::Record));
        assert_eq!(m.resolve("Nope"), Err(UnknownType("Nope".into())));
        assert_eq!(m.base_kind("Points"), Ok(BaseKind::ArrayOf));
        assert_eq!(m.base_kind("Integer"), Ok(BaseKind::Integer));
        assert_eq!(m.base_kind("$Point"), Ok(BaseKind::Enumerated));
        assert!(m.base_kind("$Nope").is_err());
    }

    #[test]
    fn derived_enumeration_items() {
        let m = model();
        let axis = m.resolve_def(m.resolve("Axis").unwrap());
        let names: Vec<_> = axis.items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["x", "y"]);
        let anon = TypeRef::Derived("Point".into());
        let r = m.resolve_ref(&anon, None).unwrap();
        assert_eq!(r.kind, BaseKind::Enumerated);
        assert_eq!(r.label, "$Point");
        assert_eq!(r.item_by_tag(2).map(|i| i.name.as_str()), Some("y"));
    }

    #[test]
    fn field_options_overlay_type_options() {
        let m = model();
        let field = Field::new(1, "p", "Points").with_option(TypeOption::MaxValue(3));
        let r = m.resolve_field(&field).unwrap();
        assert_eq!(r.options.maxv(), Some(3));
        assert!(r.options.vtype().is_some());
    }

    #[test]
    fn analysis() {
        let a = model().analyze();
        assert_eq!(a.unreferenced, vec!["Orphan".to_string()]);
        assert_eq!(a.dependencies["Points"], vec!["Point".to_string()]);
        assert_eq!(a.dependencies["Axis"], vec!["Point".to_string()]);
        assert!(a.dependencies["Point"].is_empty());
    }
}
