//! JSON Schema (draft 2020-12) export.
//!
//! The generated schema describes documents in the verbose profile: records
//! and maps are objects keyed by field name (by decimal tag with `.ID`),
//! enumerations are names (tags with `.ID`), and arrays are positional with
//! `null` standing in for an absent optional slot.

use jadn_type::format::{BinaryText, Format};
use jadn_type::translator::{audit, FeatureSet};
use jadn_type::type_def::{BaseKind, Field, Options, Resolved, TypeDefinition, TypeRef};
use jadn_type::{TranslateError, Translation, TranslationLoss, Translator, TypeModel};
use serde_json::{json, Map, Value};

const DIALECT: &str = "https://json-schema.org/draft/2020-12/schema";

/// Writes a JSON Schema for the verbose profile. Import is not supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchema;

impl Translator for JsonSchema {
    fn name(&self) -> &'static str {
        "json-schema"
    }

    fn features(&self) -> FeatureSet {
        FeatureSet {
            export: true,
            import: false,
            kinds: BaseKind::ALL.to_vec(),
            options: vec!['=', '*', '+', '#', '/', '{', '}', '%', 'q', '~', '[', ']', '!'],
            descriptions: true,
        }
    }

    fn export_schema(&self, model: &TypeModel) -> Result<Translation<String>, TranslateError> {
        let mut losses = audit(model, &self.features());
        let mut w = SchemaWriter {
            model,
            losses: Vec::new(),
        };
        let doc = w.document();
        losses.extend(w.losses);
        let text = serde_json::to_string_pretty(&doc)?;
        Ok(Translation::new(self.name(), text, losses))
    }
}

fn def_ref(name: &str) -> Value {
    Value::String(format!("#/$defs/{name}"))
}

fn insert_some<T: Into<Value>>(s: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(v) = value {
        s.insert(key.into(), v.into());
    }
}

/// Narrows `lo..hi` to `min..max`.
fn tighten(lo: Option<i64>, hi: Option<i64>, min: i64, max: i64) -> (Option<i64>, Option<i64>) {
    (
        Some(lo.map_or(min, |v| v.max(min))),
        Some(hi.map_or(max, |v| v.min(max))),
    )
}

struct SchemaWriter<'m> {
    model: &'m TypeModel,
    losses: Vec<TranslationLoss>,
}

impl<'m> SchemaWriter<'m> {
    fn model(&self) -> &'m TypeModel {
        self.model
    }

    fn loss(&mut self, location: &str, feature: impl Into<String>, detail: &str) {
        self.losses
            .push(TranslationLoss::new(location, feature, detail));
    }

    fn document(&mut self) -> Value {
        let model = self.model();
        let meta = model.meta();
        let mut doc = Map::new();
        doc.insert("$schema".into(), DIALECT.into());
        insert_some(&mut doc, "$id", meta.module.clone());
        let title = meta.title.clone().or_else(|| {
            meta.module.as_ref().map(|m| match &meta.patch {
                Some(patch) => format!("{m} v.{patch}"),
                None => m.clone(),
            })
        });
        insert_some(&mut doc, "title", title);
        insert_some(&mut doc, "description", meta.description.clone());
        if !meta.imports.is_empty() {
            self.loss(
                "meta.imports",
                "imports",
                "imported namespaces are not linked",
            );
        }
        if !meta.exports.is_empty() {
            let roots: Vec<Value> = meta
                .exports
                .iter()
                .map(|name| json!({"$ref": def_ref(name)}))
                .collect();
            doc.insert("oneOf".into(), Value::Array(roots));
        }
        let defs: Map<String, Value> = model
            .types()
            .map(|def| (def.name.clone(), self.definition(def)))
            .collect();
        doc.insert("$defs".into(), Value::Object(defs));
        Value::Object(doc)
    }

    fn definition(&mut self, def: &'m TypeDefinition) -> Value {
        let mut s = Map::new();
        s.insert("title".into(), def.name.clone().into());
        if !def.description.is_empty() {
            s.insert("description".into(), def.description.clone().into());
        }
        let resolved = self.model().resolve_def(def);
        s.extend(self.kind_schema(&def.name, &resolved));
        Value::Object(s)
    }

    /// Schema of a reference used as an element, key or value type.
    fn reference(&mut self, location: &str, r: &TypeRef) -> Value {
        if let TypeRef::Named(name) = r {
            return json!({"$ref": def_ref(name)});
        }
        match self.model().resolve_ref(r, None) {
            Ok(resolved) => Value::Object(self.kind_schema(location, &resolved)),
            Err(e) => {
                self.loss(location, "reference", &e.to_string());
                json!({})
            }
        }
    }

    fn kind_schema(&mut self, location: &str, r: &Resolved<'_>) -> Map<String, Value> {
        let mut s = Map::new();
        let options = r.options.as_ref();
        match r.kind {
            BaseKind::Boolean => {
                s.insert("type".into(), "boolean".into());
            }
            BaseKind::Integer => {
                s.insert("type".into(), "integer".into());
                let (lo, hi) = self.integer_bounds(location, options);
                insert_some(&mut s, "minimum", lo);
                insert_some(&mut s, "maximum", hi);
            }
            BaseKind::Number => {
                s.insert("type".into(), "number".into());
                insert_some(&mut s, "minimum", options.minv());
                insert_some(&mut s, "maximum", options.maxv());
                if let Some(f) = options.format() {
                    self.loss(location, format!("option /{f}"), "number formats have no equivalent");
                }
            }
            BaseKind::String => {
                s.insert("type".into(), "string".into());
                insert_some(&mut s, "minLength", options.minv());
                insert_some(&mut s, "maxLength", options.maxv());
                insert_some(&mut s, "pattern", options.pattern());
                insert_some(&mut s, "format", options.format());
            }
            BaseKind::Binary => self.binary(location, options, &mut s),
            BaseKind::Enumerated => {
                let id = options.id();
                let values: Vec<Value> = r
                    .items
                    .iter()
                    .map(|item| {
                        let mut v = Map::new();
                        match id {
                            true => {
                                v.insert("const".into(), item.tag.into());
                                v.insert("title".into(), item.name.clone().into());
                            }
                            false => {
                                v.insert("const".into(), item.name.clone().into());
                            }
                        }
                        if !item.description.is_empty() {
                            v.insert("description".into(), item.description.clone().into());
                        }
                        Value::Object(v)
                    })
                    .collect();
                s.insert("type".into(), if id { "integer" } else { "string" }.into());
                s.insert("oneOf".into(), Value::Array(values));
            }
            BaseKind::Choice | BaseKind::Map | BaseKind::Record => self.object(location, r, &mut s),
            BaseKind::Array => self.array(location, r, &mut s),
            BaseKind::ArrayOf => {
                s.insert("type".into(), "array".into());
                if let Some(v) = options.vtype() {
                    let items = self.reference(location, v);
                    s.insert("items".into(), items);
                }
                insert_some(&mut s, "minItems", options.minv());
                insert_some(&mut s, "maxItems", options.maxv());
                if options.unique() {
                    s.insert("uniqueItems".into(), true.into());
                }
            }
            BaseKind::MapOf => self.map_of(location, options, &mut s),
        }
        s
    }

    fn integer_bounds(&mut self, location: &str, options: &Options) -> (Option<i64>, Option<i64>) {
        let (lo, hi) = (options.minv(), options.maxv());
        match options.format().and_then(Format::parse) {
            Some(Format::I8) => tighten(lo, hi, i8::MIN.into(), i8::MAX.into()),
            Some(Format::I16) => tighten(lo, hi, i16::MIN.into(), i16::MAX.into()),
            Some(Format::I32) => tighten(lo, hi, i32::MIN.into(), i32::MAX.into()),
            Some(Format::Unsigned(bits)) if bits < 63 => tighten(lo, hi, 0, (1i64 << bits) - 1),
            Some(Format::Unsigned(_)) => tighten(lo, hi, 0, i64::MAX),
            Some(other) => {
                self.loss(location, format!("option /{}", other.as_str()), "format is not expressible");
                (lo, hi)
            }
            None => (lo, hi),
        }
    }

    fn binary(&mut self, location: &str, options: &Options, s: &mut Map<String, Value>) {
        s.insert("type".into(), "string".into());
        match BinaryText::for_format(options.format()) {
            BinaryText::Base64Url => {
                s.insert("contentEncoding".into(), "base64url".into());
            }
            BinaryText::Hex => {
                s.insert("pattern".into(), "^([0-9a-f]{2})*$".into());
            }
            BinaryText::Ipv4 => {
                s.insert("format".into(), "ipv4".into());
            }
            BinaryText::Ipv6 => {
                s.insert("format".into(), "ipv6".into());
            }
            BinaryText::Eui => {
                s.insert(
                    "pattern".into(),
                    "^[0-9a-f]{2}(:[0-9a-f]{2}){5}((:[0-9a-f]{2}){2})?$".into(),
                );
            }
        }
        if let Some(Format::Unsigned(bits)) = options.format().and_then(Format::parse) {
            self.loss(location, format!("option /u{bits}"), "octet width of encoded text is not checked");
        }
        if options.minv().is_some() || options.maxv().is_some() {
            self.loss(location, "option {}", "octet counts do not bound the encoded text length");
        }
    }

    fn object(&mut self, location: &str, r: &Resolved<'_>, s: &mut Map<String, Value>) {
        let options = r.options.as_ref();
        let by_tag = r.kind != BaseKind::Record && options.id();
        let mut properties = Map::new();
        let mut required = Vec::new();
        for f in r.fields {
            let key = match by_tag {
                true => f.tag.to_string(),
                false => f.name.clone(),
            };
            if r.kind != BaseKind::Choice && f.multiplicity.is_required() {
                required.push(Value::String(key.clone()));
            }
            let schema = self.field(&format!("{location}.{}", f.name), f);
            properties.insert(key, schema);
        }

        s.insert("type".into(), "object".into());
        if r.kind == BaseKind::Choice || !options.open() {
            s.insert("additionalProperties".into(), false.into());
        }
        if r.kind == BaseKind::Choice {
            s.insert("minProperties".into(), 1.into());
            s.insert("maxProperties".into(), 1.into());
        } else {
            insert_some(s, "minProperties", options.minv());
            insert_some(s, "maxProperties", options.maxv());
        }
        if !required.is_empty() {
            s.insert("required".into(), Value::Array(required));
        }
        s.insert("properties".into(), Value::Object(properties));
    }

    fn array(&mut self, location: &str, r: &Resolved<'_>, s: &mut Map<String, Value>) {
        let options = r.options.as_ref();
        let mut prefix = Vec::with_capacity(r.fields.len());
        let mut min_items = 0;
        for (i, f) in r.fields.iter().enumerate() {
            let schema = self.field(&format!("{location}.{}", f.name), f);
            if f.multiplicity.is_required() {
                min_items = i + 1;
                prefix.push(schema);
            } else {
                prefix.push(json!({"anyOf": [schema, {"type": "null"}]}));
            }
        }
        if let Some(f) = options.format() {
            self.loss(location, format!("option /{f}"), "array formats are not expressible");
        }
        let min_items = options
            .minv()
            .and_then(|n| usize::try_from(n).ok())
            .map_or(min_items, |n| n.max(min_items));
        s.insert("type".into(), "array".into());
        s.insert("prefixItems".into(), Value::Array(prefix));
        s.insert("items".into(), false.into());
        if min_items > 0 {
            s.insert("minItems".into(), min_items.into());
        }
        insert_some(s, "maxItems", options.maxv());
    }

    fn map_of(&mut self, location: &str, options: &Options, s: &mut Map<String, Value>) {
        let (Some(ktype), Some(vtype)) = (options.ktype(), options.vtype()) else {
            self.loss(location, "kind MapOf", "key or value type is missing");
            return;
        };
        let text_keys = match self.model().resolve_ref(ktype, None) {
            Ok(kt) => {
                kt.kind == BaseKind::String || (kt.kind == BaseKind::Enumerated && !kt.options.id())
            }
            Err(_) => false,
        };
        let key = self.reference(location, ktype);
        let value = self.reference(location, vtype);
        if text_keys {
            s.insert("type".into(), "object".into());
            s.insert("propertyNames".into(), key);
            s.insert("additionalProperties".into(), value);
            insert_some(s, "minProperties", options.minv());
            insert_some(s, "maxProperties", options.maxv());
        } else {
            self.loss(
                location,
                "kind MapOf",
                "key/value pairs are a flat list; their alternation is not checked",
            );
            s.insert("type".into(), "array".into());
            s.insert("items".into(), json!({"anyOf": [key, value]}));
            insert_some(s, "minItems", options.minv().map(|n| n.saturating_mul(2)));
            insert_some(s, "maxItems", options.maxv().map(|n| n.saturating_mul(2)));
        }
    }

    fn field(&mut self, location: &str, f: &Field) -> Value {
        let resolved = match self.model().resolve_field(f) {
            Ok(r) => r,
            Err(e) => {
                self.loss(location, "reference", &e.to_string());
                return json!({});
            }
        };
        let inline = !matches!(f.type_ref, TypeRef::Named(_)) || f.options.type_options().next().is_some();
        let mut s = match &f.type_ref {
            TypeRef::Named(name) if !inline => {
                let mut m = Map::new();
                m.insert("$ref".into(), def_ref(name));
                m
            }
            _ => self.kind_schema(location, &resolved),
        };
        if f.multiplicity.is_repeated() {
            let mut list = Map::new();
            list.insert("type".into(), "array".into());
            list.insert("items".into(), Value::Object(s));
            if f.multiplicity.min > 0 {
                list.insert("minItems".into(), f.multiplicity.min.into());
            }
            insert_some(&mut list, "maxItems", f.multiplicity.max);
            s = list;
        }
        if !f.description.is_empty() {
            s.insert("description".into(), f.description.clone().into());
        }
        if let Some(d) = f.options.default_value() {
            let textual = matches!(resolved.kind, BaseKind::String | BaseKind::Binary)
                || (resolved.kind == BaseKind::Enumerated && !resolved.options.id());
            let value = match textual {
                true => Value::String(d.to_string()),
                false => serde_json::from_str(d).unwrap_or_else(|_| Value::String(d.to_string())),
            };
            s.insert("default".into(), value);
        }
        Value::Object(s)
    }
}
