//! [`TypeModel`] → schema document.

use serde_json::{json, Map, Value};

use super::Form;
use crate::type_def::{Field, Item, Meta, Options, TypeDefinition, TypeModel, TypeOption};

pub(crate) fn write(model: &TypeModel, form: Form) -> Value {
    let mut doc = Map::new();
    let meta = meta(model.meta());
    if !meta.is_empty() {
        doc.insert("meta".into(), Value::Object(meta));
    }
    let types = model.types().map(|def| type_def(def, form)).collect();
    doc.insert("types".into(), Value::Array(types));
    Value::Object(doc)
}

pub(crate) fn meta(meta: &Meta) -> Map<String, Value> {
    let mut out = Map::new();
    let text = [
        ("module", &meta.module),
        ("patch", &meta.patch),
        ("title", &meta.title),
        ("description", &meta.description),
    ];
    for (key, value) in text {
        if let Some(v) = value {
            out.insert(key.into(), Value::String(v.clone()));
        }
    }
    if !meta.imports.is_empty() {
        let imports = meta
            .imports
            .iter()
            .map(|(k, v)| (k.clone(), Value::String(v.clone())))
            .collect();
        out.insert("imports".into(), Value::Object(imports));
    }
    if !meta.exports.is_empty() {
        out.insert("exports".into(), json!(meta.exports));
    }
    let config = meta.config.overrides();
    if !config.is_empty() {
        out.insert("config".into(), Value::Object(config));
    }
    out
}

fn type_def(def: &TypeDefinition, form: Form) -> Value {
    let listed = def.kind.has_members() && def.options.enum_source().is_none();
    let members = listed.then(|| match form {
        Form::Compact if def.kind.has_fields() => {
            Value::Array(def.fields().iter().map(compact_field).collect())
        }
        Form::Compact => Value::Array(def.items().iter().map(compact_item).collect()),
        Form::Verbose if def.kind.has_fields() => {
            Value::Array(def.fields().iter().map(verbose_field).collect())
        }
        Form::Verbose => Value::Array(def.items().iter().map(verbose_item).collect()),
    });

    match form {
        Form::Compact => {
            let mut out = vec![
                Value::String(def.name.clone()),
                Value::String(def.kind.as_str().into()),
                json!(def.options.to_compact()),
                Value::String(def.description.clone()),
            ];
            out.extend(members);
            Value::Array(out)
        }
        Form::Verbose => {
            let mut out = Map::new();
            out.insert("name".into(), Value::String(def.name.clone()));
            out.insert("type".into(), Value::String(def.kind.as_str().into()));
            if !def.options.is_empty() {
                out.insert("options".into(), Value::Object(def.options.to_named()));
            }
            if !def.description.is_empty() {
                out.insert("description".into(), Value::String(def.description.clone()));
            }
            if let Some(members) = members {
                out.insert("fields".into(), members);
            }
            Value::Object(out)
        }
    }
}

fn compact_field(f: &Field) -> Value {
    let options: Vec<String> = f.all_options().iter().map(TypeOption::to_compact).collect();
    json!([f.tag, f.name, f.type_ref.to_string(), options, f.description])
}

fn verbose_field(f: &Field) -> Value {
    let mut out = Map::new();
    out.insert("id".into(), json!(f.tag));
    out.insert("name".into(), Value::String(f.name.clone()));
    out.insert("type".into(), Value::String(f.type_ref.to_string()));
    let options: Options = f.all_options().into_iter().collect();
    if !options.is_empty() {
        out.insert("options".into(), Value::Object(options.to_named()));
    }
    if !f.description.is_empty() {
        out.insert("description".into(), Value::String(f.description.clone()));
    }
    Value::Object(out)
}

fn compact_item(i: &Item) -> Value {
    json!([i.tag, i.name, i.description])
}

fn verbose_item(i: &Item) -> Value {
    let mut out = Map::new();
    out.insert("id".into(), json!(i.tag));
    out.insert("value".into(), Value::String(i.name.clone()));
    if !i.description.is_empty() {
        out.insert("description".into(), Value::String(i.description.clone()));
    }
    Value::Object(out)
}
