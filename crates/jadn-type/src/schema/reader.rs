//! Schema document → unlinked definitions.
//!
//! Every shape problem is recorded and parsing carries on, so one pass
//! reports everything wrong with a document.

use serde_json::{Map, Value};

use crate::lint::{LintError, LintErrorKind};
use crate::type_def::{
    BaseKind, Config, Field, Item, Members, Meta, Multiplicity, OptionError, Options,
    TypeDefinition, TypeOption, TypeRef,
};

#[derive(Debug, Default)]
pub(crate) struct Parsed {
    pub meta: Meta,
    pub defs: Vec<TypeDefinition>,
    pub errors: Vec<LintError>,
    /// Declared names whose definitions could not be read.
    pub placeholders: Vec<String>,
}

pub(crate) fn parse(doc: &Value) -> Parsed {
    let mut p = Parsed::default();
    let Some(root) = doc.as_object() else {
        p.document("$", "schema must be a JSON object");
        return p;
    };
    for key in root.keys() {
        if key != "meta" && key != "types" {
            p.document("$", format!("unexpected top-level key '{key}'"));
        }
    }
    match root.get("meta") {
        None => {}
        Some(Value::Object(meta)) => p.meta(meta),
        Some(_) => p.document("meta", "meta must be an object"),
    }
    match root.get("types") {
        Some(Value::Array(types)) => {
            for (i, t) in types.iter().enumerate() {
                p.type_def(i, t);
            }
        }
        Some(_) => p.document("types", "types must be an array"),
        None => p.document("types", "missing types"),
    }
    p
}

pub(crate) fn parse_meta(obj: &Map<String, Value>) -> Parsed {
    let mut p = Parsed::default();
    p.meta(obj);
    p
}

impl Parsed {
    fn document(&mut self, location: impl Into<String>, message: impl Into<String>) {
        self.error(LintErrorKind::Document, location, message);
    }

    fn error(&mut self, kind: LintErrorKind, location: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LintError::new(kind, location, message));
    }

    fn meta(&mut self, obj: &Map<String, Value>) {
        for (key, value) in obj {
            let loc = format!("meta.{key}");
            match key.as_str() {
                "module" | "patch" | "title" | "description" => match value.as_str() {
                    Some(s) => {
                        let slot = match key.as_str() {
                            "module" => &mut self.meta.module,
                            "patch" => &mut self.meta.patch,
                            "title" => &mut self.meta.title,
                            _ => &mut self.meta.description,
                        };
                        *slot = Some(s.to_string());
                    }
                    None => self.document(loc, "must be a string"),
                },
                "imports" => self.imports(value, &loc),
                "exports" => match value.as_array() {
                    Some(names) => {
                        for name in names {
                            match name.as_str() {
                                Some(n) => self.meta.exports.push(n.to_string()),
                                None => self.document(&loc, "export names must be strings"),
                            }
                        }
                    }
                    None => self.document(loc, "must be an array of type names"),
                },
                "config" => match value.as_object() {
                    Some(config) => self.config(config),
                    None => self.document(loc, "must be an object"),
                },
                _ => self.document(loc, "unknown meta key"),
            }
        }
    }

    /// Accepts `{"prefix": "uri"}` or `[["prefix", "uri"], ...]`.
    fn imports(&mut self, value: &Value, loc: &str) {
        match value {
            Value::Object(obj) => {
                for (prefix, uri) in obj {
                    match uri.as_str() {
                        Some(uri) => {
                            self.meta.imports.insert(prefix.clone(), uri.to_string());
                        }
                        None => self.document(loc, format!("import '{prefix}' must be a string")),
                    }
                }
            }
            Value::Array(pairs) => {
                for pair in pairs {
                    match pair.as_array().map(Vec::as_slice) {
                        Some([Value::String(prefix), Value::String(uri)]) => {
                            self.meta.imports.insert(prefix.clone(), uri.clone());
                        }
                        _ => self.document(loc, "imports must be [prefix, uri] pairs"),
                    }
                }
            }
            _ => self.document(loc, "must be an object or an array of pairs"),
        }
    }

    fn config(&mut self, obj: &Map<String, Value>) {
        let mut config = Config::default();
        for (key, value) in obj {
            let loc = format!("meta.config.{key}");
            let count = || value.as_u64().filter(|n| *n > 0);
            let text = || value.as_str().filter(|s| !s.is_empty()).map(str::to_string);
            let ok = match key.as_str() {
                "$MaxBinary" => count().map(|n| config.max_binary = n).is_some(),
                "$MaxString" => count().map(|n| config.max_string = n).is_some(),
                "$MaxElements" => count().map(|n| config.max_elements = n).is_some(),
                "$FS" => text().map(|s| config.fs = s).is_some(),
                "$Sys" => text().map(|s| config.sys = s).is_some(),
                "$TypeName" => text().map(|s| config.type_name = s).is_some(),
                "$FieldName" => text().map(|s| config.field_name = s).is_some(),
                "$NSID" => text().map(|s| config.nsid = s).is_some(),
                _ => {
                    self.document(loc, "unknown config key");
                    continue;
                }
            };
            if !ok {
                self.document(loc, format!("invalid value {value}"));
            }
        }
        self.meta.config = config;
    }

    fn type_def(&mut self, index: usize, t: &Value) {
        let loc = format!("types[{index}]");
        let parts = match t {
            Value::Array(a) => compact_type(a),
            Value::Object(o) => verbose_type(o),
            _ => None,
        };
        let Some(parts) = parts else {
            if let Some(name) = declared_name(t) {
                self.placeholders.push(name.to_string());
            }
            self.document(loc, "type definition must be [name, type, options, description, fields] or an object with name and type");
            return;
        };
        let loc = parts.name.to_string();

        let Some(kind) = BaseKind::parse(parts.kind) else {
            self.error(
                LintErrorKind::UnknownBaseKind,
                &loc,
                format!("unknown base kind '{}'", parts.kind),
            );
            self.placeholders.push(loc);
            return;
        };

        let mut def = TypeDefinition::new(parts.name, kind);
        def.description = self.description(parts.description, &loc);
        def.options = self.options(parts.options, &loc);

        match parts.members {
            None => {}
            Some(Value::Array(members)) if members.is_empty() => {}
            Some(Value::Array(members)) if kind == BaseKind::Enumerated => {
                let items = members
                    .iter()
                    .enumerate()
                    .filter_map(|(i, m)| self.item(m, &format!("{loc}[{i}]")))
                    .collect();
                def.members = Members::Items(items);
            }
            Some(Value::Array(members)) => {
                let fields = members
                    .iter()
                    .enumerate()
                    .filter_map(|(i, m)| self.field(m, &format!("{loc}[{i}]")))
                    .collect();
                def.members = Members::Fields(fields);
            }
            Some(_) => self.document(&loc, "fields must be an array"),
        }
        self.defs.push(def);
    }

    fn description(&mut self, value: Option<&Value>, loc: &str) -> String {
        match value {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(_) => {
                self.document(loc, "description must be a string");
                String::new()
            }
        }
    }

    fn tag(&mut self, value: &Value, loc: &str) -> Option<u64> {
        match value {
            Value::Number(n) if n.is_u64() => n.as_u64(),
            Value::Number(n) if n.is_i64() => {
                self.error(LintErrorKind::NegativeTag, loc, format!("tag {n} is negative"));
                None
            }
            _ => {
                self.document(loc, "tag must be a non-negative integer");
                None
            }
        }
    }

    /// Compact `["{1", "/date"]` or verbose `{"minv": 1, "format": "date"}`.
    fn options(&mut self, value: Option<&Value>, loc: &str) -> Options {
        let mut out = Options::new();
        match value {
            None | Some(Value::Null) => {}
            Some(Value::Array(opts)) => {
                for opt in opts {
                    let parsed = match opt.as_str() {
                        Some(s) => TypeOption::parse(s),
                        None => Err(OptionError::BadValue {
                            option: "option",
                            value: opt.to_string(),
                        }),
                    };
                    self.push_option(&mut out, parsed, loc);
                }
            }
            Some(Value::Object(opts)) => {
                for (name, v) in opts {
                    self.push_option(&mut out, TypeOption::from_named(name, v), loc);
                }
            }
            Some(_) => self.document(loc, "options must be an array or an object"),
        }
        out
    }

    fn push_option(&mut self, out: &mut Options, parsed: Result<TypeOption, OptionError>, loc: &str) {
        match parsed {
            Ok(opt) => out.push(opt),
            Err(e) => self.error(LintErrorKind::InvalidOption, loc, e.to_string()),
        }
    }

    fn item(&mut self, value: &Value, loc: &str) -> Option<Item> {
        let (tag, name, description) = match value {
            Value::Array(a) if a.len() == 2 || a.len() == 3 => (&a[0], &a[1], a.get(2)),
            Value::Object(o) => match (o.get("id"), o.get("value").or_else(|| o.get("name"))) {
                (Some(tag), Some(name)) => (tag, name, o.get("description")),
                _ => {
                    self.document(loc, "item must have id and value");
                    return None;
                }
            },
            _ => {
                self.document(loc, "item must be [id, value, description]");
                return None;
            }
        };
        let tag = self.tag(tag, loc)?;
        let Some(name) = item_name(name) else {
            self.document(loc, "item value must be a string");
            return None;
        };
        let description = self.description(description, loc);
        Some(Item {
            tag,
            name,
            description,
        })
    }

    fn field(&mut self, value: &Value, loc: &str) -> Option<Field> {
        let parts = match value {
            Value::Array(a) if a.len() == 4 || a.len() == 5 => {
                Some((&a[0], &a[1], &a[2], a.get(3), a.get(4)))
            }
            Value::Object(o) => match (o.get("id"), o.get("name"), o.get("type")) {
                (Some(tag), Some(name), Some(ty)) => {
                    Some((tag, name, ty, o.get("options"), o.get("description")))
                }
                _ => None,
            },
            _ => None,
        };
        let Some((tag, name, ty, options, description)) = parts else {
            self.document(loc, "field must be [id, name, type, options, description]");
            return None;
        };
        let tag = self.tag(tag, loc)?;
        let (Some(name), Some(ty)) = (name.as_str(), ty.as_str()) else {
            self.document(loc, "field name and type must be strings");
            return None;
        };
        let loc = format!("{}.{name}", loc.split('[').next().unwrap_or(loc));

        let mut minc = None;
        let mut maxc = None;
        let mut options_out = Options::new();
        for opt in &self.options(options, &loc) {
            let slot = match opt {
                TypeOption::MinCount(n) => Some((&mut minc, *n)),
                TypeOption::MaxCount(n) => Some((&mut maxc, *n)),
                _ => None,
            };
            match slot {
                Some((slot, _)) if slot.is_some() => self.error(
                    LintErrorKind::DuplicateOption,
                    &loc,
                    format!("option {} given more than once", opt.name()),
                ),
                Some((slot, n)) => *slot = Some(n),
                None => options_out.push(opt.clone()),
            }
        }

        Some(Field {
            tag,
            name: name.to_string(),
            type_ref: TypeRef::parse(ty),
            multiplicity: Multiplicity::from_options(minc, maxc),
            options: options_out,
            description: self.description(description, &loc),
        })
    }
}

struct TypeParts<'a> {
    name: &'a str,
    kind: &'a str,
    options: Option<&'a Value>,
    description: Option<&'a Value>,
    members: Option<&'a Value>,
}

fn compact_type(a: &[Value]) -> Option<TypeParts<'_>> {
    if !(2..=5).contains(&a.len()) {
        return None;
    }
    Some(TypeParts {
        name: a[0].as_str()?,
        kind: a[1].as_str()?,
        options: a.get(2),
        description: a.get(3),
        members: a.get(4),
    })
}

fn verbose_type(o: &Map<String, Value>) -> Option<TypeParts<'_>> {
    Some(TypeParts {
        name: o.get("name")?.as_str()?,
        kind: o.get("type")?.as_str()?,
        options: o.get("options"),
        description: o.get("description"),
        members: o.get("fields"),
    })
}

fn declared_name(t: &Value) -> Option<&str> {
    match t {
        Value::Array(a) => a.first()?.as_str(),
        Value::Object(o) => o.get("name")?.as_str(),
        _ => None,
    }
}

fn item_name(v: &Value) -> Option<String> {
    v.as_str().map(str::to_string)
}
