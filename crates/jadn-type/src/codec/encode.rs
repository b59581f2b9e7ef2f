//! Structural encoder: value tree → backend calls.

use jadn_pack::{Mapping, Value};

use crate::format::BinaryText;
use crate::type_def::{BaseKind, Field, Resolved, TypeModel};
use crate::validator::PathSegment;

use super::{CodecError, CodecOptions, Fault, Layout, StructuralError, WireKey};

/// Leaf encoding of one profile.
pub(crate) trait Encoder {
    /// Presence marker of an optional positional slot.
    fn slot(&mut self, present: bool);
    fn boolean(&mut self, b: bool);
    fn integer(&mut self, n: i64);
    fn number(&mut self, x: f64) -> Result<(), Fault>;
    fn string(&mut self, s: &str);
    fn binary(&mut self, b: &[u8], text: BinaryText) -> Result<(), Fault>;
    fn begin_array(&mut self, len: usize);
    fn end_array(&mut self);
    fn begin_map(&mut self, len: usize);
    fn key(&mut self, key: WireKey) -> Result<(), Fault>;
    fn end_map(&mut self);
    /// Self-describing value of an undeclared entry.
    /// Self-describing value nesting at most `max_depth` containers.
    fn any(&mut self, value: &Value, max_depth: usize) -> Result<(), Fault>;
}

type Step = Result<(), CodecError>;

pub(crate) struct Encode<'m, E> {
    model: &'m TypeModel,
    layout: Layout,
    enc: E,
    max_depth: usize,
    path: Vec<PathSegment>,
}

impl<'m, E: Encoder> Encode<'m, E> {
    pub(crate) fn new(model: &'m TypeModel, layout: Layout, enc: E, opts: &CodecOptions) -> Self {
        Self {
            model,
            layout,
            enc,
            max_depth: opts.max_depth,
            path: Vec::new(),
        }
    }

    pub(crate) fn into_backend(self) -> E {
        self.enc
    }

    fn fail(&self, reason: impl Into<String>) -> CodecError {
        CodecError::Structural(StructuralError {
            path: self.path.clone(),
            reason: reason.into(),
        })
    }

    fn fault(&self, fault: Fault) -> CodecError {
        fault.at(&self.path, self.max_depth)
    }

    fn mismatch(&self, ty: &Resolved<'_>, value: &Value) -> CodecError {
        self.fail(format!("expected {}, got {}", ty.label, value.kind_name()))
    }

    fn nested<F>(&mut self, seg: PathSegment, f: F) -> Step
    where
        F: FnOnce(&mut Self) -> Step,
    {
        self.path.push(seg);
        let out = f(self);
        self.path.pop();
        out
    }

    pub(crate) fn value(&mut self, ty: &Resolved<'m>, value: &Value, depth: usize) -> Step {
        match ty.kind {
            BaseKind::Boolean => match value {
                Value::Bool(b) => self.enc.boolean(*b),
                other => return Err(self.mismatch(ty, other)),
            },
            BaseKind::Integer => match value {
                Value::Int(n) => self.enc.integer(*n),
                other => return Err(self.mismatch(ty, other)),
            },
            BaseKind::Number => match value.as_f64() {
                Some(x) => self.enc.number(x).map_err(|f| self.fault(f))?,
                None => return Err(self.mismatch(ty, value)),
            },
            BaseKind::String => match value {
                Value::Text(s) => self.enc.string(s),
                other => return Err(self.mismatch(ty, other)),
            },
            BaseKind::Binary => match value {
                Value::Bytes(b) => {
                    let text = BinaryText::for_format(ty.options.format());
                    self.enc.binary(b, text).map_err(|f| self.fault(f))?
                }
                other => return Err(self.mismatch(ty, other)),
            },
            BaseKind::Enumerated => self.enumerated(ty, value)?,
            kind => {
                if depth >= self.max_depth {
                    return Err(CodecError::LimitExceeded {
                        limit: self.max_depth,
                    });
                }
                let depth = depth + 1;
                match kind {
                    BaseKind::ArrayOf => self.array_of(ty, value, depth)?,
                    BaseKind::MapOf => self.map_of(ty, value, depth)?,
                    BaseKind::Array => self.array(ty, value, depth)?,
                    BaseKind::Record if self.layout == Layout::Concise && !ty.options.open() => {
                        self.positional_record(ty, value, depth)?
                    }
                    _ => self.keyed(ty, value, depth)?,
                }
            }
        }
        Ok(())
    }

    fn enumerated(&mut self, ty: &Resolved<'_>, value: &Value) -> Step {
        if ty.options.id() {
            let item = value
                .as_i64()
                .and_then(|t| u64::try_from(t).ok())
                .and_then(|t| ty.item_by_tag(t));
            return match item {
                Some(item) => {
                    self.enc.integer(item.tag as i64);
                    Ok(())
                }
                None => Err(self.fail(format!("{} is not a tag of {}", show(value), ty.label))),
            };
        }
        let Some(name) = value.as_str() else {
            return Err(self.mismatch(ty, value));
        };
        let Some(item) = ty.item_by_name(name) else {
            return Err(self.fail(format!("'{name}' is not a value of {}", ty.label)));
        };
        match self.layout {
            Layout::Verbose => self.enc.string(&item.name),
            Layout::Concise => self.enc.integer(item.tag as i64),
        }
        Ok(())
    }

    fn array_of(&mut self, ty: &Resolved<'m>, value: &Value, depth: usize) -> Step {
        let Some(items) = value.as_sequence() else {
            return Err(self.mismatch(ty, value));
        };
        let Some(vtype) = ty.options.vtype() else {
            return Err(self.fail(format!("{} has no element type", ty.label)));
        };
        let vt = self.model.resolve_ref(vtype, None)?;
        self.enc.begin_array(items.len());
        for (i, item) in items.iter().enumerate() {
            self.nested(PathSegment::Index(i), |w| w.value(&vt, item, depth))?;
        }
        self.enc.end_array();
        Ok(())
    }

    fn map_of(&mut self, ty: &Resolved<'m>, value: &Value, depth: usize) -> Step {
        let Some(entries) = value.as_mapping() else {
            return Err(self.mismatch(ty, value));
        };
        let (Some(ktype), Some(vtype)) = (ty.options.ktype(), ty.options.vtype()) else {
            return Err(self.fail(format!("{} has no key or value type", ty.label)));
        };
        let kt = self.model.resolve_ref(ktype, None)?;
        let vt = self.model.resolve_ref(vtype, None)?;
        if text_keys(&kt, self.layout) {
            self.enc.begin_map(entries.len());
            for (k, v) in entries {
                let Some(key) = k.as_str() else {
                    return Err(self.mismatch(&kt, k));
                };
                if kt.kind == BaseKind::Enumerated && kt.item_by_name(key).is_none() {
                    return Err(self.fail(format!("'{key}' is not a value of {}", kt.label)));
                }
                self.enc
                    .key(WireKey::Text(key.to_string()))
                    .map_err(|f| self.fault(f))?;
                self.nested(PathSegment::Key(key.to_string()), |w| w.value(&vt, v, depth))?;
            }
            self.enc.end_map();
        } else {
            self.enc.begin_array(entries.len() * 2);
            for (k, v) in entries {
                self.nested(PathSegment::Key(show(k)), |w| {
                    w.value(&kt, k, depth)?;
                    w.value(&vt, v, depth)
                })?;
            }
            self.enc.end_array();
        }
        Ok(())
    }

    /// Array values: positional, `Null` for an absent optional slot.
    fn array(&mut self, ty: &Resolved<'m>, value: &Value, depth: usize) -> Step {
        let Some(items) = value.as_sequence() else {
            return Err(self.mismatch(ty, value));
        };
        if items.len() > ty.fields.len() {
            return Err(self.fail(format!(
                "{} has {} positions, got {}",
                ty.label,
                ty.fields.len(),
                items.len()
            )));
        }
        let slots: Vec<Option<&Value>> = ty
            .fields
            .iter()
            .enumerate()
            .map(|(i, _)| items.get(i).filter(|v| !v.is_null()))
            .collect();
        self.positional(ty, &slots, items.len(), depth)
    }

    fn positional_record(&mut self, ty: &Resolved<'m>, value: &Value, depth: usize) -> Step {
        let Some(entries) = value.as_mapping() else {
            return Err(self.mismatch(ty, value));
        };
        self.reject_unknown(ty, entries, false)?;
        let slots: Vec<Option<&Value>> = ty
            .fields
            .iter()
            .map(|f| entries.get_text(&f.name))
            .collect();
        let len = slots.iter().rposition(Option::is_some).map_or(0, |i| i + 1);
        self.positional(ty, &slots, len, depth)
    }

    /// Writes the first `len` slots; slots past `len` are absent.
    fn positional(
        &mut self,
        ty: &Resolved<'m>,
        slots: &[Option<&Value>],
        len: usize,
        depth: usize,
    ) -> Step {
        for (field, slot) in ty.fields.iter().zip(slots) {
            if slot.is_none() && field.multiplicity.is_required() {
                return Err(self.missing(field));
            }
        }
        self.enc.begin_array(len);
        for (field, slot) in ty.fields.iter().zip(slots).take(len) {
            if !field.multiplicity.is_required() {
                self.enc.slot(slot.is_some());
            }
            if let Some(v) = slot {
                self.field(field, v, depth)?;
            }
        }
        self.enc.end_array();
        Ok(())
    }

    /// Record, Map and Choice values as keyed maps.
    fn keyed(&mut self, ty: &Resolved<'m>, value: &Value, depth: usize) -> Step {
        let Some(entries) = value.as_mapping() else {
            return Err(self.mismatch(ty, value));
        };
        let abstract_tags = ty.kind != BaseKind::Record && ty.options.id();
        let wire_tags = abstract_tags || self.layout == Layout::Concise;
        if ty.kind == BaseKind::Choice && entries.len() != 1 {
            return Err(self.fail(format!(
                "{} needs exactly one alternative, got {}",
                ty.label,
                entries.len()
            )));
        }
        self.reject_unknown(ty, entries, abstract_tags)?;
        for field in ty.fields {
            if field.multiplicity.is_required() && field_entry(entries, field, abstract_tags).is_none() {
                return Err(self.missing(field));
            }
        }

        self.enc.begin_map(entries.len());
        for (k, v) in entries {
            match lookup(ty.fields, k, abstract_tags) {
                Some(field) => {
                    let key = if wire_tags {
                        WireKey::Tag(field.tag)
                    } else {
                        WireKey::Text(field.name.clone())
                    };
                    self.enc.key(key).map_err(|f| self.fault(f))?;
                    self.field(field, v, depth)?;
                }
                None => {
                    // Only open types get here; reject_unknown saw to the rest.
                    let name = k.as_str().unwrap_or_default().to_string();
                    if wire_tags && WireKey::Text(name.clone()).tag().is_some() {
                        return Err(self.fail(format!("extra key '{name}' reads as a tag")));
                    }
                    self.enc
                        .key(WireKey::Text(name.clone()))
                        .map_err(|f| self.fault(f))?;
                    let remaining = self.max_depth.saturating_sub(depth);
                    let seg = PathSegment::Key(name);
                    self.nested(seg, |w| w.enc.any(v, remaining).map_err(|f| w.fault(f)))?;
                }
            }
        }
        self.enc.end_map();
        Ok(())
    }

    fn reject_unknown(&self, ty: &Resolved<'_>, entries: &Mapping, by_tag: bool) -> Step {
        for k in entries.keys() {
            let declared = lookup(ty.fields, k, by_tag).is_some();
            let extra = ty.options.open() && k.as_str().is_some();
            if !declared && !extra {
                return Err(self.fail(format!("{} has no field {}", ty.label, show(k))));
            }
        }
        Ok(())
    }

    fn missing(&self, field: &Field) -> CodecError {
        self.fail(format!("required field '{}' is missing", field.name))
    }

    fn field(&mut self, field: &'m Field, value: &Value, depth: usize) -> Step {
        let seg = PathSegment::Field {
            tag: field.tag,
            name: field.name.clone(),
        };
        self.nested(seg, |w| {
            let ft = w.model.resolve_field(field)?;
            if !field.multiplicity.is_repeated() {
                return w.value(&ft, value, depth);
            }
            let Some(items) = value.as_sequence() else {
                return Err(w.fail(format!(
                    "repeated field expects a sequence, got {}",
                    value.kind_name()
                )));
            };
            w.enc.begin_array(items.len());
            for (i, item) in items.iter().enumerate() {
                w.nested(PathSegment::Index(i), |w| w.value(&ft, item, depth))?;
            }
            w.enc.end_array();
            Ok(())
        })
    }
}

/// MapOf keys written as map keys rather than as a pair array.
pub(crate) fn text_keys(kt: &Resolved<'_>, layout: Layout) -> bool {
    match kt.kind {
        BaseKind::String => true,
        BaseKind::Enumerated => layout == Layout::Verbose && !kt.options.id(),
        _ => false,
    }
}

/// Field addressed by an abstract mapping key.
pub(crate) fn lookup<'a>(fields: &'a [Field], key: &Value, by_tag: bool) -> Option<&'a Field> {
    if by_tag {
        let tag = key.as_i64().and_then(|t| u64::try_from(t).ok())?;
        fields.iter().find(|f| f.tag == tag)
    } else {
        let name = key.as_str()?;
        fields.iter().find(|f| f.name == name)
    }
}

fn field_entry<'v>(entries: &'v Mapping, field: &Field, by_tag: bool) -> Option<&'v Value> {
    if by_tag {
        entries.get(&Value::Int(field.tag as i64))
    } else {
        entries.get_text(&field.name)
    }
}

pub(crate) fn show(v: &Value) -> String {
    match v {
        Value::Text(s) => format!("'{s}'"),
        Value::Int(n) => n.to_string(),
        other => other.kind_name().to_string(),
    }
}
