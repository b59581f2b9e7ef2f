//! Structural decoder: backend reads → value tree.

use jadn_pack::{Mapping, Value};

use crate::format::BinaryText;
use crate::type_def::{BaseKind, Field, Resolved, TypeModel};
use crate::validator::PathSegment;

use super::encode::{show, text_keys};
use super::{CodecError, CodecOptions, Fault, Layout, StructuralError, WireKey};

/// Leaf decoding of one profile; mirrors [`super::encode::Encoder`].
pub(crate) trait Decoder {
    /// `false` when an optional positional slot is absent.
    fn slot(&mut self) -> Result<bool, Fault>;
    fn boolean(&mut self) -> Result<bool, Fault>;
    fn integer(&mut self) -> Result<i64, Fault>;
    fn number(&mut self) -> Result<f64, Fault>;
    fn string(&mut self) -> Result<String, Fault>;
    fn binary(&mut self, text: BinaryText) -> Result<Vec<u8>, Fault>;
    /// Element count of the array that starts here.
    fn begin_array(&mut self) -> Result<usize, Fault>;
    fn end_array(&mut self) -> Result<(), Fault>;
    /// Entry count of the map that starts here.
    fn begin_map(&mut self) -> Result<usize, Fault>;
    fn key(&mut self) -> Result<WireKey, Fault>;
    fn end_map(&mut self) -> Result<(), Fault>;
    fn any(&mut self, max_depth: usize) -> Result<Value, Fault>;
    /// Fails when input remains.
    fn finish(&mut self) -> Result<(), Fault>;
}

type Read = Result<Value, CodecError>;

pub(crate) struct Decode<'m, D> {
    model: &'m TypeModel,
    layout: Layout,
    dec: D,
    max_depth: usize,
    path: Vec<PathSegment>,
}

impl<'m, D: Decoder> Decode<'m, D> {
    pub(crate) fn new(model: &'m TypeModel, layout: Layout, dec: D, opts: &CodecOptions) -> Self {
        Self {
            model,
            layout,
            dec,
            max_depth: opts.max_depth,
            path: Vec::new(),
        }
    }

    pub(crate) fn finish(&mut self) -> Result<(), CodecError> {
        self.dec.finish().map_err(|f| f.at(&[], self.max_depth))
    }

    fn fail(&self, reason: impl Into<String>) -> CodecError {
        CodecError::Structural(StructuralError {
            path: self.path.clone(),
            reason: reason.into(),
        })
    }

    /// Runs a backend read, locating its failure at the current path.
    fn read<T>(&mut self, f: impl FnOnce(&mut D) -> Result<T, Fault>) -> Result<T, CodecError> {
        f(&mut self.dec).map_err(|fault| fault.at(&self.path, self.max_depth))
    }

    fn nested<T, F>(&mut self, seg: PathSegment, f: F) -> Result<T, CodecError>
    where
        F: FnOnce(&mut Self) -> Result<T, CodecError>,
    {
        self.path.push(seg);
        let out = f(self);
        self.path.pop();
        out
    }

    pub(crate) fn value(&mut self, ty: &Resolved<'m>, depth: usize) -> Read {
        Ok(match ty.kind {
            BaseKind::Boolean => Value::Bool(self.read(|d| d.boolean())?),
            BaseKind::Integer => Value::Int(self.read(|d| d.integer())?),
            BaseKind::Number => Value::Real(self.read(|d| d.number())?),
            BaseKind::String => Value::Text(self.read(|d| d.string())?),
            BaseKind::Binary => {
                let text = BinaryText::for_format(ty.options.format());
                Value::Bytes(self.read(|d| d.binary(text))?)
            }
            BaseKind::Enumerated => self.enumerated(ty)?,
            kind => {
                if depth >= self.max_depth {
                    return Err(CodecError::LimitExceeded {
                        limit: self.max_depth,
                    });
                }
                let depth = depth + 1;
                match kind {
                    BaseKind::ArrayOf => self.array_of(ty, depth)?,
                    BaseKind::MapOf => self.map_of(ty, depth)?,
                    BaseKind::Array => self.array(ty, depth)?,
                    BaseKind::Record if self.layout == Layout::Concise && !ty.options.open() => {
                        self.positional_record(ty, depth)?
                    }
                    _ => self.keyed(ty, depth)?,
                }
            }
        })
    }

    fn enumerated(&mut self, ty: &Resolved<'_>) -> Read {
        if self.layout == Layout::Verbose && !ty.options.id() {
            let name = self.read(|d| d.string())?;
            return match ty.item_by_name(&name) {
                Some(_) => Ok(Value::Text(name)),
                None => Err(self.fail(format!("'{name}' is not a value of {}", ty.label))),
            };
        }
        let tag = self.read(|d| d.integer())?;
        let item = u64::try_from(tag).ok().and_then(|t| ty.item_by_tag(t));
        match item {
            Some(item) if ty.options.id() => Ok(Value::Int(item.tag as i64)),
            Some(item) => Ok(Value::Text(item.name.clone())),
            None => Err(self.fail(format!("{tag} is not a tag of {}", ty.label))),
        }
    }

    fn array_of(&mut self, ty: &Resolved<'m>, depth: usize) -> Read {
        let Some(vtype) = ty.options.vtype() else {
            return Err(self.fail(format!("{} has no element type", ty.label)));
        };
        let vt = self.model.resolve_ref(vtype, None)?;
        let n = self.read(|d| d.begin_array())?;
        let mut items = Vec::with_capacity(n);
        for i in 0..n {
            items.push(self.nested(PathSegment::Index(i), |r| r.value(&vt, depth))?);
        }
        self.read(|d| d.end_array())?;
        Ok(Value::Sequence(items))
    }

    fn map_of(&mut self, ty: &Resolved<'m>, depth: usize) -> Read {
        let (Some(ktype), Some(vtype)) = (ty.options.ktype(), ty.options.vtype()) else {
            return Err(self.fail(format!("{} has no key or value type", ty.label)));
        };
        let kt = self.model.resolve_ref(ktype, None)?;
        let vt = self.model.resolve_ref(vtype, None)?;
        let mut entries = Mapping::new();
        if text_keys(&kt, self.layout) {
            let n = self.read(|d| d.begin_map())?;
            for _ in 0..n {
                let WireKey::Text(key) = self.read(|d| d.key())? else {
                    return Err(self.fail(format!("{} keys must be text", ty.label)));
                };
                if kt.kind == BaseKind::Enumerated && kt.item_by_name(&key).is_none() {
                    return Err(self.fail(format!("'{key}' is not a value of {}", kt.label)));
                }
                let v = self.nested(PathSegment::Key(key.clone()), |r| r.value(&vt, depth))?;
                if entries.insert(Value::Text(key.clone()), v).is_some() {
                    return Err(self.fail(format!("duplicate key '{key}'")));
                }
            }
            self.read(|d| d.end_map())?;
        } else {
            let n = self.read(|d| d.begin_array())?;
            if n % 2 != 0 {
                return Err(self.fail(format!("{} pair list has odd length {n}", ty.label)));
            }
            for i in 0..n / 2 {
                let (k, v) = self.nested(PathSegment::Index(i), |r| {
                    Ok((r.value(&kt, depth)?, r.value(&vt, depth)?))
                })?;
                let shown = show(&k);
                if entries.insert(k, v).is_some() {
                    return Err(self.fail(format!("duplicate key {shown}")));
                }
            }
            self.read(|d| d.end_array())?;
        }
        Ok(Value::Mapping(entries))
    }

    /// Reads up to the declared number of positions; a position past the
    /// end of the input is absent.
    fn positions(
        &mut self,
        ty: &Resolved<'m>,
        depth: usize,
    ) -> Result<Vec<Option<Value>>, CodecError> {
        let n = self.read(|d| d.begin_array())?;
        if n > ty.fields.len() {
            return Err(self.fail(format!(
                "{} has {} positions, got {n}",
                ty.label,
                ty.fields.len()
            )));
        }
        let fields: &'m [Field] = ty.fields;
        let mut slots = Vec::with_capacity(n);
        for field in &fields[..n] {
            let present = field.multiplicity.is_required() || self.read(|d| d.slot())?;
            if present {
                slots.push(Some(self.field(field, depth)?));
            } else {
                slots.push(None);
            }
        }
        self.read(|d| d.end_array())?;
        for field in &fields[n..] {
            if field.multiplicity.is_required() {
                return Err(self.missing(field));
            }
        }
        Ok(slots)
    }

    fn array(&mut self, ty: &Resolved<'m>, depth: usize) -> Read {
        let slots = self.positions(ty, depth)?;
        Ok(Value::Sequence(
            slots
                .into_iter()
                .map(|s| s.unwrap_or(Value::Null))
                .collect(),
        ))
    }

    fn positional_record(&mut self, ty: &Resolved<'m>, depth: usize) -> Read {
        let slots = self.positions(ty, depth)?;
        let entries: Mapping = ty
            .fields
            .iter()
            .zip(slots)
            .filter_map(|(f, slot)| slot.map(|v| (Value::Text(f.name.clone()), v)))
            .collect();
        Ok(Value::Mapping(entries))
    }

    fn keyed(&mut self, ty: &Resolved<'m>, depth: usize) -> Read {
        let fields: &'m [Field] = ty.fields;
        let abstract_tags = ty.kind != BaseKind::Record && ty.options.id();
        let wire_tags = abstract_tags || self.layout == Layout::Concise;
        let n = self.read(|d| d.begin_map())?;
        let mut entries = Mapping::with_capacity(n);
        for _ in 0..n {
            let key = self.read(|d| d.key())?;
            let field = match (&key, wire_tags) {
                (_, true) => key.tag().and_then(|t| fields.iter().find(|f| f.tag == t)),
                (WireKey::Text(name), false) => fields.iter().find(|f| &f.name == name),
                (WireKey::Tag(_), false) => None,
            };
            let (k, v) = match (field, key) {
                (Some(field), _) => {
                    let k = match abstract_tags {
                        true => Value::Int(field.tag as i64),
                        false => Value::Text(field.name.clone()),
                    };
                    (k, self.field(field, depth)?)
                }
                (None, WireKey::Text(name)) if ty.options.open() => {
                    let remaining = self.max_depth.saturating_sub(depth);
                    let v = self.nested(PathSegment::Key(name.clone()), |r| {
                        r.read(|d| d.any(remaining))
                    })?;
                    (Value::Text(name), v)
                }
                (None, WireKey::Tag(t)) => {
                    return Err(self.fail(format!("{} has no field {t}", ty.label)))
                }
                (None, WireKey::Text(name)) => {
                    return Err(self.fail(format!("{} has no field '{name}'", ty.label)))
                }
            };
            let shown = show(&k);
            if entries.insert(k, v).is_some() {
                return Err(self.fail(format!("duplicate field {shown}")));
            }
        }
        self.read(|d| d.end_map())?;

        if ty.kind == BaseKind::Choice && n != 1 {
            return Err(self.fail(format!(
                "{} needs exactly one alternative, got {n}",
                ty.label
            )));
        }
        for field in ty.fields {
            let key = match abstract_tags {
                true => Value::Int(field.tag as i64),
                false => Value::Text(field.name.clone()),
            };
            if field.multiplicity.is_required() && !entries.contains_key(&key) {
                return Err(self.missing(field));
            }
        }
        Ok(Value::Mapping(entries))
    }

    fn missing(&self, field: &Field) -> CodecError {
        self.fail(format!("required field '{}' is missing", field.name))
    }

    fn field(&mut self, field: &'m Field, depth: usize) -> Read {
        let seg = PathSegment::Field {
            tag: field.tag,
            name: field.name.clone(),
        };
        self.nested(seg, |r| {
            let ft = r.model.resolve_field(field)?;
            if !field.multiplicity.is_repeated() {
                return r.value(&ft, depth);
            }
            let n = r.read(|d| d.begin_array())?;
            let mut items = Vec::with_capacity(n);
            for i in 0..n {
                items.push(r.nested(PathSegment::Index(i), |r| r.value(&ft, depth))?);
            }
            r.read(|d| d.end_array())?;
            Ok(Value::Sequence(items))
        })
    }
}
