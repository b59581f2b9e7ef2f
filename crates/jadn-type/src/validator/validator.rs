//! Runtime validator: walks a value tree alongside the type model.

use jadn_pack::Value;

use crate::format::Format;
use crate::type_def::{BaseKind, Field, Resolved, TypeModel, TypeRef};

use super::types::{
    ConformanceError, ErrorCode, PathSegment, ValidateError, ValidationReport, ValidatorOptions,
};

/// Checks `value` against the type named `type_name`.
///
/// `type_name` may be a defined type, a base kind name or a `$Source`
/// derived enumeration. An `Err` means the call itself could not run; data
/// problems are reported in the returned [`ValidationReport`].
pub fn validate(
    model: &TypeModel,
    type_name: &str,
    value: &Value,
    opts: &ValidatorOptions,
) -> Result<ValidationReport, ValidateError> {
    let ty = model.resolve_ref(&TypeRef::parse(type_name), None)?;
    let mut v = Validator {
        model,
        opts,
        path: Vec::new(),
        errors: Vec::new(),
    };
    v.value(&ty, value, 0)?;
    tracing::trace!(type_name, errors = v.errors.len(), "validated value");
    Ok(ValidationReport::new(v.errors))
}

struct Validator<'m, 'o> {
    model: &'m TypeModel,
    opts: &'o ValidatorOptions,
    path: Vec<PathSegment>,
    errors: Vec<ConformanceError>,
}

type Step = Result<(), ValidateError>;

impl<'m> Validator<'m, '_> {
    fn report(&mut self, code: ErrorCode, expected: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConformanceError {
            path: self.path.clone(),
            code,
            expected: expected.into(),
            message: message.into(),
        });
    }

    fn mismatch(&mut self, ty: &Resolved<'_>, value: &Value) {
        self.report(
            ErrorCode::TypeMismatch,
            ty.label.as_ref(),
            format!("expected {}, got {}", ty.kind, value.kind_name()),
        );
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

    fn value(&mut self, ty: &Resolved<'m>, value: &Value, depth: usize) -> Step {
        match ty.kind {
            BaseKind::Boolean => {
                if value.as_bool().is_none() {
                    self.mismatch(ty, value);
                }
            }
            BaseKind::Integer => self.integer(ty, value),
            BaseKind::Number => self.number(ty, value),
            BaseKind::String => self.string(ty, value),
            BaseKind::Binary => self.binary(ty, value),
            BaseKind::Enumerated => self.enumerated(ty, value),
            kind => {
                if depth >= self.opts.max_depth {
                    return Err(ValidateError::LimitExceeded {
                        limit: self.opts.max_depth,
                    });
                }
                let depth = depth + 1;
                match kind {
                    BaseKind::ArrayOf => self.array_of(ty, value, depth)?,
                    BaseKind::MapOf => self.map_of(ty, value, depth)?,
                    BaseKind::Array => self.array(ty, value, depth)?,
                    BaseKind::Choice => self.choice(ty, value, depth)?,
                    _ => self.map(ty, value, depth)?,
                }
            }
        }
        Ok(())
    }

    fn integer(&mut self, ty: &Resolved<'_>, value: &Value) {
        let Some(n) = value.as_i64() else {
            return self.mismatch(ty, value);
        };
        let opts = &ty.options;
        if let Some(min) = opts.minv().filter(|min| n < *min) {
            self.report(
                ErrorCode::BelowMinimum,
                format!("minv {min}"),
                format!("{n} is less than {min}"),
            );
        }
        if let Some(max) = opts.maxv().filter(|max| n > *max) {
            self.report(
                ErrorCode::AboveMaximum,
                format!("maxv {max}"),
                format!("{n} is greater than {max}"),
            );
        }
        if let Some(format) = self.format(ty) {
            if !format.check_int(n) {
                self.format_violation(format, &n.to_string());
            }
        }
    }

    fn number(&mut self, ty: &Resolved<'_>, value: &Value) {
        let Some(x) = value.as_f64() else {
            return self.mismatch(ty, value);
        };
        let opts = &ty.options;
        if let Some(min) = opts.minv().filter(|min| x < *min as f64) {
            self.report(
                ErrorCode::BelowMinimum,
                format!("minv {min}"),
                format!("{x} is less than {min}"),
            );
        }
        if let Some(max) = opts.maxv().filter(|max| x > *max as f64) {
            self.report(
                ErrorCode::AboveMaximum,
                format!("maxv {max}"),
                format!("{x} is greater than {max}"),
            );
        }
    }

    fn string(&mut self, ty: &Resolved<'_>, value: &Value) {
        let Some(s) = value.as_str() else {
            return self.mismatch(ty, value);
        };
        self.length(ty, s.chars().count(), "characters");
        if let Some(pattern) = ty.options.pattern() {
            let matched = self.model.pattern(pattern).map_or(true, |re| re.is_match(s));
            if !matched {
                self.report(
                    ErrorCode::PatternMismatch,
                    format!("pattern {pattern}"),
                    format!("'{s}' does not match pattern"),
                );
            }
        }
        if let Some(format) = self.format(ty) {
            if !format.check_str(s) {
                self.format_violation(format, s);
            }
        }
    }

    fn binary(&mut self, ty: &Resolved<'_>, value: &Value) {
        let Some(b) = value.as_bytes() else {
            return self.mismatch(ty, value);
        };
        self.length(ty, b.len(), "octets");
        if let Some(format) = self.format(ty) {
            if !format.check_bytes(b) {
                self.format_violation(format, &format!("{} octets", b.len()));
            }
        }
    }

    /// Length bounds of String and Binary values.
    fn length(&mut self, ty: &Resolved<'_>, len: usize, unit: &str) {
        let (min, max) = self.bounds(ty);
        if (len as u64) < min {
            self.report(
                ErrorCode::TooShort,
                format!("minv {min}"),
                format!("{len} {unit}, at least {min} required"),
            );
        }
        if (len as u64) > max {
            self.report(
                ErrorCode::TooLong,
                format!("maxv {max}"),
                format!("{len} {unit}, at most {max} allowed"),
            );
        }
    }

    /// Element or entry count bounds of containers.
    fn count(&mut self, ty: &Resolved<'_>, len: usize) {
        let (min, max) = self.bounds(ty);
        if (len as u64) < min {
            self.report(
                ErrorCode::TooFew,
                format!("minv {min}"),
                format!("{len} elements, at least {min} required"),
            );
        }
        if (len as u64) > max {
            self.report(
                ErrorCode::TooMany,
                format!("maxv {max}"),
                format!("{len} elements, at most {max} allowed"),
            );
        }
    }

    /// `minv`/`maxv` as size bounds, the configured default standing in for
    /// an absent or zero `maxv`.
    fn bounds(&self, ty: &Resolved<'_>) -> (u64, u64) {
        let min = ty.options.minv().map_or(0, |n| n.max(0) as u64);
        let max = match ty.options.maxv() {
            Some(n) if n > 0 => n as u64,
            _ => self.model.config().default_max(ty.kind),
        };
        (min, max)
    }

    fn format(&self, ty: &Resolved<'_>) -> Option<Format> {
        if !self.opts.check_formats {
            return None;
        }
        ty.options.format().and_then(Format::parse)
    }

    fn format_violation(&mut self, format: Format, shown: &str) {
        self.report(
            ErrorCode::FormatViolation,
            format!("format {}", format.as_str()),
            format!("{shown} is not a valid {}", format.as_str()),
        );
    }

    fn enumerated(&mut self, ty: &Resolved<'_>, value: &Value) {
        let found = if ty.options.id() {
            match value.as_i64() {
                Some(tag) => u64::try_from(tag).ok().and_then(|t| ty.item_by_tag(t)).is_some(),
                None => return self.mismatch(ty, value),
            }
        } else {
            match value.as_str() {
                Some(name) => ty.item_by_name(name).is_some(),
                None => return self.mismatch(ty, value),
            }
        };
        if !found {
            self.report(
                ErrorCode::UnknownEnum,
                ty.label.as_ref(),
                format!("{} is not a value of {}", display_key(value), ty.label),
            );
        }
    }

    fn array_of(&mut self, ty: &Resolved<'m>, value: &Value, depth: usize) -> Step {
        let Some(items) = value.as_sequence() else {
            self.mismatch(ty, value);
            return Ok(());
        };
        self.count(ty, items.len());
        if let Some(vtype) = ty.options.vtype() {
            let vt = self.model.resolve_ref(vtype, None)?;
            for (i, item) in items.iter().enumerate() {
                self.nested(PathSegment::Index(i), |v| v.value(&vt, item, depth))?;
            }
        }
        if ty.options.unique() {
            for (i, item) in items.iter().enumerate() {
                if items[..i].contains(item) {
                    self.nested(PathSegment::Index(i), |v| {
                        v.report(
                            ErrorCode::DuplicateElement,
                            "unique",
                            "element repeats an earlier element",
                        );
                        Ok(())
                    })?;
                }
            }
        }
        Ok(())
    }

    fn map_of(&mut self, ty: &Resolved<'m>, value: &Value, depth: usize) -> Step {
        let Some(entries) = value.as_mapping() else {
            self.mismatch(ty, value);
            return Ok(());
        };
        self.count(ty, entries.len());
        let (Some(ktype), Some(vtype)) = (ty.options.ktype(), ty.options.vtype()) else {
            return Ok(());
        };
        let kt = self.model.resolve_ref(ktype, None)?;
        let vt = self.model.resolve_ref(vtype, None)?;
        for (k, v) in entries {
            self.nested(PathSegment::Key(display_key(k)), |this| {
                this.value(&kt, k, depth)?;
                this.value(&vt, v, depth)
            })?;
        }
        Ok(())
    }

    fn array(&mut self, ty: &Resolved<'m>, value: &Value, depth: usize) -> Step {
        let Some(items) = value.as_sequence() else {
            self.mismatch(ty, value);
            return Ok(());
        };
        self.count(ty, items.iter().filter(|v| !v.is_null()).count());
        for (i, field) in ty.fields.iter().enumerate() {
            let slot = items.get(i).filter(|v| !v.is_null());
            self.field(field, slot, depth)?;
        }
        for i in ty.fields.len()..items.len() {
            self.nested(PathSegment::Index(i), |v| {
                v.report(
                    ErrorCode::TooMany,
                    ty.label.as_ref(),
                    format!("{} declares {} positions", ty.label, ty.fields.len()),
                );
                Ok(())
            })?;
        }
        if let Some(format) = self.format(ty) {
            if let Some((octets, max_prefix)) = format.net_width() {
                if !is_net(items, octets, max_prefix) {
                    self.format_violation(format, "value");
                }
            }
        }
        Ok(())
    }

    fn map(&mut self, ty: &Resolved<'m>, value: &Value, depth: usize) -> Step {
        let Some(entries) = value.as_mapping() else {
            self.mismatch(ty, value);
            return Ok(());
        };
        self.count(ty, entries.len());
        let by_tag = ty.kind == BaseKind::Map && ty.options.id();
        for (k, v) in entries {
            match lookup(ty, k, by_tag) {
                Some(field) => self.field(field, Some(v), depth)?,
                None if ty.options.open() && k.as_str().is_some() => {}
                None => self.nested(PathSegment::Key(display_key(k)), |this| {
                    this.report(
                        ErrorCode::UnknownField,
                        ty.label.as_ref(),
                        format!("{} has no field {}", ty.label, display_key(k)),
                    );
                    Ok(())
                })?,
            }
        }
        for field in ty.fields {
            let present = if by_tag {
                entries.get(&Value::Int(field.tag as i64)).is_some()
            } else {
                entries.get_text(&field.name).is_some()
            };
            if !present && field.multiplicity.is_required() {
                self.field(field, None, depth)?;
            }
        }
        Ok(())
    }

    fn choice(&mut self, ty: &Resolved<'m>, value: &Value, depth: usize) -> Step {
        let Some(entries) = value.as_mapping() else {
            self.mismatch(ty, value);
            return Ok(());
        };
        let mut iter = entries.iter();
        match (iter.next(), entries.len()) {
            (None, _) => self.report(
                ErrorCode::NoField,
                ty.label.as_ref(),
                format!("no alternative of {} is present", ty.label),
            ),
            (Some((k, v)), 1) => match lookup(ty, k, ty.options.id()) {
                Some(field) => self.field(field, Some(v), depth)?,
                None => self.nested(PathSegment::Key(display_key(k)), |this| {
                    this.report(
                        ErrorCode::UnknownField,
                        ty.label.as_ref(),
                        format!("{} has no alternative {}", ty.label, display_key(k)),
                    );
                    Ok(())
                })?,
            },
            (Some(_), n) => self.report(
                ErrorCode::MultipleFields,
                ty.label.as_ref(),
                format!("{n} alternatives of {} are present, exactly one allowed", ty.label),
            ),
        }
        Ok(())
    }

    /// One declared field; `value` is `None` when the field is absent.
    fn field(&mut self, field: &'m Field, value: Option<&Value>, depth: usize) -> Step {
        let seg = PathSegment::Field {
            tag: field.tag,
            name: field.name.clone(),
        };
        self.nested(seg, |this| {
            let Some(value) = value else {
                if field.multiplicity.is_required() {
                    this.report(
                        ErrorCode::MissingField,
                        field.type_ref.to_string(),
                        format!("required field '{}' is missing", field.name),
                    );
                }
                return Ok(());
            };
            let ft = this.model.resolve_field(field)?;
            if !field.multiplicity.is_repeated() {
                return this.value(&ft, value, depth);
            }
            let Some(items) = value.as_sequence() else {
                this.report(
                    ErrorCode::TypeMismatch,
                    format!("{}[{}]", ft.label, field.multiplicity),
                    format!("repeated field expects a sequence, got {}", value.kind_name()),
                );
                return Ok(());
            };
            let m = field.multiplicity;
            if !m.allows(items.len() as u64) {
                let code = if (items.len() as u64) < m.min {
                    ErrorCode::TooFew
                } else {
                    ErrorCode::TooMany
                };
                this.report(
                    code,
                    m.to_string(),
                    format!("{} occurrences, {m} allowed", items.len()),
                );
            }
            for (i, item) in items.iter().enumerate() {
                this.nested(PathSegment::Index(i), |v| v.value(&ft, item, depth))?;
            }
            Ok(())
        })
    }
}

/// Field named (or tagged, with `by_tag`) by a mapping key.
fn lookup<'a>(ty: &Resolved<'a>, key: &Value, by_tag: bool) -> Option<&'a Field> {
    let fields: &'a [Field] = ty.fields;
    if by_tag {
        let tag = key.as_i64().and_then(|t| u64::try_from(t).ok())?;
        fields.iter().find(|f| f.tag == tag)
    } else {
        let name = key.as_str()?;
        fields.iter().find(|f| f.name == name)
    }
}

fn display_key(key: &Value) -> String {
    match key {
        Value::Text(s) => s.clone(),
        Value::Int(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Real(f) => f.to_string(),
        other => other.kind_name().to_string(),
    }
}

/// `[address octets, prefix length]`.
fn is_net(items: &[Value], octets: usize, max_prefix: i64) -> bool {
    match items {
        [addr, prefix] => {
            addr.as_bytes().is_some_and(|b| b.len() == octets)
                && prefix.as_i64().is_some_and(|p| (0..=max_prefix).contains(&p))
        }
        _ => false,
    }
}
