//! Type expressions: a type reference with its options spelled inline.
//!
//! ```text
//! ArrayOf(Track){1..*} unique
//! String{1..64}(%^[a-z]+$%) /hostname
//! Color[0..*]
//! Integer optional default="5"
//! ```

use jadn_type::type_def::{BaseKind, Multiplicity, Options, TypeOption, TypeRef};
use jadn_type::TranslateError;

pub(super) fn syntax(line: usize, message: impl Into<String>) -> TranslateError {
    TranslateError::Syntax {
        line,
        message: message.into(),
    }
}

pub(super) fn type_ref(r: &TypeRef) -> String {
    match r {
        TypeRef::Derived(source) => format!("Enum[{source}]"),
        other => other.to_string(),
    }
}

fn bound(n: Option<i64>) -> String {
    n.map_or_else(|| "*".to_string(), |n| n.to_string())
}

/// Spells `reference` with `options`. `multiplicity` is given for fields.
pub(crate) fn render(
    reference: &TypeRef,
    options: &Options,
    multiplicity: Option<Multiplicity>,
) -> String {
    let mut out = type_ref(reference);
    if options.id() {
        out.push_str(".ID");
    }
    let args = match (options.ktype(), options.vtype(), options.enum_source()) {
        (Some(k), Some(v), _) => vec![type_ref(k), type_ref(v)],
        (None, Some(v), _) => vec![type_ref(v)],
        (_, _, Some(source)) => vec![format!("Enum[{source}]")],
        _ => Vec::new(),
    };
    if !args.is_empty() {
        out.push_str(&format!("({})", args.join(", ")));
    }
    if options.minv().is_some() || options.maxv().is_some() {
        out.push_str(&format!(
            "{{{}..{}}}",
            bound(options.minv()),
            bound(options.maxv())
        ));
    }
    if let Some(p) = options.pattern() {
        out.push_str(&format!("(%{p}%)"));
    }
    if let Some(m) = multiplicity.filter(Multiplicity::is_repeated) {
        out.push_str(&format!("[{m}]"));
    }
    if let Some(f) = options.format() {
        out.push_str(&format!(" /{f}"));
    }
    if options.unique() {
        out.push_str(" unique");
    }
    if options.open() {
        out.push_str(" open");
    }
    if multiplicity.is_some_and(|m| !m.is_repeated() && m.min == 0) {
        out.push_str(" optional");
    }
    if options.path() {
        out.push_str(" path");
    }
    if let Some(d) = options.default_value() {
        out.push_str(&format!(" default={}", serde_json::Value::from(d)));
    }
    out
}

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct Expr {
    pub reference: TypeRef,
    /// Options in the order they were written.
    pub options: Vec<TypeOption>,
    /// Present when the expression carried `[min..max]` or `optional`.
    pub multiplicity: Option<Multiplicity>,
}

impl Expr {
    /// Whether anything only a field may carry was written.
    pub fn has_field_parts(&self) -> bool {
        self.multiplicity.is_some() || self.options.iter().any(TypeOption::is_field_only)
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
}

impl<'a> Cursor<'a> {
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    /// Text up to `end`, consuming both.
    fn until(&mut self, end: &str) -> Result<&'a str, TranslateError> {
        let rest = self.rest();
        match rest.find(end) {
            Some(i) => {
                self.pos += i + end.len();
                Ok(&rest[..i])
            }
            None => Err(self.error(format!("missing '{end}'"))),
        }
    }

    fn name(&mut self) -> &'a str {
        let rest = self.rest();
        let n = rest
            .find(|c: char| !(c.is_alphanumeric() || matches!(c, '_' | '-' | '$' | ':')))
            .unwrap_or(rest.len());
        self.pos += n;
        &rest[..n]
    }

    fn word(&mut self) -> &'a str {
        let rest = self.rest();
        let n = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.pos += n;
        &rest[..n]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn error(&self, message: impl Into<String>) -> TranslateError {
        syntax(self.line, message)
    }
}

fn arg_ref(s: &str) -> TypeRef {
    match s.strip_prefix("Enum[").and_then(|s| s.strip_suffix(']')) {
        Some(source) => TypeRef::Derived(source.to_string()),
        None => TypeRef::parse(s),
    }
}

fn range<T: std::str::FromStr>(c: &Cursor<'_>, text: &str) -> Result<(Option<T>, Option<T>), TranslateError> {
    let Some((lo, hi)) = text.split_once("..") else {
        return Err(c.error(format!("'{text}' is not a min..max range")));
    };
    let side = |s: &str| -> Result<Option<T>, TranslateError> {
        match s.trim() {
            "*" => Ok(None),
            n => n
                .parse()
                .map(Some)
                .map_err(|_| c.error(format!("'{n}' is not a bound"))),
        }
    };
    Ok((side(lo)?, side(hi)?))
}

pub(super) fn parse(text: &str, line: usize) -> Result<Expr, TranslateError> {
    let mut c = Cursor {
        text: text.trim(),
        pos: 0,
        line,
    };
    let reference = if c.eat("Enum[") {
        TypeRef::Derived(c.until("]")?.to_string())
    } else {
        match c.name() {
            "" => return Err(c.error(format!("expected a type at '{}'", c.rest()))),
            name => TypeRef::parse(name),
        }
    };
    let mut options = Vec::new();
    let mut multiplicity = None;

    if c.eat(".ID") {
        options.push(TypeOption::Id);
    }
    if c.rest().starts_with('(') && !c.rest().starts_with("(%") {
        c.eat("(");
        let inner = c.until(")")?;
        let args: Vec<&str> = inner.split(',').map(str::trim).collect();
        match (&reference, args.as_slice()) {
            (TypeRef::Base(BaseKind::ArrayOf), [v]) => options.push(TypeOption::ValueType(arg_ref(v))),
            (TypeRef::Base(BaseKind::MapOf), [k, v]) => {
                options.push(TypeOption::KeyType(arg_ref(k)));
                options.push(TypeOption::ValueType(arg_ref(v)));
            }
            (TypeRef::Base(BaseKind::Enumerated), [source]) => match arg_ref(source) {
                TypeRef::Derived(source) => options.push(TypeOption::Enum(source)),
                _ => return Err(c.error(format!("expected Enum[Type], got '{source}'"))),
            },
            _ => {
                return Err(c.error(format!(
                    "unexpected arguments ({inner}) for {}",
                    type_ref(&reference)
                )))
            }
        }
    }

    loop {
        if c.eat("{") {
            let inner = c.until("}")?;
            let (lo, hi) = range::<i64>(&c, inner)?;
            options.extend(lo.map(TypeOption::MinValue));
            options.extend(hi.map(TypeOption::MaxValue));
        } else if c.eat("(%") {
            options.push(TypeOption::Pattern(c.until("%)")?.to_string()));
        } else if c.eat("[") {
            let inner = c.until("]")?;
            let (lo, hi) = range::<u64>(&c, inner)?;
            multiplicity = Some(Multiplicity {
                min: lo.unwrap_or(0),
                max: hi,
            });
        } else {
            break;
        }
    }

    loop {
        c.skip_ws();
        if c.rest().is_empty() {
            break;
        }
        if c.eat("/") {
            match c.word() {
                "" => return Err(c.error("empty format")),
                f => options.push(TypeOption::Format(f.to_string())),
            }
        } else if c.eat("default=") {
            let mut values = serde_json::Deserializer::from_str(c.rest()).into_iter::<String>();
            match values.next() {
                Some(Ok(d)) => {
                    c.pos += values.byte_offset();
                    options.push(TypeOption::Default(d));
                }
                _ => return Err(c.error("default needs a quoted string")),
            }
        } else {
            match c.word() {
                "unique" => options.push(TypeOption::Unique),
                "open" => options.push(TypeOption::Open),
                "path" => options.push(TypeOption::Path),
                "optional" if multiplicity.is_none() => multiplicity = Some(Multiplicity::OPTIONAL),
                "optional" => return Err(c.error("optional together with [min..max]")),
                other => return Err(c.error(format!("unexpected '{other}'"))),
            }
        }
    }

    Ok(Expr {
        reference,
        options,
        multiplicity,
    })
}

/// Splits a line into code and its `//` comment. `//` inside a `(%...%)`
/// pattern or a quoted string is code.
pub(super) fn split_comment(line: &str) -> (&str, Option<&str>) {
    let bytes = line.as_bytes();
    let mut in_pattern = false;
    let mut in_string = false;
    let mut i = 0;
    while i < bytes.len() {
        let rest = &bytes[i..];
        if in_string {
            match bytes[i] {
                b'\\' => i += 1,
                b'"' => in_string = false,
                _ => {}
            }
        } else if in_pattern {
            if rest.starts_with(b"%)") {
                in_pattern = false;
                i += 1;
            }
        } else if rest.starts_with(b"(%") {
            in_pattern = true;
            i += 1;
        } else if bytes[i] == b'"' {
            in_string = true;
        } else if rest.starts_with(b"//") {
            return (&line[..i], Some(line[i + 2..].trim()));
        }
        i += 1;
    }
    (line, None)
}
