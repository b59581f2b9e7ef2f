//! Type and field options.
//!
//! In the compact schema notation an option is a string whose first
//! character selects the option and whose remainder is its value
//! (`"{1"`, `"*Integer"`, `"="`). The verbose notation spells the same
//! options as an object keyed by option name (`{"minv": 1, "id": true}`).

use std::fmt;

use thiserror::Error;

use super::TypeRef;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionError {
    #[error("empty option string")]
    Empty,
    #[error("unknown option id '{0}'")]
    UnknownId(char),
    #[error("unknown option '{0}'")]
    UnknownName(String),
    #[error("invalid value {value:?} for option {option}")]
    BadValue { option: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeOption {
    /// `=` Enumerated values and Map/Choice keys are tags, not names.
    Id,
    /// `*` element type of ArrayOf, value type of MapOf.
    ValueType(TypeRef),
    /// `+` key type of MapOf.
    KeyType(TypeRef),
    /// `#` Enumerated derived from the fields of the named type.
    Enum(String),
    /// `/` semantic format.
    Format(String),
    /// `{` minimum value, length or count.
    MinValue(i64),
    /// `}` maximum value, length or count.
    MaxValue(i64),
    /// `%` regular expression a String must match.
    Pattern(String),
    /// `q` ArrayOf elements must be distinct.
    Unique,
    /// `~` Map or Record accepts undeclared keys.
    Open,
    /// `[` minimum field cardinality.
    MinCount(u64),
    /// `]` maximum field cardinality, 0 = unbounded.
    MaxCount(u64),
    /// `!` default value of an optional field.
    Default(String),
    /// `<` field names of the field's type are qualified by this field.
    Path,
}

impl TypeOption {
    pub fn id(&self) -> char {
        match self {
            Self::Id => '=',
            Self::ValueType(_) => '*',
            Self::KeyType(_) => '+',
            Self::Enum(_) => '#',
            Self::Format(_) => '/',
            Self::MinValue(_) => '{',
            Self::MaxValue(_) => '}',
            Self::Pattern(_) => '%',
            Self::Unique => 'q',
            Self::Open => '~',
            Self::MinCount(_) => '[',
            Self::MaxCount(_) => ']',
            Self::Default(_) => '!',
            Self::Path => '<',
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::ValueType(_) => "vtype",
            Self::KeyType(_) => "ktype",
            Self::Enum(_) => "enum",
            Self::Format(_) => "format",
            Self::MinValue(_) => "minv",
            Self::MaxValue(_) => "maxv",
            Self::Pattern(_) => "pattern",
            Self::Unique => "unique",
            Self::Open => "open",
            Self::MinCount(_) => "minc",
            Self::MaxCount(_) => "maxc",
            Self::Default(_) => "default",
            Self::Path => "path",
        }
    }

    /// Options that only make sense on a field, never on a type.
    pub fn is_field_only(&self) -> bool {
        matches!(
            self,
            Self::MinCount(_) | Self::MaxCount(_) | Self::Default(_) | Self::Path
        )
    }

    /// Parses the compact string form.
    pub fn parse(s: &str) -> Result<Self, OptionError> {
        let mut chars = s.chars();
        let id = chars.next().ok_or(OptionError::Empty)?;
        let value = chars.as_str();
        let name = match id {
            '=' => "id",
            '*' => "vtype",
            '+' => "ktype",
            '#' => "enum",
            '/' => "format",
            '{' => "minv",
            '}' => "maxv",
            '%' => "pattern",
            'q' => "unique",
            '~' => "open",
            '[' => "minc",
            ']' => "maxc",
            '!' => "default",
            '<' => "path",
            other => return Err(OptionError::UnknownId(other)),
        };
        Self::from_text(name, value)
    }

    /// Parses the verbose `name: value` form.
    pub fn from_named(name: &str, value: &serde_json::Value) -> Result<Self, OptionError> {
        let option = option_name(name).ok_or_else(|| OptionError::UnknownName(name.to_string()))?;
        match (option, value) {
            ("id" | "unique" | "open" | "path", serde_json::Value::Bool(true)) => {
                Self::from_text(option, "")
            }
            ("minv" | "maxv" | "minc" | "maxc", serde_json::Value::Number(n))
                if n.is_i64() || n.is_u64() =>
            {
                Self::from_text(option, &n.to_string())
            }
            (
                "vtype" | "ktype" | "enum" | "format" | "pattern" | "default",
                serde_json::Value::String(s),
            ) => Self::from_text(option, s),
            _ => Err(OptionError::BadValue {
                option,
                value: value.to_string(),
            }),
        }
    }

    fn from_text(name: &str, value: &str) -> Result<Self, OptionError> {
        let bad = |option: &'static str| OptionError::BadValue {
            option,
            value: value.to_string(),
        };
        let flag = |option: &'static str, opt: Self| {
            if value.is_empty() {
                Ok(opt)
            } else {
                Err(bad(option))
            }
        };
        let non_empty = |option: &'static str| {
            if value.is_empty() {
                Err(bad(option))
            } else {
                Ok(value.to_string())
            }
        };
        match name {
            "id" => flag("id", Self::Id),
            "unique" => flag("unique", Self::Unique),
            "open" => flag("open", Self::Open),
            "path" => flag("path", Self::Path),
            "vtype" => Ok(Self::ValueType(TypeRef::parse(&non_empty("vtype")?))),
            "ktype" => Ok(Self::KeyType(TypeRef::parse(&non_empty("ktype")?))),
            "enum" => Ok(Self::Enum(non_empty("enum")?)),
            "format" => Ok(Self::Format(non_empty("format")?)),
            "pattern" => Ok(Self::Pattern(value.to_string())),
            "default" => Ok(Self::Default(value.to_string())),
            "minv" => value.parse().map(Self::MinValue).map_err(|_| bad("minv")),
            "maxv" => value.parse().map(Self::MaxValue).map_err(|_| bad("maxv")),
            "minc" => value.parse().map(Self::MinCount).map_err(|_| bad("minc")),
            "maxc" => value.parse().map(Self::MaxCount).map_err(|_| bad("maxc")),
            other => Err(OptionError::UnknownName(other.to_string())),
        }
    }

    /// The compact string form.
    pub fn to_compact(&self) -> String {
        let id = self.id();
        match self {
            Self::Id | Self::Unique | Self::Open | Self::Path => id.to_string(),
            Self::ValueType(r) | Self::KeyType(r) => format!("{id}{r}"),
            Self::Enum(s) | Self::Format(s) | Self::Pattern(s) | Self::Default(s) => {
                format!("{id}{s}")
            }
            Self::MinValue(n) | Self::MaxValue(n) => format!("{id}{n}"),
            Self::MinCount(n) | Self::MaxCount(n) => format!("{id}{n}"),
        }
    }

    /// The value half of the verbose form.
    pub fn to_named_value(&self) -> serde_json::Value {
        match self {
            Self::Id | Self::Unique | Self::Open | Self::Path => serde_json::Value::Bool(true),
            Self::ValueType(r) | Self::KeyType(r) => serde_json::Value::String(r.to_string()),
            Self::Enum(s) | Self::Format(s) | Self::Pattern(s) | Self::Default(s) => {
                serde_json::Value::String(s.clone())
            }
            Self::MinValue(n) | Self::MaxValue(n) => serde_json::Value::from(*n),
            Self::MinCount(n) | Self::MaxCount(n) => serde_json::Value::from(*n),
        }
    }
}

fn option_name(name: &str) -> Option<&'static str> {
    const NAMES: [&str; 14] = [
        "id", "vtype", "ktype", "enum", "format", "minv", "maxv", "pattern", "unique", "open",
        "minc", "maxc", "default", "path",
    ];
    NAMES.into_iter().find(|n| *n == name)
}

impl fmt::Display for TypeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_compact())
    }
}

/// Ordered option list of a type or field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options(Vec<TypeOption>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TypeOption> {
        self.0.iter()
    }

    /// Adds an option, replacing an earlier option with the same id.
    pub fn set(&mut self, opt: TypeOption) {
        match self.0.iter_mut().find(|o| o.id() == opt.id()) {
            Some(slot) => *slot = opt,
            None => self.0.push(opt),
        }
    }

    /// Appends without replacing; the linter reports the duplicates.
    pub fn push(&mut self, opt: TypeOption) {
        self.0.push(opt);
    }

    pub fn get(&self, id: char) -> Option<&TypeOption> {
        self.0.iter().find(|o| o.id() == id)
    }

    pub fn has(&self, id: char) -> bool {
        self.get(id).is_some()
    }

    pub fn id(&self) -> bool {
        self.has('=')
    }

    pub fn unique(&self) -> bool {
        self.has('q')
    }

    pub fn open(&self) -> bool {
        self.has('~')
    }

    pub fn path(&self) -> bool {
        self.has('<')
    }

    pub fn vtype(&self) -> Option<&TypeRef> {
        match self.get('*') {
            Some(TypeOption::ValueType(r)) => Some(r),
            _ => None,
        }
    }

    pub fn ktype(&self) -> Option<&TypeRef> {
        match self.get('+') {
            Some(TypeOption::KeyType(r)) => Some(r),
            _ => None,
        }
    }

    pub fn enum_source(&self) -> Option<&str> {
        match self.get('#') {
            Some(TypeOption::Enum(s)) => Some(s),
            _ => None,
        }
    }

    pub fn format(&self) -> Option<&str> {
        match self.get('/') {
            Some(TypeOption::Format(s)) => Some(s),
            _ => None,
        }
    }

    pub fn pattern(&self) -> Option<&str> {
        match self.get('%') {
            Some(TypeOption::Pattern(s)) => Some(s),
            _ => None,
        }
    }

    pub fn minv(&self) -> Option<i64> {
        match self.get('{') {
            Some(TypeOption::MinValue(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn maxv(&self) -> Option<i64> {
        match self.get('}') {
            Some(TypeOption::MaxValue(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn default_value(&self) -> Option<&str> {
        match self.get('!') {
            Some(TypeOption::Default(s)) => Some(s),
            _ => None,
        }
    }

    /// Options that constrain the type rather than the field.
    pub fn type_options(&self) -> impl Iterator<Item = &TypeOption> {
        self.0.iter().filter(|o| !o.is_field_only())
    }

    /// `self` with the type options of `field` laid over it.
    pub fn overlay(&self, field: &Options) -> Options {
        let mut out = self.clone();
        for opt in field.type_options() {
            out.set(opt.clone());
        }
        out
    }

    pub fn to_compact(&self) -> Vec<String> {
        self.0.iter().map(TypeOption::to_compact).collect()
    }

    pub fn to_named(&self) -> serde_json::Map<String, serde_json::Value> {
        self.0
            .iter()
            .map(|o| (o.name().to_string(), o.to_named_value()))
            .collect()
    }
}

impl FromIterator<TypeOption> for Options {
    fn from_iter<I: IntoIterator<Item = TypeOption>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Options {
    type Item = &'a TypeOption;
    type IntoIter = std::slice::Iter<'a, TypeOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
