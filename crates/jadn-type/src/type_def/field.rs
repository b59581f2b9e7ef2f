use std::fmt;

use super::{Options, TypeOption, TypeRef};

/// Occurrence bounds of a field. `max == None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Multiplicity {
    pub min: u64,
    pub max: Option<u64>,
}

impl Multiplicity {
    pub const REQUIRED: Self = Self {
        min: 1,
        max: Some(1),
    };
    pub const OPTIONAL: Self = Self {
        min: 0,
        max: Some(1),
    };

    /// Builds bounds from `minc`/`maxc` option values: `minc` defaults to 1,
    /// `maxc` defaults to `max(1, minc)` and `maxc == 0` is unbounded.
    pub fn from_options(minc: Option<u64>, maxc: Option<u64>) -> Self {
        let min = minc.unwrap_or(1);
        let max = match maxc {
            Some(0) => None,
            Some(n) => Some(n),
            None => Some(min.max(1)),
        };
        Self { min, max }
    }

    pub fn is_required(&self) -> bool {
        self.min > 0
    }

    /// Values of a repeated field are sequences.
    pub fn is_repeated(&self) -> bool {
        self.max != Some(1)
    }

    pub fn is_exactly_one(&self) -> bool {
        *self == Self::REQUIRED
    }

    pub fn allows(&self, count: u64) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }

    /// The `minc`/`maxc` options that reproduce these bounds, omitting
    /// defaults.
    pub fn to_options(&self) -> Vec<TypeOption> {
        let mut out = Vec::new();
        if self.min != 1 {
            out.push(TypeOption::MinCount(self.min));
        }
        match self.max {
            None => out.push(TypeOption::MaxCount(0)),
            Some(max) if max != self.min.max(1) => out.push(TypeOption::MaxCount(max)),
            Some(_) => {}
        }
        out
    }
}

impl Default for Multiplicity {
    fn default() -> Self {
        Self::REQUIRED
    }
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}..{}", self.min, max),
            None => write!(f, "{}..*", self.min),
        }
    }
}

/// A tagged, named, typed member of a Record, Map, Choice or Array.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub tag: u64,
    pub name: String,
    pub type_ref: TypeRef,
    pub multiplicity: Multiplicity,
    /// Field options other than `minc`/`maxc`.
    pub options: Options,
    pub description: String,
}

impl Field {
    pub fn new(tag: u64, name: impl Into<String>, type_ref: impl Into<TypeRef>) -> Self {
        Self {
            tag,
            name: name.into(),
            type_ref: type_ref.into(),
            multiplicity: Multiplicity::REQUIRED,
            options: Options::new(),
            description: String::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.multiplicity = Multiplicity::OPTIONAL;
        self
    }

    pub fn with_multiplicity(mut self, min: u64, max: Option<u64>) -> Self {
        self.multiplicity = Multiplicity { min, max };
        self
    }

    pub fn with_option(mut self, opt: TypeOption) -> Self {
        self.options.push(opt);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// All options in schema order, cardinality first.
    pub fn all_options(&self) -> Vec<TypeOption> {
        let mut out = self.multiplicity.to_options();
        out.extend(self.options.iter().cloned());
        out
    }
}

/// One value of an Enumerated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub tag: u64,
    pub name: String,
    pub description: String,
}

impl Item {
    pub fn new(tag: u64, name: impl Into<String>) -> Self {
        Self {
            tag,
            name: name.into(),
            description: String::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}
