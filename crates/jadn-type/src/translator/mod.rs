//! Translator interface.
//!
//! A translator converts between a [`TypeModel`] and another schema notation.
//! It reads models through [`walk`] and builds them through [`ModelBuilder`],
//! and declares up front what it can express in a [`FeatureSet`]. Anything a
//! translation cannot carry over is reported as a [`TranslationLoss`].

mod builder;
mod visitor;

pub use builder::ModelBuilder;
pub use visitor::{walk, ModelVisitor};

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::lint::LintErrors;
use crate::type_def::{BaseKind, Field, TypeDefinition, TypeModel};

/// What a translator implements and which parts of a model it represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSet {
    pub export: bool,
    pub import: bool,
    /// Base kinds the target notation can express.
    pub kinds: Vec<BaseKind>,
    /// Option ids carried through a translation.
    pub options: Vec<char>,
    /// Whether type, field and item descriptions survive.
    pub descriptions: bool,
}

impl FeatureSet {
    /// Every kind and option, in both directions.
    pub fn lossless() -> Self {
        Self {
            export: true,
            import: true,
            kinds: BaseKind::ALL.to_vec(),
            options: vec![
                '=', '*', '+', '#', '/', '{', '}', '%', 'q', '~', '[', ']', '!', '<',
            ],
            descriptions: true,
        }
    }

    pub fn supports_kind(&self, kind: BaseKind) -> bool {
        self.kinds.contains(&kind)
    }

    pub fn supports_option(&self, id: char) -> bool {
        self.options.contains(&id)
    }
}

/// Something in the source with no equivalent in the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranslationLoss {
    /// `Type` or `Type.field`.
    pub location: String,
    /// Short name of the feature, e.g. `option /ipv4-net`.
    pub feature: String,
    pub detail: String,
}

impl TranslationLoss {
    pub fn new(
        location: impl Into<String>,
        feature: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            location: location.into(),
            feature: feature.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for TranslationLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} ({})", self.location, self.feature, self.detail)
    }
}

/// Output of a translator with its information-loss list.
#[derive(Debug, Clone)]
pub struct Translation<T> {
    pub output: T,
    pub losses: Vec<TranslationLoss>,
}

impl<T> Translation<T> {
    pub fn new(translator: &str, output: T, losses: Vec<TranslationLoss>) -> Self {
        for loss in &losses {
            tracing::warn!(
                translator,
                location = %loss.location,
                feature = %loss.feature,
                "translation loses information: {}",
                loss.detail
            );
        }
        Self { output, losses }
    }

    pub fn lossless(output: T) -> Self {
        Self {
            output,
            losses: Vec::new(),
        }
    }

    pub fn is_lossless(&self) -> bool {
        self.losses.is_empty()
    }
}

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("{translator} does not support {operation}")]
    Unsupported {
        translator: &'static str,
        operation: &'static str,
    },
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },
    #[error(transparent)]
    Lint(#[from] LintErrors),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// A schema notation plugin.
pub trait Translator: Send + Sync {
    fn name(&self) -> &'static str;

    fn features(&self) -> FeatureSet;

    fn export_schema(&self, model: &TypeModel) -> Result<Translation<String>, TranslateError>;

    fn import_schema(&self, _text: &str) -> Result<Translation<TypeModel>, TranslateError> {
        Err(TranslateError::Unsupported {
            translator: self.name(),
            operation: "import",
        })
    }
}

/// Statically registered translators, looked up by name.
#[derive(Default)]
pub struct Registry {
    translators: IndexMap<&'static str, Box<dyn Translator>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a translator, replacing any earlier one of the same name.
    pub fn register<T: Translator + 'static>(&mut self, translator: T) -> &mut Self {
        self.translators
            .insert(translator.name(), Box::new(translator));
        self
    }

    pub fn get(&self, name: &str) -> Option<&dyn Translator> {
        self.translators.get(name).map(|t| t.as_ref())
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&'static str> {
        self.translators.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.translators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translators.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("translators", &self.names())
            .finish()
    }
}

struct Audit<'f> {
    features: &'f FeatureSet,
    losses: Vec<TranslationLoss>,
}

impl ModelVisitor for Audit<'_> {
    fn visit_type(&mut self, def: &TypeDefinition) {
        if !self.features.supports_kind(def.kind) {
            self.losses.push(TranslationLoss::new(
                def.name.as_str(),
                format!("kind {}", def.kind),
                "base kind has no equivalent",
            ));
        }
        for opt in def.options.iter() {
            if !self.features.supports_option(opt.id()) {
                self.losses.push(TranslationLoss::new(
                    def.name.as_str(),
                    format!("option {}", opt.to_compact()),
                    format!("{} is not represented", opt.name()),
                ));
            }
        }
        if !self.features.descriptions && !def.description.is_empty() {
            self.losses.push(TranslationLoss::new(
                def.name.as_str(),
                "description",
                "descriptions are dropped",
            ));
        }
    }

    fn visit_field(&mut self, def: &TypeDefinition, field: &Field) {
        let location = format!("{}.{}", def.name, field.name);
        for opt in field.all_options() {
            if !self.features.supports_option(opt.id()) {
                self.losses.push(TranslationLoss::new(
                    location.as_str(),
                    format!("option {}", opt.to_compact()),
                    format!("{} is not represented", opt.name()),
                ));
            }
        }
    }
}

/// Losses implied by `features` alone: kinds and options of `model` the
/// target cannot express. Translators add their own notation-specific
/// findings.
pub fn audit(model: &TypeModel, features: &FeatureSet) -> Vec<TranslationLoss> {
    let mut audit = Audit {
        features,
        losses: Vec::new(),
    };
    walk(model, &mut audit);
    audit.losses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use serde_json::json;

    struct Names;

    impl Translator for Names {
        fn name(&self) -> &'static str {
            "names"
        }

        fn features(&self) -> FeatureSet {
            FeatureSet {
                export: true,
                import: false,
                kinds: vec![BaseKind::Record, BaseKind::Integer],
                options: vec![],
                descriptions: false,
            }
        }

        fn export_schema(&self, model: &TypeModel) -> Result<Translation<String>, TranslateError> {
            let names: Vec<&str> = model.types().map(|d| d.name.as_str()).collect();
            let losses = audit(model, &self.features());
            Ok(Translation::new(self.name(), names.join(","), losses))
        }
    }

    fn model() -> TypeModel {
        schema::load(&json!({"types": [
            ["Point", "Record", [], "A point", [[1, "x", "Integer", ["[0"], ""]]],
            ["Name", "String", ["{1"], ""]
        ]}))
        .unwrap()
    }

    #[test]
    fn audit_reports_unsupported_parts() {
        let t = Names.export_schema(&model()).unwrap();
        assert_eq!(t.output, "Point,Name");
        let features: Vec<&str> = t.losses.iter().map(|l| l.feature.as_str()).collect();
        assert_eq!(features, vec!["description", "option [0", "kind String", "option {1"]);
        assert_eq!(t.losses[1].location, "Point.x");
    }

    #[test]
    fn import_defaults_to_unsupported() {
        let err = Names.import_schema("").unwrap_err();
        assert_eq!(err.to_string(), "names does not support import");
    }

    #[test]
    fn registry_lookup() {
        let mut r = Registry::new();
        r.register(Names);
        assert_eq!(r.names(), vec!["names"]);
        assert!(r.get("names").is_some_and(|t| t.features().export));
        assert!(r.get("other").is_none());
    }

    #[test]
    fn lossless_features_audit_clean() {
        assert!(audit(&model(), &FeatureSet::lossless()).is_empty());
    }
}
