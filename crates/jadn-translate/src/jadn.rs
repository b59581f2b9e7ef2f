//! JADN JSON, the model's own document notation.

use jadn_type::schema::{self, Form};
use jadn_type::translator::FeatureSet;
use jadn_type::{TranslateError, Translation, Translator, TypeModel};

/// Writes schema documents in either textual form and reads both.
#[derive(Debug, Clone, Copy, Default)]
pub struct Jadn {
    form: Form,
}

impl Jadn {
    /// Object-per-type documents with named options.
    pub fn verbose() -> Self {
        Self { form: Form::Verbose }
    }

    /// Array-per-type documents with option strings.
    pub fn compact() -> Self {
        Self { form: Form::Compact }
    }
}

impl Translator for Jadn {
    fn name(&self) -> &'static str {
        match self.form {
            Form::Verbose => "jadn",
            Form::Compact => "jadn-compact",
        }
    }

    fn features(&self) -> FeatureSet {
        FeatureSet::lossless()
    }

    fn export_schema(&self, model: &TypeModel) -> Result<Translation<String>, TranslateError> {
        Ok(Translation::lossless(schema::to_string_pretty(model, self.form)))
    }

    fn import_schema(&self, text: &str) -> Result<Translation<TypeModel>, TranslateError> {
        Ok(Translation::lossless(schema::load_str(text)?))
    }
}
