//! Incremental construction of a [`TypeModel`] from an external notation.

use crate::lint::{self, LintError, LintErrors};
use crate::type_def::{Meta, TypeDefinition, TypeModel};

/// Collects definitions and hands them to the linter in one piece, so an
/// imported model passes exactly the checks a loaded document does.
#[derive(Debug, Clone, Default)]
pub struct ModelBuilder {
    meta: Meta,
    defs: Vec<TypeDefinition>,
    errors: Vec<LintError>,
}

impl ModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from the definitions of an existing model.
    pub fn from_model(model: &TypeModel) -> Self {
        Self {
            meta: model.meta().clone(),
            defs: model.types().cloned().collect(),
            errors: Vec::new(),
        }
    }

    pub fn meta(&mut self, meta: Meta) -> &mut Self {
        self.meta = meta;
        self
    }

    pub fn meta_mut(&mut self) -> &mut Meta {
        &mut self.meta
    }

    pub fn add_type(&mut self, def: TypeDefinition) -> &mut Self {
        self.defs.push(def);
        self
    }

    /// Records a problem the importer found in its source; it is reported
    /// ahead of the linter's own findings.
    pub fn report(&mut self, error: LintError) -> &mut Self {
        self.errors.push(error);
        self
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }

    pub fn build(self) -> Result<TypeModel, LintErrors> {
        lint::check(self.meta, self.defs, self.errors, &[])
    }
}
