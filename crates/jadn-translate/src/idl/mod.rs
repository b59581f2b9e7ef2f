//! JADN-IDL: a line-oriented text notation for schemas.
//!
//! ```text
//!  module: "http://example.com/music"
//! exports: ["Library"]
//!
//! Library = MapOf(Barcode, Album){1..*}  // Every album, by barcode
//!
//! Album = Record {
//!     1 artist  Artist,
//!     2 title   String,
//!     3 tracks  ArrayOf(Track){1..*} unique,
//!     4 cover   Binary optional              // Front cover image
//! }
//!
//! Genre = Enumerated {
//!     1 rock,
//!     2 jazz
//! }
//! ```
//!
//! Meta lines come first, one `key: json` per line. Each definition is
//! `Name = Kind` with its options written inline; kinds with members follow
//! it with a `{ ... }` block of one member per line. Array fields and
//! tagged (`.ID`) enumerations carry their names in a `// name:: description`
//! comment.

pub(crate) mod expr;
mod reader;
mod writer;

use jadn_type::translator::{audit, FeatureSet};
use jadn_type::{TranslateError, Translation, Translator, TypeModel};

/// Writes and reads JADN-IDL.
#[derive(Debug, Clone, Copy, Default)]
pub struct Idl;

impl Translator for Idl {
    fn name(&self) -> &'static str {
        "jidl"
    }

    fn features(&self) -> FeatureSet {
        FeatureSet::lossless()
    }

    fn export_schema(&self, model: &TypeModel) -> Result<Translation<String>, TranslateError> {
        let mut losses = audit(model, &self.features());
        let (text, notation) = writer::write(model);
        losses.extend(notation);
        Ok(Translation::new(self.name(), text, losses))
    }

    fn import_schema(&self, text: &str) -> Result<Translation<TypeModel>, TranslateError> {
        let model = reader::read(text)?;
        tracing::debug!(types = model.len(), "read jidl schema");
        Ok(Translation::lossless(model))
    }
}
