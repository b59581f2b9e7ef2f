//! Document-level validation: encoded bytes in, report out.

use crate::codec::{self, CodecError, CodecOptions, Profile};
use crate::type_def::TypeModel;
use crate::validator::{
    self, ConformanceError, ErrorCode, ValidationReport, ValidatorOptions,
};

/// Decodes `input` in `profile` and validates the result against
/// `type_name`.
///
/// Input that does not even have the declared shape yields a report with one
/// [`ErrorCode::Structure`] error located where decoding stopped. Only an
/// unknown type or a tripped depth limit is returned as an error.
pub fn validate_document(
    model: &TypeModel,
    type_name: &str,
    input: &[u8],
    profile: Profile,
) -> Result<ValidationReport, CodecError> {
    validate_document_with(model, type_name, input, profile, &ValidatorOptions::default())
}

pub fn validate_document_with(
    model: &TypeModel,
    type_name: &str,
    input: &[u8],
    profile: Profile,
    opts: &ValidatorOptions,
) -> Result<ValidationReport, CodecError> {
    let copts = CodecOptions {
        max_depth: opts.max_depth,
        verify: false,
    };
    let value = match codec::decode_with(model, type_name, input, profile, &copts) {
        Ok(value) => value,
        Err(CodecError::Structural(e)) => {
            return Ok(ValidationReport::new(vec![ConformanceError {
                path: e.path,
                code: ErrorCode::Structure,
                expected: type_name.to_string(),
                message: e.reason,
            }]));
        }
        Err(e) => return Err(e),
    };
    Ok(validator::validate(model, type_name, &value, opts)?)
}
