pub mod types;
pub mod validator;

pub use types::{
    ConformanceError, ErrorCode, PathSegment, ValidateError, ValidationReport, ValidatorOptions,
};
pub use validator::validate;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use crate::type_def::TypeModel;
    use jadn_pack::{Mapping, Value};
    use serde_json::json;

    fn model() -> TypeModel {
        schema::load(&json!({"types": [
            ["Point", "Record", [], "", [[1, "x", "Integer", [], ""], [2, "y", "Integer", [], ""]]],
            ["Shape", "Choice", [], "", [[1, "circle", "Number", [], ""], [2, "square", "Number", [], ""]]],
            ["Color", "Enumerated", [], "", [[1, "RED", ""], [2, "GREEN", ""]]],
            ["Code", "Enumerated", ["="], "", [[1, "RED", ""], [2, "GREEN", ""]]],
            ["Name", "String", ["{2", "}8", "%^[a-z]+$"], ""],
            ["Names", "ArrayOf", ["*Name", "q", "}3"], ""],
            ["Counts", "MapOf", ["+String", "*Integer"], ""],
            ["Pair", "Array", [], "", [[1, "a", "Integer", [], ""], [2, "b", "String", ["[0"], ""]]],
            ["Open", "Record", ["~"], "", [[1, "id", "Integer", [], ""]]],
            ["When", "String", ["/date"], ""],
            ["Small", "Integer", ["/i8", "{0"], ""],
            ["Tagged", "Map", ["="], "", [[1, "a", "Integer", [], ""], [2, "b", "Integer", ["[0"], ""]]],
            ["Bag", "Record", [], "", [[1, "ids", "Integer", ["[1", "]2"], ""]]],
            ["List", "Record", [], "", [[1, "v", "Integer", [], ""], [2, "next", "List", ["[0"], ""]]],
            ["Net", "Array", ["/ipv4-net"], "", [[1, "addr", "Binary", [], ""], [2, "prefix", "Integer", [], ""]]]
        ]}))
        .unwrap()
    }

    fn check(type_name: &str, value: serde_json::Value) -> ValidationReport {
        validate(&model(), type_name, &Value::from(value), &ValidatorOptions::default()).unwrap()
    }

    fn path(report: &ValidationReport) -> String {
        report.errors[0].path_string("/")
    }

    #[test]
    fn point_record() {
        assert!(check("Point", json!({"x": 3, "y": 5})).is_valid());

        let missing = check("Point", json!({"x": 3}));
        assert_eq!(missing.codes(), vec![ErrorCode::MissingField]);
        assert_eq!(path(&missing), "/y");

        let mismatch = check("Point", json!({"x": "3", "y": 5}));
        assert_eq!(mismatch.codes(), vec![ErrorCode::TypeMismatch]);
        assert_eq!(path(&mismatch), "/x");

        let extra = check("Point", json!({"x": 3, "y": 5, "z": 1}));
        assert_eq!(extra.codes(), vec![ErrorCode::UnknownField]);

        let null = check("Point", json!({"x": 3, "y": null}));
        assert_eq!(null.codes(), vec![ErrorCode::TypeMismatch]);
    }

    #[test]
    fn shape_choice() {
        assert!(check("Shape", json!({"circle": 1.5})).is_valid());
        assert_eq!(
            check("Shape", json!({"circle": 1.5, "square": 2})).codes(),
            vec![ErrorCode::MultipleFields]
        );
        assert_eq!(check("Shape", json!({})).codes(), vec![ErrorCode::NoField]);
        assert_eq!(
            check("Shape", json!({"triangle": 1})).codes(),
            vec![ErrorCode::UnknownField]
        );
    }

    #[test]
    fn enumerated_by_name_and_by_tag() {
        assert!(check("Color", json!("RED")).is_valid());
        assert_eq!(check("Color", json!("BLUE")).codes(), vec![ErrorCode::UnknownEnum]);
        assert_eq!(check("Color", json!(1)).codes(), vec![ErrorCode::TypeMismatch]);
        assert!(check("Code", json!(2)).is_valid());
        assert_eq!(check("Code", json!(3)).codes(), vec![ErrorCode::UnknownEnum]);
        assert!(check("$Point", json!("y")).is_valid());
    }

    #[test]
    fn string_constraints() {
        assert!(check("Name", json!("abc")).is_valid());
        assert_eq!(check("Name", json!("a")).codes(), vec![ErrorCode::TooShort]);
        assert_eq!(
            check("Name", json!("abcdefghij")).codes(),
            vec![ErrorCode::TooLong]
        );
        assert_eq!(check("Name", json!("ABC")).codes(), vec![ErrorCode::PatternMismatch]);
        assert_eq!(check("String", json!("x".repeat(256))).codes(), vec![ErrorCode::TooLong]);
    }

    #[test]
    fn formats() {
        assert!(check("When", json!("2024-02-29")).is_valid());
        assert_eq!(check("When", json!("2023-02-29")).codes(), vec![ErrorCode::FormatViolation]);
        assert_eq!(
            check("Small", json!(300)).codes(),
            vec![ErrorCode::FormatViolation]
        );
        assert_eq!(check("Small", json!(-1)).codes(), vec![ErrorCode::BelowMinimum]);

        let off = ValidatorOptions {
            check_formats: false,
            ..ValidatorOptions::default()
        };
        let report = validate(&model(), "When", &Value::from("nope"), &off).unwrap();
        assert!(report.is_valid());
    }

    #[test]
    fn array_of_reports_every_element() {
        let report = check("Names", json!(["ab", "AB", "ab", "cd"]));
        assert_eq!(
            report.codes(),
            vec![
                ErrorCode::TooMany,
                ErrorCode::PatternMismatch,
                ErrorCode::DuplicateElement,
            ]
        );
        assert_eq!(report.errors[1].path, vec![PathSegment::Index(1)]);
        assert_eq!(report.errors[2].path, vec![PathSegment::Index(2)]);
    }

    #[test]
    fn map_of_checks_keys_and_values() {
        assert!(check("Counts", json!({"a": 1, "b": 2})).is_valid());
        let report = check("Counts", json!({"a": "one"}));
        assert_eq!(report.codes(), vec![ErrorCode::TypeMismatch]);
        assert_eq!(path(&report), "/a");
    }

    #[test]
    fn positional_array() {
        assert!(check("Pair", json!([1, "x"])).is_valid());
        assert!(check("Pair", json!([1])).is_valid());
        assert!(check("Pair", json!([1, null])).is_valid());
        assert_eq!(check("Pair", json!([null, "x"])).codes(), vec![ErrorCode::MissingField]);
        assert_eq!(check("Pair", json!([1, "x", 3])).codes(), vec![ErrorCode::TooMany]);
    }

    #[test]
    fn open_record_accepts_extra_text_keys() {
        assert!(check("Open", json!({"id": 1, "note": "anything"})).is_valid());
        assert_eq!(check("Open", json!({})).codes(), vec![ErrorCode::MissingField]);
    }

    #[test]
    fn map_keyed_by_tag() {
        let value = Value::Mapping(Mapping::from_iter([(Value::Int(1), Value::Int(5))]));
        let report = validate(&model(), "Tagged", &value, &ValidatorOptions::default()).unwrap();
        assert!(report.is_valid());
        assert_eq!(check("Tagged", json!({"a": 5})).codes(), vec![
            ErrorCode::UnknownField,
            ErrorCode::MissingField,
        ]);
    }

    #[test]
    fn repeated_field_multiplicity() {
        assert!(check("Bag", json!({"ids": [1, 2]})).is_valid());
        assert_eq!(check("Bag", json!({"ids": [1, 2, 3]})).codes(), vec![ErrorCode::TooMany]);
        assert_eq!(check("Bag", json!({"ids": []})).codes(), vec![ErrorCode::TooFew]);
        assert_eq!(check("Bag", json!({"ids": 1})).codes(), vec![ErrorCode::TypeMismatch]);
    }

    #[test]
    fn network_array_format() {
        let net = Value::Sequence(vec![Value::Bytes(vec![10, 0, 0, 0]), Value::Int(8)]);
        let m = model();
        let opts = ValidatorOptions::default();
        assert!(validate(&m, "Net", &net, &opts).unwrap().is_valid());
        let bad = Value::Sequence(vec![Value::Bytes(vec![10, 0, 0, 0]), Value::Int(40)]);
        assert_eq!(
            validate(&m, "Net", &bad, &opts).unwrap().codes(),
            vec![ErrorCode::FormatViolation]
        );
    }

    #[test]
    fn depth_limit_and_unknown_type() {
        let mut v = json!({"v": 0});
        for i in 1..100 {
            v = json!({"v": i, "next": v});
        }
        let m = model();
        let err = validate(&m, "List", &Value::from(v), &ValidatorOptions::default()).unwrap_err();
        assert_eq!(err, ValidateError::LimitExceeded { limit: 64 });
        assert!(matches!(
            validate(&m, "Nope", &Value::Null, &ValidatorOptions::default()),
            Err(ValidateError::UnknownType(_))
        ));
    }

    #[test]
    fn report_json_shape() {
        let report = check("Point", json!({"x": 3}));
        assert_eq!(
            report.to_json("/"),
            json!({"valid": false, "errors": [
                {"path": "/y", "code": "missing_field", "message": "required field 'y' is missing"}
            ]})
        );
    }
}
