//! End-to-end behavior of the loader, validator and codec on small schemas.

use jadn_type::codec::{self, Layout};
use jadn_type::{
    schema, validate, validate_document, CodecError, ErrorCode, LintErrorKind, Mapping, Profile,
    TypeModel, ValidatorOptions, Value,
};
use serde_json::json;

fn shapes() -> TypeModel {
    schema::load(&json!({
        "meta": {"module": "http://example.com/shapes", "exports": ["Shape", "Point"]},
        "types": [
            ["Point", "Record", [], "", [[1, "x", "Integer", [], ""], [2, "y", "Integer", [], ""]]],
            ["Shape", "Choice", [], "", [[1, "circle", "Number", [], ""], [2, "square", "Number", [], ""]]],
            ["Color", "Enumerated", [], "", [[1, "RED", ""], [2, "GREEN", ""]]]
        ]
    }))
    .unwrap()
}

fn report(model: &TypeModel, type_name: &str, value: serde_json::Value) -> jadn_type::ValidationReport {
    validate(model, type_name, &Value::from(value), &ValidatorOptions::default()).unwrap()
}

#[test]
fn point_matrix() {
    let m = shapes();
    assert!(report(&m, "Point", json!({"x": 3, "y": 5})).is_valid());

    let missing = report(&m, "Point", json!({"x": 3}));
    assert_eq!(missing.errors.len(), 1);
    assert_eq!(missing.errors[0].code, ErrorCode::MissingField);
    assert_eq!(missing.errors[0].path_string("/"), "/y");

    let mismatch = report(&m, "Point", json!({"x": "3", "y": 5}));
    assert_eq!(mismatch.errors.len(), 1);
    assert_eq!(mismatch.errors[0].code, ErrorCode::TypeMismatch);
    assert_eq!(mismatch.errors[0].path_string("/"), "/x");
}

#[test]
fn shape_matrix() {
    let m = shapes();
    let both = report(&m, "Shape", json!({"circle": 1.0, "square": 2.0}));
    assert_eq!(both.codes(), vec![ErrorCode::MultipleFields]);
    let neither = report(&m, "Shape", json!({}));
    assert_eq!(neither.codes(), vec![ErrorCode::NoField]);
}

#[test]
fn enumerated_matrix() {
    let m = shapes();
    let red = Value::from("RED");
    let verbose = codec::encode(&m, "Color", &red, Profile::Verbose).unwrap();
    let concise = codec::encode(&m, "Color", &red, Profile::Concise).unwrap();
    assert_eq!(verbose, br#""RED""#);
    assert_eq!(concise, b"1");
    assert_eq!(codec::decode(&m, "Color", &verbose, Profile::Verbose).unwrap(), red);
    assert_eq!(codec::decode(&m, "Color", &concise, Profile::Concise).unwrap(), red);
}

#[test]
fn truncated_binary_matrix() {
    let m = shapes();
    let point = Value::from(json!({"x": 300, "y": -7}));
    let bytes = codec::encode(&m, "Point", &point, Profile::CompactBinary).unwrap();
    assert_eq!(codec::decode(&m, "Point", &bytes, Profile::CompactBinary).unwrap(), point);
    for cut in 0..bytes.len() {
        let result = codec::decode(&m, "Point", &bytes[..cut], Profile::CompactBinary);
        assert!(
            matches!(result, Err(CodecError::Structural(_))),
            "cut at {cut}: {result:?}"
        );
    }
}

#[test]
fn cycle_matrix() {
    let required = schema::load(&json!({"types": [
        ["R", "Record", [], "", [[1, "next", "R", [], ""]]]
    ]}))
    .unwrap_err();
    assert_eq!(required.kinds(), vec![LintErrorKind::NonOptionalCycle]);

    let mutual = schema::load(&json!({"types": [
        ["A", "Record", [], "", [[1, "b", "B", [], ""]]],
        ["B", "Map", [], "", [[1, "a", "A", [], ""]]]
    ]}))
    .unwrap_err();
    assert_eq!(mutual.kinds(), vec![LintErrorKind::NonOptionalCycle]);

    for ok in [
        json!({"types": [["R", "Record", [], "", [[1, "next", "R", ["[0"], ""]]]]}),
        json!({"types": [["R", "Record", [], "", [[1, "kids", "R", ["[0", "]0"], ""]]]]}),
        json!({"types": [
            ["Expr", "Choice", [], "", [[1, "lit", "Integer", [], ""], [2, "neg", "Expr", [], ""]]]
        ]}),
        json!({"types": [
            ["Tree", "Record", [], "", [[1, "kids", "Trees", [], ""]]],
            ["Trees", "ArrayOf", ["*Tree"], ""]
        ]}),
    ] {
        assert!(schema::load(&ok).is_ok(), "{ok}");
    }
}

#[test]
fn profiles_agree_on_the_abstract_value() {
    let m = shapes();
    let shape = Value::from(json!({"square": 2.5}));
    let mut decoded = Vec::new();
    for p in Profile::ALL {
        let bytes = codec::encode(&m, "Shape", &shape, p).unwrap();
        decoded.push(codec::decode(&m, "Shape", &bytes, p).unwrap());
    }
    assert!(decoded.iter().all(|v| *v == shape));
    assert_eq!(
        codec::to_json(&m, "Shape", &shape, Layout::Concise).unwrap(),
        json!({"2": 2.5})
    );
}

#[test]
fn document_entry_point() {
    let m = shapes();
    let ok = validate_document(&m, "Point", b"[3,5]", Profile::Concise).unwrap();
    assert_eq!(ok.to_json("/"), json!({"valid": true, "errors": []}));

    let bad = validate_document(&m, "Point", br#"{"x":3}"#, Profile::Verbose).unwrap();
    assert_eq!(bad.codes(), vec![ErrorCode::Structure]);
}

#[test]
fn tagged_enumeration_and_maps() {
    let m = schema::load(&json!({"types": [
        ["Status", "Enumerated", ["="], "", [[200, "OK", ""], [404, "NotFound", ""]]],
        ["Headers", "Map", ["="], "", [[1, "status", "Status", [], ""], [2, "note", "String", ["[0"], ""]]]
    ]}))
    .unwrap();
    let value = Value::Mapping(Mapping::from_iter([
        (Value::Int(1), Value::Int(404)),
        (Value::Int(2), Value::from("gone")),
    ]));
    for p in Profile::ALL {
        let bytes = codec::encode(&m, "Headers", &value, p).unwrap();
        assert_eq!(codec::decode(&m, "Headers", &bytes, p).unwrap(), value, "{p}");
    }
    assert_eq!(
        codec::to_json(&m, "Headers", &value, Layout::Verbose).unwrap(),
        json!({"1": 404, "2": "gone"})
    );
    let unknown = Value::Mapping(Mapping::from_iter([(Value::Int(1), Value::Int(500))]));
    let r = validate(&m, "Headers", &unknown, &ValidatorOptions::default()).unwrap();
    assert_eq!(r.codes(), vec![ErrorCode::UnknownEnum]);
}
