//! Schema documents: both textual forms, write-back, and lint reports.

use jadn_type::schema::{self, Form};
use jadn_type::type_def::Config;
use jadn_type::{BaseKind, LintErrorKind, Multiplicity, TypeModel, TypeRef};
use serde_json::json;

fn compact_doc() -> serde_json::Value {
    json!({
        "meta": {
            "module": "http://example.com/music",
            "patch": "1.0",
            "title": "Music Library",
            "exports": ["Library"],
            "config": {"$MaxString": 100}
        },
        "types": [
            ["Library", "MapOf", ["+Barcode", "*Album", "{1"], "Top level"],
            ["Barcode", "String", ["%^\\d{12}$"], "A UPC-A barcode"],
            ["Album", "Record", [], "model of an album", [
                [1, "artist", "Artist", [], ""],
                [2, "title", "String", [], ""],
                [3, "year", "Integer", ["{1900"], "release year"],
                [4, "tracks", "Track", ["[1", "]0"], ""],
                [5, "cover", "Binary", ["[0"], ""]
            ]],
            ["Artist", "Record", [], "", [
                [1, "name", "String", [], ""],
                [2, "instruments", "Instrument", ["[0", "]0"], ""]
            ]],
            ["Instrument", "Enumerated", [], "", [[1, "vocals", ""], [2, "guitar", ""], [3, "drums", ""]]],
            ["Track", "Array", [], "", [
                [1, "number", "Integer", ["{1"], ""],
                [2, "name", "String", [], ""],
                [3, "length", "Integer", ["[0"], "seconds"]
            ]],
            ["AlbumField", "Enumerated", ["#Album"], ""],
            ["Playlist", "ArrayOf", ["*$Album", "q"], ""]
        ]
    })
}

fn verbose_doc() -> serde_json::Value {
    json!({
        "meta": {
            "module": "http://example.com/music",
            "patch": "1.0",
            "title": "Music Library",
            "exports": ["Library"],
            "config": {"$MaxString": 100}
        },
        "types": [
            {"name": "Library", "type": "MapOf", "options": {"ktype": "Barcode", "vtype": "Album", "minv": 1},
             "description": "Top level"},
            {"name": "Barcode", "type": "String", "options": {"pattern": "^\\d{12}$"},
             "description": "A UPC-A barcode"},
            {"name": "Album", "type": "Record", "description": "model of an album", "fields": [
                {"id": 1, "name": "artist", "type": "Artist"},
                {"id": 2, "name": "title", "type": "String"},
                {"id": 3, "name": "year", "type": "Integer", "options": {"minv": 1900},
                 "description": "release year"},
                {"id": 4, "name": "tracks", "type": "Track", "options": {"minc": 1, "maxc": 0}},
                {"id": 5, "name": "cover", "type": "Binary", "options": {"minc": 0}}
            ]},
            {"name": "Artist", "type": "Record", "fields": [
                {"id": 1, "name": "name", "type": "String"},
                {"id": 2, "name": "instruments", "type": "Instrument", "options": {"minc": 0, "maxc": 0}}
            ]},
            {"name": "Instrument", "type": "Enumerated", "fields": [
                {"id": 1, "value": "vocals"}, {"id": 2, "value": "guitar"}, {"id": 3, "value": "drums"}
            ]},
            {"name": "Track", "type": "Array", "fields": [
                {"id": 1, "name": "number", "type": "Integer", "options": {"minv": 1}},
                {"id": 2, "name": "name", "type": "String"},
                {"id": 3, "name": "length", "type": "Integer", "options": {"minc": 0},
                 "description": "seconds"}
            ]},
            {"name": "AlbumField", "type": "Enumerated", "options": {"enum": "Album"}},
            {"name": "Playlist", "type": "ArrayOf", "options": {"vtype": "$Album", "unique": true}}
        ]
    })
}

fn same_model(a: &TypeModel, b: &TypeModel) {
    assert_eq!(a.meta(), b.meta());
    let a_defs: Vec<_> = a.types().collect();
    let b_defs: Vec<_> = b.types().collect();
    assert_eq!(a_defs, b_defs);
}

#[test]
fn compact_and_verbose_forms_load_the_same_model() {
    let compact = schema::load(&compact_doc()).unwrap();
    let verbose = schema::load(&verbose_doc()).unwrap();
    same_model(&compact, &verbose);

    assert_eq!(compact.len(), 8);
    assert_eq!(compact.config().max_string, 100);
    assert_eq!(compact.config().max_binary, Config::default().max_binary);
    let album = compact.get("Album").unwrap();
    assert_eq!(album.fields()[3].multiplicity, Multiplicity { min: 1, max: None });
    assert_eq!(album.fields()[4].multiplicity, Multiplicity::OPTIONAL);
    assert_eq!(compact.base_kind("Library").unwrap(), BaseKind::MapOf);
    assert_eq!(
        compact.get("Playlist").unwrap().options.vtype(),
        Some(&TypeRef::Derived("Album".into()))
    );
}

#[test]
fn written_documents_reload_identically() {
    let model = schema::load(&compact_doc()).unwrap();
    for form in [Form::Compact, Form::Verbose] {
        let text = schema::to_string_pretty(&model, form);
        let reloaded = schema::load_str(&text).unwrap();
        same_model(&model, &reloaded);
    }
    let compact = schema::to_document(&model, Form::Compact);
    assert_eq!(compact["types"][0], json!(["Library", "MapOf", ["+Barcode", "*Album", "{1"], "Top level"]));
    assert_eq!(compact["meta"]["config"], json!({"$MaxString": 100}));
}

#[test]
fn derived_enumeration_items() {
    let model = schema::load(&compact_doc()).unwrap();
    let def = model.get("AlbumField").unwrap();
    let resolved = model.resolve_def(def);
    let names: Vec<&str> = resolved.items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["artist", "title", "year", "tracks", "cover"]);
}

#[test]
fn analysis_of_references() {
    let model = schema::load(&compact_doc()).unwrap();
    let analysis = model.analyze();
    assert_eq!(analysis.unreferenced, vec!["AlbumField", "Playlist"]);
    assert_eq!(analysis.dependencies["Album"], vec!["Artist", "Track"]);
    assert_eq!(analysis.dependencies["Library"], vec!["Barcode", "Album"]);
}

#[test]
fn every_violation_is_reported_in_order() {
    let errors = schema::load(&json!({
        "meta": {"exports": ["Missing"]},
        "types": [
            ["Point", "Record", [], "", [
                [2, "x", "Integer", [], ""],
                [1, "y", "Integer", [], ""],
                [3, "y", "Unknown", [], ""]
            ]],
            ["Point", "String", [], ""],
            ["Flag", "Boolean", ["%^yes$"], ""],
            ["Pick", "Choice", [], "", [[5, "a", "String", [], ""], [5, "b", "String", [], ""]]],
            ["List", "ArrayOf", [], ""],
            ["Size", "Integer", ["{10", "}1"], ""],
            ["Bad", "Enumerated", ["#Size"], ""]
        ]
    }))
    .unwrap_err();
    assert_eq!(
        errors.kinds(),
        vec![
            LintErrorKind::NonMonotonicTag,
            LintErrorKind::DuplicateFieldName,
            LintErrorKind::UnresolvedReference,
            LintErrorKind::DuplicateTypeName,
            LintErrorKind::InvalidOption,
            LintErrorKind::DuplicateFieldTag,
            LintErrorKind::MissingOption,
            LintErrorKind::InvalidRange,
            LintErrorKind::InvalidEnumSource,
            LintErrorKind::UnknownExport,
        ]
    );
    let locations: Vec<&str> = errors.iter().map(|e| e.location.as_str()).collect();
    assert_eq!(locations[0], "Point.y");
    assert_eq!(locations[2], "Point.y");
    assert_eq!(locations[9], "meta.exports");

    let again = schema::load(&json!({
        "meta": {"exports": ["Missing"]},
        "types": [["Point", "String", [], ""], ["Point", "String", [], ""]]
    }))
    .unwrap_err();
    assert_eq!(
        again.kinds(),
        vec![LintErrorKind::DuplicateTypeName, LintErrorKind::UnknownExport]
    );
}

#[test]
fn document_shape_errors() {
    let errors = schema::load_str("{\"types\": [").unwrap_err();
    assert_eq!(errors.kinds(), vec![LintErrorKind::Document]);

    let errors = schema::load(&json!({"types": "nope"})).unwrap_err();
    assert_eq!(errors.kinds(), vec![LintErrorKind::Document]);

    let errors = schema::load(&json!({"types": [["Thing", "Widget", [], ""]]})).unwrap_err();
    assert_eq!(errors.kinds(), vec![LintErrorKind::UnknownBaseKind]);
}

#[test]
fn oversized_tags_are_lint_errors() {
    let errors = schema::load(&json!({"types": [
        ["Big", "Enumerated", [], "", [[9223372036854775808u64, "BIG", ""]]],
        ["Wide", "Record", [], "", [[18446744073709551615u64, "w", "String", [], ""]]]
    ]}))
    .unwrap_err();
    assert_eq!(
        errors.kinds(),
        vec![LintErrorKind::TagOutOfRange, LintErrorKind::TagOutOfRange]
    );

    let edge = schema::load(&json!({"types": [
        ["Edge", "Enumerated", [], "", [[9223372036854775807u64, "EDGE", ""]]]
    ]}));
    assert!(edge.is_ok());
}
