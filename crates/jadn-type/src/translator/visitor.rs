//! Read-only traversal of a [`TypeModel`].

use crate::type_def::{Field, Item, Meta, TypeDefinition, TypeModel};

/// Callbacks for [`walk`]. Every method defaults to doing nothing.
pub trait ModelVisitor {
    fn visit_meta(&mut self, _meta: &Meta) {}

    fn visit_type(&mut self, _def: &TypeDefinition) {}

    fn visit_field(&mut self, _def: &TypeDefinition, _field: &Field) {}

    /// Declared values of an Enumerated type. Derived enumerations (`#`)
    /// declare none.
    fn visit_item(&mut self, _def: &TypeDefinition, _item: &Item) {}

    fn end_type(&mut self, _def: &TypeDefinition) {}
}

/// Visits the metadata, then every definition in declaration order with
/// its members in declaration order.
pub fn walk<V: ModelVisitor + ?Sized>(model: &TypeModel, visitor: &mut V) {
    visitor.visit_meta(model.meta());
    for def in model.types() {
        visitor.visit_type(def);
        for field in def.fields() {
            visitor.visit_field(def, field);
        }
        for item in def.items() {
            visitor.visit_item(def, item);
        }
        visitor.end_type(def);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;
    use serde_json::json;

    #[derive(Default)]
    struct Trace(Vec<String>);

    impl ModelVisitor for Trace {
        fn visit_meta(&mut self, meta: &Meta) {
            self.0.push(format!("meta {}", meta.module.as_deref().unwrap_or("-")));
        }

        fn visit_type(&mut self, def: &TypeDefinition) {
            self.0.push(format!("type {} {}", def.name, def.kind));
        }

        fn visit_field(&mut self, _def: &TypeDefinition, field: &Field) {
            self.0.push(format!("field {} {}", field.tag, field.name));
        }

        fn visit_item(&mut self, _def: &TypeDefinition, item: &Item) {
            self.0.push(format!("item {} {}", item.tag, item.name));
        }

        fn end_type(&mut self, def: &TypeDefinition) {
            self.0.push(format!("end {}", def.name));
        }
    }

    #[test]
    fn declaration_order() {
        let model = schema::load(&json!({
            "meta": {"module": "http://example.com/shapes"},
            "types": [
                ["Color", "Enumerated", [], "", [[1, "RED", ""], [2, "GREEN", ""]]],
                ["Point", "Record", [], "", [[1, "x", "Integer", [], ""], [2, "y", "Integer", [], ""]]]
            ]
        }))
        .unwrap();
        let mut trace = Trace::default();
        walk(&model, &mut trace);
        assert_eq!(
            trace.0,
            vec![
                "meta http://example.com/shapes",
                "type Color Enumerated",
                "item 1 RED",
                "item 2 GREEN",
                "end Color",
                "type Point Record",
                "field 1 x",
                "field 2 y",
                "end Point",
            ]
        );
    }
}
