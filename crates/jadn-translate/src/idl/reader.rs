//! JADN-IDL text → [`TypeModel`].

use jadn_type::schema;
use jadn_type::translator::ModelBuilder;
use jadn_type::type_def::{BaseKind, Field, Item, Members, TypeDefinition, TypeRef};
use jadn_type::{TranslateError, TypeModel};
use serde_json::{Map, Value};

use super::expr::{self, syntax};

const META_KEYS: [&str; 7] = [
    "module",
    "patch",
    "title",
    "description",
    "imports",
    "exports",
    "config",
];

/// A definition whose `{ ... }` block is still being read.
struct Open {
    def: TypeDefinition,
    fields: Vec<Field>,
    items: Vec<Item>,
    line: usize,
}

impl Open {
    fn close(self) -> TypeDefinition {
        let mut def = self.def;
        if !self.items.is_empty() {
            def.members = Members::Items(self.items);
        } else if !self.fields.is_empty() {
            def.members = Members::Fields(self.fields);
        }
        def
    }

    fn member(&mut self, text: &str, line: usize) -> Result<(), TranslateError> {
        let (code, comment) = expr::split_comment(text);
        let code = code.trim();
        let code = code.strip_suffix(',').unwrap_or(code).trim_end();
        let comment = comment.unwrap_or("");
        let (tag, rest) = code.split_once(char::is_whitespace).unwrap_or((code, ""));
        let tag: u64 = tag
            .parse()
            .map_err(|_| syntax(line, format!("'{tag}' is not a tag")))?;
        let rest = rest.trim();

        match self.def.kind {
            BaseKind::Enumerated if self.def.options.id() => {
                if !rest.is_empty() {
                    return Err(syntax(line, format!("unexpected '{rest}' before the comment")));
                }
                let (name, description) = named_comment(comment);
                self.items.push(Item::new(tag, name).with_description(description));
            }
            BaseKind::Enumerated => {
                if rest.is_empty() {
                    return Err(syntax(line, "missing item name"));
                }
                self.items.push(Item::new(tag, rest).with_description(comment));
            }
            BaseKind::Array => {
                let (name, description) = named_comment(comment);
                if name.is_empty() {
                    return Err(syntax(line, "array fields are named in a '// name:: ...' comment"));
                }
                self.fields.push(field(tag, name, rest, description, line)?);
            }
            _ => {
                let (name, ty) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if ty.trim().is_empty() {
                    return Err(syntax(line, format!("field '{name}' has no type")));
                }
                self.fields.push(field(tag, name, ty, comment, line)?);
            }
        }
        Ok(())
    }
}

/// `name:: description`, or just a name.
fn named_comment(comment: &str) -> (&str, &str) {
    match comment.split_once("::") {
        Some((name, description)) => (name.trim(), description.trim()),
        None => (comment.trim(), ""),
    }
}

fn field(
    tag: u64,
    name: &str,
    ty: &str,
    description: &str,
    line: usize,
) -> Result<Field, TranslateError> {
    let e = expr::parse(ty, line)?;
    let mut field = Field::new(tag, name, e.reference).with_description(description);
    if let Some(m) = e.multiplicity {
        field.multiplicity = m;
    }
    for opt in e.options {
        field.options.push(opt);
    }
    Ok(field)
}

fn meta_line(text: &str) -> Option<(String, Value)> {
    let (key, value) = text.split_once(':')?;
    let key = key.trim();
    if !META_KEYS.contains(&key) {
        return None;
    }
    let value = value.trim();
    let json = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Some((key.to_string(), json))
}

/// `Name = Kind... [{]  [// description]`
fn definition(text: &str, line: usize) -> Result<(TypeDefinition, bool), TranslateError> {
    let (code, comment) = expr::split_comment(text);
    let Some((name, rest)) = code.split_once('=') else {
        return Err(syntax(line, "expected 'Name = Type'"));
    };
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(syntax(line, format!("'{name}' is not a type name")));
    }
    let rest = rest.trim();
    let (rest, body) = match rest.strip_suffix('{') {
        Some(r) => (r.trim_end(), true),
        None => (rest, false),
    };
    let e = expr::parse(rest, line)?;
    let TypeRef::Base(kind) = e.reference else {
        return Err(syntax(line, format!("{name} must be defined from a base kind")));
    };
    if e.has_field_parts() {
        return Err(syntax(line, format!("{name} carries field options")));
    }
    if body && !kind.has_members() {
        return Err(syntax(line, format!("{kind} definitions have no members")));
    }
    let mut def = TypeDefinition::new(name, kind).with_description(comment.unwrap_or(""));
    for opt in e.options {
        def.options.push(opt);
    }
    Ok((def, body))
}

pub(super) fn read(text: &str) -> Result<TypeModel, TranslateError> {
    let mut meta = Map::new();
    let mut builder = ModelBuilder::new();
    let mut open: Option<Open> = None;
    let mut in_header = true;

    for (i, raw) in text.lines().enumerate() {
        let line = i + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        if let Some(current) = open.as_mut() {
            if trimmed != "}" {
                current.member(trimmed, line)?;
                continue;
            }
        }
        if trimmed == "}" {
            match open.take() {
                Some(current) => builder.add_type(current.close()),
                None => return Err(syntax(line, "unmatched '}'")),
            };
            continue;
        }
        if in_header {
            if let Some((key, value)) = meta_line(trimmed) {
                meta.insert(key, value);
                continue;
            }
            in_header = false;
        }
        let (def, body) = definition(trimmed, line)?;
        tracing::trace!(name = %def.name, kind = %def.kind, line, "idl definition");
        if body {
            open = Some(Open {
                def,
                fields: Vec::new(),
                items: Vec::new(),
                line,
            });
        } else {
            builder.add_type(def);
        }
    }

    if let Some(current) = open {
        return Err(syntax(
            current.line,
            format!("definition of {} is not closed", current.def.name),
        ));
    }
    if !meta.is_empty() {
        builder.meta(schema::meta_from_json(&meta)?);
    }
    Ok(builder.build()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jadn_type::type_def::{Multiplicity, TypeOption};
    use jadn_type::LintErrorKind;

    #[test]
    fn reads_definitions_and_members() {
        let model = read(
            r#"
  title: "Shapes"
exports: ["Shape"]

Shape = Choice {  // Something to draw
    1 circle Number,  // radius
    2 square Number
}

Color = Enumerated {
    1 RED,    // warm
    2 GREEN
}

Size = Integer{0..100}
"#,
        )
        .unwrap();
        assert_eq!(model.meta().title.as_deref(), Some("Shapes"));
        let shape = model.get("Shape").unwrap();
        assert_eq!(shape.description, "Something to draw");
        assert_eq!(shape.fields()[0].description, "radius");
        assert_eq!(shape.fields()[1].type_ref, TypeRef::Base(BaseKind::Number));
        let color = model.get("Color").unwrap();
        assert_eq!(color.items()[0], Item::new(1, "RED").with_description("warm"));
        let size = model.get("Size").unwrap();
        assert_eq!(size.options.minv(), Some(0));
        assert_eq!(size.options.maxv(), Some(100));
    }

    #[test]
    fn array_fields_and_tagged_items() {
        let model = read(
            "Pair = Array {\n    1 Integer,  // left::\n    2 String optional  // right:: tail\n}\n\
             Status = Enumerated.ID {\n    200  // OK::\n    404  // Not Found:: gone\n}\n",
        )
        .unwrap();
        let pair = model.get("Pair").unwrap();
        assert_eq!(pair.fields()[1].name, "right");
        assert_eq!(pair.fields()[1].multiplicity, Multiplicity::OPTIONAL);
        assert_eq!(pair.fields()[1].description, "tail");
        let status = model.get("Status").unwrap();
        assert_eq!(status.options.iter().collect::<Vec<_>>(), vec![&TypeOption::Id]);
        assert_eq!(status.items()[1].name, "Not Found");
    }

    #[test]
    fn syntax_errors_name_the_line() {
        let err = read("A = Record {\n    x name String\n}\n").unwrap_err();
        assert_eq!(err.to_string(), "line 2: 'x' is not a tag");

        let err = read("A = Record {\n    1 a String\n").unwrap_err();
        assert!(matches!(err, TranslateError::Syntax { line: 1, .. }));

        let err = read("A = Integer {\n}\n").unwrap_err();
        assert!(matches!(err, TranslateError::Syntax { line: 1, .. }));

        let err = read("}\n").unwrap_err();
        assert!(matches!(err, TranslateError::Syntax { line: 1, .. }));
    }

    #[test]
    fn imports_are_linted() {
        let err = read("A = Record {\n    1 b Missing\n}\n").unwrap_err();
        match err {
            TranslateError::Lint(errors) => {
                assert_eq!(errors.kinds(), vec![LintErrorKind::UnresolvedReference]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
