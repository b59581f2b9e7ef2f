//! Markdown tables for reading a schema: a metadata table, then one table
//! per definition in declaration order. Export only.

use jadn_type::schema;
use jadn_type::translator::{audit, walk, FeatureSet, ModelVisitor};
use jadn_type::type_def::{BaseKind, Field, Item, Meta, Multiplicity, TypeDefinition, TypeRef};
use jadn_type::{TranslateError, Translation, Translator, TypeModel};
use serde_json::Value;

use crate::idl::expr;

/// Writes a schema as Markdown documentation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Markdown;

impl Translator for Markdown {
    fn name(&self) -> &'static str {
        "md"
    }

    fn features(&self) -> FeatureSet {
        FeatureSet {
            import: false,
            ..FeatureSet::lossless()
        }
    }

    fn export_schema(&self, model: &TypeModel) -> Result<Translation<String>, TranslateError> {
        let losses = audit(model, &self.features());
        let mut w = MarkdownWriter::default();
        walk(model, &mut w);
        let mut out = w.out.trim_end().to_string();
        out.push('\n');
        Ok(Translation::new(self.name(), out, losses))
    }
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

const MEMBERS: [(&str, Align); 5] = [
    ("ID", Align::Right),
    ("Name", Align::Left),
    ("Type", Align::Left),
    ("#", Align::Right),
    ("Description", Align::Left),
];

#[derive(Default)]
struct MarkdownWriter {
    out: String,
    rows: Vec<Vec<String>>,
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', "<br>")
}

fn code(text: &str) -> String {
    format!("`{text}`")
}

fn count(m: Multiplicity) -> String {
    match m.max {
        Some(max) if max == m.min => max.to_string(),
        _ => m.to_string(),
    }
}

/// `**name**:: description` for members whose name has no column.
fn named(name: &str, description: &str) -> String {
    format!("**{name}**:: {description}").trim_end().to_string()
}

fn meta_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items.iter().map(meta_value).collect::<Vec<_>>().join(", "),
        Value::Object(obj) => obj
            .iter()
            .map(|(k, v)| format!("**{k}**: {}", meta_value(v)))
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

fn has_body(def: &TypeDefinition) -> bool {
    def.kind.has_members() && def.options.enum_source().is_none()
}

impl MarkdownWriter {
    fn table(&mut self, columns: &[(&str, Align)], rows: &[Vec<String>]) {
        let line = |cells: Vec<String>| -> String {
            let mut s = String::from("|");
            for c in cells {
                s.push_str(&format!(" {c} |"));
            }
            s.push('\n');
            s
        };
        self.out
            .push_str(&line(columns.iter().map(|(h, _)| h.to_string()).collect()));
        self.out.push('|');
        for (_, align) in columns {
            self.out.push_str(match align {
                Align::Left => ":---|",
                Align::Right => "---:|",
            });
        }
        self.out.push('\n');
        for row in rows {
            self.out.push_str(&line(row.iter().map(|c| cell(c)).collect()));
        }
    }
}

impl ModelVisitor for MarkdownWriter {
    fn visit_meta(&mut self, meta: &Meta) {
        self.out.push_str("## Schema\n\n");
        let obj = schema::meta_to_json(meta);
        if obj.is_empty() {
            return;
        }
        let rows: Vec<Vec<String>> = obj
            .iter()
            .map(|(k, v)| vec![format!("**{k}:**"), meta_value(v)])
            .collect();
        self.table(&[("", Align::Right), ("", Align::Left)], &rows);
        self.out.push('\n');
    }

    fn visit_type(&mut self, def: &TypeDefinition) {
        let definition = expr::render(&TypeRef::Base(def.kind), &def.options, None);
        if !has_body(def) {
            let row = vec![format!("**{}**", def.name), code(&definition), def.description.clone()];
            self.table(
                &[
                    ("Type Name", Align::Left),
                    ("Type Definition", Align::Left),
                    ("Description", Align::Left),
                ],
                &[row],
            );
            self.out.push('\n');
            return;
        }
        self.out
            .push_str(&format!("**_Type: {} ({definition})_**\n\n", def.name));
        if !def.description.is_empty() {
            self.out.push_str(&def.description);
            self.out.push_str("\n\n");
        }
    }

    fn visit_field(&mut self, def: &TypeDefinition, field: &Field) {
        let ty = code(&expr::render(&field.type_ref, &field.options, None));
        let row = match def.kind {
            BaseKind::Array => vec![
                field.tag.to_string(),
                ty,
                count(field.multiplicity),
                named(&field.name, &field.description),
            ],
            _ => vec![
                field.tag.to_string(),
                format!("**{}**", field.name),
                ty,
                count(field.multiplicity),
                field.description.clone(),
            ],
        };
        self.rows.push(row);
    }

    fn visit_item(&mut self, def: &TypeDefinition, item: &Item) {
        let row = match def.options.id() {
            true => vec![item.tag.to_string(), named(&item.name, &item.description)],
            false => vec![
                item.tag.to_string(),
                format!("**{}**", item.name),
                item.description.clone(),
            ],
        };
        self.rows.push(row);
    }

    fn end_type(&mut self, def: &TypeDefinition) {
        if !has_body(def) {
            return;
        }
        let rows = std::mem::take(&mut self.rows);
        if rows.is_empty() {
            return;
        }
        let [id, name, ty, multiplicity, description] = MEMBERS;
        let columns: Vec<(&str, Align)> = match def.kind {
            BaseKind::Enumerated if def.options.id() => vec![id, description],
            BaseKind::Enumerated => vec![id, name, description],
            BaseKind::Array => vec![id, ty, multiplicity, description],
            _ => MEMBERS.to_vec(),
        };
        self.table(&columns, &rows);
        self.out.push('\n');
    }
}
