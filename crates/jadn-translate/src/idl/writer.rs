//! [`TypeModel`] → JADN-IDL text.

use jadn_type::schema;
use jadn_type::translator::{walk, ModelVisitor};
use jadn_type::type_def::{BaseKind, Field, Item, Meta, TypeDefinition, TypeRef};
use jadn_type::{TranslationLoss, TypeModel};

use super::expr;

const INDENT: &str = "    ";

struct Row {
    cells: Vec<String>,
    comment: String,
}

#[derive(Default)]
struct IdlWriter {
    out: String,
    rows: Vec<Row>,
    losses: Vec<TranslationLoss>,
}

pub(super) fn write(model: &TypeModel) -> (String, Vec<TranslationLoss>) {
    let mut w = IdlWriter::default();
    walk(model, &mut w);
    let mut out = w.out.trim_end().to_string();
    out.push('\n');
    (out, w.losses)
}

/// Definitions written with a `{ ... }` member block.
fn has_body(def: &TypeDefinition) -> bool {
    def.kind.has_members() && def.options.enum_source().is_none()
}

/// Item names the reader would split or trim differently.
fn is_writable_name(name: &str) -> bool {
    !name.is_empty()
        && name.trim() == name
        && !["//", "::", ",", "\""].iter().any(|s| name.contains(s))
}

impl IdlWriter {
    fn loss(&mut self, location: &str, feature: &str, detail: &str) {
        self.losses
            .push(TranslationLoss::new(location, feature, detail));
    }

    /// A description as one line of text.
    fn description(&mut self, location: &str, text: &str) -> String {
        let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if flat != text {
            self.loss(
                location,
                "description",
                "line breaks and repeated whitespace are collapsed",
            );
        }
        flat
    }

    fn pattern(&mut self, location: &str, pattern: Option<&str>) {
        if pattern.is_some_and(|p| p.contains("%)")) {
            self.loss(location, "option %", "a pattern containing '%)' cannot be delimited");
        }
    }

    fn flush_rows(&mut self) {
        let columns = self.rows.iter().map(|r| r.cells.len()).max().unwrap_or(0);
        let mut widths = vec![0; columns];
        for row in &self.rows {
            for (i, cell) in row.cells.iter().enumerate() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
        let code: Vec<String> = self
            .rows
            .iter()
            .map(|row| {
                let cells: Vec<String> = row
                    .cells
                    .iter()
                    .enumerate()
                    .map(|(i, cell)| match i {
                        0 => format!("{cell:>w$}", w = widths[0]),
                        _ => format!("{cell:<w$}", w = widths[i]),
                    })
                    .collect();
                cells.join(" ").trim_end().to_string()
            })
            .collect();
        let width = code.iter().map(|c| c.chars().count()).max().unwrap_or(0);
        for (line, row) in code.iter().zip(&self.rows) {
            self.out.push_str(INDENT);
            if row.comment.is_empty() {
                self.out.push_str(line);
            } else {
                self.out
                    .push_str(&format!("{line:<width$}  // {}", row.comment));
            }
            self.out.push('\n');
        }
        self.rows.clear();
    }
}

impl ModelVisitor for IdlWriter {
    fn visit_meta(&mut self, meta: &Meta) {
        let obj = schema::meta_to_json(meta);
        let width = obj.keys().map(|k| k.len() + 1).max().unwrap_or(0);
        for (key, value) in &obj {
            self.out
                .push_str(&format!("{:>width$} {value}\n", format!("{key}:")));
        }
        if !obj.is_empty() {
            self.out.push('\n');
        }
    }

    fn visit_type(&mut self, def: &TypeDefinition) {
        self.pattern(&def.name, def.options.pattern());
        let mut line = format!(
            "{} = {}",
            def.name,
            expr::render(&TypeRef::Base(def.kind), &def.options, None)
        );
        if has_body(def) {
            line.push_str(" {");
        }
        let description = self.description(&def.name, &def.description);
        if !description.is_empty() {
            line.push_str("  // ");
            line.push_str(&description);
        }
        self.out.push_str(&line);
        self.out.push('\n');
    }

    fn visit_field(&mut self, def: &TypeDefinition, field: &Field) {
        let location = format!("{}.{}", def.name, field.name);
        self.pattern(&location, field.options.pattern());
        let description = self.description(&location, &field.description);
        let ty = expr::render(&field.type_ref, &field.options, Some(field.multiplicity));
        let row = match def.kind {
            // Array fields are positional; the name rides in the comment.
            BaseKind::Array => Row {
                cells: vec![field.tag.to_string(), ty],
                comment: format!("{}:: {description}", field.name)
                    .trim_end()
                    .to_string(),
            },
            _ => Row {
                cells: vec![field.tag.to_string(), field.name.clone(), ty],
                comment: description,
            },
        };
        self.rows.push(row);
    }

    fn visit_item(&mut self, def: &TypeDefinition, item: &Item) {
        let location = format!("{}.{}", def.name, item.name);
        if !is_writable_name(&item.name) {
            self.loss(
                &location,
                "item name",
                "names with separators or surrounding whitespace do not read back",
            );
        }
        let description = self.description(&location, &item.description);
        let row = match def.options.id() {
            true => Row {
                cells: vec![item.tag.to_string()],
                comment: format!("{}:: {description}", item.name)
                    .trim_end()
                    .to_string(),
            },
            false => Row {
                cells: vec![item.tag.to_string(), item.name.clone()],
                comment: description,
            },
        };
        self.rows.push(row);
    }

    fn end_type(&mut self, def: &TypeDefinition) {
        if !has_body(def) {
            self.out.push('\n');
            return;
        }
        let last = self.rows.len().saturating_sub(1);
        for (i, row) in self.rows.iter_mut().enumerate() {
            if i != last && row.cells.len() > 1 {
                if let Some(cell) = row.cells.last_mut() {
                    cell.push(',');
                }
            }
        }
        self.flush_rows();
        self.out.push_str("}\n\n");
    }
}
