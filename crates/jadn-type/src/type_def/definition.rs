use super::{BaseKind, Field, Item, Options, TypeOption};

/// Member list of a definition.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Members {
    #[default]
    None,
    /// Values of an Enumerated type.
    Items(Vec<Item>),
    /// Fields of a Record, Map, Choice or Array.
    Fields(Vec<Field>),
}

/// A named type: a base kind, its options and its members.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDefinition {
    pub name: String,
    pub kind: BaseKind,
    pub options: Options,
    pub description: String,
    pub members: Members,
}

impl TypeDefinition {
    pub fn new(name: impl Into<String>, kind: BaseKind) -> Self {
        Self {
            name: name.into(),
            kind,
            options: Options::new(),
            description: String::new(),
            members: Members::None,
        }
    }

    pub fn with_option(mut self, opt: TypeOption) -> Self {
        self.options.push(opt);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        match &mut self.members {
            Members::Fields(fields) => fields.push(field),
            _ => self.members = Members::Fields(vec![field]),
        }
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        match &mut self.members {
            Members::Items(items) => items.push(item),
            _ => self.members = Members::Items(vec![item]),
        }
        self
    }

    pub fn fields(&self) -> &[Field] {
        match &self.members {
            Members::Fields(fields) => fields,
            _ => &[],
        }
    }

    pub fn items(&self) -> &[Item] {
        match &self.members {
            Members::Items(items) => items,
            _ => &[],
        }
    }

    pub fn field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields().iter().find(|f| f.name == name)
    }

    pub fn field_by_tag(&self, tag: u64) -> Option<&Field> {
        self.fields().iter().find(|f| f.tag == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_members() {
        let def = TypeDefinition::new("Point", BaseKind::Record)
            .with_field(Field::new(1, "x", BaseKind::Integer))
            .with_field(Field::new(2, "y", BaseKind::Integer));
        assert_eq!(def.fields().len(), 2);
        assert_eq!(def.field_by_tag(2).map(|f| f.name.as_str()), Some("y"));
        assert!(def.field_by_name("z").is_none());
        assert!(def.items().is_empty());
    }
}
