use crate::{
    error::{ErrorClass, ErrorContext, SearchError},
    predicate::NamedPredicateDefinition,
    schema::{
        FieldCodec, FieldOptions, IdConverter, IndexSchemaBuilder, ObjectStructure, ScopeBuilder,
        SearchTrait, TraitSet,
    },
    types::FieldTypeDescriptor,
};
use std::{collections::BTreeMap, sync::Arc};

///
/// LeafFieldSchema
///
/// Realized leaf field: resolved options, codec, advertised traits and the
/// NESTED object paths enclosing it (outermost first).
///

#[derive(Clone, Debug)]
pub struct LeafFieldSchema {
    pub path: String,
    pub field_type: &'static FieldTypeDescriptor,
    pub options: FieldOptions,
    pub codec: FieldCodec,
    pub traits: TraitSet,
    pub nested_chain: Vec<String>,
}

impl LeafFieldSchema {
    #[must_use]
    pub fn supports(&self, search_trait: &SearchTrait) -> bool {
        self.traits.contains(search_trait)
    }

    /// Path of the object field directly enclosing this leaf.
    #[must_use]
    pub fn parent_path(&self) -> Option<&str> {
        parent_of(&self.path)
    }
}

///
/// ObjectFieldSchema
///

#[derive(Clone, Debug)]
pub struct ObjectFieldSchema {
    pub path: String,
    pub structure: ObjectStructure,
    pub multi_valued: bool,
    pub traits: TraitSet,
    /// NESTED ancestors, excluding the object itself.
    pub nested_chain: Vec<String>,
}

impl ObjectFieldSchema {
    #[must_use]
    pub const fn is_nested(&self) -> bool {
        matches!(self.structure, ObjectStructure::Nested)
    }

    /// NESTED chain including the object itself when it is nested.
    #[must_use]
    pub fn nested_chain_inclusive(&self) -> Vec<String> {
        let mut chain = self.nested_chain.clone();
        if self.is_nested() {
            chain.push(self.path.clone());
        }
        chain
    }
}

///
/// SchemaNode
///

#[derive(Clone, Debug)]
pub enum SchemaNode {
    Field(LeafFieldSchema),
    Object(ObjectFieldSchema),
}

impl SchemaNode {
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Field(_) => "value field",
            Self::Object(_) => "object field",
        }
    }

    #[must_use]
    pub const fn traits(&self) -> &TraitSet {
        match self {
            Self::Field(field) => &field.traits,
            Self::Object(object) => &object.traits,
        }
    }
}

///
/// NamedPredicateSchema
///

#[derive(Clone, Debug)]
pub struct NamedPredicateSchema {
    pub path: String,
    pub name: String,
    /// Object field the predicate is attached to, `None` at the root.
    pub object_path: Option<String>,
    pub nested_chain: Vec<String>,
    pub definition: Arc<dyn NamedPredicateDefinition>,
}

///
/// IndexSchema
///
/// Realized schema of one named index. Every field, object field and named
/// predicate is addressable by absolute dotted path.
///

#[derive(Clone, Debug)]
pub struct IndexSchema {
    name: String,
    nodes: BTreeMap<String, SchemaNode>,
    named_predicates: BTreeMap<String, NamedPredicateSchema>,
    id_converter: Option<Arc<dyn IdConverter>>,
}

impl IndexSchema {
    /// Realize a builder, resolving options and deriving codecs and traits.
    pub fn realize<F>(builder: IndexSchemaBuilder, traits_for: F) -> Result<Self, SearchError>
    where
        F: Fn(&FieldTypeDescriptor, &FieldOptions) -> TraitSet,
    {
        let (name, root, id_converter) = builder.into_parts();
        let mut schema = Self {
            name,
            nodes: BTreeMap::new(),
            named_predicates: BTreeMap::new(),
            id_converter,
        };
        schema.realize_scope(&root, None, &[], &traits_for)?;

        Ok(schema)
    }

    fn realize_scope<F>(
        &mut self,
        scope: &ScopeBuilder,
        parent: Option<&str>,
        nested_chain: &[String],
        traits_for: &F,
    ) -> Result<(), SearchError>
    where
        F: Fn(&FieldTypeDescriptor, &FieldOptions) -> TraitSet,
    {
        for leaf in &scope.fields {
            let path = self.child_path(parent, &leaf.name)?;
            let options = leaf
                .options
                .clone()
                .resolve(leaf.field_type, &path)
                .map_err(|err| err.with_context(self.context(&path)))?;
            let node = LeafFieldSchema {
                codec: FieldCodec::for_field(leaf.field_type, &options),
                traits: traits_for(leaf.field_type, &options),
                path: path.clone(),
                field_type: leaf.field_type,
                options,
                nested_chain: nested_chain.to_vec(),
            };
            self.insert(path, SchemaNode::Field(node))?;
        }

        for object in &scope.objects {
            let path = self.child_path(parent, &object.name)?;
            let mut traits = TraitSet::new();
            traits.insert(SearchTrait::Exists);
            if matches!(object.structure, ObjectStructure::Nested) {
                traits.insert(SearchTrait::Nested);
            }
            let node = ObjectFieldSchema {
                path: path.clone(),
                structure: object.structure,
                multi_valued: object.multi_valued,
                traits,
                nested_chain: nested_chain.to_vec(),
            };
            let child_chain = node.nested_chain_inclusive();
            self.insert(path.clone(), SchemaNode::Object(node))?;
            self.realize_scope(&object.scope, Some(&path), &child_chain, traits_for)?;
        }

        for (name, definition) in &scope.named_predicates {
            let path = self.child_path(parent, name)?;
            if self.named_predicates.contains_key(&path) {
                return Err(self.duplicate(&path));
            }
            if let Some(SchemaNode::Object(object)) = parent.and_then(|p| self.nodes.get_mut(p)) {
                object.traits.insert(SearchTrait::Named(name.clone()));
            }
            self.named_predicates.insert(
                path.clone(),
                NamedPredicateSchema {
                    path,
                    name: name.clone(),
                    object_path: parent.map(str::to_string),
                    nested_chain: nested_chain.to_vec(),
                    definition: Arc::clone(definition),
                },
            );
        }

        Ok(())
    }

    fn child_path(&self, parent: Option<&str>, name: &str) -> Result<String, SearchError> {
        if name.is_empty() || name.contains('.') {
            return Err(SearchError::new(
                ErrorClass::Schema,
                format!("Invalid field name '{name}': must be non-empty and must not contain '.'."),
            )
            .with_context(ErrorContext::new().with_indexes([self.name.as_str()])));
        }

        Ok(match parent {
            Some(parent) => format!("{parent}.{name}"),
            None => name.to_string(),
        })
    }

    fn insert(&mut self, path: String, node: SchemaNode) -> Result<(), SearchError> {
        if self.nodes.contains_key(&path) {
            return Err(self.duplicate(&path));
        }
        self.nodes.insert(path, node);

        Ok(())
    }

    fn duplicate(&self, path: &str) -> SearchError {
        SearchError::new(ErrorClass::Schema, format!("Duplicate field '{path}'."))
            .with_context(self.context(path))
    }

    fn context(&self, path: &str) -> ErrorContext {
        ErrorContext::new()
            .with_indexes([self.name.as_str()])
            .with_field(path)
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn node(&self, path: &str) -> Option<&SchemaNode> {
        self.nodes.get(path)
    }

    #[must_use]
    pub fn field(&self, path: &str) -> Option<&LeafFieldSchema> {
        match self.nodes.get(path) {
            Some(SchemaNode::Field(field)) => Some(field),
            _ => None,
        }
    }

    #[must_use]
    pub fn object(&self, path: &str) -> Option<&ObjectFieldSchema> {
        match self.nodes.get(path) {
            Some(SchemaNode::Object(object)) => Some(object),
            _ => None,
        }
    }

    /// Every leaf field, ordered by path.
    pub fn fields(&self) -> impl Iterator<Item = &LeafFieldSchema> {
        self.nodes.values().filter_map(|node| match node {
            SchemaNode::Field(field) => Some(field),
            SchemaNode::Object(_) => None,
        })
    }

    #[must_use]
    pub fn named_predicate(&self, path: &str) -> Option<&NamedPredicateSchema> {
        self.named_predicates.get(path)
    }

    #[must_use]
    pub fn id_converter(&self) -> Option<&Arc<dyn IdConverter>> {
        self.id_converter.as_ref()
    }
}

/// Parent object path of a dotted path, `None` for root-level names.
#[must_use]
pub fn parent_of(path: &str) -> Option<&str> {
    path.rfind('.').map(|idx| &path[..idx])
}

/// Last segment of a dotted path.
#[must_use]
pub fn leaf_name(path: &str) -> &str {
    path.rfind('.').map_or(path, |idx| &path[idx + 1..])
}
