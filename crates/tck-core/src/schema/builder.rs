use crate::{
    predicate::NamedPredicateDefinition,
    schema::{FieldOptions, IdConverter, ObjectStructure},
    types::FieldTypeDescriptor,
};
use derive_more::{Deref, DerefMut};
use std::sync::Arc;

///
/// LeafDeclaration
///

#[derive(Clone, Debug)]
pub(crate) struct LeafDeclaration {
    pub(crate) name: String,
    pub(crate) field_type: &'static FieldTypeDescriptor,
    pub(crate) options: FieldOptions,
}

///
/// ObjectDeclaration
///

#[derive(Clone, Debug)]
pub(crate) struct ObjectDeclaration {
    pub(crate) name: String,
    pub(crate) structure: ObjectStructure,
    pub(crate) multi_valued: bool,
    pub(crate) scope: ScopeBuilder,
}

///
/// ScopeBuilder
///
/// Declares the leaf fields, object fields and named predicates of one
/// schema scope (the index root or an object field).
///

#[derive(Clone, Debug, Default)]
pub struct ScopeBuilder {
    pub(crate) fields: Vec<LeafDeclaration>,
    pub(crate) objects: Vec<ObjectDeclaration>,
    pub(crate) named_predicates: Vec<(String, Arc<dyn NamedPredicateDefinition>)>,
}

impl ScopeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a leaf field in this scope.
    pub fn field(
        &mut self,
        name: impl Into<String>,
        field_type: &'static FieldTypeDescriptor,
        options: FieldOptions,
    ) -> &mut Self {
        self.fields.push(LeafDeclaration {
            name: name.into(),
            field_type,
            options,
        });
        self
    }

    /// Declare an object field and return the builder of its scope.
    pub fn object_field(
        &mut self,
        name: impl Into<String>,
        structure: ObjectStructure,
        multi_valued: bool,
    ) -> &mut Self {
        let slot = self.objects.len();
        self.objects.push(ObjectDeclaration {
            name: name.into(),
            structure,
            multi_valued,
            scope: Self::new(),
        });

        &mut self.objects[slot].scope
    }

    /// Attach a named predicate to this scope.
    pub fn named_predicate(
        &mut self,
        name: impl Into<String>,
        definition: Arc<dyn NamedPredicateDefinition>,
    ) -> &mut Self {
        self.named_predicates.push((name.into(), definition));
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.objects.is_empty() && self.named_predicates.is_empty()
    }
}

///
/// IndexSchemaBuilder
///
/// Schema definition of one named index. Derefs to its root scope so
/// root fields are declared directly on the builder.
///

#[derive(Clone, Debug, Deref, DerefMut)]
pub struct IndexSchemaBuilder {
    name: String,
    #[deref]
    #[deref_mut]
    root: ScopeBuilder,
    id_converter: Option<Arc<dyn IdConverter>>,
}

impl IndexSchemaBuilder {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: ScopeBuilder::new(),
            id_converter: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id_converter(&mut self, converter: Arc<dyn IdConverter>) -> &mut Self {
        self.id_converter = Some(converter);
        self
    }

    pub(crate) fn into_parts(self) -> (String, ScopeBuilder, Option<Arc<dyn IdConverter>>) {
        (self.name, self.root, self.id_converter)
    }
}
