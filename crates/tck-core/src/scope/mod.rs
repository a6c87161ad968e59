//! Module: scope
//! Responsibility: resolve a path across every index of a query scope and
//! reject configurations the indexes disagree on.
//! Does not own: predicate argument validation (see `predicate`).

#[cfg(test)]
mod tests;

use crate::{
    error::{ErrorClass, SearchError},
    predicate::{FieldTarget, NamedPredicateDefinition},
    schema::{
        IdConverter, IndexSchema, LeafFieldSchema, NamedPredicateSchema, ObjectFieldSchema,
        ObjectStructure, SchemaNode, SearchTrait, TraitSet, ValueConvert, parent_of,
    },
};
use std::{fmt, sync::Arc};

///
/// ScopeModel
///
/// One or more realized index schemas queried together.
///

#[derive(Clone, Debug)]
pub struct ScopeModel {
    indexes: Vec<Arc<IndexSchema>>,
}

impl ScopeModel {
    pub fn new(indexes: Vec<Arc<IndexSchema>>) -> Result<Self, SearchError> {
        if indexes.is_empty() {
            return Err(SearchError::empty_argument("indexes"));
        }

        Ok(Self { indexes })
    }

    #[must_use]
    pub fn indexes(&self) -> &[Arc<IndexSchema>] {
        &self.indexes
    }

    pub fn index_names(&self) -> impl Iterator<Item = &str> {
        self.indexes.iter().map(|index| index.name())
    }

    #[must_use]
    pub fn contains_index(&self, name: &str) -> bool {
        self.index_names().any(|n| n == name)
    }

    /// Resolve a path to the node every index holding it agrees on.
    ///
    /// Indexes lacking the path are ignored; a path no index knows is a
    /// schema error.
    pub fn node(&self, path: &str) -> Result<ScopedNode<'_>, SearchError> {
        let present = self
            .indexes
            .iter()
            .filter_map(|index| index.node(path).map(|node| (index.name(), node)))
            .collect::<Vec<_>>();

        let Some((_, first)) = present.first() else {
            return Err(SearchError::unknown_field(path, self.index_names()));
        };

        for (_, other) in &present[1..] {
            if std::mem::discriminant(*first) != std::mem::discriminant(*other) {
                return Err(SearchError::attribute_differs(
                    path,
                    "Field kind",
                    first.kind_name(),
                    other.kind_name(),
                    self.index_names(),
                ));
            }
        }

        let node = if matches!(first, SchemaNode::Field(_)) {
            ScopedNode::Field(ScopedField {
                scope: self,
                path: path.to_string(),
                entries: present
                    .into_iter()
                    .filter_map(|(name, node)| match node {
                        SchemaNode::Field(field) => Some((name, field)),
                        SchemaNode::Object(_) => None,
                    })
                    .collect(),
            })
        } else {
            ScopedNode::Object(ScopedObject {
                scope: self,
                path: path.to_string(),
                entries: present
                    .into_iter()
                    .filter_map(|(name, node)| match node {
                        SchemaNode::Object(object) => Some((name, object)),
                        SchemaNode::Field(_) => None,
                    })
                    .collect(),
            })
        };

        Ok(node)
    }

    /// Resolve a path that must be a leaf field.
    pub fn field(&self, path: &str) -> Result<ScopedField<'_>, SearchError> {
        match self.node(path)? {
            ScopedNode::Field(field) => Ok(field),
            ScopedNode::Object(_) => Err(SearchError::new(
                ErrorClass::Schema,
                format!("'{path}' is an object field; a value field is required."),
            )
            .with_context(self.context(path))),
        }
    }

    /// Resolve a path that must be an object field.
    pub fn object(&self, path: &str) -> Result<ScopedObject<'_>, SearchError> {
        match self.node(path)? {
            ScopedNode::Object(object) => Ok(object),
            ScopedNode::Field(_) => Err(SearchError::new(
                ErrorClass::Schema,
                format!("'{path}' is a value field; an object field is required."),
            )
            .with_context(self.context(path))),
        }
    }

    /// Resolve a named predicate; indexes lacking its enclosing scope are
    /// ignored.
    pub fn named_predicate(&self, path: &str) -> Result<&NamedPredicateSchema, SearchError> {
        let name = crate::schema::leaf_name(path);
        let search_trait = SearchTrait::Named(name.to_string());
        let candidates = self
            .indexes
            .iter()
            .filter(|index| parent_of(path).is_none_or(|parent| index.object(parent).is_some()))
            .map(|index| index.named_predicate(path))
            .collect::<Vec<_>>();

        let found = candidates.iter().flatten().copied().collect::<Vec<_>>();
        let Some(first) = found.first().copied() else {
            return match parent_of(path) {
                Some(parent) if self.node(parent).is_ok() => Err(SearchError::unsupported_trait(
                    parent,
                    &search_trait.to_string(),
                    self.index_names(),
                )),
                _ => Err(SearchError::unknown_field(path, self.index_names())),
            };
        };
        if found.len() < candidates.len() {
            return Err(SearchError::inconsistent_support(
                path,
                &search_trait.to_string(),
                self.index_names(),
            ));
        }

        for other in &found[1..] {
            if !Arc::ptr_eq(&first.definition, &other.definition) {
                return Err(SearchError::attribute_differs(
                    path,
                    "Predicate definition",
                    DefinitionRef(&first.definition),
                    DefinitionRef(&other.definition),
                    self.index_names(),
                ));
            }
            self.compare_chains(path, &first.nested_chain, &other.nested_chain)?;
        }

        Ok(first)
    }

    /// Identifier converter shared by all indexes, `None` for raw ids.
    pub fn id_converter(
        &self,
        convert: ValueConvert,
    ) -> Result<Option<Arc<dyn IdConverter>>, SearchError> {
        if !convert.enabled() {
            return Ok(None);
        }

        let mut converters = self.indexes.iter().map(|index| index.id_converter());
        let first = converters.next().flatten();
        for other in converters {
            let left = first.map(|c| c.name());
            let right = other.map(|c| c.name());
            if left != right {
                return Err(SearchError::identifier_differs(
                    DisplayOpt(left),
                    DisplayOpt(right),
                    self.index_names(),
                ));
            }
        }

        Ok(first.cloned())
    }

    pub(crate) fn compare_chains(
        &self,
        path: &str,
        left: &[String],
        right: &[String],
    ) -> Result<(), SearchError> {
        if left == right {
            return Ok(());
        }

        Err(SearchError::attribute_differs(
            path,
            "Nested path hierarchy",
            format_args!("{left:?}"),
            format_args!("{right:?}"),
            self.index_names(),
        ))
    }

    fn context(&self, path: &str) -> crate::error::ErrorContext {
        crate::error::ErrorContext::new()
            .with_indexes(self.index_names())
            .with_field(path)
    }
}

///
/// ScopedNode
///

#[derive(Debug)]
pub enum ScopedNode<'a> {
    Field(ScopedField<'a>),
    Object(ScopedObject<'a>),
}

///
/// ScopedField
///
/// A leaf field as seen by every index of the scope that declares it.
///

#[derive(Debug)]
pub struct ScopedField<'a> {
    scope: &'a ScopeModel,
    path: String,
    entries: Vec<(&'a str, &'a LeafFieldSchema)>,
}

impl<'a> ScopedField<'a> {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Names of the indexes declaring the field.
    pub fn index_names(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.entries.iter().map(|(name, _)| *name)
    }

    /// Traits every declaring index advertises.
    #[must_use]
    pub fn traits(&self) -> TraitSet {
        let mut entries = self.entries.iter().map(|(_, field)| &field.traits);
        let first = entries.next().cloned().unwrap_or_default();

        entries.fold(first, |acc, traits| acc.intersection(traits))
    }

    /// Check that `search_trait` may be used on the field across the scope
    /// and produce the target a predicate should carry.
    pub fn target(
        &self,
        search_trait: &SearchTrait,
        convert: ValueConvert,
    ) -> Result<FieldTarget, SearchError> {
        let names = || self.scope.index_names();
        let supporting = self
            .entries
            .iter()
            .filter(|(_, field)| field.supports(search_trait))
            .count();
        let trait_name = search_trait.to_string();

        if supporting == 0 {
            return Err(SearchError::unsupported_trait(&self.path, &trait_name, names()));
        }
        if supporting < self.entries.len() {
            return Err(SearchError::inconsistent_support(&self.path, &trait_name, names()));
        }

        let (_, first) = self.entries[0];
        for (_, other) in &self.entries[1..] {
            if first.codec != other.codec {
                return Err(SearchError::attribute_differs(
                    &self.path,
                    "Codec",
                    &first.codec,
                    &other.codec,
                    names(),
                ));
            }
            if search_trait.uses_analysis() {
                compare_opt(
                    &self.path,
                    "Analyzer",
                    first.options.analyzer.as_deref(),
                    other.options.analyzer.as_deref(),
                    self.scope,
                )?;
                compare_opt(
                    &self.path,
                    "Normalizer",
                    first.options.normalizer.as_deref(),
                    other.options.normalizer.as_deref(),
                    self.scope,
                )?;
            }
            if search_trait.converts_values() && convert.enabled() {
                let left = first.options.dsl_converter.as_ref().map(|c| c.name());
                let right = other.options.dsl_converter.as_ref().map(|c| c.name());
                if left != right {
                    return Err(SearchError::attribute_differs(
                        &self.path,
                        "DSL converter",
                        PassThroughOr(left),
                        PassThroughOr(right),
                        names(),
                    ));
                }
            }
            self.scope
                .compare_chains(&self.path, &first.nested_chain, &other.nested_chain)?;
        }

        let converter = if search_trait.converts_values() && convert.enabled() {
            first.options.dsl_converter.clone()
        } else {
            None
        };

        Ok(FieldTarget {
            path: self.path.clone(),
            field_type: first.field_type,
            codec: first.codec.clone(),
            analyzer: first.options.analyzer.clone(),
            normalizer: first.options.normalizer.clone(),
            converter,
            nested_chain: first.nested_chain.clone(),
            multi_valued: self.entries.iter().any(|(_, f)| f.options.multi_valued),
            boost: None,
        })
    }
}

///
/// ScopedObject
///

#[derive(Debug)]
pub struct ScopedObject<'a> {
    scope: &'a ScopeModel,
    path: String,
    entries: Vec<(&'a str, &'a ObjectFieldSchema)>,
}

impl ScopedObject<'_> {
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn traits(&self) -> TraitSet {
        let mut entries = self.entries.iter().map(|(_, object)| &object.traits);
        let first = entries.next().cloned().unwrap_or_default();

        entries.fold(first, |acc, traits| acc.intersection(traits))
    }

    /// Check `search_trait` on the object field and return its structure and
    /// its NESTED ancestors (excluding itself).
    pub fn target(
        &self,
        search_trait: &SearchTrait,
    ) -> Result<(ObjectStructure, Vec<String>), SearchError> {
        let names = || self.scope.index_names();
        let supporting = self
            .entries
            .iter()
            .filter(|(_, object)| object.traits.contains(search_trait))
            .count();
        let trait_name = search_trait.to_string();

        if supporting == 0 {
            return Err(SearchError::unsupported_trait(&self.path, &trait_name, names()));
        }
        if supporting < self.entries.len() {
            return Err(SearchError::inconsistent_support(&self.path, &trait_name, names()));
        }

        let (_, first) = self.entries[0];
        for (_, other) in &self.entries[1..] {
            if first.structure != other.structure {
                return Err(SearchError::attribute_differs(
                    &self.path,
                    "Structure",
                    first.structure,
                    other.structure,
                    names(),
                ));
            }
            self.scope
                .compare_chains(&self.path, &first.nested_chain, &other.nested_chain)?;
        }

        Ok((first.structure, first.nested_chain.clone()))
    }
}

fn compare_opt(
    path: &str,
    property: &str,
    left: Option<&str>,
    right: Option<&str>,
    scope: &ScopeModel,
) -> Result<(), SearchError> {
    if left == right {
        return Ok(());
    }

    Err(SearchError::attribute_differs(
        path,
        property,
        DisplayOpt(left),
        DisplayOpt(right),
        scope.index_names(),
    ))
}

struct DisplayOpt<'a>(Option<&'a str>);

impl fmt::Display for DisplayOpt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.unwrap_or("none"))
    }
}

/// Definition type and instance address; two instances of one type render
/// differently.
struct DefinitionRef<'a>(&'a Arc<dyn NamedPredicateDefinition>);

impl fmt::Display for DefinitionRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:p}", self.0, Arc::as_ptr(self.0).cast::<()>())
    }
}

struct PassThroughOr<'a>(Option<&'a str>);

impl fmt::Display for PassThroughOr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.unwrap_or("pass-through"))
    }
}
