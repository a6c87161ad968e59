//! Module: binding
//! Responsibility: generate bounded-depth object-field trees and keep the
//! schema being declared in lock step with them.
//! Does not own: document population (see `dataset`).

#[cfg(test)]
mod tests;

use crate::{
    MAX_DEPTH,
    schema::{FieldOptions, ObjectStructure, ScopeBuilder},
    types::FieldTypeDescriptor,
};
use std::{collections::BTreeMap, fmt};

///
/// LeafFieldBinding
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LeafFieldBinding {
    pub field_type: &'static FieldTypeDescriptor,
    pub relative_name: String,
    pub absolute_path: String,
}

///
/// ObjectFieldBinding
///
/// One generated object scope. The root has no structure and an empty
/// absolute path; every other node is NESTED or FLATTENED.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ObjectFieldBinding {
    pub relative_name: String,
    pub absolute_path: String,
    pub structure: Option<ObjectStructure>,
    pub depth: usize,
    pub fields: Vec<LeafFieldBinding>,
    pub nested: Option<String>,
    pub flattened: Option<String>,
}

impl ObjectFieldBinding {
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.structure.is_none()
    }

    #[must_use]
    pub fn field(&self, field_type: &FieldTypeDescriptor) -> Option<&LeafFieldBinding> {
        self.fields.iter().find(|f| f.field_type == field_type)
    }

    /// Absolute paths of the child objects, nested first.
    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.nested.iter().chain(&self.flattened).map(String::as_str)
    }
}

///
/// BindingTree
///
/// Arena of generated bindings keyed by absolute path. The root is stored
/// under the empty path. Read-only once generated.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct BindingTree {
    nodes: BTreeMap<String, ObjectFieldBinding>,
}

impl BindingTree {
    #[must_use]
    pub fn root(&self) -> Option<&ObjectFieldBinding> {
        self.nodes.get("")
    }

    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ObjectFieldBinding> {
        self.nodes.get(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every object path below the root, parents before children.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut out = Vec::with_capacity(self.nodes.len());
        if let Some(root) = self.root() {
            self.collect_paths(root, &mut out);
        }
        out
    }

    fn collect_paths<'a>(&'a self, node: &'a ObjectFieldBinding, out: &mut Vec<&'a str>) {
        for child in node.children() {
            if let Some(child) = self.nodes.get(child) {
                out.push(&child.absolute_path);
                self.collect_paths(child, out);
            }
        }
    }

    /// Absolute path of the `field_type` leaf of the object at `path`.
    #[must_use]
    pub fn leaf_path(&self, path: &str, field_type: &FieldTypeDescriptor) -> Option<&str> {
        self.get(path)
            .and_then(|node| node.field(field_type))
            .map(|leaf| leaf.absolute_path.as_str())
    }

    /// NESTED objects enclosing `path`, the object itself included,
    /// outermost first.
    #[must_use]
    pub fn nested_ancestors(&self, path: &str) -> Vec<&str> {
        let mut out = Vec::new();
        let mut current = self.get(path);
        while let Some(node) = current {
            if node.structure == Some(ObjectStructure::Nested) {
                out.push(node.absolute_path.as_str());
            }
            current = crate::schema::parent_of(&node.absolute_path)
                .and_then(|parent| self.get(parent));
        }
        out.reverse();
        out
    }
}

type Declared = (&'static FieldTypeDescriptor, FieldOptions);
type DeclareFn = dyn Fn(&'static FieldTypeDescriptor) -> Declared + Send + Sync;

///
/// ObjectFieldBindingGenerator
///
/// Builds identical binding trees for every index of a fixture. `declare`
/// maps each generated leaf to the type and options actually declared in
/// the schema, so counterpart indexes keep the paths while diverging on
/// configuration.
///

pub struct ObjectFieldBindingGenerator {
    field_types: Vec<&'static FieldTypeDescriptor>,
    declare: Box<DeclareFn>,
}

impl ObjectFieldBindingGenerator {
    #[must_use]
    pub fn new(field_types: impl IntoIterator<Item = &'static FieldTypeDescriptor>) -> Self {
        Self {
            field_types: field_types.into_iter().collect(),
            declare: Box::new(|ty| (ty, FieldOptions::new())),
        }
    }

    /// Override what gets declared for each generated leaf.
    #[must_use]
    pub fn declare<F>(mut self, declare: F) -> Self
    where
        F: Fn(&'static FieldTypeDescriptor) -> (&'static FieldTypeDescriptor, FieldOptions)
            + Send
            + Sync
            + 'static,
    {
        self.declare = Box::new(declare);
        self
    }

    #[must_use]
    pub fn field_types(&self) -> &[&'static FieldTypeDescriptor] {
        &self.field_types
    }

    /// Depth-0 root binding and its full subtree, declared into `scope`.
    pub fn create_root(&self, scope: &mut ScopeBuilder) -> BindingTree {
        let mut tree = BindingTree::default();
        self.populate(&mut tree, scope, None, "", None, 0);

        tree
    }

    /// Object field `name` under `parent_path` at `depth`, declared into the
    /// parent's `scope`.
    pub fn create(
        &self,
        tree: &mut BindingTree,
        scope: &mut ScopeBuilder,
        parent_path: Option<&str>,
        name: &str,
        structure: ObjectStructure,
        depth: usize,
    ) -> String {
        let child = scope.object_field(name, structure, true);

        self.populate(tree, child, parent_path, name, Some(structure), depth)
    }

    fn populate(
        &self,
        tree: &mut BindingTree,
        scope: &mut ScopeBuilder,
        parent_path: Option<&str>,
        name: &str,
        structure: Option<ObjectStructure>,
        depth: usize,
    ) -> String {
        debug_assert!(depth <= MAX_DEPTH, "binding depth {depth} exceeds {MAX_DEPTH}");

        let absolute_path = join(parent_path, name);
        let fields = self
            .field_types
            .iter()
            .map(|&ty| {
                let (declared, options) = (self.declare)(ty);
                let relative_name = ty.field_name();
                scope.field(relative_name.clone(), declared, options);

                LeafFieldBinding {
                    field_type: ty,
                    absolute_path: join(non_root(&absolute_path), &relative_name),
                    relative_name,
                }
            })
            .collect();

        let (nested, flattened) = if depth < MAX_DEPTH {
            let parent = non_root(&absolute_path);
            let [nested, flattened] = [ObjectStructure::Nested, ObjectStructure::Flattened]
                .map(|s| self.create(tree, scope, parent, s.child_name(), s, depth + 1));
            (Some(nested), Some(flattened))
        } else {
            (None, None)
        };

        tree.nodes
            .entry(absolute_path.clone())
            .or_insert_with(|| ObjectFieldBinding {
                relative_name: name.to_string(),
                absolute_path: absolute_path.clone(),
                structure,
                depth,
                fields,
                nested,
                flattened,
            });

        absolute_path
    }
}

impl fmt::Debug for ObjectFieldBindingGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectFieldBindingGenerator")
            .field("field_types", &self.field_types)
            .finish_non_exhaustive()
    }
}

fn join(parent: Option<&str>, name: &str) -> String {
    match parent {
        Some(parent) => format!("{parent}.{name}"),
        None => name.to_string(),
    }
}

fn non_root(path: &str) -> Option<&str> {
    (!path.is_empty()).then_some(path)
}
