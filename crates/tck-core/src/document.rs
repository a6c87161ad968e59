use crate::{binding::LeafFieldBinding, value::Value};
use std::collections::BTreeMap;

///
/// DocumentObject
///
/// One object instance: leaf values by relative field name and child
/// instances by relative object name. Every name maps to a list so
/// multi-valued fields and multi-instance objects share one shape.
///

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DocumentObject {
    values: BTreeMap<String, Vec<Value>>,
    objects: BTreeMap<String, Vec<Self>>,
}

impl DocumentObject {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to the leaf field `name`.
    pub fn add_value(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.values
            .entry(name.to_string())
            .or_default()
            .push(value.into());
        self
    }

    /// Append a value through a generated leaf binding.
    pub fn set(&mut self, field: &LeafFieldBinding, value: impl Into<Value>) -> &mut Self {
        self.add_value(&field.relative_name, value)
    }

    /// Append a new, empty instance of the object field `name`.
    pub fn add_object(&mut self, name: &str) -> &mut Self {
        let instances = self.objects.entry(name.to_string()).or_default();
        let slot = instances.len();
        instances.push(Self::default());

        &mut instances[slot]
    }

    #[must_use]
    pub fn values(&self, name: &str) -> &[Value] {
        self.values.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    #[must_use]
    pub fn objects(&self, name: &str) -> &[Self] {
        self.objects.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn value_entries(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    pub fn object_entries(&self) -> impl Iterator<Item = (&str, &[Self])> {
        self.objects.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// No leaf value anywhere in this instance or below it.
    #[must_use]
    pub fn has_no_values(&self) -> bool {
        self.values.values().all(Vec::is_empty)
            && self
                .objects
                .values()
                .flatten()
                .all(Self::has_no_values)
    }
}

///
/// Document
///

#[derive(Clone, Debug, PartialEq)]
pub struct Document {
    pub id: String,
    pub routing_key: Option<String>,
    pub root: DocumentObject,
}

impl Document {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            routing_key: None,
            root: DocumentObject::new(),
        }
    }

    #[must_use]
    pub fn routing(mut self, key: impl Into<String>) -> Self {
        self.routing_key = Some(key.into());
        self
    }

    pub const fn root_mut(&mut self) -> &mut DocumentObject {
        &mut self.root
    }
}

///
/// TESTS
///
