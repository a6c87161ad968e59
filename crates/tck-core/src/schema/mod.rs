//! Module: schema
//! Responsibility: schema-definition contract and the realized per-index schema.
//! Does not own: cross-index reconciliation (see `scope`).

mod builder;
mod convert;
mod index;
mod options;
mod traits;

#[cfg(test)]
mod tests;

pub use builder::{IndexSchemaBuilder, ScopeBuilder};
pub use convert::{
    IdConverter, PassThroughConverter, PrefixIdConverter, TextParsingConverter, ValueConvert,
    ValueConverter, raw_document_id,
};
pub use index::{
    IndexSchema, LeafFieldSchema, NamedPredicateSchema, ObjectFieldSchema, SchemaNode, leaf_name,
    parent_of,
};
pub use options::{FieldCodec, FieldOptions, ObjectStructure};
pub use traits::{SearchTrait, TraitSet, standard_traits};
