//! # rowgen-schema
//!
//! Builds a canonical, cross-referenced model of a relational schema from a
//! live catalog (tables, columns, keys, indexes, triggers) for downstream
//! code emission and for the rowgen runtime.
//!
//! The pipeline, leaves first:
//!
//! - [`NamespaceAllocator`] — short collision-free uppercase codes per schema
//! - [`classify_column`] — raw catalog column record -> [`ColumnDescriptor`]
//! - [`CatalogReader`] — the introspection queries over a [`CatalogClient`]
//! - [`invert_keys`] — the bidirectional foreign-key graph
//! - [`ModelAssembler`] — composes the above into a memoized [`SchemaModel`]
//!
//! The whole pipeline is one synchronous pass; catalog failures propagate
//! unchanged and abort the build.

pub mod assemble;
pub mod catalog;
pub mod classify;
pub mod dump;
pub mod emit;
pub mod error;
pub mod model;
pub mod namespace;
pub mod relations;

pub use assemble::ModelAssembler;
pub use catalog::{CatalogClient, CatalogReader, CatalogSource};
pub use classify::{TAG_BOOLEAN, TAG_CURRENT_TIMESTAMP, classify_column};
pub use dump::CatalogDump;
pub use emit::{Emitter, JsonEmitter};
pub use error::{SchemaError, SchemaResult};
pub use model::{
    ColumnDescriptor, DependentKeyDescriptor, FieldMap, IndexDescriptor, KeyDescriptor,
    SchemaModel, TableDescriptor, TriggerDescriptor, ValueType,
};
pub use namespace::NamespaceAllocator;
pub use relations::invert_keys;
