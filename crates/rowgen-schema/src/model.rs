//! Assembled schema model types.
//!
//! A [`SchemaModel`] is the canonical, cross-referenced description of one
//! schema: every table with its classified columns, its outward foreign keys,
//! and the inverted ("dependent") keys other tables point at it with. The
//! model is built once per run by [`crate::ModelAssembler`] and never mutated
//! afterwards; emitters and the runtime only read it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A raw catalog record: field name -> value, exactly as the catalog stores it.
pub type FieldMap = BTreeMap<String, Value>;

/// Semantic value type of a column, derived from its SQL type and comment tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    Int,
    Float,
    String,
    Boolean,
}

/// One classified column.
///
/// Raw fields are carried verbatim from the catalog; derived fields are pure
/// functions of the raw fields plus the whitespace-split comment tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDescriptor {
    // Raw catalog attributes
    pub name: String,
    pub data_type: String,
    pub column_type: String,
    pub nullable: bool,
    pub raw_default: Option<String>,
    pub character_max_length: Option<u64>,
    pub numeric_precision: Option<u64>,
    pub comment: String,
    pub extra: String,
    pub ordinal: u32,

    // Derived attributes
    pub comment_tags: Vec<String>,
    pub enum_values: Vec<String>,
    pub value_type: ValueType,
    pub auto_increment: bool,
    pub default_value: Value,
    pub max_length: Option<u64>,
    pub date_format: Option<String>,
    pub label: String,
    /// 1-based position within the primary key, if the column is part of it.
    pub primary_position: Option<u32>,
}

impl ColumnDescriptor {
    /// Check whether the column carries the given comment tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.comment_tags.iter().any(|t| t == tag)
    }

    pub fn is_primary(&self) -> bool {
        self.primary_position.is_some()
    }
}

/// One outward foreign key column usage: `table.column -> referenced_table.referenced_column`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDescriptor {
    /// Table the key is defined on.
    pub table: String,
    pub column: String,
    pub referenced_table: String,
    pub referenced_column: String,
    pub ordinal: u32,
}

/// An inward key: a foreign key on another table referencing this one,
/// together with its sibling keys from the same originating table so that
/// consumers of composite keys can join on all columns together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependentKeyDescriptor {
    pub key: KeyDescriptor,
    /// Other keys defined on the same originating table, excluding `key` itself.
    pub siblings: Vec<KeyDescriptor>,
}

/// One indexed column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexDescriptor {
    pub column: String,
    /// Catalog key kind marker (`PRI`, `UNI`, `MUL`).
    pub kind: String,
    pub ordinal: u32,
}

/// One trigger, namespaced like a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDescriptor {
    pub name: String,
    pub namespace: String,
    pub class_name: String,
    /// Raw catalog record the trigger was read from.
    pub raw: FieldMap,
}

/// The assembled model of one table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub name: String,
    /// Short collision-free uppercase code for the owning schema.
    pub namespace: String,
    /// UpperCamelCase fragment derived from the table name.
    pub class_name: String,
    pub columns: Vec<ColumnDescriptor>,
    /// This table's foreign keys, ordered by column name then ordinal.
    pub keys: Vec<KeyDescriptor>,
    /// Keys on other tables referencing this one. Always present, possibly empty.
    pub dependent_keys: Vec<DependentKeyDescriptor>,
    pub indexes: Vec<IndexDescriptor>,
    /// Primary key column names in key order.
    pub primary_columns: Vec<String>,
    /// True if any column auto-increments.
    pub auto_increment: bool,
    /// Raw catalog record the table was read from (engine, row counts, ...).
    pub raw: FieldMap,
}

impl TableDescriptor {
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }
}

/// The full model of a schema: table name -> [`TableDescriptor`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaModel {
    pub schema: String,
    /// True when columns/keys/indexes were resolved; false for the bare
    /// table list used for existence checks.
    pub extras: bool,
    pub built_at: DateTime<Utc>,
    pub tables: BTreeMap<String, TableDescriptor>,
    pub triggers: Vec<TriggerDescriptor>,
}

impl SchemaModel {
    pub fn table(&self, name: &str) -> Option<&TableDescriptor> {
        self.tables.get(name)
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }
}
