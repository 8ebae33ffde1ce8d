//! Model assembly.
//!
//! [`ModelAssembler`] composes the catalog record streams, the column
//! classifier, the namespace allocator and the key-graph inversion into one
//! memoized [`SchemaModel`] per `(schema, extras)` pair. The assembler owns
//! its allocator and cache; one assembler per build run, no shared state.

use crate::catalog::CatalogSource;
use crate::classify::{classify_column, get_str, get_u64, require_str};
use crate::error::SchemaResult;
use crate::model::{
    FieldMap, IndexDescriptor, KeyDescriptor, SchemaModel, TableDescriptor, TriggerDescriptor,
};
use crate::namespace::NamespaceAllocator;
use crate::relations::invert_keys;
use chrono::Utc;
use heck::ToUpperCamelCase;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Builds and memoizes schema models from a [`CatalogSource`].
pub struct ModelAssembler<S> {
    source: S,
    namespaces: NamespaceAllocator,
    cache: BTreeMap<(String, bool), Arc<SchemaModel>>,
}

impl<S: CatalogSource> ModelAssembler<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            namespaces: NamespaceAllocator::new(),
            cache: BTreeMap::new(),
        }
    }

    /// Pin a namespace code before building, overriding allocation.
    pub fn set_namespace(&mut self, schema: impl Into<String>, code: impl Into<String>) {
        self.namespaces.set(schema, code);
    }

    /// Build the model for `schema`.
    ///
    /// With `extras` false only the bare table list is resolved (name + raw
    /// attributes), which is enough for existence checks. A repeated call
    /// with the same arguments returns the cached model.
    pub fn build(&mut self, schema: &str, extras: bool) -> SchemaResult<Arc<SchemaModel>> {
        let key = (schema.to_string(), extras);
        if let Some(model) = self.cache.get(&key) {
            tracing::debug!(schema, extras, "schema model cache hit");
            return Ok(Arc::clone(model));
        }

        tracing::debug!(schema, extras, "building schema model");
        let model = Arc::new(self.assemble(schema, extras)?);
        self.cache.insert(key, Arc::clone(&model));
        Ok(model)
    }

    fn assemble(&mut self, schema: &str, extras: bool) -> SchemaResult<SchemaModel> {
        let mut tables: BTreeMap<String, TableDescriptor> = BTreeMap::new();
        for raw in self.source.tables(schema)? {
            let name = require_str(&raw, "TABLE_NAME")?;
            tables.insert(name.clone(), bare_table(name, raw));
        }

        let mut triggers = Vec::new();

        if extras {
            let namespace = self.namespaces.allocate(schema)?;
            let mut keys_by_table: BTreeMap<String, Vec<KeyDescriptor>> = BTreeMap::new();

            for table in tables.values_mut() {
                table.namespace = namespace.clone();
                table.class_name = table.name.to_upper_camel_case();

                for raw in self.source.columns(schema, &table.name)? {
                    table.columns.push(classify_column(&raw)?);
                }

                table.keys = self
                    .source
                    .foreign_keys(schema, &table.name)?
                    .iter()
                    .map(|raw| parse_key(raw, &table.name))
                    .collect::<SchemaResult<Vec<_>>>()?;

                table.indexes = self
                    .source
                    .indexes(schema, &table.name)?
                    .iter()
                    .map(parse_index)
                    .collect::<SchemaResult<Vec<_>>>()?;

                for (pos, raw) in self
                    .source
                    .primary_key_columns(schema, &table.name)?
                    .iter()
                    .enumerate()
                {
                    let column = require_str(raw, "COLUMN_NAME")?;
                    if let Some(col) = table.columns.iter_mut().find(|c| c.name == column) {
                        col.primary_position = Some(pos as u32 + 1);
                    }
                    table.primary_columns.push(column);
                }

                table.auto_increment = table.columns.iter().any(|c| c.auto_increment);
                keys_by_table.insert(table.name.clone(), table.keys.clone());
            }

            let mut dependents = invert_keys(&keys_by_table);
            for table in tables.values_mut() {
                if let Some(deps) = dependents.remove(&table.name) {
                    table.dependent_keys = deps;
                }
            }

            for raw in self.source.triggers(schema)? {
                let name = require_str(&raw, "TRIGGER_NAME")?;
                triggers.push(TriggerDescriptor {
                    class_name: name.to_upper_camel_case(),
                    name,
                    namespace: namespace.clone(),
                    raw,
                });
            }
        }

        Ok(SchemaModel {
            schema: schema.to_string(),
            extras,
            built_at: Utc::now(),
            tables,
            triggers,
        })
    }
}

fn bare_table(name: String, raw: FieldMap) -> TableDescriptor {
    TableDescriptor {
        name,
        namespace: String::new(),
        class_name: String::new(),
        columns: Vec::new(),
        keys: Vec::new(),
        dependent_keys: Vec::new(),
        indexes: Vec::new(),
        primary_columns: Vec::new(),
        auto_increment: false,
        raw,
    }
}

fn parse_key(raw: &FieldMap, table: &str) -> SchemaResult<KeyDescriptor> {
    Ok(KeyDescriptor {
        table: table.to_string(),
        column: require_str(raw, "COLUMN_NAME")?,
        referenced_table: require_str(raw, "REFERENCED_TABLE_NAME")?,
        referenced_column: require_str(raw, "REFERENCED_COLUMN_NAME")?,
        ordinal: get_u64(raw, "ORDINAL_POSITION").unwrap_or(0) as u32,
    })
}

fn parse_index(raw: &FieldMap) -> SchemaResult<IndexDescriptor> {
    Ok(IndexDescriptor {
        column: require_str(raw, "COLUMN_NAME")?,
        kind: get_str(raw, "COLUMN_KEY"),
        ordinal: get_u64(raw, "ORDINAL_POSITION").unwrap_or(0) as u32,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogSource;
    use crate::model::FieldMap;
    use serde_json::{Value, json};

    fn record(fields: &[(&str, Value)]) -> FieldMap {
        fields
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Two tables: `user` (auto-increment pk) and `order` (fk to user).
    struct StubSource;

    impl CatalogSource for StubSource {
        fn tables(&self, _schema: &str) -> SchemaResult<Vec<FieldMap>> {
            Ok(vec![
                record(&[("TABLE_NAME", json!("order")), ("ENGINE", json!("InnoDB"))]),
                record(&[("TABLE_NAME", json!("user")), ("ENGINE", json!("InnoDB"))]),
            ])
        }

        fn columns(&self, _schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>> {
            let mut cols = vec![record(&[
                ("COLUMN_NAME", json!("id")),
                ("DATA_TYPE", json!("int")),
                ("COLUMN_TYPE", json!("int(10) unsigned")),
                ("IS_NULLABLE", json!("NO")),
                ("EXTRA", json!("auto_increment")),
                ("ORDINAL_POSITION", json!(1)),
            ])];
            if table == "order" {
                cols.push(record(&[
                    ("COLUMN_NAME", json!("user_id")),
                    ("DATA_TYPE", json!("int")),
                    ("COLUMN_TYPE", json!("int(10) unsigned")),
                    ("IS_NULLABLE", json!("NO")),
                    ("ORDINAL_POSITION", json!(2)),
                ]));
            }
            Ok(cols)
        }

        fn foreign_keys(&self, _schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>> {
            if table == "order" {
                Ok(vec![record(&[
                    ("COLUMN_NAME", json!("user_id")),
                    ("REFERENCED_TABLE_NAME", json!("user")),
                    ("REFERENCED_COLUMN_NAME", json!("id")),
                    ("ORDINAL_POSITION", json!(1)),
                ])])
            } else {
                Ok(Vec::new())
            }
        }

        fn indexes(&self, _schema: &str, _table: &str) -> SchemaResult<Vec<FieldMap>> {
            Ok(vec![record(&[
                ("COLUMN_NAME", json!("id")),
                ("COLUMN_KEY", json!("PRI")),
                ("ORDINAL_POSITION", json!(1)),
            ])])
        }

        fn primary_key_columns(&self, _schema: &str, _table: &str) -> SchemaResult<Vec<FieldMap>> {
            Ok(vec![record(&[
                ("COLUMN_NAME", json!("id")),
                ("SEQ_IN_INDEX", json!(1)),
            ])])
        }

        fn triggers(&self, _schema: &str) -> SchemaResult<Vec<FieldMap>> {
            Ok(vec![record(&[(
                "TRIGGER_NAME",
                json!("order_audit_insert"),
            )])])
        }
    }

    #[test]
    fn full_build_resolves_columns_keys_and_dependents() {
        let mut assembler = ModelAssembler::new(StubSource);
        let model = assembler.build("app", true).unwrap();

        let user = model.table("user").unwrap();
        // "app" is one word, so width 1 yields "A".
        assert_eq!(user.namespace, "A");
        assert_eq!(user.class_name, "User");
        assert!(user.auto_increment);
        assert_eq!(user.primary_columns, vec!["id"]);
        assert_eq!(user.column("id").unwrap().primary_position, Some(1));

        // Exactly one dependent key: order.user_id -> user.id, no siblings.
        assert_eq!(user.dependent_keys.len(), 1);
        let dep = &user.dependent_keys[0];
        assert_eq!(dep.key.table, "order");
        assert_eq!(dep.key.column, "user_id");
        assert!(dep.siblings.is_empty());

        let order = model.table("order").unwrap();
        assert_eq!(order.keys.len(), 1);
        assert!(order.dependent_keys.is_empty());

        assert_eq!(model.triggers.len(), 1);
        assert_eq!(model.triggers[0].class_name, "OrderAuditInsert");
    }

    #[test]
    fn bare_build_skips_columns_and_keys() {
        let mut assembler = ModelAssembler::new(StubSource);
        let model = assembler.build("app", false).unwrap();

        let user = model.table("user").unwrap();
        assert!(user.columns.is_empty());
        assert!(user.keys.is_empty());
        assert_eq!(user.raw.get("ENGINE"), Some(&json!("InnoDB")));
        assert!(model.triggers.is_empty());
    }

    #[test]
    fn build_is_memoized_per_schema_and_extras() {
        let mut assembler = ModelAssembler::new(StubSource);
        let a = assembler.build("app", true).unwrap();
        let b = assembler.build("app", true).unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        let bare = assembler.build("app", false).unwrap();
        assert!(!Arc::ptr_eq(&a, &bare));
    }
}
