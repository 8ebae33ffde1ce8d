//! Catalog access.
//!
//! The catalog collaborator is anything that can answer read-only SQL against
//! the relational catalog ([`CatalogClient`]). [`CatalogReader`] issues the
//! fixed set of introspection queries through it and returns the raw records
//! untransformed; classification and graph building happen downstream.
//!
//! [`CatalogSource`] is the shaped view the assembler consumes: the same six
//! record streams, whether they come from a live catalog or a JSON dump.

use crate::error::SchemaResult;
use crate::model::FieldMap;
use serde_json::Value;

/// Read-only SQL access to the relational catalog.
///
/// Failures propagate unchanged to the build; there is no retry.
pub trait CatalogClient {
    /// Execute a read-only query, returning an ordered sequence of field
    /// maps exactly as the catalog stores them.
    fn fetch_all(&self, sql: &str, params: &[Value]) -> SchemaResult<Vec<FieldMap>>;
}

impl<C: CatalogClient + ?Sized> CatalogClient for &C {
    fn fetch_all(&self, sql: &str, params: &[Value]) -> SchemaResult<Vec<FieldMap>> {
        (**self).fetch_all(sql, params)
    }
}

/// The ordered record streams the model assembler consumes.
pub trait CatalogSource {
    /// All tables in a schema.
    fn tables(&self, schema: &str) -> SchemaResult<Vec<FieldMap>>;
    /// All columns of a table, in ordinal order.
    fn columns(&self, schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>>;
    /// Foreign-key column usages of a table (referenced column non-null),
    /// ordered by column name then ordinal position.
    fn foreign_keys(&self, schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>>;
    /// Indexed columns of a table, ordered by column name then ordinal position.
    fn indexes(&self, schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>>;
    /// Primary-key columns of a table, in position order within the key.
    fn primary_key_columns(&self, schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>>;
    /// All triggers in a schema.
    fn triggers(&self, schema: &str) -> SchemaResult<Vec<FieldMap>>;
}

/// Issues the catalog introspection queries against a [`CatalogClient`].
#[derive(Debug, Clone)]
pub struct CatalogReader<C> {
    client: C,
}

impl<C: CatalogClient> CatalogReader<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    fn schema_query(&self, sql: &str, schema: &str) -> SchemaResult<Vec<FieldMap>> {
        self.client.fetch_all(sql, &[Value::String(schema.to_string())])
    }

    fn table_query(&self, sql: &str, schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>> {
        self.client.fetch_all(
            sql,
            &[
                Value::String(schema.to_string()),
                Value::String(table.to_string()),
            ],
        )
    }
}

impl<C: CatalogClient> CatalogSource for CatalogReader<C> {
    fn tables(&self, schema: &str) -> SchemaResult<Vec<FieldMap>> {
        self.schema_query(
            "SELECT * FROM information_schema.TABLES WHERE TABLE_SCHEMA = ?",
            schema,
        )
    }

    fn columns(&self, schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>> {
        self.table_query(
            "SELECT * FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
             ORDER BY ORDINAL_POSITION",
            schema,
            table,
        )
    }

    fn foreign_keys(&self, schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>> {
        self.table_query(
            "SELECT * FROM information_schema.KEY_COLUMN_USAGE \
             WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? \
             AND REFERENCED_COLUMN_NAME IS NOT NULL \
             ORDER BY COLUMN_NAME, ORDINAL_POSITION",
            schema,
            table,
        )
    }

    fn indexes(&self, schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>> {
        self.table_query(
            "SELECT * FROM information_schema.COLUMNS \
             WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND COLUMN_KEY != '' \
             ORDER BY COLUMN_NAME, ORDINAL_POSITION",
            schema,
            table,
        )
    }

    fn primary_key_columns(&self, schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>> {
        self.table_query(
            "SELECT * FROM information_schema.STATISTICS \
             WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ? AND INDEX_NAME = 'PRIMARY' \
             ORDER BY SEQ_IN_INDEX",
            schema,
            table,
        )
    }

    fn triggers(&self, schema: &str) -> SchemaResult<Vec<FieldMap>> {
        self.schema_query(
            "SELECT * FROM information_schema.TRIGGERS WHERE TRIGGER_SCHEMA = ?",
            schema,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchemaError;
    use std::cell::RefCell;

    /// Records the queries it is asked and replays canned rows.
    struct RecordingClient {
        rows: Vec<FieldMap>,
        seen: RefCell<Vec<(String, Vec<Value>)>>,
    }

    impl CatalogClient for RecordingClient {
        fn fetch_all(&self, sql: &str, params: &[Value]) -> SchemaResult<Vec<FieldMap>> {
            self.seen
                .borrow_mut()
                .push((sql.to_string(), params.to_vec()));
            Ok(self.rows.clone())
        }
    }

    #[test]
    fn reader_parameterizes_by_schema_and_table() {
        let client = RecordingClient {
            rows: Vec::new(),
            seen: RefCell::new(Vec::new()),
        };
        let reader = CatalogReader::new(&client);
        reader.tables("app").unwrap();
        reader.columns("app", "users").unwrap();

        let seen = client.seen.borrow();
        assert_eq!(seen[0].1, vec![Value::String("app".into())]);
        assert_eq!(
            seen[1].1,
            vec![Value::String("app".into()), Value::String("users".into())]
        );
        assert!(seen[1].0.contains("information_schema.COLUMNS"));
    }

    #[test]
    fn client_failure_propagates() {
        struct FailingClient;
        impl CatalogClient for FailingClient {
            fn fetch_all(&self, _sql: &str, _params: &[Value]) -> SchemaResult<Vec<FieldMap>> {
                Err(SchemaError::catalog("connection refused"))
            }
        }

        let reader = CatalogReader::new(FailingClient);
        assert!(matches!(
            reader.tables("app").unwrap_err(),
            SchemaError::Catalog(_)
        ));
    }
}
