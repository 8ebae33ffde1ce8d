//! File-backed catalog source.
//!
//! A [`CatalogDump`] is a JSON snapshot of the raw catalog record streams for
//! one schema. It implements [`CatalogSource`], so a model can be assembled
//! without a live catalog connection; the CLI and the test suites both build
//! from dumps.

use crate::catalog::CatalogSource;
use crate::error::{SchemaError, SchemaResult};
use crate::model::FieldMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DUMP_VERSION: u32 = 1;

/// Raw catalog records for one schema, keyed the way the catalog queries are.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogDump {
    pub version: u32,
    pub retrieved_at: DateTime<Utc>,
    pub schema: String,
    pub tables: Vec<FieldMap>,
    #[serde(default)]
    pub columns: BTreeMap<String, Vec<FieldMap>>,
    #[serde(default)]
    pub foreign_keys: BTreeMap<String, Vec<FieldMap>>,
    #[serde(default)]
    pub indexes: BTreeMap<String, Vec<FieldMap>>,
    #[serde(default)]
    pub primary_keys: BTreeMap<String, Vec<FieldMap>>,
    #[serde(default)]
    pub triggers: Vec<FieldMap>,
}

impl CatalogDump {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            version: DUMP_VERSION,
            retrieved_at: Utc::now(),
            schema: schema.into(),
            tables: Vec::new(),
            columns: BTreeMap::new(),
            foreign_keys: BTreeMap::new(),
            indexes: BTreeMap::new(),
            primary_keys: BTreeMap::new(),
            triggers: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> SchemaResult<Self> {
        let data = std::fs::read(path).map_err(|e| {
            SchemaError::catalog(format!("failed to read catalog dump {}: {e}", path.display()))
        })?;
        let dump: Self = serde_json::from_slice(&data).map_err(|e| {
            SchemaError::Serialization(format!(
                "failed to parse catalog dump {}: {e}",
                path.display()
            ))
        })?;
        if dump.version != DUMP_VERSION {
            return Err(SchemaError::validation(format!(
                "unsupported catalog dump version {} in {}",
                dump.version,
                path.display()
            )));
        }
        Ok(dump)
    }

    pub fn save(&self, path: &Path) -> SchemaResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SchemaError::catalog(format!("failed to create directory: {e}")))?;
        }
        let data = serde_json::to_vec_pretty(self)
            .map_err(|e| SchemaError::Serialization(format!("failed to serialize dump: {e}")))?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, data)
            .map_err(|e| SchemaError::catalog(format!("failed to write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, path).map_err(|e| {
            SchemaError::catalog(format!(
                "failed to rename {} -> {}: {e}",
                tmp.display(),
                path.display()
            ))
        })?;
        Ok(())
    }

    fn check_schema(&self, schema: &str) -> SchemaResult<()> {
        if schema != self.schema {
            return Err(SchemaError::catalog(format!(
                "catalog dump holds schema '{}', not '{schema}'",
                self.schema
            )));
        }
        Ok(())
    }

    fn per_table(
        &self,
        map: &BTreeMap<String, Vec<FieldMap>>,
        schema: &str,
        table: &str,
    ) -> SchemaResult<Vec<FieldMap>> {
        self.check_schema(schema)?;
        Ok(map.get(table).cloned().unwrap_or_default())
    }
}

impl CatalogSource for CatalogDump {
    fn tables(&self, schema: &str) -> SchemaResult<Vec<FieldMap>> {
        self.check_schema(schema)?;
        Ok(self.tables.clone())
    }

    fn columns(&self, schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>> {
        self.per_table(&self.columns, schema, table)
    }

    fn foreign_keys(&self, schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>> {
        self.per_table(&self.foreign_keys, schema, table)
    }

    fn indexes(&self, schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>> {
        self.per_table(&self.indexes, schema, table)
    }

    fn primary_key_columns(&self, schema: &str, table: &str) -> SchemaResult<Vec<FieldMap>> {
        self.per_table(&self.primary_keys, schema, table)
    }

    fn triggers(&self, schema: &str) -> SchemaResult<Vec<FieldMap>> {
        self.check_schema(schema)?;
        Ok(self.triggers.clone())
    }
}
