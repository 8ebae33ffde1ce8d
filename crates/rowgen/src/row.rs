//! A single entity row.
//!
//! A [`Row`] is one record bound to its owning [`Table`]. It carries the
//! current field map plus a clean snapshot taken when the row was loaded or
//! last saved; `save` only writes the fields that changed since. Rows created
//! in memory are unsaved until their first `save`, which inserts instead of
//! updating and back-fills the auto-increment key.

use crate::error::{RowgenError, RowgenResult};
use crate::table::Table;
use rowgen_schema::FieldMap;
use serde_json::Value;
use std::sync::Arc;

#[derive(Clone)]
pub struct Row {
    table: Arc<Table>,
    data: FieldMap,
    /// Field values as of the last load or save.
    clean: FieldMap,
    /// True once the row exists in storage.
    stored: bool,
}

impl Row {
    /// A new in-memory row. Fields are routed through the table's accessors,
    /// so virtual setters apply and unknown names are dropped.
    pub(crate) fn new(table: Arc<Table>, data: FieldMap) -> Self {
        let mut row = Self {
            table,
            data: FieldMap::new(),
            clean: FieldMap::new(),
            stored: false,
        };
        row.set_from_map(&data);
        row
    }

    /// A blank in-memory row with every schema column at its computed
    /// default.
    pub(crate) fn blank(table: Arc<Table>) -> Self {
        let data = table
            .descriptor()
            .columns
            .iter()
            .map(|c| (c.name.clone(), c.default_value.clone()))
            .collect();
        Self {
            table,
            data,
            clean: FieldMap::new(),
            stored: false,
        }
    }

    /// A row loaded from storage. The record is taken verbatim as both the
    /// current and the clean state.
    pub(crate) fn from_record(table: Arc<Table>, record: FieldMap) -> Self {
        Self {
            table,
            clean: record.clone(),
            data: record,
            stored: true,
        }
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    /// True until the row has been written to storage.
    pub fn is_unsaved(&self) -> bool {
        !self.stored
    }

    /// Read one field through its accessor.
    pub fn get(&self, name: &str) -> RowgenResult<Value> {
        let accessor = self
            .table
            .accessors()
            .get(name)
            .ok_or_else(|| RowgenError::UnknownColumn(name.to_string()))?;
        Ok((accessor.getter)(&self.data))
    }

    /// Write one field through its accessor. Fails for unknown names and for
    /// read-only virtual accessors.
    pub fn set(&mut self, name: &str, value: Value) -> RowgenResult<()> {
        let accessor = self
            .table
            .accessors()
            .get(name)
            .ok_or_else(|| RowgenError::UnknownColumn(name.to_string()))?;
        let setter = accessor
            .setter
            .as_ref()
            .ok_or_else(|| RowgenError::validation(format!("Field '{name}' is read-only")))?;
        setter(&mut self.data, value);
        Ok(())
    }

    /// Apply every known field of `fields`, silently ignoring names that have
    /// no accessor or no setter.
    pub fn set_from_map(&mut self, fields: &FieldMap) {
        for (name, value) in fields {
            if let Some(accessor) = self.table.accessors().get(name)
                && let Some(setter) = &accessor.setter
            {
                setter(&mut self.data, value.clone());
            }
        }
    }

    /// All fields, read through their accessors so virtual getters apply.
    pub fn to_map(&self) -> FieldMap {
        let mut map = FieldMap::new();
        for name in self.table.accessors().names() {
            if let Some(accessor) = self.table.accessors().get(name) {
                map.insert(name.to_string(), (accessor.getter)(&self.data));
            }
        }
        map
    }

    /// Primary key values in key order. Missing components read as null.
    pub fn primary_key_values(&self) -> Vec<Value> {
        self.table
            .primary_keys()
            .iter()
            .map(|column| self.data.get(column).cloned().unwrap_or(Value::Null))
            .collect()
    }

    /// Primary key as a field map.
    pub fn primary_key_map(&self) -> FieldMap {
        self.table
            .primary_keys()
            .iter()
            .map(|column| {
                (
                    column.clone(),
                    self.data.get(column).cloned().unwrap_or(Value::Null),
                )
            })
            .collect()
    }

    /// Single-key value, or an object map for composite keys.
    fn primary_key_value(&self) -> Value {
        let keys = self.table.primary_keys();
        if keys.len() == 1 {
            self.data.get(&keys[0]).cloned().unwrap_or(Value::Null)
        } else {
            Value::Object(
                self.primary_key_map()
                    .into_iter()
                    .collect::<serde_json::Map<_, _>>(),
            )
        }
    }

    /// Insert or update the row. Returns the primary key value after the
    /// write, so callers can pick up a freshly generated key.
    pub fn save(&mut self) -> RowgenResult<Value> {
        if self.stored {
            self.update_stored()
        } else {
            self.insert_new()
        }
    }

    fn insert_new(&mut self) -> RowgenResult<Value> {
        let fields = self.stored_fields();
        let generated = self.table.client().insert(self.table.name(), &fields)?;

        if generated != Value::Null
            && let Some(column) = self.table.auto_increment_column()
        {
            self.data.insert(column.to_string(), generated);
        }

        self.stored = true;
        self.clean = self.data.clone();
        tracing::debug!(table = self.table.name(), "inserted row");
        Ok(self.primary_key_value())
    }

    fn update_stored(&mut self) -> RowgenResult<Value> {
        let keys: FieldMap = self
            .table
            .primary_keys()
            .iter()
            .map(|column| {
                (
                    column.clone(),
                    self.clean.get(column).cloned().unwrap_or(Value::Null),
                )
            })
            .collect();
        if keys.values().any(|v| v.is_null()) {
            return Err(RowgenError::identity(format!(
                "Cannot update a '{}' row without a complete primary key",
                self.table.name()
            )));
        }

        let changed: FieldMap = self
            .stored_fields()
            .into_iter()
            .filter(|(name, value)| self.clean.get(name) != Some(value))
            .collect();
        if !changed.is_empty() {
            self.table.client().update(self.table.name(), &changed, &keys)?;
            self.clean = self.data.clone();
            tracing::debug!(
                table = self.table.name(),
                fields = changed.len(),
                "updated row"
            );
        }
        Ok(self.primary_key_value())
    }

    /// Delete the row from storage. Unsaved rows report zero affected rows.
    pub fn delete(&mut self) -> RowgenResult<u64> {
        if !self.stored {
            return Ok(0);
        }
        let keys: FieldMap = self
            .table
            .primary_keys()
            .iter()
            .map(|column| {
                (
                    column.clone(),
                    self.clean.get(column).cloned().unwrap_or(Value::Null),
                )
            })
            .collect();
        let affected = self.table.client().delete(self.table.name(), &keys)?;
        if affected > 0 {
            self.stored = false;
        }
        Ok(affected)
    }

    /// All rows of `dependent` referencing this row through its foreign keys.
    ///
    /// Fails when no foreign key of `dependent` references this row's table.
    /// When any referenced value on this row is null the reference cannot
    /// match anything, so an empty rowset is returned without a query.
    pub fn find_dependent_rowset(
        &self,
        dependent: &Arc<Table>,
    ) -> RowgenResult<crate::rowset::Rowset> {
        let keys: Vec<_> = self
            .table
            .descriptor()
            .dependent_keys
            .iter()
            .filter(|dep| dep.key.table == dependent.name())
            .collect();
        if keys.is_empty() {
            return Err(RowgenError::validation(format!(
                "Table '{}' has no reference to '{}'",
                dependent.name(),
                self.table.name()
            )));
        }

        let mut criteria = FieldMap::new();
        for dep in keys {
            let value = self
                .data
                .get(&dep.key.referenced_column)
                .cloned()
                .unwrap_or(Value::Null);
            if value.is_null() {
                return Ok(dependent.create_rowset());
            }
            criteria.insert(dep.key.column.clone(), value);
        }
        dependent.find_by_column_values(&criteria)
    }

    /// Current data restricted to schema columns.
    fn stored_fields(&self) -> FieldMap {
        self.data
            .iter()
            .filter(|(name, _)| self.table.descriptor().has_column(name))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}

impl std::fmt::Debug for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Row")
            .field("table", &self.table.name())
            .field("data", &self.data)
            .field("stored", &self.stored)
            .finish()
    }
}
