//! An ordered collection of rows from one table.
//!
//! A [`Rowset`] owns its rows and remembers how it was fetched: a paginated
//! fetch stamps the total count, current page and page size so templates can
//! render pagers without another query. Filtering and grouping return new,
//! structurally independent rowsets; mutating a filtered copy never touches
//! the original.

use crate::error::{RowgenError, RowgenResult};
use crate::row::Row;
use crate::table::Table;
use crate::value::{group_key, loose_eq};
use rowgen_schema::FieldMap;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

pub struct Rowset {
    table: Arc<Table>,
    rows: Vec<Row>,
    total_count: Option<u64>,
    current_page: Option<u64>,
    page_size: Option<u64>,
}

impl Rowset {
    pub(crate) fn new(table: Arc<Table>) -> Self {
        Self {
            table,
            rows: Vec::new(),
            total_count: None,
            current_page: None,
            page_size: None,
        }
    }

    /// Wrap records loaded from storage.
    pub(crate) fn from_records(table: Arc<Table>, records: Vec<FieldMap>) -> Self {
        let rows = records
            .into_iter()
            .map(|record| Row::from_record(Arc::clone(&table), record))
            .collect();
        Self {
            table,
            rows,
            total_count: None,
            current_page: None,
            page_size: None,
        }
    }

    pub(crate) fn stamp_page(&mut self, total_count: u64, current_page: u64, page_size: u64) {
        self.total_count = Some(total_count);
        self.current_page = Some(current_page);
        self.page_size = Some(page_size);
    }

    pub fn table(&self) -> &Arc<Table> {
        &self.table
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Row> {
        self.rows.get_mut(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Row> {
        self.rows.iter_mut()
    }

    // ==================== membership ====================

    /// Append a row. The row must belong to this rowset's table, and its
    /// primary key, when fully set, must not collide with an existing row.
    pub fn add_row(&mut self, row: Row) -> RowgenResult<()> {
        if !Arc::ptr_eq(row.table(), &self.table) {
            return Err(RowgenError::RowTypeMismatch {
                expected: self.table.name().to_string(),
                actual: row.table().name().to_string(),
            });
        }

        let keys = row.primary_key_values();
        if !keys.is_empty() && keys.iter().all(|v| !v.is_null()) {
            let duplicate = self
                .rows
                .iter()
                .any(|existing| keys_match(&existing.primary_key_values(), &keys));
            if duplicate {
                return Err(RowgenError::identity(format!(
                    "Duplicate primary key {keys:?} in '{}' rowset",
                    self.table.name()
                )));
            }
        }

        self.rows.push(row);
        Ok(())
    }

    /// Create a new unsaved row from `fields` and append it.
    pub fn create_row(&mut self, fields: FieldMap) -> RowgenResult<&mut Row> {
        let row = Row::new(Arc::clone(&self.table), fields);
        self.add_row(row)?;
        let index = self.rows.len() - 1;
        Ok(&mut self.rows[index])
    }

    // ==================== filtering and grouping ====================

    /// Rows whose `column` loosely equals `value`, as an independent rowset.
    pub fn filter_by(&self, column: &str, value: &Value) -> RowgenResult<Rowset> {
        let mut criteria = FieldMap::new();
        criteria.insert(column.to_string(), value.clone());
        self.filter_by_map(&criteria)
    }

    /// Rows matching every criterion loosely, as an independent rowset.
    /// Pagination metadata does not carry over.
    pub fn filter_by_map(&self, criteria: &FieldMap) -> RowgenResult<Rowset> {
        let mut filtered = Rowset::new(Arc::clone(&self.table));
        for row in &self.rows {
            let mut matches = true;
            for (column, wanted) in criteria {
                if !loose_eq(&row.get(column)?, wanted) {
                    matches = false;
                    break;
                }
            }
            if matches {
                filtered.rows.push(row.clone());
            }
        }
        Ok(filtered)
    }

    /// Partition rows by the canonical key of `column`. Nulls group under the
    /// empty key; loosely equal values share a group.
    pub fn group_by(&self, column: &str) -> RowgenResult<BTreeMap<String, Rowset>> {
        let mut groups: BTreeMap<String, Rowset> = BTreeMap::new();
        for row in &self.rows {
            let key = group_key(&row.get(column)?);
            groups
                .entry(key)
                .or_insert_with(|| Rowset::new(Arc::clone(&self.table)))
                .rows
                .push(row.clone());
        }
        Ok(groups)
    }

    /// The row with exactly these primary key values.
    pub fn row_by_primary_keys(&self, keys: &[Value]) -> RowgenResult<&Row> {
        let expected = self.table.primary_keys().len();
        if keys.len() != expected {
            return Err(RowgenError::identity(format!(
                "Table '{}' has {expected} primary key column(s), got {} value(s)",
                self.table.name(),
                keys.len()
            )));
        }
        self.rows
            .iter()
            .find(|row| keys_match(&row.primary_key_values(), keys))
            .ok_or_else(|| {
                RowgenError::not_found(format!(
                    "No row with primary keys {keys:?} in '{}' rowset",
                    self.table.name()
                ))
            })
    }

    // ==================== bulk mutation ====================

    /// Upsert-merge: for each map, match existing rows on the map's present,
    /// non-null primary key components. No match appends a new unsaved row;
    /// one match merges the map into it; several matches are ambiguous and
    /// fail without touching anything for that map.
    pub fn set_from_maps(&mut self, maps: &[FieldMap]) -> RowgenResult<()> {
        for fields in maps {
            let key_criteria: FieldMap = self
                .table
                .primary_keys()
                .iter()
                .filter_map(|column| {
                    fields
                        .get(column)
                        .filter(|v| !v.is_null())
                        .map(|v| (column.clone(), v.clone()))
                })
                .collect();

            let matches: Vec<usize> = if key_criteria.is_empty() {
                Vec::new()
            } else {
                self.rows
                    .iter()
                    .enumerate()
                    .filter(|(_, row)| {
                        key_criteria.iter().all(|(column, wanted)| {
                            row.get(column).map(|v| loose_eq(&v, wanted)).unwrap_or(false)
                        })
                    })
                    .map(|(i, _)| i)
                    .collect()
            };

            match matches.as_slice() {
                [] => {
                    let row = Row::new(Arc::clone(&self.table), fields.clone());
                    self.rows.push(row);
                }
                [index] => self.rows[*index].set_from_map(fields),
                _ => {
                    return Err(RowgenError::identity(format!(
                        "Key components {key_criteria:?} match {} rows in '{}' rowset",
                        matches.len(),
                        self.table.name()
                    )));
                }
            }
        }
        Ok(())
    }

    /// Save every row independently. Each row's outcome is reported in order;
    /// one failure does not stop the others.
    pub fn save(&mut self) -> Vec<RowgenResult<Value>> {
        self.rows.iter_mut().map(Row::save).collect()
    }

    /// Delete every stored row, stopping at the first failure. A failed or
    /// zero-affected delete aborts with the offending row's keys; deletions
    /// already applied stay applied. On full success the rowset is emptied.
    pub fn delete(&mut self) -> RowgenResult<u64> {
        let mut affected = 0;
        for row in &mut self.rows {
            if row.is_unsaved() {
                continue;
            }
            let keys = row.primary_key_values();
            match row.delete() {
                Ok(0) | Err(_) => {
                    return Err(RowgenError::DeleteFailed {
                        keys: format!("{keys:?}"),
                    });
                }
                Ok(n) => affected += n,
            }
        }
        self.reset();
        Ok(affected)
    }

    /// Drop all rows and pagination metadata.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.total_count = None;
        self.current_page = None;
        self.page_size = None;
    }

    // ==================== export ====================

    pub fn to_maps(&self) -> Vec<FieldMap> {
        self.rows.iter().map(Row::to_map).collect()
    }

    /// Maps keyed by the joined primary key. Each null component renders as
    /// a fresh `NULL_{n}` placeholder, so rows with incomplete keys stay
    /// distinct instead of overwriting each other.
    pub fn keyed_by_primary_key(&self) -> BTreeMap<String, FieldMap> {
        let mut null_seq = 0usize;
        self.rows
            .iter()
            .map(|row| {
                let key = row
                    .primary_key_values()
                    .iter()
                    .map(|v| {
                        if v.is_null() {
                            let placeholder = format!("NULL_{null_seq}");
                            null_seq += 1;
                            placeholder
                        } else {
                            group_key(v)
                        }
                    })
                    .collect::<Vec<_>>()
                    .join("_");
                (key, row.to_map())
            })
            .collect()
    }

    /// One column's value from every row, in row order.
    pub fn get_column_values(&self, column: &str) -> RowgenResult<Vec<Value>> {
        self.rows.iter().map(|row| row.get(column)).collect()
    }

    /// Set one column on every row.
    pub fn set_column_values(&mut self, column: &str, value: &Value) -> RowgenResult<()> {
        for row in &mut self.rows {
            row.set(column, value.clone())?;
        }
        Ok(())
    }

    // ==================== pagination ====================

    /// True when more rows match than are locally held.
    pub fn is_paginated(&self) -> bool {
        self.total_count() > self.rows.len() as u64
    }

    /// Matching rows across all pages; just the length when not paginated.
    pub fn total_count(&self) -> u64 {
        self.total_count.unwrap_or(self.rows.len() as u64)
    }

    /// 1-based page number.
    pub fn current_page(&self) -> u64 {
        self.current_page.unwrap_or(1)
    }

    /// Rows per page. An unpaginated rowset is one page of itself.
    pub fn page_size(&self) -> u64 {
        if !self.is_paginated() {
            return self.rows.len() as u64;
        }
        self.page_size
            .unwrap_or_else(|| self.table.default_page_size())
    }

    pub fn total_pages(&self) -> u64 {
        let page_size = self.page_size();
        if page_size == 0 {
            0
        } else {
            self.total_count().div_ceil(page_size)
        }
    }
}

impl<'a> IntoIterator for &'a Rowset {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl std::fmt::Debug for Rowset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rowset")
            .field("table", &self.table.name())
            .field("rows", &self.rows.len())
            .field("current_page", &self.current_page)
            .finish()
    }
}

fn keys_match(actual: &[Value], wanted: &[Value]) -> bool {
    actual.len() == wanted.len()
        && actual
            .iter()
            .zip(wanted)
            .all(|(a, b)| loose_eq(a, b))
}
