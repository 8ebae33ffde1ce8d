//! Table gateways.
//!
//! A [`Table`] binds one [`TableDescriptor`] from the schema model to a
//! persistence collaborator and hands out rows and rowsets for it. Tables are
//! shared behind `Arc`; every row and rowset holds a reference back to its
//! table, and that pointer identity is what membership checks compare.

use crate::accessor::AccessorRegistry;
use crate::client::PersistClient;
use crate::error::RowgenResult;
use crate::query::{Predicate, SelectQuery};
use crate::row::Row;
use crate::rowset::Rowset;
use rowgen_schema::TableDescriptor;
use serde_json::Value;
use std::sync::Arc;

/// Rows per page when a paginated fetch does not say otherwise.
pub const DEFAULT_PAGE_SIZE: u64 = 12;

/// Pagination request for [`Table::paginate`]. Pages are 1-based.
#[derive(Debug, Clone, Copy)]
pub struct PageOptions {
    pub page: u64,
    /// Falls back to the table's default page size.
    pub page_size: Option<u64>,
}

impl PageOptions {
    pub fn page(page: u64) -> Self {
        Self {
            page,
            page_size: None,
        }
    }
}

pub struct Table {
    descriptor: TableDescriptor,
    client: Arc<dyn PersistClient>,
    accessors: AccessorRegistry,
    default_page_size: u64,
}

impl Table {
    pub fn new(descriptor: TableDescriptor, client: Arc<dyn PersistClient>) -> Arc<Self> {
        let accessors = AccessorRegistry::for_table(&descriptor);
        Arc::new(Self {
            descriptor,
            client,
            accessors,
            default_page_size: DEFAULT_PAGE_SIZE,
        })
    }

    /// Like [`Table::new`] with extra virtual accessors registered on top of
    /// the stored ones. Generated table classes use this.
    pub fn with_accessors(
        descriptor: TableDescriptor,
        client: Arc<dyn PersistClient>,
        register: impl FnOnce(&mut AccessorRegistry),
    ) -> Arc<Self> {
        let mut accessors = AccessorRegistry::for_table(&descriptor);
        register(&mut accessors);
        Arc::new(Self {
            descriptor,
            client,
            accessors,
            default_page_size: DEFAULT_PAGE_SIZE,
        })
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn descriptor(&self) -> &TableDescriptor {
        &self.descriptor
    }

    pub fn client(&self) -> &Arc<dyn PersistClient> {
        &self.client
    }

    pub fn accessors(&self) -> &AccessorRegistry {
        &self.accessors
    }

    /// Primary key column names in key order.
    pub fn primary_keys(&self) -> &[String] {
        &self.descriptor.primary_columns
    }

    pub fn default_page_size(&self) -> u64 {
        self.default_page_size
    }

    /// The auto-increment column, if the table has one.
    pub fn auto_increment_column(&self) -> Option<&str> {
        self.descriptor
            .columns
            .iter()
            .find(|c| c.auto_increment)
            .map(|c| c.name.as_str())
    }

    // ==================== factories ====================

    /// A new unsaved row bound to this table.
    pub fn create_row(self: &Arc<Self>, fields: rowgen_schema::FieldMap) -> Row {
        Row::new(Arc::clone(self), fields)
    }

    /// A blank row with every column at its schema default.
    pub fn create_blank_row(self: &Arc<Self>) -> Row {
        Row::blank(Arc::clone(self))
    }

    /// A new empty rowset bound to this table.
    pub fn create_rowset(self: &Arc<Self>) -> Rowset {
        Rowset::new(Arc::clone(self))
    }

    // ==================== finders ====================

    /// Every row of the table, ordered by its primary key.
    pub fn find_all(self: &Arc<Self>) -> RowgenResult<Rowset> {
        let query = self.keyed_order(SelectQuery::new(self.name()));
        let records = self.client.select(&query)?;
        Ok(Rowset::from_records(Arc::clone(self), records))
    }

    /// Rows where `column` equals `value` (`IS NULL` for a null value).
    pub fn find_by_column_value(
        self: &Arc<Self>,
        column: &str,
        value: &Value,
    ) -> RowgenResult<Rowset> {
        let mut criteria = rowgen_schema::FieldMap::new();
        criteria.insert(column.to_string(), value.clone());
        self.find_by_column_values(&criteria)
    }

    /// Rows matching every criterion. Criteria naming columns the schema does
    /// not know are dropped; null values become `IS NULL` predicates and
    /// array values become `IN` lists (with `IS NULL` OR'd in when the array
    /// contains a null).
    pub fn find_by_column_values(
        self: &Arc<Self>,
        criteria: &rowgen_schema::FieldMap,
    ) -> RowgenResult<Rowset> {
        let query = self.keyed_order(self.build_query(criteria));
        let records = self.client.select(&query)?;
        Ok(Rowset::from_records(Arc::clone(self), records))
    }

    /// Like [`Table::find_by_column_values`], but conjoining the criteria
    /// onto a caller-supplied base query. If the base query already
    /// references this table its alias is reused; otherwise the table is
    /// added as a source.
    pub fn find_with_query(
        self: &Arc<Self>,
        query: SelectQuery,
        criteria: &rowgen_schema::FieldMap,
    ) -> RowgenResult<Rowset> {
        let mut query = if query.qualifier_for(self.name()).is_some() {
            query
        } else {
            query.from(self.name(), None)
        };
        self.apply_criteria(&mut query, criteria);
        let records = self.client.select(&query)?;
        Ok(Rowset::from_records(Arc::clone(self), records))
    }

    /// One page of rows matching the criteria, with the pagination metadata
    /// stamped on the returned rowset.
    pub fn paginate(
        self: &Arc<Self>,
        criteria: &rowgen_schema::FieldMap,
        options: PageOptions,
    ) -> RowgenResult<Rowset> {
        let page = options.page.max(1);
        let page_size = options.page_size.unwrap_or(self.default_page_size);

        let count_query = self.build_query(criteria);
        let total_count = self.client.count(&count_query)?;

        let mut query = self.keyed_order(self.build_query(criteria));
        query.limit(page_size);
        query.offset((page - 1) * page_size);
        let records = self.client.select(&query)?;

        let mut rowset = Rowset::from_records(Arc::clone(self), records);
        rowset.stamp_page(total_count, page, page_size);
        tracing::debug!(
            table = self.name(),
            page,
            page_size,
            total_count,
            "paginated fetch"
        );
        Ok(rowset)
    }

    /// Translate criteria into predicates against this table, reusing the
    /// query's existing alias for it when one is set.
    pub fn build_query(&self, criteria: &rowgen_schema::FieldMap) -> SelectQuery {
        let mut query = SelectQuery::new(self.name());
        self.apply_criteria(&mut query, criteria);
        query
    }

    /// Add this table's criteria to an existing query, e.g. one already
    /// joining several tables.
    pub fn apply_criteria(&self, query: &mut SelectQuery, criteria: &rowgen_schema::FieldMap) {
        let qualifier = query
            .qualifier_for(self.name())
            .unwrap_or(self.name())
            .to_string();

        for (column, value) in criteria {
            if !self.descriptor.has_column(column) {
                tracing::warn!(
                    table = self.name(),
                    column,
                    "dropping criterion for unknown column"
                );
                continue;
            }
            let predicate = match value {
                Value::Null => Predicate::IsNull {
                    qualifier: qualifier.clone(),
                    column: column.clone(),
                },
                Value::Array(members) => {
                    let or_null = members.iter().any(Value::is_null);
                    Predicate::In {
                        qualifier: qualifier.clone(),
                        column: column.clone(),
                        values: members.iter().filter(|v| !v.is_null()).cloned().collect(),
                        or_null,
                    }
                }
                other => Predicate::Eq {
                    qualifier: qualifier.clone(),
                    column: column.clone(),
                    value: other.clone(),
                },
            };
            query.push(predicate);
        }
    }

    fn keyed_order(&self, mut query: SelectQuery) -> SelectQuery {
        let qualifier = query
            .qualifier_for(self.name())
            .unwrap_or(self.name())
            .to_string();
        for column in &self.descriptor.primary_columns {
            query = query.order_by(format!("`{qualifier}`.`{column}`"));
        }
        query
    }
}

impl std::fmt::Debug for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.descriptor.name)
            .field("primary_keys", &self.descriptor.primary_columns)
            .finish()
    }
}
