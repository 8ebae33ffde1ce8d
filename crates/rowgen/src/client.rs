//! The persistence collaborator boundary.
//!
//! Everything the runtime knows about storage goes through [`PersistClient`].
//! Reads take a [`SelectQuery`]; writes take the table name plus field maps.
//! The trait is synchronous and object-safe so a [`crate::Table`] can hold it
//! behind `Arc<dyn PersistClient>`.

use crate::RowgenResult;
use crate::query::SelectQuery;
use rowgen_schema::FieldMap;
use serde_json::Value;

/// Synchronous persistence operations the runtime delegates to.
pub trait PersistClient: Send + Sync {
    /// All rows matching the query, honoring its ordering and window.
    fn select(&self, query: &SelectQuery) -> RowgenResult<Vec<FieldMap>>;

    /// Number of rows matching the query, ignoring its window.
    fn count(&self, query: &SelectQuery) -> RowgenResult<u64>;

    /// Insert one row. Returns the generated key value when the table
    /// auto-increments, `Null` otherwise.
    fn insert(&self, table: &str, fields: &FieldMap) -> RowgenResult<Value>;

    /// Update rows matching the key map. Returns the affected row count.
    fn update(&self, table: &str, fields: &FieldMap, keys: &FieldMap) -> RowgenResult<u64>;

    /// Delete rows matching the key map. Returns the affected row count.
    fn delete(&self, table: &str, keys: &FieldMap) -> RowgenResult<u64>;
}
