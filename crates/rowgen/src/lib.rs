//! # rowgen
//!
//! In-memory relational runtime backing rowgen-generated data access layers.
//! A [`Table`] binds a [`rowgen_schema::TableDescriptor`] to a
//! [`PersistClient`] and hands out [`Row`]s and [`Rowset`]s; rows track dirty
//! state and save incrementally, rowsets filter, group, upsert-merge and
//! paginate in memory.
//!
//! Storage is fully abstracted: the runtime never opens a connection, it only
//! calls the [`PersistClient`] it was given.

pub mod accessor;
pub mod client;
pub mod error;
pub mod query;
pub mod row;
pub mod rowset;
pub mod table;
pub mod value;

pub use accessor::{Accessor, AccessorRegistry, Getter, Setter};
pub use client::PersistClient;
pub use error::{RowgenError, RowgenResult};
pub use query::{Predicate, SelectQuery, TableRef};
pub use row::Row;
pub use rowset::Rowset;
pub use table::{DEFAULT_PAGE_SIZE, PageOptions, Table};
pub use value::{group_key, loose_eq};
