//! Foreign-key graph inversion.
//!
//! The catalog only states outward keys (this table's columns referencing
//! other tables). Consumers of a table also need the inward view: which
//! tables point at it, and with which composite-key siblings. This module
//! builds that transpose.

use crate::model::{DependentKeyDescriptor, KeyDescriptor};
use std::collections::BTreeMap;

/// Invert per-table outward key lists into per-table dependent-key lists.
///
/// Every table present in the input gets an entry, empty when nothing
/// references it. Each dependent entry carries the other keys of its
/// originating table as siblings, so consumers joining on composite foreign
/// keys can join on all columns together. Keys referencing a table outside
/// the input set are dropped with a warning; they cannot be attached to any
/// descriptor in this model.
pub fn invert_keys(
    keys_by_table: &BTreeMap<String, Vec<KeyDescriptor>>,
) -> BTreeMap<String, Vec<DependentKeyDescriptor>> {
    let mut dependents: BTreeMap<String, Vec<DependentKeyDescriptor>> = keys_by_table
        .keys()
        .map(|table| (table.clone(), Vec::new()))
        .collect();

    for keys in keys_by_table.values() {
        for (idx, key) in keys.iter().enumerate() {
            let siblings: Vec<KeyDescriptor> = keys
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, k)| k.clone())
                .collect();

            match dependents.get_mut(&key.referenced_table) {
                Some(list) => list.push(DependentKeyDescriptor {
                    key: key.clone(),
                    siblings,
                }),
                None => {
                    tracing::warn!(
                        table = %key.table,
                        column = %key.column,
                        referenced = %key.referenced_table,
                        "foreign key references a table outside the model; dropped"
                    );
                }
            }
        }
    }

    dependents
}
