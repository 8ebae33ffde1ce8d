//! Field accessor registry.
//!
//! Every readable name on a row goes through an [`Accessor`]. The registry is
//! built once per [`crate::Table`] from the schema model: each stored column
//! gets a pair of closures reading and writing its entry in the row's field
//! map. Generated table classes can register additional virtual accessors
//! (computed fields, renames) on top; those participate in `to_map` and
//! `set_from_map` like stored columns but never reach the persistence layer.

use rowgen_schema::{FieldMap, TableDescriptor};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Reads a field value out of a row's data map.
pub type Getter = Arc<dyn Fn(&FieldMap) -> Value + Send + Sync>;

/// Writes a field value into a row's data map.
pub type Setter = Arc<dyn Fn(&mut FieldMap, Value) + Send + Sync>;

/// One named field accessor.
#[derive(Clone)]
pub struct Accessor {
    pub getter: Getter,
    pub setter: Option<Setter>,
    /// True when the field is a schema column and persists.
    pub stored: bool,
}

/// All accessors for one table, stored columns first.
#[derive(Clone, Default)]
pub struct AccessorRegistry {
    accessors: BTreeMap<String, Accessor>,
}

impl AccessorRegistry {
    /// Build the stored accessors for every column of `descriptor`.
    pub fn for_table(descriptor: &TableDescriptor) -> Self {
        let mut registry = Self::default();
        for column in &descriptor.columns {
            let name = column.name.clone();
            let get_name = name.clone();
            let set_name = name.clone();
            registry.accessors.insert(
                name,
                Accessor {
                    getter: Arc::new(move |data: &FieldMap| {
                        data.get(&get_name).cloned().unwrap_or(Value::Null)
                    }),
                    setter: Some(Arc::new(move |data: &mut FieldMap, value: Value| {
                        data.insert(set_name.clone(), value);
                    })),
                    stored: true,
                },
            );
        }
        registry
    }

    /// Register a virtual accessor. Replaces any existing accessor of the
    /// same name, including a stored one.
    pub fn register(&mut self, name: impl Into<String>, getter: Getter, setter: Option<Setter>) {
        self.accessors.insert(
            name.into(),
            Accessor {
                getter,
                setter,
                stored: false,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&Accessor> {
        self.accessors.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.accessors.contains_key(name)
    }

    /// Accessor names in stable order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.accessors.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> AccessorRegistry {
        let mut registry = AccessorRegistry::default();
        registry.register(
            "id",
            Arc::new(|data: &FieldMap| data.get("id").cloned().unwrap_or(Value::Null)),
            Some(Arc::new(|data: &mut FieldMap, v: Value| {
                data.insert("id".into(), v);
            })),
        );
        registry
    }

    #[test]
    fn getter_reads_missing_field_as_null() {
        let registry = registry();
        let data = FieldMap::new();
        let accessor = registry.get("id").unwrap();
        assert_eq!((accessor.getter)(&data), Value::Null);
    }

    #[test]
    fn setter_writes_into_data() {
        let registry = registry();
        let mut data = FieldMap::new();
        let accessor = registry.get("id").unwrap();
        (accessor.setter.as_ref().unwrap())(&mut data, json!(7));
        assert_eq!(data.get("id"), Some(&json!(7)));
    }

    #[test]
    fn virtual_accessor_is_not_stored() {
        let mut registry = registry();
        registry.register("display_name", Arc::new(|_| json!("x")), None);
        assert!(!registry.get("display_name").unwrap().stored);
    }
}
