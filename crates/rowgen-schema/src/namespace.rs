//! Namespace code allocation.
//!
//! Every schema name gets a short uppercase code used to disambiguate
//! generated identifiers across schemas. Codes are unique for the lifetime of
//! one allocator, and the allocator is an owned object threaded through the
//! build pipeline; a fresh run starts from a fresh allocator.

use crate::error::{SchemaError, SchemaResult};
use std::collections::BTreeMap;

/// Assigns short, collision-free uppercase codes to schema names.
///
/// The candidate code for width `w` is the first `w` characters of every
/// `_`-separated word of the name, concatenated and upper-cased. Widths are
/// tried strictly increasing until the candidate is unused; if the width
/// exceeds the name itself the allocation fails and the build must abort.
#[derive(Debug, Default)]
pub struct NamespaceAllocator {
    codes: BTreeMap<String, String>,
}

impl NamespaceAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate (or return the previously allocated) code for `name`.
    pub fn allocate(&mut self, name: &str) -> SchemaResult<String> {
        if let Some(code) = self.codes.get(name) {
            return Ok(code.clone());
        }

        let words: Vec<&str> = name.split('_').collect();
        for width in 1..=name.len() {
            let candidate: String = words
                .iter()
                .flat_map(|w| w.chars().take(width))
                .collect::<String>()
                .to_uppercase();

            if !self.codes.values().any(|c| c == &candidate) {
                if width > 1 {
                    tracing::debug!(name, code = %candidate, width, "widened namespace code");
                }
                self.codes.insert(name.to_string(), candidate.clone());
                return Ok(candidate);
            }
        }

        Err(SchemaError::AllocationExhausted(name.to_string()))
    }

    /// Pin a code for a name, overriding allocation.
    pub fn set(&mut self, name: impl Into<String>, code: impl Into<String>) {
        self.codes.insert(name.into(), code.into());
    }

    /// The code previously given to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.codes.get(name).map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_is_memoized() {
        let mut ns = NamespaceAllocator::new();
        let a = ns.allocate("my_app").unwrap();
        let b = ns.allocate("my_app").unwrap();
        assert_eq!(a, "MA");
        assert_eq!(a, b);
    }

    #[test]
    fn collision_widens_prefix() {
        let mut ns = NamespaceAllocator::new();
        assert_eq!(ns.allocate("my_app").unwrap(), "MA");
        // First-letter abbreviation collides; the second name widens to 2.
        assert_eq!(ns.allocate("main_archive").unwrap(), "MAAR");
    }

    #[test]
    fn widths_increase_strictly() {
        let mut ns = NamespaceAllocator::new();
        ns.set("a", "A");
        ns.set("b", "AB");
        // "abc" tries A (taken), then AB (taken), then ABC.
        assert_eq!(ns.allocate("abc").unwrap(), "ABC");
    }

    #[test]
    fn exhaustion_is_fatal() {
        let mut ns = NamespaceAllocator::new();
        ns.set("x", "A");
        ns.set("y", "AB");
        let err = ns.allocate("ab").unwrap_err();
        assert!(matches!(err, SchemaError::AllocationExhausted(ref n) if n == "ab"));
    }

    #[test]
    fn pinned_code_wins() {
        let mut ns = NamespaceAllocator::new();
        ns.set("my_app", "CUSTOM");
        assert_eq!(ns.allocate("my_app").unwrap(), "CUSTOM");
    }
}
