//! Unique class-name allocation
//!
//! The IDE injects per-instance style edits by targeting a class that is
//! unique to one `(selection, prop)` pair. The allocator hands out stable
//! identifiers on first request and reuses them for the lifetime of the
//! hosting context. Owned by the host application, not a global.

use std::collections::HashMap;
use viewbridge_selection::Selection;

/// Allocates stable, unique class names per `(selection uid, prop name)`.
#[derive(Debug, Default)]
pub struct ClassNameAllocator {
    classes: HashMap<String, String>,
}

impl ClassNameAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the class for the pair, allocating on first use.
    pub fn class_for(&mut self, selection: &Selection, prop_name: &str) -> String {
        let key = format!("{}{}", selection.uid(), prop_name);

        if let Some(existing) = self.classes.get(&key) {
            return existing.clone();
        }

        let class = format!("-viewbridge-identifier{}", self.classes.len());
        self.classes.insert(key, class.clone());
        class
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_is_stable() {
        let mut allocator = ClassNameAllocator::new();
        let selection = Selection::entry("btn1");

        let first = allocator.class_for(&selection, "root");
        let second = allocator.class_for(&selection, "root");
        assert_eq!(first, second);
        assert_eq!(allocator.len(), 1);
    }

    #[test]
    fn test_distinct_pairs_get_distinct_classes() {
        let mut allocator = ClassNameAllocator::new();
        let a = Selection::entry("btn1");
        let b = Selection::entry("btn2");

        let c1 = allocator.class_for(&a, "root");
        let c2 = allocator.class_for(&a, "icon");
        let c3 = allocator.class_for(&b, "root");

        assert_ne!(c1, c2);
        assert_ne!(c1, c3);
        assert_ne!(c2, c3);
    }
}
