//! Capability traits shared by every node of the data tree.
//!
//! The aggregation engine only needs a name and a sort key from caller-supplied
//! sections and items, so callers can feed their own types as long as they
//! implement these traits.

use crate::domain::entities::Field;

/// Something with a display name.
pub trait Named {
    fn name(&self) -> &str;
}

/// Something with an integer display order.
pub trait Sortable {
    fn sorting(&self) -> i64;
}

/// A row in a section: named, sortable, carrying a grouping key and fields.
///
/// Callers may bring their own item and section types, but fields are always
/// the concrete [`Field`]: merging and synthesis match on its content variant.
pub trait DataItem: Named + Sortable {
    /// Identity key used to collapse items into one summary item.
    fn grouping(&self) -> i64;

    /// Fields in display order.
    fn fields(&self) -> &[Field];
}

/// A titled collection of items.
pub trait DataSection: Named + Sortable {
    type Item: DataItem;

    /// Items in display order.
    fn items(&self) -> &[Self::Item];
}

/// Stable ascending sort by `sorting`.
pub fn sort_by_sorting<T: Sortable>(nodes: &mut [T]) {
    nodes.sort_by_key(|n| n.sorting());
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row(&'static str, i64);

    impl Sortable for Row {
        fn sorting(&self) -> i64 {
            self.1
        }
    }

    #[test]
    fn given_equal_sort_keys_when_sorting_then_keeps_insertion_order() {
        let mut rows = vec![Row("b", 2), Row("a1", 1), Row("c", 0), Row("a2", 1)];
        sort_by_sorting(&mut rows);
        let names: Vec<_> = rows.iter().map(|r| r.0).collect();
        assert_eq!(names, vec!["c", "a1", "a2", "b"]);
    }
}
