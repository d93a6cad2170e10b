//! Partition a section's items by grouping key.

use itertools::Itertools;

use crate::domain::traits::DataItem;

/// Items sharing one grouping key.
///
/// The seed is the first member in list order; followers keep their relative
/// order.
#[derive(Debug)]
pub struct Group<'a, I> {
    pub key: i64,
    pub seed: &'a I,
    pub followers: Vec<&'a I>,
}

// Never empty: a group always holds its seed.
#[allow(clippy::len_without_is_empty)]
impl<'a, I> Group<'a, I> {
    /// Number of original items, seed included.
    pub fn len(&self) -> usize {
        self.followers.len() + 1
    }

    /// Seed followed by followers, in original order.
    pub fn members(&self) -> impl Iterator<Item = &'a I> + '_ {
        std::iter::once(self.seed).chain(self.followers.iter().copied())
    }
}

/// Bucket items by `grouping`, ascending by key.
pub fn group_items<I: DataItem>(items: &[I]) -> Vec<Group<'_, I>> {
    items
        .iter()
        .into_group_map_by(|item| item.grouping())
        .into_iter()
        .sorted_by_key(|(key, _)| *key)
        .filter_map(|(key, members)| {
            let mut members = members.into_iter();
            let seed = members.next()?;
            Some(Group {
                key,
                seed,
                followers: members.collect(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Item;

    fn item(name: &str, grouping: i64) -> Item {
        Item::new(name, 0, grouping, vec![])
    }

    #[test]
    fn given_items_when_grouping_then_buckets_ascend_by_key() {
        let items = vec![item("a", 7), item("b", -1), item("c", 3)];

        let groups = group_items(&items);

        let keys: Vec<_> = groups.iter().map(|g| g.key).collect();
        assert_eq!(keys, vec![-1, 3, 7]);
    }

    #[test]
    fn given_shared_key_when_grouping_then_first_item_is_seed() {
        let items = vec![item("x", 2), item("y", 1), item("z", 2), item("w", 2)];

        let groups = group_items(&items);

        let group = groups.iter().find(|g| g.key == 2).unwrap();
        assert_eq!(group.seed.name, "x");
        let followers: Vec<_> = group.followers.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(followers, vec!["z", "w"]);
        assert_eq!(group.len(), 3);
    }

    #[test]
    fn given_no_items_when_grouping_then_no_groups() {
        let items: Vec<Item> = vec![];
        assert!(group_items(&items).is_empty());
    }
}
