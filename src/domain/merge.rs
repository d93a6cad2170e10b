//! Fold group members into one item by summing fields matched by name.

use std::collections::HashMap;

use tracing::trace;

use crate::domain::entities::{Field, FieldContent, Item};
use crate::domain::traits::{sort_by_sorting, DataItem};

/// Where a sibling list lives; decides what happens to unmatched fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    /// Item-level fields: unmatched follower fields are added.
    Item,
    /// Children of a branch: unmatched follower fields are dropped.
    Nested,
}

/// Merge `follower` into `acc`, producing a new item.
///
/// The result keeps the accumulator's name, sorting and grouping.
pub fn merge_item<I: DataItem + ?Sized>(acc: &Item, follower: &I) -> Item {
    Item::new(
        acc.name.clone(),
        acc.sorting,
        acc.grouping,
        merge_fields(&acc.fields, follower.fields(), Scope::Item),
    )
}

/// Name → position lookup for one sibling list. Duplicate names: first wins.
fn name_index(fields: &[Field]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(fields.len());
    for (pos, field) in fields.iter().enumerate() {
        index.entry(field.name.clone()).or_insert(pos);
    }
    index
}

fn merge_fields(acc: &[Field], follower: &[Field], scope: Scope) -> Vec<Field> {
    let mut merged = acc.to_vec();
    let mut index = name_index(acc);

    for incoming in follower {
        match index.get(&incoming.name).copied() {
            Some(pos) => merged[pos] = merge_pair(&merged[pos], incoming),
            None if scope == Scope::Item => {
                index.insert(incoming.name.clone(), merged.len());
                merged.push(adopt(incoming));
            }
            None => trace!(field = %incoming.name, "no counterpart in accumulator, dropped"),
        }
    }

    merged
}

/// Combine an accumulator field with the follower field of the same name.
fn merge_pair(base: &Field, incoming: &Field) -> Field {
    match &incoming.content {
        FieldContent::Value { value, .. } => Field {
            name: base.name.clone(),
            sorting: base.sorting,
            content: FieldContent::Value {
                value: base.scalar().unwrap_or(0.0) + value,
                children: Vec::new(),
            },
            should_receive_styling: base.should_receive_styling,
        },
        FieldContent::Branch(children) => match &base.content {
            FieldContent::Branch(base_children) => {
                let mut merged = merge_fields(base_children, children, Scope::Nested);
                sort_by_sorting(&mut merged);
                Field {
                    content: FieldContent::Branch(merged),
                    ..base.clone()
                }
            }
            _ => {
                trace!(
                    field = %base.name,
                    kind = %base.kind(),
                    "branch merged into non-branch, ignored"
                );
                base.clone()
            }
        },
        FieldContent::Empty => base.clone(),
    }
}

/// A follower field with no counterpart, as it enters the merged item.
fn adopt(incoming: &Field) -> Field {
    match &incoming.content {
        FieldContent::Value { value, .. } => Field {
            content: FieldContent::Value {
                value: *value,
                children: Vec::new(),
            },
            ..incoming.clone()
        },
        _ => incoming.clone(),
    }
}
