//! Derived statistics appended to a merged group item.

use crate::domain::entities::{Field, FieldContent, Item};
use crate::domain::grouping::Group;
use crate::domain::traits::DataItem;

/// Mean of a value field across the group, appended as its child.
pub const AVERAGE_FIELD: &str = "AVG";
/// Dispersion of a value field across the group, appended as its child.
pub const DISPERSION_FIELD: &str = "SD";
/// Number of items in the group, appended to the summary item.
pub const COUNT_FIELD: &str = "Count";
/// Number of follower values equal to exactly 0 or 1.
pub const ZERO_OR_ONE_FIELD: &str = "0 or 1";

/// Decorate `merged` with AVG/SD per value field, then Count and "0 or 1".
///
/// `group` supplies the original, pre-merge members. Branch and empty fields
/// stay in the summary, undecorated, so `Count.sorting` counts them too.
/// The summary's `grouping` is the group key.
pub fn synthesize<I: DataItem>(merged: Item, group: &Group<'_, I>) -> Item {
    let n = group.len() as f64;
    let mut fields: Vec<Field> = merged
        .fields
        .into_iter()
        .map(|field| decorate(field, group, n))
        .collect();

    fields.push(Field::value(COUNT_FIELD, fields.len() as i64, n));

    let zero_or_one = zero_or_one_count(group);
    fields.push(
        Field::value(ZERO_OR_ONE_FIELD, fields.len() as i64, zero_or_one as f64).unstyled(),
    );

    Item {
        name: merged.name,
        sorting: merged.sorting,
        grouping: group.key,
        fields,
    }
}

fn decorate<I: DataItem>(field: Field, group: &Group<'_, I>, n: f64) -> Field {
    let (value, mut children) = match field.content {
        FieldContent::Value { value, children } => (value, children),
        content => return Field { content, ..field },
    };

    let average = value / n;
    children.push(Field::value(AVERAGE_FIELD, children.len() as i64, average));

    let values = group
        .members()
        .flat_map(|item| item.fields())
        .filter(|f| f.name == field.name)
        .filter_map(Field::scalar);
    let sd = dispersion(values, average, n);
    children.push(Field::value(DISPERSION_FIELD, children.len() as i64, sd).unstyled());

    Field {
        content: FieldContent::Value { value, children },
        ..field
    }
}

/// `sqrt( Σ sqrt(|v − average|) / n )`.
///
/// This is not a textbook standard deviation: distances are square-rooted
/// instead of squared. Downstream thresholds are calibrated against it.
pub fn dispersion(values: impl IntoIterator<Item = f64>, average: f64, n: f64) -> f64 {
    let sum: f64 = values
        .into_iter()
        .map(|v| (v - average).abs().sqrt())
        .sum();
    (sum / n).sqrt()
}

/// Count follower (non-seed) item-level fields holding exactly 0 or 1.
fn zero_or_one_count<I: DataItem>(group: &Group<'_, I>) -> usize {
    group
        .followers
        .iter()
        .copied()
        .flat_map(|item| item.fields())
        .filter_map(Field::scalar)
        .filter(|&v| v == 0.0 || v == 1.0)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn given_equal_values_when_computing_dispersion_then_zero() {
        assert_relative_eq!(dispersion([2.0, 2.0, 2.0], 2.0, 3.0), 0.0);
    }

    #[test]
    fn given_values_when_computing_dispersion_then_uses_root_distances() {
        // |0-2| = 2, |4-2| = 2 → (sqrt 2 + sqrt 2) / 2 = sqrt 2 → sqrt(sqrt 2)
        let sd = dispersion([0.0, 4.0], 2.0, 2.0);
        assert_relative_eq!(sd, 2.0_f64.sqrt().sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn given_branch_field_when_synthesizing_then_not_decorated() {
        let seed = Item::new(
            "row",
            0,
            4,
            vec![Field::branch("b", 0, vec![Field::value("x", 0, 1.0)])],
        );
        let group = Group {
            key: 4,
            seed: &seed,
            followers: vec![],
        };

        let summary = synthesize(seed.clone(), &group);

        assert_eq!(summary.fields[0], seed.fields[0]);
        assert_eq!(summary.fields[1].name, COUNT_FIELD);
        assert_eq!(summary.fields[1].sorting, 1);
        assert_eq!(summary.fields[2].name, ZERO_OR_ONE_FIELD);
        assert_eq!(summary.fields[2].sorting, 2);
        assert!(!summary.fields[2].should_receive_styling);
    }

    #[test]
    fn given_existing_annotations_when_synthesizing_then_appends_after_them() {
        let seed = Item::new(
            "row",
            0,
            1,
            vec![Field::new("F", 0, Some(7.0), Some(vec![Field::value("note", 0, 1.0)]))],
        );
        let group = Group {
            key: 1,
            seed: &seed,
            followers: vec![],
        };

        let summary = synthesize(seed.clone(), &group);

        let children = summary.fields[0].children();
        let names: Vec<_> = children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["note", AVERAGE_FIELD, DISPERSION_FIELD]);
        assert_eq!(children[1].sorting, 1);
        assert_eq!(children[2].sorting, 2);
        assert!(!children[2].should_receive_styling);
    }
}
