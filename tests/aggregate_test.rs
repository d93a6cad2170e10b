//! Aggregation engine behavior on whole sections.

use approx::assert_relative_eq;
use rstest::rstest;

use datasummary::domain::{
    aggregate, validate, Aggregator, DataItem, DataSection, DivergenceKind, DomainError, Field,
    Item, Named, SchemaPolicy, Section, Sortable, AVERAGE_FIELD, COUNT_FIELD, DISPERSION_FIELD,
    ZERO_OR_ONE_FIELD,
};
use datasummary::util::testing::init_test_setup;

fn row(name: &str, sorting: i64, grouping: i64, fields: Vec<Field>) -> Item {
    Item::new(name, sorting, grouping, fields)
}

fn value_of(item: &Item, name: &str) -> f64 {
    item.field(name)
        .and_then(Field::scalar)
        .unwrap_or_else(|| panic!("no value field '{}'", name))
}

fn annotation(item: &Item, field: &str, child: &str) -> f64 {
    item.field(field)
        .and_then(|f| f.child(child))
        .and_then(Field::scalar)
        .unwrap_or_else(|| panic!("no annotation '{}/{}'", field, child))
}

// ============================================================
// Worked scenarios
// ============================================================

#[test]
fn given_two_items_in_group_when_aggregating_then_sums_and_derives_stats() {
    init_test_setup();
    let section = Section::new(
        "Scores",
        0,
        vec![
            row("first", 1, 0, vec![Field::value("Field1", 0, 3.0)]),
            row("second", 2, 0, vec![Field::value("Field1", 0, 5.0)]),
        ],
    );

    let result = aggregate(&[section]);

    let item = &result[0].items[0];
    assert_eq!(value_of(item, "Field1"), 8.0);
    assert_relative_eq!(annotation(item, "Field1", AVERAGE_FIELD), 4.0);
    assert_relative_eq!(annotation(item, "Field1", DISPERSION_FIELD), 1.0);
    assert_eq!(value_of(item, COUNT_FIELD), 2.0);
}

#[test]
fn given_single_item_group_when_aggregating_then_stats_are_trivial() {
    let section = Section::new(
        "Scores",
        0,
        vec![row("only", 0, 4, vec![Field::value("Field1", 0, 7.0)])],
    );

    let result = aggregate(&[section]);

    let item = &result[0].items[0];
    assert_eq!(item.grouping, 4);
    assert_eq!(value_of(item, "Field1"), 7.0);
    assert_relative_eq!(annotation(item, "Field1", AVERAGE_FIELD), 7.0);
    assert_relative_eq!(annotation(item, "Field1", DISPERSION_FIELD), 0.0);
    assert_eq!(value_of(item, COUNT_FIELD), 1.0);
    assert_eq!(value_of(item, ZERO_OR_ONE_FIELD), 0.0);
}

#[test]
fn given_zero_one_values_when_aggregating_then_counts_followers_only() {
    let section = Section::new(
        "Flags",
        0,
        vec![
            row("seed", 0, 1, vec![Field::value("F", 0, 0.0)]),
            row("one", 1, 1, vec![Field::value("F", 0, 1.0)]),
            row("four", 2, 1, vec![Field::value("F", 0, 4.0)]),
        ],
    );

    let result = aggregate(&[section]);

    let item = &result[0].items[0];
    assert_eq!(value_of(item, ZERO_OR_ONE_FIELD), 1.0);
    assert_eq!(value_of(item, "F"), 5.0);
    assert_eq!(value_of(item, COUNT_FIELD), 3.0);
}

#[test]
fn given_field_missing_on_follower_when_aggregating_then_seed_value_unchanged() {
    let section = Section::new(
        "Partial",
        0,
        vec![
            row(
                "seed",
                0,
                0,
                vec![Field::value("a", 0, 2.0), Field::value("b", 1, 10.0)],
            ),
            row("follower", 1, 0, vec![Field::value("a", 0, 3.0)]),
        ],
    );

    let result = aggregate(&[section]);

    let item = &result[0].items[0];
    assert_eq!(value_of(item, "a"), 5.0);
    assert_eq!(value_of(item, "b"), 10.0);
}

// ============================================================
// Structural properties
// ============================================================

#[test]
fn given_sections_when_aggregating_then_preserves_count_names_and_order() {
    let sections = vec![
        Section::new("second", 5, vec![row("r", 0, 0, vec![])]),
        Section::new("first", 1, vec![]),
    ];

    let result = aggregate(&sections);

    let names: Vec<_> = result.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["second", "first"]);
    assert_eq!(result[0].sorting, 5);
    assert!(result[1].items.is_empty());
}

#[test]
fn given_interleaved_groups_when_aggregating_then_one_item_per_key_ascending() {
    let section = Section::new(
        "S",
        0,
        vec![
            row("a", 0, 9, vec![Field::value("v", 0, 1.0)]),
            row("b", 1, 2, vec![Field::value("v", 0, 2.0)]),
            row("c", 2, 9, vec![Field::value("v", 0, 3.0)]),
        ],
    );

    let result = aggregate(&[section]);

    let keys: Vec<_> = result[0].items.iter().map(|i| i.grouping).collect();
    assert_eq!(keys, vec![2, 9]);
    assert_eq!(result[0].items[1].name, "a");
    assert_eq!(value_of(&result[0].items[1], "v"), 4.0);
}

#[test]
fn given_summary_item_when_aggregating_then_count_and_zero_or_one_come_last() {
    let section = Section::new(
        "S",
        0,
        vec![
            row(
                "a",
                0,
                0,
                vec![Field::value("x", 0, 1.0), Field::value("y", 1, 2.0)],
            ),
            row(
                "b",
                1,
                0,
                vec![Field::value("x", 0, 1.0), Field::value("y", 1, 2.0)],
            ),
        ],
    );

    let result = aggregate(&[section]);

    let fields = &result[0].items[0].fields;
    let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["x", "y", COUNT_FIELD, ZERO_OR_ONE_FIELD]);
    assert_eq!(fields[2].sorting, 2);
    assert_eq!(fields[3].sorting, 3);
    assert!(fields[2].should_receive_styling);
    assert!(!fields[3].should_receive_styling);
}

#[test]
fn given_nested_values_when_aggregating_then_sums_recursively_without_annotations() {
    let nested = |v: f64| {
        Field::branch(
            "group",
            0,
            vec![Field::value("leaf", 0, v), Field::value("other", 1, 1.0)],
        )
    };
    let section = Section::new(
        "S",
        0,
        vec![
            row("a", 0, 0, vec![nested(2.0)]),
            row("b", 1, 0, vec![nested(3.0)]),
        ],
    );

    let result = aggregate(&[section]);

    let group = result[0].items[0].field("group").unwrap();
    assert_eq!(group.child("leaf").and_then(Field::scalar), Some(5.0));
    assert_eq!(group.child("other").and_then(Field::scalar), Some(2.0));
    assert!(group.child(AVERAGE_FIELD).is_none());
    assert!(group.child("leaf").unwrap().children().is_empty());
}

#[rstest]
#[case(vec![1.0, 2.0, 3.0, 4.0])]
#[case(vec![0.5, 0.5])]
#[case(vec![-3.0, 10.0, 7.5])]
fn given_group_values_when_aggregating_then_average_is_sum_over_count(#[case] values: Vec<f64>) {
    let items = values
        .iter()
        .enumerate()
        .map(|(i, v)| row("r", i as i64, 0, vec![Field::value("v", 0, *v)]))
        .collect();
    let section = Section::new("S", 0, items);

    let result = aggregate(&[section]);

    let item = &result[0].items[0];
    let sum: f64 = values.iter().sum();
    let n = values.len() as f64;
    assert_relative_eq!(value_of(item, "v"), sum, epsilon = 1e-12);
    assert_relative_eq!(annotation(item, "v", AVERAGE_FIELD), sum / n, epsilon = 1e-12);
    assert_eq!(value_of(item, COUNT_FIELD), n);
}

// ============================================================
// Schema policies
// ============================================================

fn divergent_section() -> Section {
    Section::new(
        "S",
        0,
        vec![
            row(
                "seed",
                0,
                3,
                vec![Field::value("a", 0, 1.0), Field::value("b", 1, 1.0)],
            ),
            row(
                "follower",
                1,
                3,
                vec![Field::value("a", 0, 1.0), Field::value("c", 1, 1.0)],
            ),
        ],
    )
}

#[test]
fn given_divergent_group_when_validating_then_reports_missing_and_unexpected() {
    let found = validate(&[divergent_section()]);

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].section, "S");
    assert_eq!(found[0].group, 3);
    let kinds: Vec<_> = found[0]
        .divergences
        .iter()
        .map(|d| (d.path.as_str(), d.kind.clone()))
        .collect();
    assert!(kinds.contains(&("b", DivergenceKind::Missing)));
    assert!(kinds.contains(&("c", DivergenceKind::Unexpected)));
}

#[rstest]
#[case(SchemaPolicy::Ignore, 0)]
#[case(SchemaPolicy::Warn, 1)]
fn given_lenient_policy_when_running_then_aggregates_and_reports(
    #[case] policy: SchemaPolicy,
    #[case] reported: usize,
) {
    init_test_setup();

    let summary = Aggregator::new(policy)
        .run(&[divergent_section()])
        .expect("lenient policies never fail");

    assert_eq!(summary.divergences.len(), reported);
    assert_eq!(value_of(&summary.sections[0].items[0], "a"), 2.0);
}

#[test]
fn given_strict_policy_when_running_divergent_group_then_fails() {
    let err = Aggregator::new(SchemaPolicy::Strict)
        .run(&[divergent_section()])
        .unwrap_err();

    match err {
        DomainError::SchemaMismatch {
            section,
            group,
            divergences,
        } => {
            assert_eq!(section, "S");
            assert_eq!(group, 3);
            assert_eq!(divergences.len(), 2);
        }
    }
}

#[test]
fn given_parallel_and_sequential_runs_when_comparing_then_identical() {
    let sections: Vec<Section> = (0..8)
        .map(|s| {
            Section::new(
                format!("section {}", s),
                s,
                (0..20)
                    .map(|i| row("r", i, i % 3, vec![Field::value("v", 0, (i * s) as f64)]))
                    .collect(),
            )
        })
        .collect();

    let parallel = Aggregator::default().run(&sections).unwrap();
    let sequential = Aggregator::default()
        .with_parallel(false)
        .run(&sections)
        .unwrap();

    assert_eq!(parallel, sequential);
}

// ============================================================
// Caller-supplied types
// ============================================================

struct Measurement {
    label: String,
    position: i64,
    batch: i64,
    readings: Vec<Field>,
}

impl Named for Measurement {
    fn name(&self) -> &str {
        &self.label
    }
}

impl Sortable for Measurement {
    fn sorting(&self) -> i64 {
        self.position
    }
}

impl DataItem for Measurement {
    fn grouping(&self) -> i64 {
        self.batch
    }

    fn fields(&self) -> &[Field] {
        &self.readings
    }
}

struct Sheet {
    measurements: Vec<Measurement>,
}

impl Named for Sheet {
    fn name(&self) -> &str {
        "sheet"
    }
}

impl Sortable for Sheet {
    fn sorting(&self) -> i64 {
        7
    }
}

impl DataSection for Sheet {
    type Item = Measurement;

    fn items(&self) -> &[Measurement] {
        &self.measurements
    }
}

#[test]
fn given_custom_section_type_when_aggregating_then_produces_concrete_summary() {
    let measurement = |label: &str, position: i64, v: f64| Measurement {
        label: label.to_string(),
        position,
        batch: 1,
        readings: vec![Field::value("temp", 0, v)],
    };
    let sheet = Sheet {
        measurements: vec![measurement("m1", 0, 20.0), measurement("m2", 1, 22.0)],
    };

    let result = aggregate(&[sheet]);

    assert_eq!(result[0].name, "sheet");
    assert_eq!(result[0].sorting, 7);
    let item = &result[0].items[0];
    assert_eq!(item.name, "m1");
    assert_eq!(value_of(item, "temp"), 42.0);
    assert_relative_eq!(annotation(item, "temp", AVERAGE_FIELD), 21.0);
}
