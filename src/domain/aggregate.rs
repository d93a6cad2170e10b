//! Section-level driver: group, merge and synthesize.

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::domain::entities::{Item, Section};
use crate::domain::error::{DomainError, DomainResult};
use crate::domain::grouping::{group_items, Group};
use crate::domain::merge::merge_item;
use crate::domain::schema::{GroupSchema, SchemaDivergence, SchemaPolicy};
use crate::domain::synthesis::synthesize;
use crate::domain::traits::{DataItem, DataSection};

/// Collapse every section's items into one summary item per grouping key.
///
/// Section names, sorting and order are preserved; items come out ascending
/// by grouping key. Never fails: divergent shapes degrade silently.
///
/// Running this on its own output is not meaningful: the synthesized fields
/// would be merged like data.
pub fn aggregate<S: DataSection>(sections: &[S]) -> Vec<Section> {
    sections
        .iter()
        .map(|section| summarize_section(section, false).0)
        .collect()
}

/// Check every group against its seed's shape without aggregating.
pub fn validate<S: DataSection>(sections: &[S]) -> Vec<GroupDivergences> {
    sections
        .iter()
        .flat_map(|section| {
            group_items(section.items())
                .iter()
                .filter_map(|group| {
                    let found = check_group(group);
                    (!found.is_empty()).then(|| GroupDivergences {
                        section: section.name().to_string(),
                        group: group.key,
                        divergences: found,
                    })
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Divergences found while validating one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupDivergences {
    pub section: String,
    pub group: i64,
    pub divergences: Vec<SchemaDivergence>,
}

/// Aggregated sections plus any schema findings.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub sections: Vec<Section>,
    pub divergences: Vec<GroupDivergences>,
}

/// Configurable aggregation run.
#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    policy: SchemaPolicy,
    parallel: bool,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new(SchemaPolicy::default())
    }
}

impl Aggregator {
    pub fn new(policy: SchemaPolicy) -> Self {
        Self {
            policy,
            parallel: true,
        }
    }

    /// Process sections on the rayon pool (default) or sequentially.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Aggregate `sections`, validating group shapes according to the policy.
    ///
    /// # Errors
    /// `DomainError::SchemaMismatch` for the first divergent group (in section,
    /// then key order) when the policy is `Strict`.
    #[instrument(
        level = "debug",
        skip_all,
        fields(sections = sections.len(), policy = %self.policy)
    )]
    pub fn run<S>(&self, sections: &[S]) -> DomainResult<Summary>
    where
        S: DataSection + Sync,
        S::Item: Sync,
    {
        let validate = self.policy != SchemaPolicy::Ignore;
        let results: Vec<(Section, Vec<GroupDivergences>)> = if self.parallel {
            sections
                .par_iter()
                .map(|section| summarize_section(section, validate))
                .collect()
        } else {
            sections
                .iter()
                .map(|section| summarize_section(section, validate))
                .collect()
        };

        let (sections, divergences): (Vec<_>, Vec<_>) = results.into_iter().unzip();
        let divergences: Vec<GroupDivergences> = divergences.into_iter().flatten().collect();

        let divergences = match self.policy {
            SchemaPolicy::Ignore => divergences,
            SchemaPolicy::Warn => {
                for group in &divergences {
                    for d in &group.divergences {
                        warn!(section = %group.section, group = group.group, "{}", d);
                    }
                }
                divergences
            }
            SchemaPolicy::Strict => {
                if let Some(first) = divergences.into_iter().next() {
                    return Err(DomainError::SchemaMismatch {
                        section: first.section,
                        group: first.group,
                        divergences: first.divergences,
                    });
                }
                Vec::new()
            }
        };

        Ok(Summary {
            sections,
            divergences,
        })
    }
}

fn summarize_section<S: DataSection>(
    section: &S,
    validate: bool,
) -> (Section, Vec<GroupDivergences>) {
    let groups = group_items(section.items());
    debug!(
        section = section.name(),
        items = section.items().len(),
        groups = groups.len(),
        "summarizing section"
    );

    let mut divergences = Vec::new();
    let mut items = Vec::with_capacity(groups.len());
    for group in &groups {
        if validate {
            let found = check_group(group);
            if !found.is_empty() {
                divergences.push(GroupDivergences {
                    section: section.name().to_string(),
                    group: group.key,
                    divergences: found,
                });
            }
        }
        items.push(summarize_group(group));
    }

    let summary = Section {
        name: section.name().to_string(),
        sorting: section.sorting(),
        items,
    };
    (summary, divergences)
}

/// Fold followers into the seed, then append the derived statistics.
fn summarize_group<I: DataItem>(group: &Group<'_, I>) -> Item {
    let seed = Item::from_data(group.seed);
    let merged = group
        .followers
        .iter()
        .fold(seed, |acc, follower| merge_item(&acc, *follower));
    synthesize(merged, group)
}

fn check_group<I: DataItem>(group: &Group<'_, I>) -> Vec<SchemaDivergence> {
    let schema = GroupSchema::from_item(group.seed);
    group
        .followers
        .iter()
        .flat_map(|member| schema.validate(*member))
        .collect()
}
