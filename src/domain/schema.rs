//! Field shape of a group, derived from its seed and checked against members.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::entities::{Field, FieldKind};
use crate::domain::traits::DataItem;

/// What to do when group members do not share the seed's shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaPolicy {
    /// Do not validate; unmatched fields degrade silently.
    #[default]
    Ignore,
    /// Validate, log and report divergences, but still aggregate.
    Warn,
    /// Abort on the first divergent group.
    Strict,
}

impl fmt::Display for SchemaPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaPolicy::Ignore => write!(f, "ignore"),
            SchemaPolicy::Warn => write!(f, "warn"),
            SchemaPolicy::Strict => write!(f, "strict"),
        }
    }
}

impl FromStr for SchemaPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ignore" => Ok(SchemaPolicy::Ignore),
            "warn" => Ok(SchemaPolicy::Warn),
            "strict" => Ok(SchemaPolicy::Strict),
            other => Err(format!(
                "unknown schema policy '{}' (expected ignore, warn or strict)",
                other
            )),
        }
    }
}

/// How a member deviates from the seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DivergenceKind {
    /// Present on the seed, absent on the member
    Missing,
    /// Present on the member, absent on the seed
    Unexpected,
    /// Same name, different shape
    KindMismatch { expected: String, found: String },
}

/// One shape difference, located by a `/`-separated field path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDivergence {
    /// Name of the member item that diverges
    pub item: String,
    pub path: String,
    #[serde(flatten)]
    pub kind: DivergenceKind,
}

impl fmt::Display for SchemaDivergence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DivergenceKind::Missing => write!(f, "{}: missing field '{}'", self.item, self.path),
            DivergenceKind::Unexpected => {
                write!(f, "{}: unexpected field '{}'", self.item, self.path)
            }
            DivergenceKind::KindMismatch { expected, found } => write!(
                f,
                "{}: field '{}' is {} (expected {})",
                self.item, self.path, found, expected
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct FieldShape {
    name: String,
    kind: FieldKind,
    /// Only populated for branches
    children: Vec<FieldShape>,
}

impl FieldShape {
    fn of(field: &Field) -> Self {
        let children = match field.kind() {
            FieldKind::Branch => field.children().iter().map(FieldShape::of).collect(),
            _ => Vec::new(),
        };
        Self {
            name: field.name.clone(),
            kind: field.kind(),
            children,
        }
    }
}

/// Expected field layout for every member of a group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSchema {
    fields: Vec<FieldShape>,
}

impl GroupSchema {
    /// Derive the schema from the group's seed.
    pub fn from_item<I: DataItem + ?Sized>(seed: &I) -> Self {
        Self {
            fields: seed.fields().iter().map(FieldShape::of).collect(),
        }
    }

    /// Compare `item` against the schema. Empty when shapes agree.
    pub fn validate<I: DataItem + ?Sized>(&self, item: &I) -> Vec<SchemaDivergence> {
        let mut out = Vec::new();
        compare(&self.fields, item.fields(), "", item.name(), &mut out);
        out
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", prefix, name)
    }
}

fn compare(
    expected: &[FieldShape],
    actual: &[Field],
    prefix: &str,
    item: &str,
    out: &mut Vec<SchemaDivergence>,
) {
    let mut by_name: HashMap<&str, &Field> = HashMap::with_capacity(actual.len());
    for field in actual {
        by_name.entry(field.name.as_str()).or_insert(field);
    }

    let mut known = HashSet::with_capacity(expected.len());
    for shape in expected {
        if !known.insert(shape.name.as_str()) {
            continue;
        }
        let path = join(prefix, &shape.name);
        let Some(field) = by_name.get(shape.name.as_str()) else {
            out.push(SchemaDivergence {
                item: item.to_string(),
                path,
                kind: DivergenceKind::Missing,
            });
            continue;
        };
        let found = field.kind();
        if found != shape.kind {
            out.push(SchemaDivergence {
                item: item.to_string(),
                path,
                kind: DivergenceKind::KindMismatch {
                    expected: shape.kind.to_string(),
                    found: found.to_string(),
                },
            });
        } else if found == FieldKind::Branch {
            compare(&shape.children, field.children(), &path, item, out);
        }
    }

    let mut reported = HashSet::new();
    for field in actual {
        let name = field.name.as_str();
        if !known.contains(name) && reported.insert(name) {
            out.push(SchemaDivergence {
                item: item.to_string(),
                path: join(prefix, name),
                kind: DivergenceKind::Unexpected,
            });
        }
    }
}
