//! Rendering summaries as JSON, TOML or a text tree.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use termtree::Tree;

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{Field, FieldContent, GroupDivergences, Item, Section};

/// How a summary is written out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Toml,
    #[default]
    Tree,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Toml => write!(f, "toml"),
            OutputFormat::Tree => write!(f, "tree"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "toml" => Ok(OutputFormat::Toml),
            "tree" => Ok(OutputFormat::Tree),
            other => Err(format!(
                "unknown output format '{}' (expected json, toml or tree)",
                other
            )),
        }
    }
}

/// Serialized shape of a summary.
#[derive(Debug, Serialize)]
struct Report<'a> {
    sections: &'a [Section],
    #[serde(skip_serializing_if = "no_divergences")]
    divergences: &'a [GroupDivergences],
}

fn no_divergences(divergences: &&[GroupDivergences]) -> bool {
    divergences.is_empty()
}

/// Render sections (and any schema findings) in `format`.
///
/// `precision` only affects the tree format.
pub fn render(
    sections: &[Section],
    divergences: &[GroupDivergences],
    format: OutputFormat,
    precision: usize,
) -> ApplicationResult<String> {
    let report = Report {
        sections,
        divergences,
    };
    let render_err = |message: String| ApplicationError::Render {
        format: format.to_string(),
        message,
    };
    match format {
        OutputFormat::Json => {
            serde_json::to_string_pretty(&report).map_err(|e| render_err(e.to_string()))
        }
        OutputFormat::Toml => {
            toml::to_string_pretty(&report).map_err(|e| render_err(e.to_string()))
        }
        OutputFormat::Tree => Ok(sections_tree(sections, precision).to_string()),
    }
}

/// Build the display tree for a list of sections.
pub fn sections_tree(sections: &[Section], precision: usize) -> Tree<String> {
    Tree::new("sections".to_string())
        .with_leaves(sections.iter().map(|s| s.to_tree(precision)))
}

/// Conversion of a data node into a printable tree.
pub trait ToTree {
    fn to_tree(&self, precision: usize) -> Tree<String>;
}

impl ToTree for Section {
    fn to_tree(&self, precision: usize) -> Tree<String> {
        Tree::new(format!("{} [{}]", self.name, self.sorting))
            .with_leaves(self.items.iter().map(|i| i.to_tree(precision)))
    }
}

impl ToTree for Item {
    fn to_tree(&self, precision: usize) -> Tree<String> {
        Tree::new(format!("{} (group {})", self.name, self.grouping))
            .with_leaves(self.fields.iter().map(|f| f.to_tree(precision)))
    }
}

impl ToTree for Field {
    fn to_tree(&self, precision: usize) -> Tree<String> {
        let mut label = match &self.content {
            FieldContent::Value { value, .. } => format!("{}: {:.*}", self.name, precision, value),
            FieldContent::Branch(_) => self.name.clone(),
            FieldContent::Empty => format!("{}: -", self.name),
        };
        if !self.should_receive_styling {
            label.push_str(" (plain)");
        }
        Tree::new(label).with_leaves(self.children().iter().map(|c| c.to_tree(precision)))
    }
}
