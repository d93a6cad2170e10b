//! Domain entities: the Section → Item → Field tree

use serde::{Deserialize, Serialize};

use crate::domain::traits::{sort_by_sorting, DataItem, DataSection, Named, Sortable};

/// A titled group of items, e.g. one table of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawSection")]
pub struct Section {
    pub name: String,
    pub sorting: i64,
    /// Items, ascending by `sorting`
    pub items: Vec<Item>,
}

impl Section {
    /// Create a section; items are stably sorted by `sorting`.
    pub fn new(name: impl Into<String>, sorting: i64, mut items: Vec<Item>) -> Self {
        sort_by_sorting(&mut items);
        Self {
            name: name.into(),
            sorting,
            items,
        }
    }
}

/// One data row. Items sharing a `grouping` collapse into one summary item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawItem")]
pub struct Item {
    pub name: String,
    pub sorting: i64,
    /// Identity key used for grouping only, never for display order
    pub grouping: i64,
    /// Fields, ascending by `sorting`
    pub fields: Vec<Field>,
}

impl Item {
    /// Create an item; fields are stably sorted by `sorting`.
    pub fn new(
        name: impl Into<String>,
        sorting: i64,
        grouping: i64,
        mut fields: Vec<Field>,
    ) -> Self {
        sort_by_sorting(&mut fields);
        Self {
            name: name.into(),
            sorting,
            grouping,
            fields,
        }
    }

    /// Copy any `DataItem` into the concrete representation.
    pub fn from_data<I: DataItem + ?Sized>(item: &I) -> Self {
        Self::new(
            item.name(),
            item.sorting(),
            item.grouping(),
            item.fields().to_vec(),
        )
    }

    /// First field with the given name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// A named cell of an item, either a scalar or a sub-tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawField", into = "RawField")]
pub struct Field {
    pub name: String,
    pub sorting: i64,
    pub content: FieldContent,
    /// Hint for renderers; synthesized dispersion/occurrence fields opt out
    pub should_receive_styling: bool,
}

/// What a field carries.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldContent {
    /// A scalar. `children` holds annotations such as AVG/SD on summaries.
    Value { value: f64, children: Vec<Field> },
    /// A sub-tree of fields, ascending by `sorting`.
    Branch(Vec<Field>),
    /// Neither value nor children.
    Empty,
}

/// Shape of a field, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Value,
    Branch,
    Empty,
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldKind::Value => write!(f, "value"),
            FieldKind::Branch => write!(f, "branch"),
            FieldKind::Empty => write!(f, "empty"),
        }
    }
}

impl Field {
    /// Build a field from the optional value / optional children pair.
    ///
    /// When both are given the value is authoritative and the children are kept
    /// as annotations of the value.
    pub fn new(
        name: impl Into<String>,
        sorting: i64,
        value: Option<f64>,
        children: Option<Vec<Field>>,
    ) -> Self {
        let content = match (value, children) {
            (Some(value), children) => {
                let mut children = children.unwrap_or_default();
                sort_by_sorting(&mut children);
                FieldContent::Value { value, children }
            }
            (None, Some(mut children)) => {
                sort_by_sorting(&mut children);
                FieldContent::Branch(children)
            }
            (None, None) => FieldContent::Empty,
        };
        Self {
            name: name.into(),
            sorting,
            content,
            should_receive_styling: true,
        }
    }

    pub fn value(name: impl Into<String>, sorting: i64, value: f64) -> Self {
        Self::new(name, sorting, Some(value), None)
    }

    pub fn branch(name: impl Into<String>, sorting: i64, children: Vec<Field>) -> Self {
        Self::new(name, sorting, None, Some(children))
    }

    pub fn empty(name: impl Into<String>, sorting: i64) -> Self {
        Self::new(name, sorting, None, None)
    }

    /// Same field, excluded from renderer styling.
    pub fn unstyled(mut self) -> Self {
        self.should_receive_styling = false;
        self
    }

    /// Scalar value, if this is a value field.
    pub fn scalar(&self) -> Option<f64> {
        match self.content {
            FieldContent::Value { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Children of either a branch or a value field's annotations.
    pub fn children(&self) -> &[Field] {
        match &self.content {
            FieldContent::Value { children, .. } | FieldContent::Branch(children) => children,
            FieldContent::Empty => &[],
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self.content {
            FieldContent::Value { .. } => FieldKind::Value,
            FieldContent::Branch(_) => FieldKind::Branch,
            FieldContent::Empty => FieldKind::Empty,
        }
    }

    /// First child with the given name.
    pub fn child(&self, name: &str) -> Option<&Field> {
        self.children().iter().find(|f| f.name == name)
    }
}

impl Named for Section {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Sortable for Section {
    fn sorting(&self) -> i64 {
        self.sorting
    }
}

impl DataSection for Section {
    type Item = Item;

    fn items(&self) -> &[Item] {
        &self.items
    }
}

impl Named for Item {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Sortable for Item {
    fn sorting(&self) -> i64 {
        self.sorting
    }
}

impl DataItem for Item {
    fn grouping(&self) -> i64 {
        self.grouping
    }

    fn fields(&self) -> &[Field] {
        &self.fields
    }
}

impl Named for Field {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Sortable for Field {
    fn sorting(&self) -> i64 {
        self.sorting
    }
}

// ============================================================
// Wire shapes
// ============================================================

fn default_styling() -> bool {
    true
}

/// Serialized field: optional value and optional children side by side.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawField {
    name: String,
    #[serde(default)]
    sorting: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<Field>>,
    #[serde(default = "default_styling")]
    should_receive_styling: bool,
}

impl From<RawField> for Field {
    fn from(raw: RawField) -> Self {
        let mut field = Field::new(raw.name, raw.sorting, raw.value, raw.children);
        field.should_receive_styling = raw.should_receive_styling;
        field
    }
}

impl From<Field> for RawField {
    fn from(field: Field) -> Self {
        let (value, children) = match field.content {
            FieldContent::Value { value, children } if children.is_empty() => (Some(value), None),
            FieldContent::Value { value, children } => (Some(value), Some(children)),
            FieldContent::Branch(children) => (None, Some(children)),
            FieldContent::Empty => (None, None),
        };
        Self {
            name: field.name,
            sorting: field.sorting,
            value,
            children,
            should_receive_styling: field.should_receive_styling,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawItem {
    name: String,
    #[serde(default)]
    sorting: i64,
    #[serde(default)]
    grouping: i64,
    #[serde(default)]
    fields: Vec<Field>,
}

impl From<RawItem> for Item {
    fn from(raw: RawItem) -> Self {
        Item::new(raw.name, raw.sorting, raw.grouping, raw.fields)
    }
}

#[derive(Debug, Deserialize)]
struct RawSection {
    name: String,
    #[serde(default)]
    sorting: i64,
    #[serde(default)]
    items: Vec<Item>,
}

impl From<RawSection> for Section {
    fn from(raw: RawSection) -> Self {
        Section::new(raw.name, raw.sorting, raw.items)
    }
}
