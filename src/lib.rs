//! datasummary: statistical summaries for grouped tabular data.
//!
//! Items sharing a grouping key collapse into one summary item whose fields
//! are summed by name and decorated with derived statistics:
//!
//! ```
//! use datasummary::domain::{aggregate, Field, Item, Section};
//!
//! let section = Section::new("Scores", 0, vec![
//!     Item::new("first", 1, 7, vec![Field::value("Field1", 0, 3.0)]),
//!     Item::new("second", 2, 7, vec![Field::value("Field1", 0, 5.0)]),
//! ]);
//!
//! let summary = aggregate(&[section]);
//! let item = &summary[0].items[0];
//! let field = item.field("Field1").unwrap();
//! assert_eq!(field.scalar(), Some(8.0));
//! assert_eq!(field.child("AVG").and_then(|f| f.scalar()), Some(4.0));
//! assert_eq!(item.field("Count").and_then(|f| f.scalar()), Some(2.0));
//! ```

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use domain::{aggregate, Aggregator};
