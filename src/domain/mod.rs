//! Domain layer: the data tree and the aggregation engine
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregate;
pub mod entities;
pub mod error;
pub mod grouping;
pub mod merge;
pub mod schema;
pub mod synthesis;
pub mod traits;

pub use aggregate::{aggregate, validate, Aggregator, GroupDivergences, Summary};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use grouping::{group_items, Group};
pub use schema::{DivergenceKind, GroupSchema, SchemaDivergence, SchemaPolicy};
pub use synthesis::{AVERAGE_FIELD, COUNT_FIELD, DISPERSION_FIELD, ZERO_OR_ONE_FIELD};
pub use traits::{DataItem, DataSection, Named, Sortable};
