//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::schema::SchemaDivergence;

/// Domain errors represent rule violations inside the aggregation engine.
///
/// The default engine path never fails; these only surface when a caller
/// opts into strict schema validation.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error(
        "section '{section}', group {group}: {} schema divergence(s)",
        .divergences.len()
    )]
    SchemaMismatch {
        section: String,
        group: i64,
        divergences: Vec<SchemaDivergence>,
    },
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
