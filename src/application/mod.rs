//! Application layer: services and use cases
//!
//! This layer orchestrates domain logic and depends on I/O boundary traits.

pub mod dataset;
pub mod error;
pub mod error_ext;
pub mod render;
pub mod services;

pub use dataset::{Dataset, DatasetFormat};
pub use error::{ApplicationError, ApplicationResult};
pub use error_ext::IoResultExt;
pub use render::{render, OutputFormat, ToTree};
