//! Dataset files: the section list a summary is computed from.
//!
//! Accepted formats are JSON and TOML, picked by file extension:
//!
//! ```json
//! { "sections": [
//!   { "name": "Section 1", "sorting": 0, "items": [
//!     { "name": "Row", "sorting": 1, "grouping": 0, "fields": [
//!       { "name": "Field 1", "sorting": 1, "value": 3 }
//!     ] }
//!   ] }
//! ] }
//! ```

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::Section;

/// Ordered list of sections as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub sections: Vec<Section>,
}

/// On-disk encoding of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    Json,
    Toml,
}

impl DatasetFormat {
    /// Detect the format from the file extension.
    pub fn from_path(path: &Path) -> ApplicationResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("json") => Ok(DatasetFormat::Json),
            Some("toml") => Ok(DatasetFormat::Toml),
            _ => Err(ApplicationError::Dataset {
                path: path.to_path_buf(),
                message: "unsupported extension (expected .json or .toml)".to_string(),
            }),
        }
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetFormat::Json => write!(f, "json"),
            DatasetFormat::Toml => write!(f, "toml"),
        }
    }
}

impl Dataset {
    /// Parse dataset content. `path` is only used for error messages.
    pub fn parse(content: &str, format: DatasetFormat, path: &Path) -> ApplicationResult<Self> {
        let dataset_err = |message: String| ApplicationError::Dataset {
            path: path.to_path_buf(),
            message,
        };
        match format {
            DatasetFormat::Json => {
                serde_json::from_str(content).map_err(|e| dataset_err(e.to_string()))
            }
            DatasetFormat::Toml => toml::from_str(content).map_err(|e| dataset_err(e.to_string())),
        }
    }

    /// Number of items across all sections.
    pub fn item_count(&self) -> usize {
        self.sections.iter().map(|s| s.items.len()).sum()
    }
}
