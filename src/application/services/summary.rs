//! Summary service
//!
//! Loads dataset files, runs the aggregation engine and renders the result.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::dataset::{Dataset, DatasetFormat};
use crate::application::render::{render, OutputFormat};
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{self, Aggregator, GroupDivergences, SchemaPolicy, Summary};
use crate::infrastructure::traits::FileSystem;

/// Per-call overrides of the configured defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryOptions {
    pub policy: Option<SchemaPolicy>,
    pub format: Option<OutputFormat>,
}

/// Service for summarizing dataset files.
pub struct SummaryService {
    fs: Arc<dyn FileSystem>,
    settings: Arc<Settings>,
}

impl SummaryService {
    /// Create a new summary service.
    pub fn new(fs: Arc<dyn FileSystem>, settings: Arc<Settings>) -> Self {
        Self { fs, settings }
    }

    /// Read and parse a dataset file (format from extension).
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<Dataset> {
        if !self.fs.is_file(path) {
            return Err(ApplicationError::Dataset {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            });
        }
        let format = DatasetFormat::from_path(path)?;
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read dataset", path)?;
        let dataset = Dataset::parse(&content, format, path)?;
        debug!(
            sections = dataset.sections.len(),
            items = dataset.item_count(),
            %format,
            "loaded dataset"
        );
        Ok(dataset)
    }

    /// Aggregate a dataset file.
    #[instrument(level = "debug", skip(self))]
    pub fn summarize(
        &self,
        path: &Path,
        policy: Option<SchemaPolicy>,
    ) -> ApplicationResult<Summary> {
        let dataset = self.load(path)?;
        let policy = policy.unwrap_or(self.settings.schema_policy);
        let summary = Aggregator::new(policy)
            .with_parallel(self.settings.parallel)
            .run(&dataset.sections)?;
        info!(
            sections = summary.sections.len(),
            divergent_groups = summary.divergences.len(),
            "summary complete"
        );
        Ok(summary)
    }

    /// Aggregate and render in one step.
    pub fn summarize_to_string(
        &self,
        path: &Path,
        options: SummaryOptions,
    ) -> ApplicationResult<String> {
        let summary = self.summarize(path, options.policy)?;
        let format = options.format.unwrap_or(self.settings.output);
        render(
            &summary.sections,
            &summary.divergences,
            format,
            self.settings.precision,
        )
    }

    /// Report groups whose members do not share the seed's shape.
    #[instrument(level = "debug", skip(self))]
    pub fn check(&self, path: &Path) -> ApplicationResult<Vec<GroupDivergences>> {
        let dataset = self.load(path)?;
        Ok(domain::validate(&dataset.sections))
    }

    /// Render the raw (unaggregated) dataset as a tree.
    pub fn tree(&self, path: &Path) -> ApplicationResult<String> {
        let dataset = self.load(path)?;
        render(
            &dataset.sections,
            &[],
            OutputFormat::Tree,
            self.settings.precision,
        )
    }

    /// Write rendered output, creating parent directories.
    pub fn write_output(&self, path: &Path, content: &str) -> ApplicationResult<()> {
        self.fs
            .ensure_parent(path)
            .with_path_context("create output directory", path)?;
        self.fs
            .write(path, content)
            .with_path_context("write summary", path)
    }
}
