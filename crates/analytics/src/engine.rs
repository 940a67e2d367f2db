use crate::classify::ColorClassifier;
use crate::dataset::Dataset;
use crate::enrich::enrich;
use crate::error::LoadError;
use crate::loader::{self, LoadedRows};
use std::io::Read;
use std::path::Path;

/// Turns a source table into an enriched `Dataset`.
///
/// The engine holds no data; it only carries the settings that shape
/// enrichment (currently the colour classifier), so one instance can serve any
/// number of loads.
#[derive(Debug, Clone, Default)]
pub struct MetricsEngine {
    classifier: ColorClassifier,
}

impl MetricsEngine {
    pub fn new(classifier: ColorClassifier) -> Self {
        Self { classifier }
    }

    pub fn classifier(&self) -> &ColorClassifier {
        &self.classifier
    }

    /// Reads, normalises and enriches the CSV file at `path`.
    pub fn load(&self, path: &Path) -> Result<Dataset, LoadError> {
        tracing::debug!(path = %path.display(), "Loading dataset.");
        let rows = loader::read_path(path)?;
        Ok(self.finish(rows))
    }

    /// Same as [`MetricsEngine::load`] over any reader.
    pub fn load_from_reader<R: Read>(&self, reader: R) -> Result<Dataset, LoadError> {
        let rows = loader::read_rows(reader)?;
        Ok(self.finish(rows))
    }

    /// Enriches rows that were parsed elsewhere.
    pub fn enrich(&self, rows: LoadedRows) -> Dataset {
        enrich(rows, &self.classifier)
    }

    fn finish(&self, rows: LoadedRows) -> Dataset {
        let dataset = self.enrich(rows);
        let report = dataset.report();

        for (column, count) in &report.coerced_cells {
            tracing::warn!(column = %column, cells = count, "Unparseable numeric cells coerced to zero.");
        }
        tracing::info!(
            rows = report.rows,
            months = report.total_months,
            first = ?report.first_month.map(|m| m.label()),
            last = ?report.last_month.map(|m| m.label()),
            brands = report.brands,
            asins = report.asins,
            "Dataset loaded."
        );

        dataset
    }
}
