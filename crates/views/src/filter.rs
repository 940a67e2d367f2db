use analytics::Dataset;
use core_types::EnrichedRecord;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The brand selection. An empty selection means every brand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrandFilter {
    brands: BTreeSet<String>,
}

impl BrandFilter {
    pub fn new<I, S>(brands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            brands: brands
                .into_iter()
                .map(Into::into)
                .map(|b| b.trim().to_string())
                .filter(|b| !b.is_empty())
                .collect(),
        }
    }

    pub fn all() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list such as `Ohuhu,Arteza`. `None` or an
    /// empty string selects every brand.
    pub fn from_list(list: Option<&str>) -> Self {
        match list {
            Some(s) => Self::new(s.split(',')),
            None => Self::all(),
        }
    }

    pub fn is_all(&self) -> bool {
        self.brands.is_empty()
    }

    pub fn brands(&self) -> impl Iterator<Item = &str> {
        self.brands.iter().map(String::as_str)
    }

    pub fn matches(&self, brand: &str) -> bool {
        self.is_all() || self.brands.contains(brand)
    }

    /// The rows of the selected brands, in dataset order.
    ///
    /// Rows are borrowed as they are: stability fields were fixed over the
    /// whole dataset at load and are not recomputed for the selection.
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a EnrichedRecord> {
        let rows: Vec<&EnrichedRecord> = dataset
            .records()
            .iter()
            .filter(|r| self.matches(&r.record.brand))
            .collect();

        if !self.is_all() {
            let unknown: Vec<&str> = self
                .brands()
                .filter(|b| dataset.brands().binary_search_by(|k| k.as_str().cmp(*b)).is_err())
                .collect();
            if !unknown.is_empty() {
                tracing::warn!(brands = ?unknown, "Selected brands do not occur in the dataset.");
            }
        }
        tracing::debug!(selected = rows.len(), total = dataset.records().len(), "Brand filter applied.");
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lists() {
        assert!(BrandFilter::from_list(None).is_all());
        assert!(BrandFilter::from_list(Some("")).is_all());
        assert!(BrandFilter::from_list(Some(" , ")).is_all());

        let f = BrandFilter::from_list(Some("Ohuhu, Arteza"));
        assert_eq!(f.brands().collect::<Vec<_>>(), vec!["Arteza", "Ohuhu"]);
        assert!(f.matches("Ohuhu"));
        assert!(!f.matches("Posca"));
    }

    #[test]
    fn empty_selection_matches_everything() {
        let f = BrandFilter::all();
        assert!(f.matches("anything"));
        assert!(f.matches(""));
    }
}
