use crate::filter::BrandFilter;
use analytics::{Dataset, GroupRow, GroupSpec, group_by};
use core_types::{AggFn, CoreError, Dimension, EnrichedRecord, Measure};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// An ad-hoc slice: group by `dimensions`, aggregate one `measure`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewSpec {
    pub dimensions: Vec<Dimension>,
    pub measure: Measure,
    pub agg: AggFn,
}

impl ViewSpec {
    pub fn new(dimensions: Vec<Dimension>, measure: Measure, agg: AggFn) -> Self {
        Self {
            dimensions,
            measure,
            agg,
        }
    }

    /// Builds a spec from its textual form, e.g. `("month,brand", "amount", "sum")`.
    pub fn parse(dimensions: &str, measure: &str, agg: &str) -> Result<Self, CoreError> {
        let dimensions = dimensions
            .split(',')
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(Dimension::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(dimensions, measure.parse()?, agg.parse()?))
    }

    fn group_spec(&self) -> GroupSpec {
        GroupSpec::single(self.dimensions.clone(), self.measure, self.agg)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewResult {
    pub spec: ViewSpec,
    pub rows: Vec<GroupRow>,
    pub notice: Option<String>,
}

pub(crate) const EMPTY_SELECTION: &str = "No rows match the selected brands.";

/// The filtered rows, plus a notice when the filter selected nothing.
pub(crate) fn select<'a>(
    dataset: &'a Dataset,
    filter: &BrandFilter,
) -> (Vec<&'a EnrichedRecord>, Option<String>) {
    let selected = filter.apply(dataset);
    if selected.is_empty() {
        tracing::warn!(brands = ?filter.brands().collect::<Vec<_>>(), "{EMPTY_SELECTION}");
        return (selected, Some(EMPTY_SELECTION.to_string()));
    }
    (selected, None)
}

/// Runs `spec` over the rows selected by `filter`.
pub fn assemble(dataset: &Dataset, filter: &BrandFilter, spec: &ViewSpec) -> ViewResult {
    let (selected, notice) = select(dataset, filter);
    let rows = group_by(selected.iter().copied(), &spec.group_spec());
    tracing::debug!(dimensions = ?spec.dimensions, rows = rows.len(), "View assembled.");

    ViewResult {
        spec: spec.clone(),
        rows,
        notice,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_textual_specs() {
        let spec = ViewSpec::parse("month, Brand", "amount", "SUM").unwrap();
        assert_eq!(spec.dimensions, vec![Dimension::Month, Dimension::Brand]);
        assert_eq!(spec.measure, Measure::Amount);
        assert_eq!(spec.agg, AggFn::Sum);

        let spec = ViewSpec::parse("", "unit-price", "mean").unwrap();
        assert!(spec.dimensions.is_empty());
        assert_eq!(spec.measure, Measure::UnitPrice);
    }

    #[test]
    fn rejects_unknown_names() {
        assert!(matches!(
            ViewSpec::parse("month,colour", "amount", "sum"),
            Err(CoreError::UnknownName { kind: "dimension", .. })
        ));
        assert!(ViewSpec::parse("month", "profit", "sum").is_err());
        assert!(ViewSpec::parse("month", "amount", "median").is_err());
    }
}
