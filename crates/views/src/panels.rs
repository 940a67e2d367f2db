//! The four dashboard panels.
//!
//! Panels that describe how the selected brands behave are computed on the
//! filtered rows. Panels that describe market structure (quarterly YoY and
//! share matrices, price tiers, colour-type trend) always use the whole
//! dataset, so a share is a share of the market and not of the selection.

use crate::distribution::{Distribution, distributions};
use crate::error::ViewError;
use crate::filter::BrandFilter;
use crate::query::select;
use crate::ranking::{AsinProfile, asin_profiles, at_risk, top_stable};
use analytics::{Dataset, DatasetReport, GroupSpec, PivotTable, RatioTable, group_by};
use configuration::DashboardSettings;
use core_types::{AggFn, DimValue, Dimension, EnrichedRecord, Measure};
use rust_decimal::Decimal;
use serde::Serialize;

/// Panel parameters taken from the `[dashboard]` settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelOptions {
    pub top_n: usize,
    pub yoy_lag: usize,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self::from(&DashboardSettings::default())
    }
}

impl From<&DashboardSettings> for PanelOptions {
    fn from(settings: &DashboardSettings) -> Self {
        Self {
            top_n: settings.top_n,
            yoy_lag: settings.yoy_lag,
        }
    }
}

/// One point of a multi-series chart (line, area, grouped bar).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub x: DimValue,
    pub series: DimValue,
    pub value: Decimal,
}

/// One leaf of a two-level hierarchy (sunburst, treemap).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HierarchyNode {
    pub parent: DimValue,
    pub child: DimValue,
    pub value: Decimal,
    /// `value` over the sum of all leaves; zero when that sum is zero.
    pub share: Decimal,
}

fn series<'a, I>(records: I, x: Dimension, series: Dimension, measure: Measure, agg: AggFn) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = &'a EnrichedRecord>,
{
    group_by(records, &GroupSpec::single(vec![x, series], measure, agg))
        .into_iter()
        .map(|row| {
            let value = row.value();
            let mut keys = row.keys.into_iter();
            SeriesPoint {
                x: keys.next().unwrap_or_else(|| DimValue::from("")),
                series: keys.next().unwrap_or_else(|| DimValue::from("")),
                value,
            }
        })
        .collect()
}

fn hierarchy<'a, I>(records: I, parent: Dimension, child: Dimension) -> Vec<HierarchyNode>
where
    I: IntoIterator<Item = &'a EnrichedRecord>,
{
    let points = series(records, parent, child, Measure::Amount, AggFn::Sum);
    let total = analytics::saturating_sum(points.iter().map(|p| p.value));
    points
        .into_iter()
        .map(|p| HierarchyNode {
            share: analytics::safe_div(p.value, total),
            parent: p.x,
            child: p.series,
            value: p.value,
        })
        .collect()
}

// ----------------------------------------------------------------------------
// 1. Market overview
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct MarketOverview {
    /// The selected brands; every brand when the selection is empty.
    pub brands: Vec<String>,
    pub monthly_amount_by_brand: Vec<SeriesPoint>,
    pub yearly_amount_by_ink_delivery: Vec<SeriesPoint>,
    pub metric: Measure,
    /// Monthly mean of `metric` per brand.
    pub monthly_metric_by_brand: Vec<SeriesPoint>,
    pub notice: Option<String>,
}

/// Metrics the overview can trend.
pub const OVERVIEW_METRICS: [Measure; 3] = [Measure::Price, Measure::Rate, Measure::Sales];

pub fn market_overview(dataset: &Dataset, filter: &BrandFilter, metric: Measure) -> Result<MarketOverview, ViewError> {
    if !OVERVIEW_METRICS.contains(&metric) {
        return Err(ViewError::UnsupportedMetric(metric));
    }
    let (rows, notice) = select(dataset, filter);

    // No selection means every brand in the dataset.
    let brands = if filter.is_all() {
        dataset.brands().to_vec()
    } else {
        filter.brands().map(String::from).collect()
    };

    Ok(MarketOverview {
        brands,
        monthly_amount_by_brand: series(rows.iter().copied(), Dimension::Month, Dimension::Brand, Measure::Amount, AggFn::Sum),
        yearly_amount_by_ink_delivery: series(
            rows.iter().copied(),
            Dimension::Year,
            Dimension::InkDelivery,
            Measure::Amount,
            AggFn::Sum,
        ),
        metric,
        monthly_metric_by_brand: series(rows.iter().copied(), Dimension::Month, Dimension::Brand, metric, AggFn::Mean),
        notice,
    })
}

// ----------------------------------------------------------------------------
// 2. Brand share and ASIN stability
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct BrandShareView {
    pub total_months: usize,
    pub yoy_lag: usize,
    /// Quarter x brand revenue change over `yoy_lag` quarters. Whole market.
    pub quarterly_yoy: RatioTable,
    /// Quarter x brand share of revenue. Whole market.
    pub quarterly_share: RatioTable,
    /// Year x brand share of revenue. Whole market.
    pub annual_share: RatioTable,
    /// Every selected ASIN profile, for the stability scatter.
    pub stability_points: Vec<AsinProfile>,
    pub top_stable: Vec<AsinProfile>,
    pub at_risk: Vec<AsinProfile>,
    pub notice: Option<String>,
}

pub fn brand_share(dataset: &Dataset, filter: &BrandFilter, options: &PanelOptions) -> Result<BrandShareView, ViewError> {
    let market = dataset.records();
    let quarterly = PivotTable::from_records(market, Dimension::Quarter, Dimension::Brand, Measure::Amount);
    let annual = PivotTable::from_records(market, Dimension::Year, Dimension::Brand, Measure::Amount);

    let (rows, notice) = select(dataset, filter);
    let profiles = asin_profiles(rows.iter().copied());
    tracing::debug!(profiles = profiles.len(), quarters = quarterly.index.len(), "Brand share panel assembled.");

    Ok(BrandShareView {
        total_months: dataset.total_months(),
        yoy_lag: options.yoy_lag,
        quarterly_yoy: quarterly.pct_change(options.yoy_lag)?,
        quarterly_share: quarterly.share_of_row_total(),
        annual_share: annual.share_of_row_total(),
        top_stable: top_stable(&profiles, options.top_n),
        at_risk: at_risk(&profiles, options.top_n),
        stability_points: profiles,
        notice,
    })
}

// ----------------------------------------------------------------------------
// 3. Price tiers
// ----------------------------------------------------------------------------

/// Always computed over the whole market.
#[derive(Debug, Clone, Serialize)]
pub struct PriceTierView {
    pub quarterly_amount_by_tier: Vec<SeriesPoint>,
    /// Tier x year revenue.
    pub tier_by_year: PivotTable,
    pub tier_totals: Vec<Decimal>,
}

pub fn price_tiers(dataset: &Dataset) -> PriceTierView {
    let market = dataset.records();
    let tier_by_year = PivotTable::from_records(market, Dimension::Year, Dimension::PriceTier, Measure::Amount).transpose();

    PriceTierView {
        quarterly_amount_by_tier: series(market, Dimension::Quarter, Dimension::PriceTier, Measure::Amount, AggFn::Sum),
        tier_totals: tier_by_year.row_totals(),
        tier_by_year,
    }
}

// ----------------------------------------------------------------------------
// 4. Product features
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct FeatureView {
    /// Packaging, then pack size, by revenue.
    pub packaging_unit_count: Vec<HierarchyNode>,
    pub ink_delivery_price: Vec<Distribution>,
    /// Nib type, then line width, by revenue.
    pub nib_line_width: Vec<HierarchyNode>,
    pub unit_price_by_brand: Vec<Distribution>,
    /// Monthly revenue of independent vs assorted colour sets. Whole market.
    pub color_type_trend: Vec<SeriesPoint>,
    pub notice: Option<String>,
}

pub fn features(dataset: &Dataset, filter: &BrandFilter) -> FeatureView {
    let (rows, notice) = select(dataset, filter);

    FeatureView {
        packaging_unit_count: hierarchy(rows.iter().copied(), Dimension::Packaging, Dimension::UnitCount),
        ink_delivery_price: distributions(rows.iter().copied(), Dimension::InkDelivery, Measure::Price),
        nib_line_width: hierarchy(rows.iter().copied(), Dimension::NibType, Dimension::LineWidth),
        unit_price_by_brand: distributions(rows.iter().copied(), Dimension::Brand, Measure::UnitPrice),
        color_type_trend: series(dataset.records(), Dimension::Month, Dimension::ColorType, Measure::Amount, AggFn::Sum),
        notice,
    }
}

// ----------------------------------------------------------------------------
// Everything at once
// ----------------------------------------------------------------------------

/// All panels for one selection, as written by `export`.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub summary: DatasetReport,
    pub brands: Vec<String>,
    pub overview: MarketOverview,
    pub brand_share: BrandShareView,
    pub price_tiers: PriceTierView,
    pub features: FeatureView,
}

pub fn snapshot(
    dataset: &Dataset,
    filter: &BrandFilter,
    options: &PanelOptions,
    metric: Measure,
) -> Result<DashboardSnapshot, ViewError> {
    Ok(DashboardSnapshot {
        summary: dataset.report(),
        brands: dataset.brands().to_vec(),
        overview: market_overview(dataset, filter, metric)?,
        brand_share: brand_share(dataset, filter, options)?,
        price_tiers: price_tiers(dataset),
        features: features(dataset, filter),
    })
}
