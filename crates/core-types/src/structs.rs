use crate::enums::{ColorType, Dimension, Measure};
use crate::period::MonthPeriod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the source table: a single ASIN in a single month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    pub asin: String,
    pub brand: String,
    pub date: MonthPeriod,
    pub amount: Decimal,
    pub sales: Decimal,
    pub price: Decimal,
    pub rate: Decimal,
    /// Pens per package.
    pub unit_count: Decimal,
    pub ink_delivery: String,
    pub nib_type: String,
    pub packaging: String,
    pub line_width: String,
    pub dual_tip: String,
    pub ink_color: String,
    pub price_tier: String,
}

impl SalesRecord {
    /// A record with zeroed measures and empty attributes.
    pub fn new(asin: impl Into<String>, brand: impl Into<String>, date: MonthPeriod) -> Self {
        Self {
            asin: asin.into(),
            brand: brand.into(),
            date,
            amount: Decimal::ZERO,
            sales: Decimal::ZERO,
            price: Decimal::ZERO,
            rate: Decimal::ZERO,
            unit_count: Decimal::ZERO,
            ink_delivery: String::new(),
            nib_type: String::new(),
            packaging: String::new(),
            line_width: String::new(),
            dual_tip: String::new(),
            ink_color: String::new(),
            price_tier: String::new(),
        }
    }
}

/// A source row plus every field derived from it at load time.
///
/// `months_listed` and `stability_score` are computed over the whole dataset,
/// so they are identical on every row of the same ASIN and never change when a
/// view narrows the brand selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    #[serde(flatten)]
    pub record: SalesRecord,
    pub period_key: String,
    pub quarter_key: String,
    pub year: i32,
    pub asp: Decimal,
    pub unit_price: Decimal,
    pub months_listed: u32,
    pub stability_score: Decimal,
    pub color_type: ColorType,
}

impl EnrichedRecord {
    pub fn dimension(&self, dimension: Dimension) -> DimValue {
        let r = &self.record;
        match dimension {
            Dimension::Month => DimValue::Text(self.period_key.clone()),
            Dimension::Quarter => DimValue::Text(self.quarter_key.clone()),
            Dimension::Year => DimValue::Number(Decimal::from(self.year)),
            Dimension::Brand => DimValue::Text(r.brand.clone()),
            Dimension::Asin => DimValue::Text(r.asin.clone()),
            Dimension::InkDelivery => DimValue::Text(r.ink_delivery.clone()),
            Dimension::NibType => DimValue::Text(r.nib_type.clone()),
            Dimension::Packaging => DimValue::Text(r.packaging.clone()),
            Dimension::LineWidth => DimValue::Text(r.line_width.clone()),
            Dimension::DualTip => DimValue::Text(r.dual_tip.clone()),
            Dimension::InkColor => DimValue::Text(r.ink_color.clone()),
            Dimension::PriceTier => DimValue::Text(r.price_tier.clone()),
            Dimension::UnitCount => DimValue::Number(r.unit_count.normalize()),
            Dimension::ColorType => DimValue::Text(self.color_type.name().to_string()),
        }
    }

    pub fn measure(&self, measure: Measure) -> Decimal {
        let r = &self.record;
        match measure {
            Measure::Amount => r.amount,
            Measure::Sales => r.sales,
            Measure::Price => r.price,
            Measure::Rate => r.rate,
            Measure::UnitCount => r.unit_count,
            Measure::Asp => self.asp,
            Measure::UnitPrice => self.unit_price,
            Measure::MonthsListed => Decimal::from(self.months_listed),
            Measure::StabilityScore => self.stability_score,
        }
    }
}

/// The value of one grouping key.
///
/// Numeric keys (years, pack sizes) sort numerically; text keys sort
/// lexically, which for `YYYY-MM` and `YYYYQn` labels is chronological.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum DimValue {
    Number(Decimal),
    Text(String),
}

impl fmt::Display for DimValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DimValue::Number(n) => write!(f, "{}", n.normalize()),
            DimValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for DimValue {
    fn from(value: &str) -> Self {
        DimValue::Text(value.to_string())
    }
}

impl From<i32> for DimValue {
    fn from(value: i32) -> Self {
        DimValue::Number(Decimal::from(value))
    }
}
