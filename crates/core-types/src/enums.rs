use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A categorical key that rows can be grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Month,
    Quarter,
    Year,
    Brand,
    Asin,
    InkDelivery,
    NibType,
    Packaging,
    LineWidth,
    DualTip,
    InkColor,
    PriceTier,
    UnitCount,
    ColorType,
}

impl Dimension {
    pub const ALL: [Dimension; 14] = [
        Dimension::Month,
        Dimension::Quarter,
        Dimension::Year,
        Dimension::Brand,
        Dimension::Asin,
        Dimension::InkDelivery,
        Dimension::NibType,
        Dimension::Packaging,
        Dimension::LineWidth,
        Dimension::DualTip,
        Dimension::InkColor,
        Dimension::PriceTier,
        Dimension::UnitCount,
        Dimension::ColorType,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dimension::Month => "month",
            Dimension::Quarter => "quarter",
            Dimension::Year => "year",
            Dimension::Brand => "brand",
            Dimension::Asin => "asin",
            Dimension::InkDelivery => "ink_delivery",
            Dimension::NibType => "nib_type",
            Dimension::Packaging => "packaging",
            Dimension::LineWidth => "line_width",
            Dimension::DualTip => "dual_tip",
            Dimension::InkColor => "ink_color",
            Dimension::PriceTier => "price_tier",
            Dimension::UnitCount => "unit_count",
            Dimension::ColorType => "color_type",
        }
    }
}

/// A numeric column that can be aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Measure {
    Amount,
    Sales,
    Price,
    Rate,
    UnitCount,
    Asp,
    UnitPrice,
    MonthsListed,
    StabilityScore,
}

impl Measure {
    pub const ALL: [Measure; 9] = [
        Measure::Amount,
        Measure::Sales,
        Measure::Price,
        Measure::Rate,
        Measure::UnitCount,
        Measure::Asp,
        Measure::UnitPrice,
        Measure::MonthsListed,
        Measure::StabilityScore,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Measure::Amount => "amount",
            Measure::Sales => "sales",
            Measure::Price => "price",
            Measure::Rate => "rate",
            Measure::UnitCount => "unit_count",
            Measure::Asp => "asp",
            Measure::UnitPrice => "unit_price",
            Measure::MonthsListed => "months_listed",
            Measure::StabilityScore => "stability_score",
        }
    }
}

/// How the values of a group are folded into one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggFn {
    Sum,
    Mean,
    Max,
    Min,
    Count,
}

impl AggFn {
    pub const ALL: [AggFn; 5] = [AggFn::Sum, AggFn::Mean, AggFn::Max, AggFn::Min, AggFn::Count];

    pub fn name(&self) -> &'static str {
        match self {
            AggFn::Sum => "sum",
            AggFn::Mean => "mean",
            AggFn::Max => "max",
            AggFn::Min => "min",
            AggFn::Count => "count",
        }
    }
}

/// Whether a product is a single solid colour set or a mixed one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ColorType {
    Independent,
    Assorted,
}

impl ColorType {
    pub fn name(&self) -> &'static str {
        match self {
            ColorType::Independent => "Independent",
            ColorType::Assorted => "Assorted",
        }
    }
}

/// Implements `Display` and a case-insensitive `FromStr` over `name()`.
/// Hyphens are accepted in place of underscores so CLI flags read naturally.
macro_rules! named_enum {
    ($ty:ident, $kind:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
                $ty::ALL
                    .iter()
                    .copied()
                    .find(|v| v.name() == wanted)
                    .ok_or_else(|| CoreError::UnknownName {
                        kind: $kind,
                        value: s.to_string(),
                    })
            }
        }
    };
}

named_enum!(Dimension, "dimension");
named_enum!(Measure, "measure");
named_enum!(AggFn, "aggregation");

impl fmt::Display for ColorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip_through_from_str() {
        for d in Dimension::ALL {
            assert_eq!(d.name().parse::<Dimension>().unwrap(), d);
        }
        for m in Measure::ALL {
            assert_eq!(m.name().parse::<Measure>().unwrap(), m);
        }
        for a in AggFn::ALL {
            assert_eq!(a.name().parse::<AggFn>().unwrap(), a);
        }
    }

    #[test]
    fn from_str_is_lenient_about_case_and_hyphens() {
        assert_eq!("Ink-Delivery".parse::<Dimension>().unwrap(), Dimension::InkDelivery);
        assert_eq!("UNIT_PRICE".parse::<Measure>().unwrap(), Measure::UnitPrice);
    }

    #[test]
    fn unknown_names_are_reported() {
        let err = "median".parse::<AggFn>().unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownName {
                kind: "aggregation",
                value: "median".to_string()
            }
        );
    }
}
