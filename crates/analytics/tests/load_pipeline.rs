//! End-to-end: CSV file on disk through load, aggregation and pivots.

use analytics::{GroupSpec, LoadError, PivotTable, group_by, load};
use core_types::{DimValue, Dimension, Measure};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::io::Write;
use tempfile::NamedTempFile;

const HEADER: &str = "Date,Brand,ASIN,Amount,Sales,Price,Rate,产品支数,出墨方式,笔头类型,包装方式,线宽,是否双头,Ink_Color,价格档位";

fn write_csv(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{HEADER}").unwrap();
    for row in rows {
        writeln!(file, "{row}").unwrap();
    }
    file.flush().unwrap();
    file
}

#[test]
fn stability_over_three_months() {
    let file = write_csv(&[
        "202401,Ohuhu,A1,100,10,12,0.5,12,Pump,Fine,Box,0.7mm,Yes,White,Mid",
        "202402,Arteza,B2,60,6,8,0.3,24,Valve,Broad,Bag,2mm,No,24 Colors,Low",
        "202403,Ohuhu,A1,90,9,12,0.5,12,Pump,Fine,Box,0.7mm,Yes,White,Mid",
    ]);
    let ds = load(file.path()).unwrap();

    assert_eq!(ds.total_months(), 3);
    for r in ds.records().iter().filter(|r| r.record.asin == "A1") {
        assert_eq!(r.months_listed, 2);
        assert_eq!(r.stability_score.round_dp(3), dec!(0.667));
    }
    for r in ds.records() {
        assert!(r.months_listed as usize <= ds.total_months());
        assert!(r.stability_score >= Decimal::ZERO && r.stability_score <= Decimal::ONE);
    }
}

#[test]
fn unparseable_numbers_become_zero_and_rows_are_kept() {
    let file = write_csv(&[
        "202401,Ohuhu,A1,n/a,10,12,0.5,12,Pump,Fine,Box,0.7mm,Yes,White,Mid",
        "202401,Ohuhu,A2,\"1,200\",,12,0.5,,Pump,Fine,Box,0.7mm,Yes,White,Mid",
        "202401,Ohuhu,A3,1.5e2,3,12,0.5,6,Pump,Fine,Box,0.7mm,Yes,White,Mid",
    ]);
    let ds = load(file.path()).unwrap();
    let report = ds.report();

    assert_eq!(report.rows, 3);
    assert_eq!(report.total_amount, dec!(150));
    assert_eq!(report.coerced_cells.get("Amount"), Some(&2));
    assert_eq!(report.coerced_cells.get("Sales"), Some(&1));
    assert_eq!(report.coerced_cells.get("产品支数"), Some(&1));
    assert_eq!(report.coerced_total(), 4);

    let a2 = ds.records().iter().find(|r| r.record.asin == "A2").unwrap();
    assert_eq!(a2.asp, Decimal::ZERO);
    assert_eq!(a2.unit_price, Decimal::ZERO);
}

#[test]
fn missing_columns_are_all_reported() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Date,Brand,ASIN,Amount").unwrap();
    writeln!(file, "202401,Ohuhu,A1,100").unwrap();
    file.flush().unwrap();

    match load(file.path()) {
        Err(LoadError::MissingColumns(cols)) => {
            assert_eq!(cols.len(), 11);
            assert!(cols.contains(&"Sales".to_string()));
            assert!(cols.contains(&"价格档位".to_string()));
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn pivot_rows_match_grouped_totals() {
    let file = write_csv(&[
        "202401,Ohuhu,A1,100,10,12,0.5,12,Pump,Fine,Box,0.7mm,Yes,White,Mid",
        "202401,Arteza,B1,40,4,8,0.3,24,Valve,Broad,Bag,2mm,No,24 Colors,Low",
        "202402,Ohuhu,A1,80,8,12,0.5,12,Pump,Fine,Box,0.7mm,Yes,White,Mid",
        "202402,,C1,20,2,5,0.1,6,,,,,,,",
    ]);
    let ds = load(file.path()).unwrap();

    let pivot = PivotTable::from_records(ds.records(), Dimension::Month, Dimension::Brand, Measure::Amount);
    let grouped = group_by(ds.records(), &GroupSpec::sum(vec![Dimension::Month], Measure::Amount));

    assert_eq!(pivot.columns[0], DimValue::from(""));
    let totals = pivot.row_totals();
    assert_eq!(totals, grouped.iter().map(|g| g.value()).collect::<Vec<_>>());
    assert_eq!(totals, vec![dec!(140), dec!(100)]);
}

#[test]
fn bundled_sample_loads() {
    let path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/acrylic_markers_sample.csv");
    let ds = load(&path).unwrap();
    let report = ds.report();

    assert_eq!(report.rows, 23);
    assert_eq!(report.total_months, 5);
    assert_eq!(report.brands, 4);
    assert_eq!(report.coerced_cells.get("产品支数"), Some(&1));

    let zero_sales = ds.records().iter().find(|r| r.record.sales.is_zero()).unwrap();
    assert_eq!(zero_sales.asp, Decimal::ZERO);
}
