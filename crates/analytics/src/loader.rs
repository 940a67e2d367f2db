//! CSV ingest and normalisation.
//!
//! Turns the producer's sales table into `SalesRecord`s. The column set is a
//! contract with the producer: a missing column fails the whole load. Bad
//! cells do not: unparseable numbers become zero (and are counted) and
//! categorical cells are kept verbatim, so no row and no revenue is dropped.

use crate::error::LoadError;
use core_types::{MonthPeriod, SalesRecord};
use csv::StringRecord;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;
use std::str::FromStr;

/// The columns the producer's export must contain, in `ALL` order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Date,
    Brand,
    Asin,
    Amount,
    Sales,
    Price,
    Rate,
    UnitCount,
    InkDelivery,
    NibType,
    Packaging,
    LineWidth,
    DualTip,
    InkColor,
    PriceTier,
}

impl Column {
    pub const ALL: [Column; 15] = [
        Column::Date,
        Column::Brand,
        Column::Asin,
        Column::Amount,
        Column::Sales,
        Column::Price,
        Column::Rate,
        Column::UnitCount,
        Column::InkDelivery,
        Column::NibType,
        Column::Packaging,
        Column::LineWidth,
        Column::DualTip,
        Column::InkColor,
        Column::PriceTier,
    ];

    /// The header as it appears in the producer's spreadsheet.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Brand => "Brand",
            Column::Asin => "ASIN",
            Column::Amount => "Amount",
            Column::Sales => "Sales",
            Column::Price => "Price",
            Column::Rate => "Rate",
            Column::UnitCount => "产品支数",
            Column::InkDelivery => "出墨方式",
            Column::NibType => "笔头类型",
            Column::Packaging => "包装方式",
            Column::LineWidth => "线宽",
            Column::DualTip => "是否双头",
            Column::InkColor => "Ink_Color",
            Column::PriceTier => "价格档位",
        }
    }

    /// An English alias, matched case-insensitively.
    pub fn alias(&self) -> &'static str {
        match self {
            Column::Date => "date",
            Column::Brand => "brand",
            Column::Asin => "asin",
            Column::Amount => "amount",
            Column::Sales => "sales",
            Column::Price => "price",
            Column::Rate => "rate",
            Column::UnitCount => "unit_count",
            Column::InkDelivery => "ink_delivery",
            Column::NibType => "nib_type",
            Column::Packaging => "packaging",
            Column::LineWidth => "line_width",
            Column::DualTip => "dual_tip",
            Column::InkColor => "ink_color",
            Column::PriceTier => "price_tier",
        }
    }

    fn matches(&self, header: &str) -> bool {
        header == self.header() || header.to_lowercase() == self.alias()
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            Column::Amount | Column::Sales | Column::Price | Column::Rate | Column::UnitCount
        )
    }
}

/// Parsed rows plus bookkeeping about what had to be coerced.
#[derive(Debug, Clone)]
pub struct LoadedRows {
    pub records: Vec<SalesRecord>,
    /// Numeric cells per column that were blank or unparseable and became zero.
    pub coerced_cells: BTreeMap<String, usize>,
}

/// Reads and normalises the table at `path`.
pub fn read_path(path: &Path) -> Result<LoadedRows, LoadError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LoadError::NotFound(path.to_path_buf()),
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        },
    })?;
    read_rows(file)
}

/// Reads and normalises a table from any reader.
pub fn read_rows<R: Read>(reader: R) -> Result<LoadedRows, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = reader.headers()?.clone();
    let layout = ColumnLayout::resolve(&headers)?;

    let mut records = Vec::new();
    let mut coerced_cells = BTreeMap::new();

    for result in reader.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or_default();
        records.push(layout.parse_row(&row, line, &mut coerced_cells)?);
    }

    if records.is_empty() {
        return Err(LoadError::Empty);
    }

    Ok(LoadedRows {
        records,
        coerced_cells,
    })
}

/// Header position of every required column.
struct ColumnLayout {
    positions: [usize; Column::ALL.len()],
}

impl ColumnLayout {
    fn resolve(headers: &StringRecord) -> Result<Self, LoadError> {
        // Spreadsheet tools often prefix the first header of a UTF-8 export with a BOM.
        let names: Vec<&str> = headers
            .iter()
            .map(|h| h.trim().trim_start_matches('\u{feff}'))
            .collect();

        let mut positions = [0usize; Column::ALL.len()];
        let mut missing = Vec::new();
        for (slot, column) in positions.iter_mut().zip(Column::ALL) {
            match names.iter().position(|name| column.matches(name)) {
                Some(idx) => *slot = idx,
                None => missing.push(column.header().to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(LoadError::MissingColumns(missing));
        }
        Ok(Self { positions })
    }

    /// Flexible parsing allows short rows; absent trailing cells read as blank.
    fn cell<'r>(&self, row: &'r StringRecord, column: Column) -> &'r str {
        row.get(self.positions[column as usize]).unwrap_or("")
    }

    fn number(
        &self,
        row: &StringRecord,
        column: Column,
        coerced: &mut BTreeMap<String, usize>,
    ) -> Decimal {
        debug_assert!(column.is_numeric());
        match parse_decimal(self.cell(row, column)) {
            Some(value) => value,
            None => {
                *coerced.entry(column.header().to_string()).or_insert(0) += 1;
                Decimal::ZERO
            }
        }
    }

    fn parse_row(
        &self,
        row: &StringRecord,
        line: u64,
        coerced: &mut BTreeMap<String, usize>,
    ) -> Result<SalesRecord, LoadError> {
        let raw_date = self.cell(row, Column::Date);
        let date = MonthPeriod::from_str(raw_date).map_err(|_| LoadError::InvalidPeriod {
            line,
            value: raw_date.to_string(),
        })?;

        let text = |column: Column| self.cell(row, column).to_string();

        Ok(SalesRecord {
            asin: text(Column::Asin),
            brand: text(Column::Brand),
            date,
            amount: self.number(row, Column::Amount, coerced),
            sales: self.number(row, Column::Sales, coerced),
            price: self.number(row, Column::Price, coerced),
            rate: self.number(row, Column::Rate, coerced),
            unit_count: self.number(row, Column::UnitCount, coerced),
            ink_delivery: text(Column::InkDelivery),
            nib_type: text(Column::NibType),
            packaging: text(Column::Packaging),
            line_width: text(Column::LineWidth),
            dual_tip: text(Column::DualTip),
            ink_color: text(Column::InkColor),
            price_tier: text(Column::PriceTier),
        })
    }
}

/// Largest magnitude a numeric cell may hold. Column sums over any realistic
/// row count stay far below `Decimal::MAX`.
pub const MAX_CELL_MAGNITUDE: Decimal = Decimal::from_parts(1_661_992_960, 1_808_227_885, 5, false, 0);

/// Parses a numeric cell. Plain and scientific notation are accepted;
/// blanks, thousands separators, magnitudes above `MAX_CELL_MAGNITUDE` and
/// anything else yield `None`.
pub fn parse_decimal(raw: &str) -> Option<Decimal> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .ok()
        .filter(|v| v.abs() <= MAX_CELL_MAGNITUDE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const HEADER: &str = "Date,Brand,ASIN,Amount,Sales,Price,Rate,产品支数,出墨方式,笔头类型,包装方式,线宽,是否双头,Ink_Color,价格档位";

    fn csv_with(rows: &[&str]) -> String {
        let mut out = String::from(HEADER);
        for row in rows {
            out.push('\n');
            out.push_str(row);
        }
        out.push('\n');
        out
    }

    #[test]
    fn parses_a_complete_row() {
        let data = csv_with(&["202401,Ohuhu,B0A1,1500.50,30,49.99,4.6,24,Pump,Fine,Box,0.7mm,Yes,Black,$40-60"]);
        let rows = read_rows(data.as_bytes()).unwrap();

        assert_eq!(rows.records.len(), 1);
        assert!(rows.coerced_cells.is_empty());
        let r = &rows.records[0];
        assert_eq!(r.date, MonthPeriod::new(2024, 1).unwrap());
        assert_eq!(r.brand, "Ohuhu");
        assert_eq!(r.asin, "B0A1");
        assert_eq!(r.amount, dec!(1500.50));
        assert_eq!(r.sales, dec!(30));
        assert_eq!(r.unit_count, dec!(24));
        assert_eq!(r.ink_delivery, "Pump");
        assert_eq!(r.price_tier, "$40-60");
    }

    #[test]
    fn bad_numbers_become_zero_and_are_counted() {
        let data = csv_with(&[
            "202401,Ohuhu,B0A1,n/a,,49.99,4.6,24,Pump,Fine,Box,0.7mm,Yes,Black,low",
            "202402,Ohuhu,B0A1,\"1,200\",10,1e2,x,24,Pump,Fine,Box,0.7mm,Yes,Black,low",
        ]);
        let rows = read_rows(data.as_bytes()).unwrap();

        assert_eq!(rows.records.len(), 2, "rows with bad numbers are kept");
        assert_eq!(rows.records[0].amount, Decimal::ZERO);
        assert_eq!(rows.records[0].sales, Decimal::ZERO);
        assert_eq!(rows.records[1].amount, Decimal::ZERO);
        assert_eq!(rows.records[1].price, dec!(100));
        assert_eq!(rows.coerced_cells.get("Amount"), Some(&2));
        assert_eq!(rows.coerced_cells.get("Sales"), Some(&1));
        assert_eq!(rows.coerced_cells.get("Rate"), Some(&1));
    }

    #[test]
    fn short_rows_keep_blank_attributes() {
        let data = csv_with(&["202401,Ohuhu,B0A1,10,1,5,4,12"]);
        let rows = read_rows(data.as_bytes()).unwrap();
        let r = &rows.records[0];
        assert_eq!(r.amount, dec!(10));
        assert_eq!(r.ink_color, "");
        assert_eq!(r.price_tier, "");
    }

    #[test]
    fn english_aliases_and_bom_are_accepted() {
        let data = "\u{feff}date,brand,asin,amount,sales,price,rate,unit_count,ink_delivery,nib_type,packaging,line_width,dual_tip,ink_color,price_tier\n2024-02,Arteza,B0Z,5,1,5,4,12,Valve,Bullet,Bag,2mm,No,Assorted,low\n";
        let rows = read_rows(data.as_bytes()).unwrap();
        assert_eq!(rows.records[0].brand, "Arteza");
        assert_eq!(rows.records[0].date, MonthPeriod::new(2024, 2).unwrap());
    }

    #[test]
    fn missing_columns_are_all_reported() {
        let data = "Date,Brand,ASIN,Amount\n202401,Ohuhu,B0A1,10\n";
        match read_rows(data.as_bytes()) {
            Err(LoadError::MissingColumns(cols)) => {
                assert_eq!(cols.len(), 11);
                assert!(cols.contains(&"Sales".to_string()));
                assert!(cols.contains(&"价格档位".to_string()));
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn invalid_month_fails_with_line_number() {
        let data = csv_with(&[
            "202401,Ohuhu,B0A1,10,1,5,4,12,Pump,Fine,Box,0.7mm,Yes,Black,low",
            "January,Ohuhu,B0A1,10,1,5,4,12,Pump,Fine,Box,0.7mm,Yes,Black,low",
        ]);
        match read_rows(data.as_bytes()) {
            Err(LoadError::InvalidPeriod { line, value }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "January");
            }
            other => panic!("expected InvalidPeriod, got {other:?}"),
        }
    }

    #[test]
    fn header_only_file_is_empty() {
        let data = csv_with(&[]);
        assert!(matches!(read_rows(data.as_bytes()), Err(LoadError::Empty)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(matches!(read_path(&path), Err(LoadError::NotFound(_))));
    }

    #[test]
    fn parse_decimal_cases() {
        assert_eq!(parse_decimal(" 12.5 "), Some(dec!(12.5)));
        assert_eq!(parse_decimal("-3"), Some(dec!(-3)));
        assert_eq!(parse_decimal("2.5e3"), Some(dec!(2500)));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("1,000"), None);
        assert_eq!(parse_decimal("NaN"), None);
    }

    #[test]
    fn oversized_magnitudes_are_coerced() {
        assert_eq!(MAX_CELL_MAGNITUDE, dec!(100000000000000000000));
        assert_eq!(parse_decimal("1e20"), Some(MAX_CELL_MAGNITUDE));
        assert_eq!(parse_decimal("-1e20"), Some(-MAX_CELL_MAGNITUDE));
        assert_eq!(parse_decimal("1.0000001e20"), None);
        assert_eq!(parse_decimal("79228162514264337593543950335"), None);

        let data = csv_with(&[
            "202401,Ohuhu,B0A1,79228162514264337593543950335,10,49.99,4.6,24,Pump,Fine,Box,0.7mm,Yes,Black,low",
            "202402,Ohuhu,B0A1,79228162514264337593543950335,10,49.99,4.6,24,Pump,Fine,Box,0.7mm,Yes,Black,low",
        ]);
        let rows = read_rows(data.as_bytes()).unwrap();
        assert_eq!(rows.records.len(), 2);
        assert!(rows.records.iter().all(|r| r.amount.is_zero()));
        assert_eq!(rows.coerced_cells.get("Amount"), Some(&2));
    }
}
