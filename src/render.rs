//! Terminal rendering of dashboard panels.

use analytics::{DatasetReport, PivotTable, RatioTable};
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table, presets::UTF8_FULL};
use core_types::DimValue;
use rust_decimal::Decimal;
use std::collections::BTreeSet;
use views::{AsinProfile, Distribution, HierarchyNode, SeriesPoint, ViewResult};

fn new_table<I, S>(header: I) -> Table
where
    I: IntoIterator<Item = S>,
    S: Into<Cell>,
{
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn number(value: Decimal, dp: u32) -> Cell {
    Cell::new(value.round_dp(dp).normalize()).set_alignment(CellAlignment::Right)
}

fn percent(value: Option<Decimal>) -> Cell {
    let text = match value {
        Some(v) => format!("{:.1}%", (v * Decimal::ONE_HUNDRED).round_dp(1)),
        None => "-".to_string(),
    };
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Blank category values are shown explicitly rather than as an empty cell.
fn label(key: &DimValue) -> String {
    match key.to_string() {
        s if s.is_empty() => "(blank)".to_string(),
        s => s,
    }
}

pub fn title(text: &str) {
    println!("\n{text}");
}

pub fn notice(notice: Option<&str>) {
    if let Some(message) = notice {
        println!("Note: {message}");
    }
}

pub fn summary(report: &DatasetReport) -> Table {
    let month = |m: Option<core_types::MonthPeriod>| m.map(|m| m.label()).unwrap_or_else(|| "-".into());

    let mut table = new_table(["Metric", "Value"]);
    table.add_row(vec![Cell::new("Rows"), Cell::new(report.rows)]);
    table.add_row(vec![Cell::new("Months observed"), Cell::new(report.total_months)]);
    table.add_row(vec![Cell::new("First month"), Cell::new(month(report.first_month))]);
    table.add_row(vec![Cell::new("Last month"), Cell::new(month(report.last_month))]);
    table.add_row(vec![Cell::new("Brands"), Cell::new(report.brands)]);
    table.add_row(vec![Cell::new("ASINs"), Cell::new(report.asins)]);
    table.add_row(vec![Cell::new("Total amount"), number(report.total_amount, 2)]);
    table.add_row(vec![Cell::new("Total units"), number(report.total_sales, 0)]);
    for (column, count) in &report.coerced_cells {
        table.add_row(vec![Cell::new(format!("Coerced cells ({column})")), Cell::new(count)]);
    }
    table
}

/// Lays series points out with `x` down the rows and one column per series.
pub fn series(points: &[SeriesPoint], x_header: &str, dp: u32) -> Table {
    let xs: BTreeSet<&DimValue> = points.iter().map(|p| &p.x).collect();
    let names: BTreeSet<&DimValue> = points.iter().map(|p| &p.series).collect();

    let mut table = new_table(std::iter::once(x_header.to_string()).chain(names.iter().map(|n| label(n))));
    for x in xs {
        let mut row = vec![Cell::new(label(x))];
        for &name in &names {
            let value = points
                .iter()
                .find(|p| &p.x == x && &p.series == name)
                .map(|p| number(p.value, dp))
                .unwrap_or_else(|| Cell::new("-").set_alignment(CellAlignment::Right));
            row.push(value);
        }
        table.add_row(row);
    }
    table
}

pub fn pivot(pivot: &PivotTable, totals: &[Decimal]) -> Table {
    let header = std::iter::once(pivot.index_dimension.to_string())
        .chain(pivot.columns.iter().map(label))
        .chain(std::iter::once("Total".to_string()));

    let mut table = new_table(header);
    for ((key, cells), total) in pivot.index.iter().zip(&pivot.cells).zip(totals) {
        let mut row = vec![Cell::new(label(key))];
        row.extend(cells.iter().map(|v| number(*v, 0)));
        row.push(number(*total, 0));
        table.add_row(row);
    }
    table
}

pub fn ratios(ratios: &RatioTable, index_header: &str) -> Table {
    let header = std::iter::once(index_header.to_string()).chain(ratios.columns.iter().map(label));

    let mut table = new_table(header);
    for (key, cells) in ratios.index.iter().zip(&ratios.cells) {
        let mut row = vec![Cell::new(label(key))];
        row.extend(cells.iter().map(|v| percent(*v)));
        table.add_row(row);
    }
    table
}

pub fn profiles(profiles: &[AsinProfile]) -> Table {
    let mut table = new_table([
        "ASIN", "Brand", "Months", "Stability", "Amount", "Avg price", "Avg rate", "Ink", "Pack", "Nib", "Dual tip",
    ]);
    for p in profiles {
        table.add_row(vec![
            Cell::new(&p.asin),
            Cell::new(&p.brand),
            Cell::new(p.months_listed).set_alignment(CellAlignment::Right),
            percent(Some(p.stability_score)),
            number(p.amount, 0),
            number(p.price, 2),
            number(p.rate, 2),
            Cell::new(&p.ink_delivery),
            number(p.unit_count, 0),
            Cell::new(&p.nib_type),
            Cell::new(&p.dual_tip),
        ]);
    }
    table
}

pub fn hierarchy(nodes: &[HierarchyNode], parent: &str, child: &str) -> Table {
    let mut table = new_table([parent, child, "Amount", "Share"]);
    for n in nodes {
        table.add_row(vec![
            Cell::new(label(&n.parent)),
            Cell::new(label(&n.child)),
            number(n.value, 0),
            percent(Some(n.share)),
        ]);
    }
    table
}

pub fn distributions(distributions: &[Distribution], category: &str) -> Table {
    let mut table = new_table([category, "n", "Min", "Q1", "Median", "Q3", "Max", "Mean"]);
    for d in distributions {
        let s = &d.summary;
        table.add_row(vec![
            Cell::new(label(&d.category)),
            Cell::new(d.values.len()).set_alignment(CellAlignment::Right),
            number(s.min, 2),
            number(s.q1, 2),
            number(s.median, 2),
            number(s.q3, 2),
            number(s.max, 2),
            number(d.mean, 2),
        ]);
    }
    table
}

pub fn view(result: &ViewResult) -> Table {
    let value_header = format!("{}({})", result.spec.agg, result.spec.measure);
    let header = result
        .spec
        .dimensions
        .iter()
        .map(|d| d.to_string())
        .chain(std::iter::once(value_header));

    let mut table = new_table(header);
    for row in &result.rows {
        let mut cells: Vec<Cell> = row.keys.iter().map(|k| Cell::new(label(k))).collect();
        cells.push(number(row.value(), 4));
        table.add_row(cells);
    }
    table
}
