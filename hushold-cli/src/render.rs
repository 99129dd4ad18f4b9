//! Plain-text and CSV rendering of engine output. Rounding happens here
//! and nowhere else.

use anyhow::{Context, Result};
use hushold_core::{MonthKey, PointSource, ProjectionSeries};
use hushold_finance::{CategoryTable, MonthlySeries, SavingsPlan};
use std::io::Write;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

fn month_name(month: MonthKey) -> &'static str {
    MONTH_NAMES[(month.month() - 1) as usize]
}

fn whole(value: f64) -> String {
    // `+ 0.0` turns a rounded -0 into 0
    format!("{:.0}", value.round() + 0.0)
}

/// Category × month table with row totals and a totals line.
pub fn print_table(table: &CategoryTable, label: &str) {
    let width = table
        .names()
        .map(|n| n.chars().count())
        .chain([label.len(), "Total".len()])
        .max()
        .unwrap_or(8);
    let months: Vec<MonthKey> = MonthKey::months_of_year(table.year).collect();

    print!("{:<width$}", label);
    for m in &months {
        print!(" {:>8}", month_name(*m));
    }
    println!(" {:>10}", "Total");

    for row in &table.rows {
        print!("{:<width$}", row.name);
        for m in &months {
            print!(" {:>8}", whole(row.months.get(m).copied().unwrap_or(0.0)));
        }
        println!(" {:>10}", whole(row.total()));
    }

    print!("{:<width$}", "Total");
    for m in &months {
        print!(" {:>8}", whole(table.month_total(*m)));
    }
    println!(" {:>10}", whole(table.grand_total()));
}

/// Single labelled row of twelve months.
pub fn print_series_row(label: &str, series: &MonthlySeries) {
    let width = label.chars().count().max(8);
    print!("{:<width$}", "");
    for m in series.keys() {
        print!(" {:>8}", month_name(*m));
    }
    println!(" {:>10}", "Total");

    print!("{:<width$}", label);
    for v in series.values() {
        print!(" {:>8}", whole(*v));
    }
    println!(" {:>10}", whole(series.values().sum()));
}

/// Unrounded CSV: one row per category, one column per month, then total.
pub fn write_table_csv<W: Write>(table: &CategoryTable, label: &str, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    let months: Vec<MonthKey> = MonthKey::months_of_year(table.year).collect();

    let mut header = vec![label.to_string()];
    header.extend(months.iter().map(|m| m.to_string()));
    header.push("total".to_string());
    wtr.write_record(&header).context("write csv header")?;

    for row in &table.rows {
        let mut record = vec![row.name.clone()];
        record.extend(
            months
                .iter()
                .map(|m| row.months.get(m).copied().unwrap_or(0.0).to_string()),
        );
        record.push(row.total().to_string());
        wtr.write_record(&record).context("write csv row")?;
    }

    wtr.flush().context("flush csv")?;
    Ok(())
}

pub fn print_projection(series: &ProjectionSeries) {
    println!("{:<8} {:>10} {:>10} {:>10}  source", "month", "value", "lower", "upper");
    for p in &series.points {
        let bound = |b: Option<f64>| b.map(whole).unwrap_or_else(|| "-".to_string());
        let source = match p.source {
            PointSource::Actual => "actual",
            PointSource::Partial => "partial",
            PointSource::Forecast => "forecast",
            PointSource::Average => "average",
        };
        println!(
            "{:<8} {:>10} {:>10} {:>10}  {}",
            p.month.to_string(),
            whole(p.value),
            bound(p.lower),
            bound(p.upper),
            source
        );
    }
}

pub fn print_plan(plan: &SavingsPlan) {
    println!("Avg monthly income:   {}", whole(plan.avg_income));
    println!("Avg monthly expenses: {}", whole(plan.avg_expenses));
    println!("Projected savings:    {} / month\n", whole(plan.monthly_savings));

    println!("{:<20} {:>10} {:>8} {:>10} {:>12}", "category", "avg", "adj %", "projected", "total");
    for c in &plan.categories {
        println!(
            "{:<20} {:>10} {:>8} {:>10} {:>12}",
            c.name,
            whole(c.average),
            format!("{:+}", c.adjustment_pct),
            whole(c.projected),
            whole(c.total)
        );
    }

    println!(
        "\n{:<8} {:>10} {:>10} {:>10} {:>12}",
        "month", "income", "expenses", "savings", "cumulative"
    );
    for m in &plan.months {
        println!(
            "{:<8} {:>10} {:>10} {:>10} {:>12}",
            m.month.to_string(),
            whole(m.income),
            whole(m.expenses),
            whole(m.savings),
            whole(m.cumulative_savings)
        );
    }
}
