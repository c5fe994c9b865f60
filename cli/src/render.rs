use anyhow::Result;
use footfall_core::calendar::SUMMARY_SERIES;
use footfall_core::engine::stats::Extreme;
use footfall_core::{ComparisonRow, Metric, StoreStatistics, YearsOverview};
use serde::Serialize;
use tabled::builder::Builder;
use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};

#[derive(Tabled)]
struct YearRow {
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "Records")]
    records: usize,
    #[tabled(rename = "Default")]
    default: String,
}

#[derive(Tabled)]
struct StatsRow {
    #[tabled(rename = "Store")]
    store: String,
    #[tabled(rename = "Total")]
    total: String,
    #[tabled(rename = "Avg")]
    average: String,
    #[tabled(rename = "Median")]
    median: String,
    #[tabled(rename = "Max")]
    max: String,
    #[tabled(rename = "Min")]
    min: String,
    #[tabled(rename = "CV %")]
    cv: String,
    #[tabled(rename = "Trend")]
    trend: String,
    #[tabled(rename = "Active")]
    active: String,
    #[tabled(rename = "Streaks +/-")]
    streaks: String,
    #[tabled(rename = "Performance")]
    performance: String,
    #[tabled(rename = "Avg/Best %")]
    vs_best: String,
    #[tabled(rename = "Avg/Worst %")]
    vs_worst: String,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn styled(mut table: Table) -> Table {
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table
}

fn format_value(value: f64, metric: Metric) -> String {
    match metric {
        Metric::Conversion => format!("{:.1}", value),
        _ => format!("{:.0}", value),
    }
}

// Summary columns ("Resumen" or "Resumen (2025)") go last.
fn is_summary_column(key: &str) -> bool {
    key == SUMMARY_SERIES || key.starts_with(&format!("{} (", SUMMARY_SERIES))
}

fn columns(rows: &[ComparisonRow]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for key in rows.iter().flat_map(|row| row.values.keys()) {
        if !columns.contains(key) {
            columns.push(key.clone());
        }
    }
    columns.sort_by(|a, b| (is_summary_column(a), a).cmp(&(is_summary_column(b), b)));
    columns
}

pub fn show_comparison(rows: &[ComparisonRow], metric: Metric) {
    let columns = columns(rows);

    let mut builder = Builder::default();
    builder.push_record(std::iter::once("Period".to_string()).chain(columns.iter().cloned()));
    for row in rows {
        let cells = columns.iter().map(|column| {
            row.get(column)
                .map(|value| format_value(value, metric))
                .unwrap_or_else(|| "-".to_string())
        });
        builder.push_record(std::iter::once(row.period.clone()).chain(cells));
    }

    println!("{}", styled(builder.build()));
}

pub fn show_years(overview: &YearsOverview) {
    let rows = overview.years.iter().map(|summary| YearRow {
        year: summary.year,
        records: summary.records,
        default: if overview.default_year == Some(summary.year) { "*".to_string() } else { String::new() },
    });

    if overview.legacy {
        println!("Legacy single-year dataset");
    }
    println!("{}", styled(Table::new(rows)));
}

pub fn show_statistics(stats: &[StoreStatistics], metric: Metric) {
    let rows = stats.iter().map(|s| {
        let extreme = |e: &Option<Extreme>| {
            e.as_ref()
                .map(|e| format!("{} ({})", format_value(e.value, metric), e.period))
                .unwrap_or_else(|| "-".to_string())
        };
        StatsRow {
            store: if s.inactive { format!("{} (inactive)", s.store) } else { s.store.clone() },
            total: format_value(s.total, metric),
            average: format!("{:.1}", s.average),
            median: format!("{:.1}", s.median),
            max: extreme(&s.max),
            min: extreme(&s.min),
            cv: format!("{:.1}", s.coefficient_of_variation),
            trend: format!("{:?} {:+.1}%", s.trend, s.trend_percent),
            active: format!("{}/{}", s.active_periods, s.total_periods),
            streaks: format!("{}/{}", s.best_streak, s.worst_streak),
            performance: format!("{:?}", s.performance),
            vs_best: format!("{:.1}", s.average_vs_best),
            vs_worst: format!("{:.1}", s.average_vs_worst),
        }
    });

    println!("{}", styled(Table::new(rows)));
}
