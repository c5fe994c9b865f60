mod render;

use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use footfall_core::calendar::{days_in_month, month_label, month_labels, week_labels, SUMMARY_SERIES};
use footfall_core::engine::normalize::resolve_calendar;
use footfall_core::engine::projection::project;
use footfall_core::{
    ComparisonRow, DashboardService, DataEnvelope, Dataset, FileDatasetRepository, Granularity, Metric, Settings,
    StoreSelection,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "footfall")]
#[command(about = "Retail footfall and conversion dashboard", long_about = None)]
struct Cli {
    /// Directory holding daily-data.json (overrides FOOTFALL_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Clone)]
struct ViewArgs {
    /// flujo, boletas or conversion
    #[arg(long)]
    metric: Option<Metric>,
    /// Comma separated store names; defaults to every store plus Resumen
    #[arg(long, value_delimiter = ',')]
    stores: Vec<String>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Store a dataset blob (legacy or multi-year, wrapped or bare)
    Import { file: PathBuf },
    /// List the years in the stored dataset
    Years,
    /// Monthly totals per store
    Monthly {
        #[arg(long)]
        year: Option<i32>,
        /// Comma separated period labels to show
        #[arg(long, value_delimiter = ',')]
        periods: Vec<String>,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Weekly totals per store
    Weekly {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long, value_delimiter = ',')]
        periods: Vec<String>,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Month by month totals up to a day of the month
    Cutoff {
        #[arg(long)]
        day: u32,
        #[arg(long)]
        month: Option<u32>,
        #[arg(long)]
        year: Option<i32>,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Compare two years period by period
    Yoy {
        #[arg(long)]
        year1: i32,
        #[arg(long)]
        year2: i32,
        #[arg(long, default_value = "month")]
        granularity: Granularity,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Compare two years up to a month and day
    YoyCutoff {
        #[arg(long)]
        year1: i32,
        #[arg(long)]
        year2: i32,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        day: u32,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Per-store statistics
    Stats {
        #[arg(long)]
        year: Option<i32>,
        /// Use weekly periods instead of months
        #[arg(long)]
        weekly: bool,
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Number of days a month has, for picking a cutoff day
    Days {
        #[arg(long)]
        year: i32,
        #[arg(long)]
        month: u32,
    },
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// Explicit store list, or every known store plus the summary series.
fn selection_for(stores: &[String], known: impl IntoIterator<Item = String>) -> StoreSelection {
    if stores.is_empty() {
        known
            .into_iter()
            .chain(std::iter::once(SUMMARY_SERIES.to_string()))
            .map(|name| (name, true))
            .collect()
    } else {
        stores.iter().map(|name| (name.trim().to_string(), true)).collect()
    }
}

fn stores_in(dataset: &Dataset, years: &[i32]) -> BTreeSet<String> {
    years
        .iter()
        .filter_map(|year| dataset.calendar(*year))
        .flat_map(|calendar| calendar.store_names().map(str::to_string).collect::<Vec<_>>())
        .collect()
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let settings = Settings::from_env()?;
    let repo = FileDatasetRepository::new(cli.data_dir.clone().or_else(|| settings.data_dir.clone()))?;
    tracing::debug!(path = %repo.path().display(), "using dataset file");
    let service = DashboardService::new(repo);
    let metric_or_default = |metric: Option<Metric>| metric.unwrap_or_else(|| settings.metric());

    match cli.command {
        Commands::Import { file } => {
            let reader = BufReader::new(
                File::open(&file).with_context(|| format!("Failed to open {}", file.display()))?,
            );
            let value: serde_json::Value =
                serde_json::from_reader(reader).with_context(|| format!("Failed to parse {}", file.display()))?;
            let imported = DataEnvelope::from_value(&value)?;
            tracing::info!(file = %file.display(), legacy = imported.data.is_legacy(), "importing dataset");
            if imported.data.is_empty() {
                tracing::warn!(file = %file.display(), "imported dataset has no stores or years");
            }
            let envelope = DataEnvelope::new(imported.data, Utc::now());
            service.replace_dataset(&envelope)?;

            if cli.json {
                render::print_json(&envelope.metadata)?;
            } else {
                println!(
                    "Imported {} records ({}) into {}",
                    envelope.metadata.records_processed,
                    if envelope.data.is_legacy() { "legacy layout" } else { "multi-year layout" },
                    service.repo().path().display()
                );
            }
        }
        Commands::Years => {
            let overview = service.years()?;
            if cli.json {
                render::print_json(&overview)?;
            } else if overview.years.is_empty() {
                println!("No data imported yet.");
            } else {
                render::show_years(&overview);
            }
        }
        Commands::Monthly { year, periods, view } => {
            let metric = metric_or_default(view.metric);
            show_rollup(&service, Granularity::Month, year, periods, &view.stores, metric, cli.json)?;
        }
        Commands::Weekly { year, periods, view } => {
            let metric = metric_or_default(view.metric);
            show_rollup(&service, Granularity::Week, year, periods, &view.stores, metric, cli.json)?;
        }
        Commands::Cutoff { day, month, year, view } => {
            let dataset = service.dataset()?;
            let resolved = resolve_calendar(&dataset, year).map(|r| r.year);
            let known = stores_in(&dataset, &resolved.into_iter().collect::<Vec<_>>());
            let selection = selection_for(&view.stores, known);
            let metric = metric_or_default(view.metric);
            let rows = service.cutoff(year, day, month, &selection, metric)?;
            output_rows(cli.json, &rows, metric)?;
        }
        Commands::Yoy { year1, year2, granularity, view } => {
            let known = stores_in(&service.dataset()?, &[year1, year2]);
            let selection = selection_for(&view.stores, known);
            let metric = metric_or_default(view.metric);
            let rows = service.year_over_year_by_month((year1, year2), granularity, &selection, metric)?;
            output_rows(cli.json, &rows, metric)?;
        }
        Commands::YoyCutoff { year1, year2, month, day, view } => {
            let known = stores_in(&service.dataset()?, &[year1, year2]);
            let selection = selection_for(&view.stores, known);
            let metric = metric_or_default(view.metric);
            let rows = service.year_over_year_by_day_cutoff((year1, year2), month, day, &selection, metric)?;
            output_rows(cli.json, &rows, metric)?;
        }
        Commands::Stats { year, weekly, view } => {
            let granularity = if weekly { Granularity::Week } else { Granularity::Month };
            let dataset = service.dataset()?;
            let resolved = resolve_calendar(&dataset, year).map(|r| r.year);
            let known = stores_in(&dataset, &resolved.into_iter().collect::<Vec<_>>());
            let selection = selection_for(&view.stores, known);
            let metric = metric_or_default(view.metric);
            let stats = service.statistics(year, granularity, &selection, metric)?;

            if cli.json {
                render::print_json(&stats)?;
            } else if stats.is_empty() {
                println!("No stores to report.");
            } else {
                render::show_statistics(&stats, metric);
            }
        }
        Commands::Days { year, month } => {
            let label = month_label(month).with_context(|| format!("Invalid month {}", month))?;
            let days = days_in_month(year, month).with_context(|| format!("Invalid month {} for {}", month, year))?;
            if cli.json {
                render::print_json(&days)?;
            } else {
                println!("{} {}: {} days", label, year, days);
            }
        }
    }
    Ok(())
}

fn output_rows(json: bool, rows: &[ComparisonRow], metric: Metric) -> Result<()> {
    if json {
        render::print_json(&rows)
    } else if rows.is_empty() {
        println!("No data for the requested years.");
        Ok(())
    } else {
        render::show_comparison(rows, metric);
        Ok(())
    }
}

fn show_rollup(
    service: &DashboardService<FileDatasetRepository>,
    granularity: Granularity,
    year: Option<i32>,
    periods: Vec<String>,
    stores: &[String],
    metric: Metric,
    json: bool,
) -> Result<()> {
    let Some(rollup) = service.rollup(year, granularity)? else {
        println!("No data imported yet.");
        return Ok(());
    };
    let known: Vec<String> = rollup.series.iter().filter(|s| !s.is_summary()).map(|s| s.name.clone()).collect();
    let selection = selection_for(stores, known);
    let periods = if periods.is_empty() {
        match granularity {
            Granularity::Month => month_labels(),
            Granularity::Week => week_labels(),
        }
    } else {
        periods
    };
    let rows = project(&rollup.series, &selection, &periods, metric);

    if json {
        render::print_json(&rows)
    } else {
        println!("{} ({})", rollup.year, metric);
        render::show_comparison(&rows, metric);
        Ok(())
    }
}
