use std::collections::BTreeMap;

use crate::calendar::{month_labels, week_labels, MONTH_NAMES, SUMMARY_SERIES};
use crate::engine::{monthly::monthly_rollup, weekly::weekly_rollup};
use crate::model::{
    cutoff_total, is_selected, ComparisonRow, DailyRecord, Dataset, Granularity, Metric, StoreCalendar,
    StoreSelection,
};

/// Comparison of the same calendar periods across two years.
///
/// Series keys are `"<store> (<year>)"`. Every year contributes a
/// `"Resumen (<year>)"` key built from all of that year's stores.
pub trait YearOverYear {
    fn by_month(
        &self,
        dataset: &Dataset,
        years: (i32, i32),
        granularity: Granularity,
        selection: &StoreSelection,
        metric: Metric,
    ) -> Vec<ComparisonRow>;

    fn by_day_cutoff(
        &self,
        dataset: &Dataset,
        years: (i32, i32),
        cutoff_month: u32,
        cutoff_day: u32,
        selection: &StoreSelection,
        metric: Metric,
    ) -> Vec<ComparisonRow>;
}

pub fn series_key(name: &str, year: i32) -> String {
    format!("{} ({})", name, year)
}

/// Year-over-year built on the same rollups as the single-year views.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalendarYearOverYear;

impl YearOverYear for CalendarYearOverYear {
    fn by_month(
        &self,
        dataset: &Dataset,
        years: (i32, i32),
        granularity: Granularity,
        selection: &StoreSelection,
        metric: Metric,
    ) -> Vec<ComparisonRow> {
        let calendars = calendars_for(dataset, years);
        if calendars.is_empty() {
            return Vec::new();
        }

        let labels = match granularity {
            Granularity::Month => month_labels(),
            Granularity::Week => week_labels(),
        };
        let rollups: Vec<_> = calendars
            .into_iter()
            .map(|(year, calendar)| {
                let series = match granularity {
                    Granularity::Month => monthly_rollup(calendar),
                    Granularity::Week => weekly_rollup(calendar),
                };
                (year, series)
            })
            .collect();

        labels
            .into_iter()
            .enumerate()
            .map(|(idx, label)| {
                let mut row = ComparisonRow::new(label);
                for (year, series) in &rollups {
                    for s in series {
                        if !s.is_summary() && !is_selected(selection, &s.name) {
                            continue;
                        }
                        if let Some(point) = s.data.get(idx) {
                            row.values.insert(series_key(&s.name, *year), point.metric(metric));
                        }
                    }
                }
                row
            })
            .collect()
    }

    fn by_day_cutoff(
        &self,
        dataset: &Dataset,
        years: (i32, i32),
        cutoff_month: u32,
        cutoff_day: u32,
        selection: &StoreSelection,
        metric: Metric,
    ) -> Vec<ComparisonRow> {
        let calendars = calendars_for(dataset, years);
        if calendars.is_empty() {
            return Vec::new();
        }

        let last_month = cutoff_month.min(12) as usize;
        MONTH_NAMES[..last_month]
            .iter()
            .zip(1u32..)
            .map(|(label, month)| {
                let mut row = ComparisonRow::new(*label);
                for (year, calendar) in &calendars {
                    let totals = store_totals(calendar, month, cutoff_day);
                    let summary: DailyRecord = totals.values().sum();
                    for (store, total) in totals {
                        if store != SUMMARY_SERIES && is_selected(selection, store) {
                            row.values.insert(series_key(store, *year), metric.of(total));
                        }
                    }
                    row.values.insert(series_key(SUMMARY_SERIES, *year), metric.of(summary));
                }
                row
            })
            .collect()
    }
}

// Requested years that exist in the dataset, each once.
fn calendars_for(dataset: &Dataset, (first, second): (i32, i32)) -> Vec<(i32, &StoreCalendar)> {
    let mut years = vec![first];
    if second != first {
        years.push(second);
    }
    years
        .into_iter()
        .filter_map(|year| dataset.calendar(year).map(|calendar| (year, calendar)))
        .collect()
}

// Cutoff-limited totals of every store for one month, zero when unrecorded.
fn store_totals(calendar: &StoreCalendar, month: u32, cutoff_day: u32) -> BTreeMap<&str, DailyRecord> {
    calendar
        .store_names()
        .map(|store| {
            let total = calendar
                .month(store, month)
                .map(|days| cutoff_total(days, cutoff_day))
                .unwrap_or_default();
            (store, total)
        })
        .collect()
}
