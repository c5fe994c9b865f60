use crate::calendar::{month_labels, MONTH_NAMES};
use crate::engine::summarize;
use crate::model::{month_total, Point, Series, StoreCalendar, StoreMonths};

/// Twelve zero-filled month points per store, followed by the `Resumen` series.
pub fn monthly_rollup(calendar: &StoreCalendar) -> Vec<Series> {
    let mut series: Vec<Series> = calendar
        .stores()
        .map(|(name, months)| Series {
            name: name.to_string(),
            data: store_months(months),
        })
        .collect();

    let summary = summarize(&series, &month_labels());
    series.push(summary);
    series
}

fn store_months(months: &StoreMonths) -> Vec<Point> {
    MONTH_NAMES
        .iter()
        .zip(1u32..)
        .map(|(label, month)| {
            let totals = months.get(&month).map(month_total).unwrap_or_default();
            Point::new(*label, totals)
        })
        .collect()
}
