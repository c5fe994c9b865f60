use crate::calendar::{MONTH_NAMES, SUMMARY_SERIES};
use crate::model::{cutoff_total, ComparisonRow, DailyRecord, Metric, StoreCalendar, StoreSelection};

/// Per-month totals using only days `1..=cutoff_day` of every month.
///
/// Each row carries the `metric` of every selected store that has the month
/// recorded, plus `Resumen` built from all stores regardless of selection.
/// All twelve months are scanned; restricting months is left to the caller.
pub fn cutoff_comparison(
    calendar: &StoreCalendar,
    cutoff_day: u32,
    selection: &StoreSelection,
    metric: Metric,
) -> Vec<ComparisonRow> {
    MONTH_NAMES
        .iter()
        .zip(1u32..)
        .map(|(label, month)| {
            let mut row = ComparisonRow::new(*label);

            let selected = selection
                .iter()
                .filter(|(name, selected)| **selected && name.as_str() != SUMMARY_SERIES);
            for (store, _) in selected {
                if let Some(days) = calendar.month(store, month) {
                    row.values.insert(store.clone(), metric.of(cutoff_total(days, cutoff_day)));
                }
            }

            let summary: DailyRecord = calendar
                .store_names()
                .filter_map(|store| calendar.month(store, month))
                .map(|days| cutoff_total(days, cutoff_day))
                .sum();
            row.values.insert(SUMMARY_SERIES.to_string(), metric.of(summary));

            row
        })
        .filter(|row| !row.values.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario() -> StoreCalendar {
        let mut calendar = StoreCalendar::new();
        calendar.insert("A", 1, 1, DailyRecord::new(100, 10));
        calendar.insert("A", 1, 2, DailyRecord::new(200, 30));
        calendar.insert("A", 1, 26, DailyRecord::new(50, 5));
        calendar.insert("B", 1, 3, DailyRecord::new(1000, 10));
        calendar.insert("B", 2, 3, DailyRecord::new(10, 1));
        calendar
    }

    fn select(names: &[&str]) -> StoreSelection {
        names.iter().map(|n| (n.to_string(), true)).collect()
    }

    #[test]
    fn test_cutoff_excludes_later_days() {
        let calendar = scenario();
        let rows = cutoff_comparison(&calendar, 25, &select(&["A"]), Metric::Flujo);
        assert_eq!(rows[0].period, "Enero");
        assert_eq!(rows[0].get("A"), Some(300.0));

        let rows = cutoff_comparison(&calendar, 26, &select(&["A"]), Metric::Flujo);
        assert_eq!(rows[0].get("A"), Some(350.0));
    }

    #[test]
    fn test_summary_ignores_selection() {
        let calendar = scenario();
        let only_a = cutoff_comparison(&calendar, 31, &select(&["A"]), Metric::Flujo);
        let none = cutoff_comparison(&calendar, 31, &StoreSelection::new(), Metric::Flujo);

        assert_eq!(only_a[0].get(SUMMARY_SERIES), Some(1350.0));
        assert_eq!(none[0].get(SUMMARY_SERIES), Some(1350.0));
        assert_eq!(none[0].values.len(), 1);
    }

    #[test]
    fn test_stores_without_the_month_are_omitted() {
        let calendar = scenario();
        let rows = cutoff_comparison(&calendar, 31, &select(&["A", "B"]), Metric::Boletas);
        let february = &rows[1];
        assert_eq!(february.period, "Febrero");
        assert_eq!(february.get("A"), None);
        assert_eq!(february.get("B"), Some(1.0));
        assert_eq!(rows.len(), 12);
    }

    #[test]
    fn test_unselected_unknown_and_summary_entries_skipped() {
        let calendar = scenario();
        let mut selection = select(&["Ghost", SUMMARY_SERIES]);
        selection.insert("A".to_string(), false);
        let rows = cutoff_comparison(&calendar, 31, &selection, Metric::Flujo);
        assert_eq!(rows[0].values.keys().collect::<Vec<_>>(), vec![SUMMARY_SERIES]);
    }

    #[test]
    fn test_conversion_from_cutoff_totals() {
        let calendar = scenario();
        let rows = cutoff_comparison(&calendar, 2, &select(&["A"]), Metric::Conversion);
        assert_eq!(rows[0].get("A"), Some(13.3));
        // 40 / 300 summed with B's day 3 excluded
        assert_eq!(rows[0].get(SUMMARY_SERIES), Some(13.3));
    }

    #[test]
    fn test_monotonic_in_cutoff_day() {
        let calendar = scenario();
        let selection = select(&["A", "B"]);
        let mut previous = cutoff_comparison(&calendar, 0, &selection, Metric::Flujo);
        for day in 1..=31 {
            let current = cutoff_comparison(&calendar, day, &selection, Metric::Flujo);
            for (before, after) in previous.iter().zip(current.iter()) {
                for (key, value) in &before.values {
                    assert!(after.get(key).unwrap() >= *value);
                }
            }
            previous = current;
        }
    }

    #[test]
    fn test_empty_calendar_yields_zero_summary_rows() {
        let rows = cutoff_comparison(&StoreCalendar::new(), 10, &select(&["A"]), Metric::Flujo);
        assert_eq!(rows.len(), 12);
        assert!(rows.iter().all(|r| r.get(SUMMARY_SERIES) == Some(0.0)));
    }

    #[test]
    fn test_idempotent() {
        let calendar = scenario();
        let selection = select(&["A", "B"]);
        assert_eq!(
            cutoff_comparison(&calendar, 15, &selection, Metric::Conversion),
            cutoff_comparison(&calendar, 15, &selection, Metric::Conversion)
        );
    }
}
