use crate::model::{is_selected, ComparisonRow, Metric, Series, StoreSelection};

/// Chart rows for the visible periods, reading already rolled-up series.
///
/// Only series whose name is selected appear (`Resumen` included when it is
/// selected). A series without a point for a period simply has no value there.
pub fn project(series: &[Series], selection: &StoreSelection, periods: &[String], metric: Metric) -> Vec<ComparisonRow> {
    periods
        .iter()
        .map(|period| {
            let mut row = ComparisonRow::new(period.clone());
            for s in series.iter().filter(|s| is_selected(selection, &s.name)) {
                if let Some(point) = s.point(period) {
                    row.values.insert(s.name.clone(), point.metric(metric));
                }
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{week_labels, SUMMARY_SERIES};
    use crate::engine::monthly::monthly_rollup;
    use crate::engine::weekly::weekly_rollup;
    use crate::model::{DailyRecord, StoreCalendar};

    fn rollup() -> Vec<Series> {
        let mut calendar = StoreCalendar::new();
        calendar.insert("A", 1, 1, DailyRecord::new(100, 10));
        calendar.insert("B", 2, 1, DailyRecord::new(40, 10));
        monthly_rollup(&calendar)
    }

    #[test]
    fn test_rows_follow_visible_periods() {
        let selection = StoreSelection::from([("A".to_string(), true), (SUMMARY_SERIES.to_string(), true)]);
        let periods = vec!["Febrero".to_string(), "Enero".to_string()];
        let rows = project(&rollup(), &selection, &periods, Metric::Flujo);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].period, "Febrero");
        assert_eq!(rows[0].get("A"), Some(0.0));
        assert_eq!(rows[0].get(SUMMARY_SERIES), Some(40.0));
        assert_eq!(rows[0].get("B"), None);
        assert_eq!(rows[1].get("A"), Some(100.0));
    }

    #[test]
    fn test_selection_does_not_change_summary_values() {
        let series = rollup();
        let periods = vec!["Enero".to_string(), "Febrero".to_string()];
        let with_all = StoreSelection::from([
            ("A".to_string(), true),
            ("B".to_string(), true),
            (SUMMARY_SERIES.to_string(), true),
        ]);
        let summary_only = StoreSelection::from([(SUMMARY_SERIES.to_string(), true)]);

        let a = project(&series, &with_all, &periods, Metric::Flujo);
        let b = project(&series, &summary_only, &periods, Metric::Flujo);
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.get(SUMMARY_SERIES), y.get(SUMMARY_SERIES));
        }
    }

    #[test]
    fn test_unknown_period_yields_empty_row() {
        let selection = StoreSelection::from([("A".to_string(), true)]);
        let rows = project(&rollup(), &selection, &["Semana 3".to_string()], Metric::Conversion);
        assert!(rows[0].values.is_empty());
    }

    #[test]
    fn test_weekly_summary_unaffected_by_selection() {
        let mut calendar = StoreCalendar::new();
        calendar.insert("A", 1, 1, DailyRecord::new(100, 10));
        calendar.insert("B", 1, 3, DailyRecord::new(40, 10));
        calendar.insert("B", 2, 9, DailyRecord::new(25, 5));
        let series = weekly_rollup(&calendar);
        let periods = week_labels();

        let everything = StoreSelection::from([
            ("A".to_string(), true),
            ("B".to_string(), true),
            (SUMMARY_SERIES.to_string(), true),
        ]);
        let only_a = StoreSelection::from([("A".to_string(), true), (SUMMARY_SERIES.to_string(), true)]);

        let full = project(&series, &everything, &periods, Metric::Conversion);
        let partial = project(&series, &only_a, &periods, Metric::Conversion);
        assert_eq!(full.len(), 52);
        for (x, y) in full.iter().zip(partial.iter()) {
            assert_eq!(x.get(SUMMARY_SERIES), y.get(SUMMARY_SERIES));
            assert_eq!(y.get("B"), None);
        }
        // (10 + 10) / (100 + 40)
        assert_eq!(partial[0].get(SUMMARY_SERIES), Some(14.3));
    }
}
