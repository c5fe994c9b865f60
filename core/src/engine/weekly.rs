use crate::calendar::{week_label, week_labels, week_of, WEEKS_PER_YEAR};
use crate::engine::summarize;
use crate::model::{DailyRecord, Point, Series, StoreCalendar, StoreMonths};

/// Fifty-two zero-filled week points per store, followed by the `Resumen`
/// series. Weeks come from the fixed month table in [`week_of`].
pub fn weekly_rollup(calendar: &StoreCalendar) -> Vec<Series> {
    let mut series: Vec<Series> = calendar
        .stores()
        .map(|(name, months)| Series {
            name: name.to_string(),
            data: store_weeks(months),
        })
        .collect();

    let summary = summarize(&series, &week_labels());
    series.push(summary);
    series
}

// One pass over the recorded days, bucketing each by week.
fn store_weeks(months: &StoreMonths) -> Vec<Point> {
    let mut buckets = vec![DailyRecord::default(); WEEKS_PER_YEAR as usize];

    for (&month, days) in months.range(1..=12) {
        for (&day, record) in days {
            let Some(week) = week_of(month, day).filter(|w| (1..=WEEKS_PER_YEAR).contains(w)) else {
                continue;
            };
            buckets[(week - 1) as usize] += *record;
        }
    }

    buckets
        .into_iter()
        .zip(1..)
        .map(|(totals, week)| Point::new(week_label(week), totals))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::monthly::monthly_rollup;

    fn scenario() -> StoreCalendar {
        let mut calendar = StoreCalendar::new();
        calendar.insert("A", 1, 1, DailyRecord::new(100, 10));
        calendar.insert("A", 1, 2, DailyRecord::new(200, 30));
        calendar
    }

    #[test]
    fn test_first_week_bucket() {
        let series = weekly_rollup(&scenario());
        let store = &series[0];
        assert_eq!(store.data.len(), 52);

        let week1 = &store.data[0];
        assert_eq!(week1.label, "Semana 1");
        assert_eq!((week1.flujo, week1.boletas, week1.conversion), (300, 40, 13.3));

        let week2 = &store.data[1];
        assert_eq!(week2.label, "Semana 2");
        assert_eq!((week2.flujo, week2.boletas, week2.conversion), (0, 0, 0.0));
        assert_eq!(store.data[51].label, "Semana 52");
    }

    #[test]
    fn test_overlapping_days_share_a_bucket() {
        let mut calendar = StoreCalendar::new();
        calendar.insert("A", 2, 29, DailyRecord::new(7, 1));
        calendar.insert("A", 3, 1, DailyRecord::new(3, 1));
        let series = weekly_rollup(&calendar);
        assert_eq!(series[0].data[9].flujo, 10);
    }

    #[test]
    fn test_days_outside_the_table_are_dropped() {
        let mut calendar = StoreCalendar::new();
        calendar.insert("A", 12, 40, DailyRecord::new(7, 1));
        calendar.insert("A", 13, 1, DailyRecord::new(7, 1));
        calendar.insert("A", 5, 0, DailyRecord::new(7, 1));
        let series = weekly_rollup(&calendar);
        assert!(series[0].data.iter().all(|p| p.flujo == 0));
    }

    #[test]
    fn test_weekly_and_monthly_totals_agree() {
        let mut calendar = StoreCalendar::new();
        for month in 1..=12 {
            for day in 1..=31 {
                calendar.insert("A", month, day, DailyRecord::new((month * day) as u64, day as u64));
                if day % 3 == 0 {
                    calendar.insert("B", month, day, DailyRecord::new(day as u64, 1));
                }
            }
        }

        let weekly = weekly_rollup(&calendar);
        let monthly = monthly_rollup(&calendar);
        for (w, m) in weekly.iter().zip(monthly.iter()) {
            assert_eq!(w.name, m.name);
            let w_flujo: u64 = w.data.iter().map(|p| p.flujo).sum();
            let m_flujo: u64 = m.data.iter().map(|p| p.flujo).sum();
            let w_boletas: u64 = w.data.iter().map(|p| p.boletas).sum();
            let m_boletas: u64 = m.data.iter().map(|p| p.boletas).sum();
            assert_eq!(w_flujo, m_flujo, "flujo mismatch for {}", w.name);
            assert_eq!(w_boletas, m_boletas, "boletas mismatch for {}", w.name);
        }
    }

    #[test]
    fn test_summary_is_elementwise_sum() {
        let mut calendar = scenario();
        calendar.insert("B", 6, 10, DailyRecord::new(40, 4));
        let series = weekly_rollup(&calendar);
        let summary = series.last().unwrap();
        assert!(summary.is_summary());
        for idx in 0..52 {
            let expected: u64 = series[..series.len() - 1].iter().map(|s| s.data[idx].flujo).sum();
            assert_eq!(summary.data[idx].flujo, expected);
        }
        assert_eq!(summary.data[week_of(6, 10).unwrap() as usize - 1].conversion, 10.0);
    }

    #[test]
    fn test_idempotent() {
        let mut calendar = scenario();
        calendar.insert("B", 8, 17, DailyRecord::new(60, 6));
        assert_eq!(weekly_rollup(&calendar), weekly_rollup(&calendar));
    }
}
