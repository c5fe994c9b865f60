use std::collections::BTreeMap;

use crate::calendar::LEGACY_DEFAULT_YEAR;
use crate::model::{Dataset, StoreCalendar};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedCalendar<'a> {
    pub calendar: &'a StoreCalendar,
    pub year: i32,
}

/// Picks the calendar the views operate on.
///
/// Legacy datasets always resolve to [`LEGACY_DEFAULT_YEAR`]. Multi-year
/// datasets use `requested_year` when it is present, otherwise the year with
/// the most recorded days. `None` when the dataset has no years.
pub fn resolve_calendar(dataset: &Dataset, requested_year: Option<i32>) -> Option<ResolvedCalendar<'_>> {
    match dataset {
        Dataset::Legacy(calendar) => Some(ResolvedCalendar {
            calendar,
            year: LEGACY_DEFAULT_YEAR,
        }),
        Dataset::MultiYear(by_year) => {
            let year = requested_year
                .filter(|y| by_year.contains_key(y))
                .or_else(|| select_year(by_year))?;
            by_year.get(&year).map(|calendar| ResolvedCalendar { calendar, year })
        }
    }
}

/// Year with the most recorded day entries across all stores and months.
///
/// Ties go to the largest tied year, and a dataset where every year is empty
/// picks the largest year key.
pub fn select_year(by_year: &BTreeMap<i32, StoreCalendar>) -> Option<i32> {
    let mut best = *by_year.keys().next_back()?;
    let mut max_records = 0;

    // Ascending scan; `>=` lets a later (larger) year take over a tie.
    for (year, calendar) in by_year {
        let records = calendar.record_count();
        if records >= max_records {
            max_records = records;
            best = *year;
        }
    }

    Some(best)
}
