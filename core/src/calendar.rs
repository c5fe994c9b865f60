use chrono::{Datelike, Duration, NaiveDate};

pub const MONTH_NAMES: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio",
    "Julio", "Agosto", "Septiembre", "Octubre", "Noviembre", "Diciembre",
];

pub const WEEKS_PER_YEAR: u32 = 52;

/// Year assumed for datasets stored in the single-year layout.
pub const LEGACY_DEFAULT_YEAR: i32 = 2025;

/// Name of the synthetic cross-store series.
pub const SUMMARY_SERIES: &str = "Resumen";

// First week bucket of each month. Approximate on purpose: every month owns a
// fixed run of buckets no matter how its days fall on the real calendar.
const MONTH_TO_WEEK_START: [u32; 12] = [1, 6, 10, 15, 19, 23, 28, 32, 36, 40, 44, 48];

pub fn month_label(month: u32) -> Option<&'static str> {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES.get(idx as usize))
        .copied()
}

pub fn week_label(week: u32) -> String {
    format!("Semana {}", week)
}

pub fn month_labels() -> Vec<String> {
    MONTH_NAMES.iter().map(|m| m.to_string()).collect()
}

pub fn week_labels() -> Vec<String> {
    (1..=WEEKS_PER_YEAR).map(week_label).collect()
}

/// Global week bucket for a (month, day) pair.
///
/// Returns `None` for a month outside 1..=12 or day 0. Days past 31 still map
/// to a number, which can land beyond [`WEEKS_PER_YEAR`]; callers drop those.
pub fn week_of(month: u32, day: u32) -> Option<u32> {
    if day == 0 {
        return None;
    }
    let week_start = *MONTH_TO_WEEK_START.get(month.checked_sub(1)? as usize)?;
    let week_in_month = day.div_ceil(7);
    Some(week_start + week_in_month - 1)
}

/// Transactions per hundred visits, rounded to one decimal. Zero when there
/// were no visits.
///
/// Rounds the per-mille ratio half away from zero, so 3 of 2000 is 0.2
/// (not the 0.1 a binary `toFixed(1)` of 0.15 gives).
pub fn conversion(flujo: u64, boletas: u64) -> f64 {
    if flujo == 0 {
        return 0.0;
    }
    let per_mille = boletas as f64 * 1000.0 / flujo as f64;
    per_mille.round() / 10.0
}

/// Real length of a month, used to offer cutoff-day choices.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((next_month - Duration::days(1)).day())
}
