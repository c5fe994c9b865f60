use serde::{Deserialize, Serialize};

use crate::model::{is_selected, Metric, Series, StoreSelection};

// Relative change between the halves needed to call a trend.
const TREND_THRESHOLD_PERCENT: f64 = 5.0;
// Trailing periods inspected for recent activity.
const RECENT_PERIODS: usize = 5;
// Active periods needed before performance is classified.
const PERFORMANCE_MIN_PERIODS: usize = 4;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Rising,
    Falling,
    Stable,
    Inactive,
}

/// Second-half average of active periods against the first half.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Performance {
    /// More than 10% up.
    Excellent,
    /// More than 5% up.
    Good,
    Neutral,
    /// More than 5% down.
    Low,
    /// More than 10% down.
    Concerning,
    /// Fewer than four active periods.
    Insufficient,
}

impl Performance {
    fn classify(first_avg: f64, second_avg: f64) -> Self {
        if second_avg > first_avg * 1.1 {
            Performance::Excellent
        } else if second_avg > first_avg * 1.05 {
            Performance::Good
        } else if second_avg < first_avg * 0.9 {
            Performance::Concerning
        } else if second_avg < first_avg * 0.95 {
            Performance::Low
        } else {
            Performance::Neutral
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Extreme {
    pub value: f64,
    pub period: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoreStatistics {
    pub store: String,
    pub total: f64,
    pub average: f64,
    pub median: f64,
    pub max: Option<Extreme>,
    pub min: Option<Extreme>,
    pub std_dev: f64,
    pub coefficient_of_variation: f64,
    pub trend: Trend,
    pub trend_percent: f64,
    pub active_periods: usize,
    pub total_periods: usize,
    pub best_streak: usize,
    pub worst_streak: usize,
    pub inactive: bool,
    pub performance: Performance,
    /// Average as a percentage of the best period.
    pub average_vs_best: f64,
    /// Average as a percentage of the worst period, 0 when that is 0.
    pub average_vs_worst: f64,
}

impl StoreStatistics {
    fn empty(store: &str, total_periods: usize) -> Self {
        Self {
            store: store.to_string(),
            total: 0.0,
            average: 0.0,
            median: 0.0,
            max: None,
            min: None,
            std_dev: 0.0,
            coefficient_of_variation: 0.0,
            trend: Trend::Inactive,
            trend_percent: 0.0,
            active_periods: 0,
            total_periods,
            best_streak: 0,
            worst_streak: 0,
            inactive: true,
            performance: Performance::Insufficient,
            average_vs_best: 0.0,
            average_vs_worst: 0.0,
        }
    }
}

/// Per-store figures for the statistics panel. `Resumen` is never included.
///
/// Averages, extremes and trend only look at active periods (metric > 0);
/// streaks walk every period in order.
pub fn store_statistics(series: &[Series], selection: &StoreSelection, metric: Metric) -> Vec<StoreStatistics> {
    series
        .iter()
        .filter(|s| !s.is_summary() && is_selected(selection, &s.name))
        .map(|s| statistics_for(s, metric))
        .collect()
}

fn statistics_for(series: &Series, metric: Metric) -> StoreStatistics {
    let values: Vec<f64> = series.data.iter().map(|p| p.metric(metric)).collect();
    let active: Vec<(&str, f64)> = series
        .data
        .iter()
        .zip(values.iter())
        .filter(|(_, v)| **v > 0.0)
        .map(|(p, v)| (p.label.as_str(), *v))
        .collect();

    if active.is_empty() {
        return StoreStatistics::empty(&series.name, values.len());
    }

    let n = active.len() as f64;
    let total: f64 = active.iter().map(|(_, v)| v).sum();
    let average = total / n;
    let variance = active.iter().map(|(_, v)| (v - average).powi(2)).sum::<f64>() / n;
    let std_dev = variance.sqrt();
    let coefficient_of_variation = if average > 0.0 { std_dev / average * 100.0 } else { 0.0 };
    let (trend, trend_percent) = trend(&active);
    let (best_streak, worst_streak) = streaks(&values, average);
    let inactive = !values.iter().rev().take(RECENT_PERIODS).any(|v| *v > 0.0);
    let max = extreme(&active, |candidate, best| candidate > best);
    let min = extreme(&active, |candidate, best| candidate < best);

    let (performance, average_vs_best, average_vs_worst) = if active.len() < PERFORMANCE_MIN_PERIODS {
        (Performance::Insufficient, 0.0, 0.0)
    } else {
        let (first_avg, second_avg) = half_averages(&active);
        (
            Performance::classify(first_avg, second_avg),
            max.as_ref().map_or(0.0, |e| percent_of(average, e.value)),
            min.as_ref().map_or(0.0, |e| percent_of(average, e.value)),
        )
    };

    StoreStatistics {
        store: series.name.clone(),
        total,
        average,
        median: median(active.iter().map(|(_, v)| *v).collect()),
        max,
        min,
        std_dev,
        coefficient_of_variation,
        trend,
        trend_percent,
        active_periods: active.len(),
        total_periods: values.len(),
        best_streak,
        worst_streak,
        inactive,
        performance,
        average_vs_best,
        average_vs_worst,
    }
}

// Rounded to one decimal; 0 when `whole` is 0.
fn percent_of(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    (part / whole * 1000.0).round() / 10.0
}

// Averages of the active values split at `len / 2`.
fn half_averages(active: &[(&str, f64)]) -> (f64, f64) {
    let (first, second) = active.split_at(active.len() / 2);
    let mean = |half: &[(&str, f64)]| {
        if half.is_empty() {
            0.0
        } else {
            half.iter().map(|(_, v)| v).sum::<f64>() / half.len() as f64
        }
    };
    (mean(first), mean(second))
}

fn median(mut values: Vec<f64>) -> f64 {
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

// First occurrence wins on equal values.
fn extreme(active: &[(&str, f64)], better: impl Fn(f64, f64) -> bool) -> Option<Extreme> {
    let mut iter = active.iter();
    let (label, value) = iter.next()?;
    let mut best = Extreme {
        value: *value,
        period: label.to_string(),
    };
    for (label, value) in iter {
        if better(*value, best.value) {
            best = Extreme {
                value: *value,
                period: label.to_string(),
            };
        }
    }
    Some(best)
}

fn trend(active: &[(&str, f64)]) -> (Trend, f64) {
    let (first_avg, second_avg) = half_averages(active);
    if first_avg <= 0.0 {
        return (Trend::Stable, 0.0);
    }

    let percent = (second_avg - first_avg) / first_avg * 100.0;
    let trend = if percent > TREND_THRESHOLD_PERCENT {
        Trend::Rising
    } else if percent < -TREND_THRESHOLD_PERCENT {
        Trend::Falling
    } else {
        Trend::Stable
    };
    (trend, percent)
}

fn streaks(values: &[f64], average: f64) -> (usize, usize) {
    let (mut best, mut worst) = (0, 0);
    let (mut above, mut below) = (0, 0);
    for &value in values {
        if value > average {
            above += 1;
            below = 0;
            best = best.max(above);
        } else if value > 0.0 && value < average {
            below += 1;
            above = 0;
            worst = worst.max(below);
        } else {
            above = 0;
            below = 0;
        }
    }
    (best, worst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::SUMMARY_SERIES;
    use crate::model::{DailyRecord, Point};

    fn series(name: &str, flujo: &[u64]) -> Series {
        Series {
            name: name.to_string(),
            data: flujo
                .iter()
                .enumerate()
                .map(|(i, f)| Point::new(format!("P{}", i + 1), DailyRecord::new(*f, 0)))
                .collect(),
        }
    }

    fn all(names: &[&str]) -> StoreSelection {
        names.iter().map(|n| (n.to_string(), true)).collect()
    }

    #[test]
    fn test_basic_figures() {
        let s = series("A", &[10, 0, 20, 30, 40]);
        let stats = store_statistics(&[s], &all(&["A"]), Metric::Flujo);
        let a = &stats[0];

        assert_eq!(a.active_periods, 4);
        assert_eq!(a.total_periods, 5);
        assert_eq!(a.total, 100.0);
        assert_eq!(a.average, 25.0);
        assert_eq!(a.median, 25.0);
        assert_eq!(a.max, Some(Extreme { value: 40.0, period: "P5".to_string() }));
        assert_eq!(a.min, Some(Extreme { value: 10.0, period: "P1".to_string() }));
        assert!((a.std_dev - 125f64.sqrt()).abs() < 1e-9);
        assert!(!a.inactive);
    }

    #[test]
    fn test_trend_rising_and_falling() {
        let rising = store_statistics(&[series("A", &[10, 10, 20, 20])], &all(&["A"]), Metric::Flujo);
        assert_eq!(rising[0].trend, Trend::Rising);
        assert_eq!(rising[0].trend_percent, 100.0);

        let falling = store_statistics(&[series("A", &[20, 20, 10, 10])], &all(&["A"]), Metric::Flujo);
        assert_eq!(falling[0].trend, Trend::Falling);

        let single = store_statistics(&[series("A", &[20])], &all(&["A"]), Metric::Flujo);
        assert_eq!(single[0].trend, Trend::Stable);
    }

    #[test]
    fn test_streaks() {
        // active average is ~31.7
        let s = series("A", &[40, 50, 10, 20, 0, 10, 60]);
        let stats = store_statistics(&[s], &all(&["A"]), Metric::Flujo);
        assert_eq!(stats[0].best_streak, 2);
        assert_eq!(stats[0].worst_streak, 2);
    }

    #[test]
    fn test_inactive_store() {
        let s = series("A", &[0, 0, 0]);
        let stats = store_statistics(&[s], &all(&["A"]), Metric::Flujo);
        assert_eq!(stats[0].trend, Trend::Inactive);
        assert_eq!(stats[0].active_periods, 0);
        assert!(stats[0].inactive);

        let stale = series("B", &[5, 0, 0, 0, 0, 0]);
        let stats = store_statistics(&[stale], &all(&["B"]), Metric::Flujo);
        assert!(stats[0].inactive);
        assert_eq!(stats[0].active_periods, 1);
    }

    #[test]
    fn test_skips_summary_and_unselected() {
        let list = vec![series("A", &[1]), series("B", &[2]), series(SUMMARY_SERIES, &[3])];
        let stats = store_statistics(&list, &all(&["A", SUMMARY_SERIES]), Metric::Flujo);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].store, "A");
    }

    fn performance_of(second_half: u64) -> Performance {
        // Zeros are not active, so the halves are [1000, 1000] and [x, x].
        let s = series("A", &[1000, 0, 1000, second_half, second_half]);
        store_statistics(&[s], &all(&["A"]), Metric::Flujo)[0].performance
    }

    #[test]
    fn test_performance_classes() {
        assert_eq!(performance_of(1101), Performance::Excellent);
        assert_eq!(performance_of(1100), Performance::Good);
        assert_eq!(performance_of(1051), Performance::Good);
        assert_eq!(performance_of(1050), Performance::Neutral);
        assert_eq!(performance_of(1000), Performance::Neutral);
        assert_eq!(performance_of(950), Performance::Neutral);
        assert_eq!(performance_of(949), Performance::Low);
        assert_eq!(performance_of(901), Performance::Low);
        assert_eq!(performance_of(899), Performance::Concerning);
    }

    #[test]
    fn test_performance_needs_four_active_periods() {
        let s = series("A", &[10, 0, 20, 30, 0]);
        let stats = store_statistics(&[s], &all(&["A"]), Metric::Flujo);
        assert_eq!(stats[0].performance, Performance::Insufficient);
        assert_eq!(stats[0].average_vs_best, 0.0);
        assert_eq!(stats[0].average_vs_worst, 0.0);

        let empty = store_statistics(&[series("B", &[0, 0])], &all(&["B"]), Metric::Flujo);
        assert_eq!(empty[0].performance, Performance::Insufficient);
    }

    #[test]
    fn test_average_against_best_and_worst() {
        let s = series("A", &[100, 100, 200, 200]);
        let stats = store_statistics(&[s], &all(&["A"]), Metric::Flujo);
        // average 150
        assert_eq!(stats[0].average_vs_best, 75.0);
        assert_eq!(stats[0].average_vs_worst, 150.0);
        assert_eq!(stats[0].performance, Performance::Excellent);
    }
}
