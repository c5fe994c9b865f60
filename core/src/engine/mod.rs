pub mod cutoff;
pub mod monthly;
pub mod normalize;
pub mod projection;
pub mod stats;
pub mod weekly;
pub mod yoy;

use crate::calendar::SUMMARY_SERIES;
use crate::model::{DailyRecord, Point, Series};

/// Cross-store series built from already rolled-up store series, period by
/// period. Conversion comes from the summed totals.
pub(crate) fn summarize(stores: &[Series], labels: &[String]) -> Series {
    let data = labels
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let totals: DailyRecord = stores
                .iter()
                .filter_map(|s| s.data.get(idx))
                .map(Point::totals)
                .sum();
            Point::new(label.clone(), totals)
        })
        .collect();

    Series {
        name: SUMMARY_SERIES.to_string(),
        data,
    }
}
