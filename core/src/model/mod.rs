pub mod dataset;
pub mod record;
pub mod series;

pub use dataset::{DataEnvelope, Dataset, Metadata};
pub use record::{cutoff_total, month_total, DailyRecord, MonthDays, StoreCalendar, StoreMonths};
pub use series::{is_selected, ComparisonRow, Granularity, Metric, Point, Series, StoreSelection};
