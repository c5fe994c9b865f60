pub mod calendar;
pub mod config;
pub mod engine;
pub mod model;
pub mod repository;
pub mod service;

pub use config::Settings;
pub use engine::stats::{Performance, StoreStatistics, Trend};
pub use engine::yoy::{series_key, CalendarYearOverYear, YearOverYear};
pub use model::{ComparisonRow, DailyRecord, DataEnvelope, Dataset, Granularity, Metadata, Metric, Series, StoreSelection};
pub use repository::{DatasetRepository, FileDatasetRepository};
pub use service::dashboard_service::{DashboardService, Rollup, YearSummary, YearsOverview};
