use std::cell::RefCell;
use std::collections::HashMap;

use anyhow::Result;
use serde::Serialize;

use crate::engine::cutoff::cutoff_comparison;
use crate::engine::monthly::monthly_rollup;
use crate::engine::normalize::{resolve_calendar, select_year};
use crate::engine::stats::{store_statistics, StoreStatistics};
use crate::engine::weekly::weekly_rollup;
use crate::engine::yoy::{CalendarYearOverYear, YearOverYear};
use crate::model::{ComparisonRow, DataEnvelope, Dataset, Granularity, Metric, Series, StoreSelection};
use crate::repository::DatasetRepository;

/// Series of one resolved year.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Rollup {
    pub year: i32,
    pub series: Vec<Series>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct YearSummary {
    pub year: i32,
    pub records: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct YearsOverview {
    pub legacy: bool,
    pub years: Vec<YearSummary>,
    /// Year the views use when none is requested.
    pub default_year: Option<i32>,
}

/// Every dashboard view over the stored dataset.
///
/// The dataset is loaded once and rollups are memoized per
/// `(year, granularity)`. Store selection never reaches the cache: it only
/// decides which computed values are read.
pub struct DashboardService<R: DatasetRepository, Y: YearOverYear = CalendarYearOverYear> {
    repo: R,
    year_over_year: Y,
    dataset: RefCell<Option<Dataset>>,
    rollups: RefCell<HashMap<(i32, Granularity), Rollup>>,
}

impl<R: DatasetRepository> DashboardService<R> {
    pub fn new(repo: R) -> Self {
        Self::with_year_over_year(repo, CalendarYearOverYear)
    }
}

impl<R: DatasetRepository, Y: YearOverYear> DashboardService<R, Y> {
    pub fn with_year_over_year(repo: R, year_over_year: Y) -> Self {
        Self {
            repo,
            year_over_year,
            dataset: RefCell::new(None),
            rollups: RefCell::new(HashMap::new()),
        }
    }

    fn with_dataset<T>(&self, f: impl FnOnce(&Dataset) -> T) -> Result<T> {
        if self.dataset.borrow().is_none() {
            let dataset = match self.repo.get()? {
                Some(envelope) => envelope.data,
                None => {
                    tracing::debug!("no dataset stored yet");
                    Dataset::default()
                }
            };
            *self.dataset.borrow_mut() = Some(dataset);
        }
        let guard = self.dataset.borrow();
        match guard.as_ref() {
            Some(dataset) => Ok(f(dataset)),
            None => Ok(f(&Dataset::default())),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn dataset(&self) -> Result<Dataset> {
        self.with_dataset(Clone::clone)
    }

    /// Drops everything cached so the next call reads the repository again.
    pub fn reload(&self) {
        self.dataset.borrow_mut().take();
        self.rollups.borrow_mut().clear();
    }

    pub fn replace_dataset(&self, envelope: &DataEnvelope) -> Result<()> {
        self.repo.set(envelope)?;
        self.rollups.borrow_mut().clear();
        *self.dataset.borrow_mut() = Some(envelope.data.clone());
        Ok(())
    }

    /// Rolled-up series for `year`, or for the default year when it is absent.
    /// `None` when the dataset has no years at all.
    pub fn rollup(&self, year: Option<i32>, granularity: Granularity) -> Result<Option<Rollup>> {
        self.with_dataset(|dataset| {
            let resolved = resolve_calendar(dataset, year)?;
            let key = (resolved.year, granularity);

            if let Some(cached) = self.rollups.borrow().get(&key) {
                tracing::debug!(year = resolved.year, ?granularity, "rollup cache hit");
                return Some(cached.clone());
            }

            tracing::debug!(year = resolved.year, ?granularity, "computing rollup");
            let series = match granularity {
                Granularity::Month => monthly_rollup(resolved.calendar),
                Granularity::Week => weekly_rollup(resolved.calendar),
            };
            let rollup = Rollup {
                year: resolved.year,
                series,
            };
            self.rollups.borrow_mut().insert(key, rollup.clone());
            Some(rollup)
        })
    }

    pub fn monthly(&self, year: Option<i32>) -> Result<Option<Rollup>> {
        self.rollup(year, Granularity::Month)
    }

    pub fn weekly(&self, year: Option<i32>) -> Result<Option<Rollup>> {
        self.rollup(year, Granularity::Week)
    }

    /// Month-by-month totals limited to days `1..=cutoff_day`.
    ///
    /// `cutoff_month` is accepted for the dashboard's benefit but does not
    /// restrict the months scanned.
    pub fn cutoff(
        &self,
        year: Option<i32>,
        cutoff_day: u32,
        cutoff_month: Option<u32>,
        selection: &StoreSelection,
        metric: Metric,
    ) -> Result<Vec<ComparisonRow>> {
        if let Some(month) = cutoff_month {
            tracing::debug!(cutoff_month = month, "cutoff month does not restrict the comparison");
        }
        self.with_dataset(|dataset| {
            resolve_calendar(dataset, year)
                .map(|resolved| cutoff_comparison(resolved.calendar, cutoff_day, selection, metric))
                .unwrap_or_default()
        })
    }

    pub fn year_over_year_by_month(
        &self,
        years: (i32, i32),
        granularity: Granularity,
        selection: &StoreSelection,
        metric: Metric,
    ) -> Result<Vec<ComparisonRow>> {
        self.with_dataset(|dataset| {
            self.year_over_year
                .by_month(dataset, years, granularity, selection, metric)
        })
    }

    pub fn year_over_year_by_day_cutoff(
        &self,
        years: (i32, i32),
        cutoff_month: u32,
        cutoff_day: u32,
        selection: &StoreSelection,
        metric: Metric,
    ) -> Result<Vec<ComparisonRow>> {
        self.with_dataset(|dataset| {
            self.year_over_year
                .by_day_cutoff(dataset, years, cutoff_month, cutoff_day, selection, metric)
        })
    }

    pub fn statistics(
        &self,
        year: Option<i32>,
        granularity: Granularity,
        selection: &StoreSelection,
        metric: Metric,
    ) -> Result<Vec<StoreStatistics>> {
        Ok(self
            .rollup(year, granularity)?
            .map(|rollup| store_statistics(&rollup.series, selection, metric))
            .unwrap_or_default())
    }

    pub fn years(&self) -> Result<YearsOverview> {
        self.with_dataset(|dataset| match dataset {
            Dataset::Legacy(_) => YearsOverview {
                legacy: true,
                years: dataset
                    .years()
                    .into_iter()
                    .map(|year| YearSummary {
                        year,
                        records: dataset.record_count(),
                    })
                    .collect(),
                default_year: resolve_calendar(dataset, None).map(|r| r.year),
            },
            Dataset::MultiYear(by_year) => YearsOverview {
                legacy: false,
                years: by_year
                    .iter()
                    .map(|(year, calendar)| YearSummary {
                        year: *year,
                        records: calendar.record_count(),
                    })
                    .collect(),
                default_year: select_year(by_year),
            },
        })
    }
}
