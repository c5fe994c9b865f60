use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Visits (`flujo`) and completed transactions (`boletas`) of one store on one day.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DailyRecord {
    #[serde(default)]
    pub flujo: u64,
    #[serde(default)]
    pub boletas: u64,
}

impl DailyRecord {
    pub fn new(flujo: u64, boletas: u64) -> Self {
        Self { flujo, boletas }
    }
}

// Saturates instead of overflowing on absurdly large counts.
impl Add for DailyRecord {
    type Output = DailyRecord;

    fn add(self, other: DailyRecord) -> DailyRecord {
        DailyRecord {
            flujo: self.flujo.saturating_add(other.flujo),
            boletas: self.boletas.saturating_add(other.boletas),
        }
    }
}

impl AddAssign for DailyRecord {
    fn add_assign(&mut self, other: DailyRecord) {
        *self = *self + other;
    }
}

impl Sum for DailyRecord {
    fn sum<I: Iterator<Item = DailyRecord>>(iter: I) -> Self {
        iter.fold(DailyRecord::default(), Add::add)
    }
}

impl<'a> Sum<&'a DailyRecord> for DailyRecord {
    fn sum<I: Iterator<Item = &'a DailyRecord>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Day number -> record.
pub type MonthDays = BTreeMap<u32, DailyRecord>;
/// Month number -> days.
pub type StoreMonths = BTreeMap<u32, MonthDays>;

/// Sum of every day present in a month.
pub fn month_total(days: &MonthDays) -> DailyRecord {
    days.values().sum()
}

/// Sum of days `1..=cutoff_day`. Later days are never read.
pub fn cutoff_total(days: &MonthDays, cutoff_day: u32) -> DailyRecord {
    if cutoff_day == 0 {
        return DailyRecord::default();
    }
    days.range(1..=cutoff_day).map(|(_, record)| record).sum()
}

/// Store name -> month -> day -> record, for a single year.
///
/// Sparse: a missing month or day means "no data". It sums as zero but is
/// not counted as a recorded day.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct StoreCalendar {
    stores: BTreeMap<String, StoreMonths>,
}

impl StoreCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, store: &str, month: u32, day: u32, record: DailyRecord) {
        self.stores
            .entry(store.to_string())
            .or_default()
            .entry(month)
            .or_default()
            .insert(day, record);
    }

    /// Registers a store (and optionally an empty month) without any days.
    pub fn ensure_month(&mut self, store: &str, month: u32) {
        self.stores
            .entry(store.to_string())
            .or_default()
            .entry(month)
            .or_default();
    }

    pub fn ensure_store(&mut self, store: &str) {
        self.stores.entry(store.to_string()).or_default();
    }

    pub fn stores(&self) -> impl Iterator<Item = (&str, &StoreMonths)> {
        self.stores.iter().map(|(name, months)| (name.as_str(), months))
    }

    pub fn store_names(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    pub fn month(&self, store: &str, month: u32) -> Option<&MonthDays> {
        self.stores.get(store)?.get(&month)
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Number of recorded day entries across every store and month.
    pub fn record_count(&self) -> usize {
        self.stores
            .values()
            .flat_map(|months| months.values())
            .map(|days| days.len())
            .sum()
    }
}
