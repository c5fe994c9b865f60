use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::calendar::LEGACY_DEFAULT_YEAR;
use crate::model::record::{DailyRecord, StoreCalendar};

/// Telemetry for every store, in one of the two persisted layouts.
///
/// The layout is detected once, when the blob is decoded. Everything past
/// this point works on the variant and never probes the JSON shape again.
#[derive(Debug, Clone, PartialEq)]
pub enum Dataset {
    /// `store -> month -> day`, implicitly [`LEGACY_DEFAULT_YEAR`].
    Legacy(StoreCalendar),
    /// `year -> store -> month -> day`.
    MultiYear(BTreeMap<i32, StoreCalendar>),
}

impl Default for Dataset {
    fn default() -> Self {
        Dataset::MultiYear(BTreeMap::new())
    }
}

impl Dataset {
    pub fn from_value(value: &Value) -> Result<Self> {
        let root = value
            .as_object()
            .ok_or_else(|| anyhow!("dataset must be a JSON object"))?;

        if looks_legacy(root) {
            return Ok(Dataset::Legacy(parse_calendar(root)));
        }

        let mut by_year = BTreeMap::new();
        for (key, stores) in root {
            let Ok(year) = key.trim().parse::<i32>() else {
                tracing::warn!(key = %key, "skipping non-numeric year key");
                continue;
            };
            match stores.as_object() {
                Some(stores) => {
                    by_year.insert(year, parse_calendar(stores));
                }
                None => tracing::warn!(year, "skipping year whose value is not an object"),
            }
        }
        Ok(Dataset::MultiYear(by_year))
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Dataset::Legacy(_))
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Dataset::Legacy(calendar) => calendar.is_empty(),
            Dataset::MultiYear(by_year) => by_year.is_empty(),
        }
    }

    /// Years with a calendar, ascending.
    pub fn years(&self) -> Vec<i32> {
        match self {
            Dataset::Legacy(_) => vec![LEGACY_DEFAULT_YEAR],
            Dataset::MultiYear(by_year) => by_year.keys().copied().collect(),
        }
    }

    pub fn calendar(&self, year: i32) -> Option<&StoreCalendar> {
        match self {
            Dataset::Legacy(calendar) if year == LEGACY_DEFAULT_YEAR => Some(calendar),
            Dataset::Legacy(_) => None,
            Dataset::MultiYear(by_year) => by_year.get(&year),
        }
    }

    pub fn record_count(&self) -> usize {
        match self {
            Dataset::Legacy(calendar) => calendar.record_count(),
            Dataset::MultiYear(by_year) => by_year.values().map(StoreCalendar::record_count).sum(),
        }
    }

    /// Adds one day of telemetry. A legacy dataset receiving another year is
    /// upgraded to the multi-year layout, keeping its data under the legacy year.
    pub fn insert(&mut self, year: i32, store: &str, month: u32, day: u32, record: DailyRecord) {
        if let Dataset::Legacy(calendar) = self {
            if year == LEGACY_DEFAULT_YEAR {
                calendar.insert(store, month, day, record);
                return;
            }
            let legacy = std::mem::take(calendar);
            *self = Dataset::MultiYear(BTreeMap::from([(LEGACY_DEFAULT_YEAR, legacy)]));
        }
        if let Dataset::MultiYear(by_year) = self {
            by_year.entry(year).or_default().insert(store, month, day, record);
        }
    }
}

// Legacy blobs hold stores at the top level, so the first entry carries a
// month "1" object. Multi-year blobs hold store names one level deeper.
// "First" is the order the blob was written in (`preserve_order`).
fn looks_legacy(root: &Map<String, Value>) -> bool {
    root.values()
        .next()
        .and_then(Value::as_object)
        .and_then(|first| first.get("1"))
        .is_some_and(Value::is_object)
}

fn parse_calendar(stores: &Map<String, Value>) -> StoreCalendar {
    let mut calendar = StoreCalendar::new();
    for (store, months) in stores {
        calendar.ensure_store(store);
        let Some(months) = months.as_object() else {
            tracing::warn!(store = %store, "store entry is not an object");
            continue;
        };
        for (month_key, days) in months {
            let Some(month) = parse_key(month_key).filter(|m| (1..=12).contains(m)) else {
                tracing::warn!(store = %store, month = %month_key, "skipping unknown month key");
                continue;
            };
            calendar.ensure_month(store, month);
            let Some(days) = days.as_object() else {
                continue;
            };
            for (day_key, record) in days {
                let Some(day) = parse_key(day_key) else {
                    tracing::warn!(store = %store, month, day = %day_key, "skipping unknown day key");
                    continue;
                };
                calendar.insert(store, month, day, parse_record(record));
            }
        }
    }
    calendar
}

fn parse_key(key: &str) -> Option<u32> {
    key.trim().parse().ok()
}

fn parse_record(value: &Value) -> DailyRecord {
    DailyRecord::new(count_field(value, "flujo"), count_field(value, "boletas"))
}

fn count_field(value: &Value, field: &str) -> u64 {
    match value.get(field) {
        Some(Value::Number(n)) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f > 0.0).map(|f| f as u64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

impl Serialize for Dataset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Dataset::Legacy(calendar) => {
                // Reload sniffs the first store, so one holding January leads.
                let mut stores: Vec<_> = calendar.stores().collect();
                stores.sort_by_key(|(name, months)| (!months.contains_key(&1), *name));
                serializer.collect_map(stores)
            }
            Dataset::MultiYear(by_year) => by_year.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Dataset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Dataset::from_value(&value).map_err(serde::de::Error::custom)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
    #[serde(default)]
    pub records_processed: u64,
    #[serde(default)]
    pub update_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years: Option<Vec<i32>>,
}

impl Metadata {
    pub fn describe(dataset: &Dataset, now: DateTime<Utc>) -> Self {
        let years = dataset.years();
        Self {
            last_updated: Some(now),
            records_processed: dataset.record_count() as u64,
            update_date: Some(now.with_timezone(&Local).format("%d-%m-%Y").to_string()),
            years: (!years.is_empty()).then_some(years),
        }
    }
}

/// The persisted blob: dataset plus ingestion metadata.
#[derive(Serialize, Debug, Clone, PartialEq, Default)]
pub struct DataEnvelope {
    pub data: Dataset,
    pub metadata: Metadata,
}

impl DataEnvelope {
    pub fn new(data: Dataset, now: DateTime<Utc>) -> Self {
        let metadata = Metadata::describe(&data, now);
        Self { data, metadata }
    }

    /// Accepts `{ data, metadata }` or a bare dataset from older exports.
    pub fn from_value(value: &Value) -> Result<Self> {
        match value.as_object().and_then(|root| root.get("data")) {
            Some(data) => {
                let metadata = match value.get("metadata") {
                    Some(Value::Null) | None => Metadata::default(),
                    Some(meta) => serde_json::from_value(meta.clone())?,
                };
                Ok(Self {
                    data: Dataset::from_value(data)?,
                    metadata,
                })
            }
            None => Ok(Self {
                data: Dataset::from_value(value)?,
                metadata: Metadata::default(),
            }),
        }
    }
}

impl<'de> Deserialize<'de> for DataEnvelope {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        DataEnvelope::from_value(&value).map_err(serde::de::Error::custom)
    }
}
