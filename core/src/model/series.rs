use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::calendar::{conversion, SUMMARY_SERIES};
use crate::model::record::DailyRecord;

/// One period of a rolled-up series. `conversion` is always derived from the
/// totals, never averaged across sub-periods.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Point {
    pub label: String,
    pub flujo: u64,
    pub boletas: u64,
    pub conversion: f64,
}

impl Point {
    pub fn new(label: impl Into<String>, totals: DailyRecord) -> Self {
        Self {
            label: label.into(),
            flujo: totals.flujo,
            boletas: totals.boletas,
            conversion: conversion(totals.flujo, totals.boletas),
        }
    }

    pub fn totals(&self) -> DailyRecord {
        DailyRecord::new(self.flujo, self.boletas)
    }

    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Flujo => self.flujo as f64,
            Metric::Boletas => self.boletas as f64,
            Metric::Conversion => self.conversion,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub data: Vec<Point>,
}

impl Series {
    pub fn is_summary(&self) -> bool {
        self.name == SUMMARY_SERIES
    }

    pub fn point(&self, label: &str) -> Option<&Point> {
        self.data.iter().find(|p| p.label == label)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    Flujo,
    Boletas,
    Conversion,
}

impl Metric {
    /// Metric value of raw totals, with conversion recomputed from them.
    pub fn of(self, totals: DailyRecord) -> f64 {
        match self {
            Metric::Flujo => totals.flujo as f64,
            Metric::Boletas => totals.boletas as f64,
            Metric::Conversion => conversion(totals.flujo, totals.boletas),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Flujo => "flujo",
            Metric::Boletas => "boletas",
            Metric::Conversion => "conversion",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "flujo" => Ok(Metric::Flujo),
            "boletas" => Ok(Metric::Boletas),
            "conversion" | "conversión" | "conversión (%)" => Ok(Metric::Conversion),
            other => Err(anyhow!("Unknown metric: '{}'", other)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    #[default]
    Month,
    Week,
}

impl FromStr for Granularity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "month" | "monthly" | "mes" => Ok(Granularity::Month),
            "week" | "weekly" | "semana" => Ok(Granularity::Week),
            other => Err(anyhow!("Unknown granularity: '{}'", other)),
        }
    }
}

/// Store name -> selected flag, as toggled by the dashboard.
pub type StoreSelection = BTreeMap<String, bool>;

pub fn is_selected(selection: &StoreSelection, name: &str) -> bool {
    selection.get(name).copied().unwrap_or(false)
}

/// Chart/table row: one period with one value per series key.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ComparisonRow {
    pub period: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl ComparisonRow {
    pub fn new(period: impl Into<String>) -> Self {
        Self {
            period: period.into(),
            values: BTreeMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.values.get(key).copied()
    }
}
