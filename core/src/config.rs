use std::path::PathBuf;

use anyhow::Context;

use crate::model::Metric;

pub const DATA_DIR_VAR: &str = "FOOTFALL_DATA_DIR";
pub const DEFAULT_METRIC_VAR: &str = "FOOTFALL_DEFAULT_METRIC";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Settings {
    /// Where the dataset blob lives. `None` means `~/.footfall`.
    pub data_dir: Option<PathBuf>,
    pub default_metric: Option<Metric>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let data_dir = lookup(DATA_DIR_VAR)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let default_metric = lookup(DEFAULT_METRIC_VAR)
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.parse::<Metric>())
            .transpose()
            .with_context(|| format!("{} is invalid", DEFAULT_METRIC_VAR))?;

        Ok(Self {
            data_dir,
            default_metric,
        })
    }

    pub fn metric(&self) -> Metric {
        self.default_metric.unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.metric(), Metric::Flujo);
    }

    #[test]
    fn test_reads_values() {
        let settings = Settings::from_lookup(lookup(&[
            (DATA_DIR_VAR, "/srv/footfall"),
            (DEFAULT_METRIC_VAR, "conversion"),
        ]))
        .unwrap();
        assert_eq!(settings.data_dir, Some(PathBuf::from("/srv/footfall")));
        assert_eq!(settings.metric(), Metric::Conversion);
    }

    #[test]
    fn test_rejects_unknown_metric() {
        assert!(Settings::from_lookup(lookup(&[(DEFAULT_METRIC_VAR, "ventas")])).is_err());
    }
}
