use serde::Deserialize;
use std::{fs, path::Path};
use time::Month;
use usage_domain::MonthWindow;

pub const CONFIG_ENV: &str = "BILLING_REPORTS_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonthWindowConfig {
    pub start_year: i32,
    pub start_month: u8,
    pub months: usize,
}

impl Default for MonthWindowConfig {
    fn default() -> Self {
        Self {
            start_year: 2024,
            start_month: 11,
            months: 12,
        }
    }
}

impl MonthWindowConfig {
    pub fn window(&self) -> anyhow::Result<MonthWindow> {
        let month = Month::try_from(self.start_month)
            .map_err(|e| anyhow::anyhow!("invalid month_window.start_month {}: {e}", self.start_month))?;
        Ok(MonthWindow::new(self.start_year, month, self.months))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AggregateConfig {
    pub default_output: String,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            default_output: "Usage_By_Month_Nov24_to_Oct25_ORDERED.xlsx".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ConflictsConfig {
    pub default_output: String,
}

impl Default for ConflictsConfig {
    fn default() -> Self {
        Self {
            default_output: "Premise_Conflicts.xlsx".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub month_window: MonthWindowConfig,
    pub aggregate: AggregateConfig,
    pub conflicts: ConflictsConfig,
}

impl AppConfig {
    /// Built-in defaults unless `BILLING_REPORTS_CONFIG` names a TOML file.
    pub fn load() -> anyhow::Result<Self> {
        use std::env;

        match env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let cfg: AppConfig = toml::from_str(&contents)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_the_fixed_report_layout() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.month_window.window().unwrap(), MonthWindow::default());
        assert_eq!(cfg.aggregate.default_output, "Usage_By_Month_Nov24_to_Oct25_ORDERED.xlsx");
        assert_eq!(cfg.conflicts.default_output, "Premise_Conflicts.xlsx");
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[month_window]\nstart_year = 2025\n\n[conflicts]\ndefault_output = \"out.csv\"").unwrap();

        let cfg = AppConfig::from_file(file.path()).expect("valid config");

        assert_eq!(
            cfg.month_window.window().unwrap(),
            MonthWindow::new(2025, Month::November, 12)
        );
        assert_eq!(cfg.conflicts.default_output, "out.csv");
        assert_eq!(cfg.aggregate.default_output, AggregateConfig::default().default_output);
    }

    #[test]
    fn invalid_start_month_is_rejected() {
        let cfg = MonthWindowConfig {
            start_month: 13,
            ..MonthWindowConfig::default()
        };
        assert!(cfg.window().is_err());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        assert!(AppConfig::from_file("no-such-config.toml").is_err());
    }
}
