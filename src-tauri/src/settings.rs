use crate::errors::{AppError, AppResult};
use crate::models::{DashboardSettings, PageSize};
use anyhow::Context;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const SETTINGS_FILE_NAME: &str = "settings.yaml";
pub const MAX_UPDATE_INTERVAL_SECS: u64 = 86_400;
pub const MAX_INITIAL_LOAD_DELAY_MS: u64 = 60_000;

impl DashboardSettings {
    pub fn initial_load_delay(&self) -> Duration {
        Duration::from_millis(self.initial_load_delay_ms)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }

    pub fn resolved_export_dir(&self, app_data_dir: &Path) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| app_data_dir.join("exports"))
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.update_interval_secs == 0 {
            return Err(AppError::InvalidInput(
                "updateIntervalSecs must be at least 1".to_string(),
            ));
        }
        if self.update_interval_secs > MAX_UPDATE_INTERVAL_SECS {
            return Err(AppError::InvalidInput(format!(
                "updateIntervalSecs must be at most {}",
                MAX_UPDATE_INTERVAL_SECS
            )));
        }
        if self.initial_load_delay_ms > MAX_INITIAL_LOAD_DELAY_MS {
            return Err(AppError::InvalidInput(format!(
                "initialLoadDelayMs must be at most {}",
                MAX_INITIAL_LOAD_DELAY_MS
            )));
        }
        PageSize::try_from(self.default_page_size).map_err(AppError::InvalidInput)?;
        Ok(())
    }
}

/// YAML-backed settings file in the app data directory.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(app_data_dir: &Path) -> Self {
        Self {
            path: app_data_dir.join(SETTINGS_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> AppResult<DashboardSettings> {
        if !self.path.exists() {
            return Ok(DashboardSettings::default());
        }

        let raw = std::fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let settings: DashboardSettings = serde_yaml::from_str(&raw)
            .with_context(|| format!("failed to parse {}", self.path.display()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, settings: &DashboardSettings) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let raw = serde_yaml::to_string(settings)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }

    /// Deep-merges a JSON patch over `current`, validates and persists the result.
    pub fn apply_update(
        &self,
        current: &DashboardSettings,
        update: serde_json::Value,
    ) -> AppResult<DashboardSettings> {
        let mut merged = serde_json::to_value(current)?;
        merge_json(&mut merged, update);
        let settings: DashboardSettings = serde_json::from_value(merged)
            .map_err(|error| AppError::InvalidInput(error.to_string()))?;
        settings.validate()?;
        self.save(&settings)?;
        Ok(settings)
    }
}

fn merge_json(target: &mut serde_json::Value, update: serde_json::Value) {
    match (target, update) {
        (serde_json::Value::Object(target_map), serde_json::Value::Object(update_map)) => {
            for (key, value) in update_map {
                merge_json(target_map.entry(key).or_insert(serde_json::Value::Null), value);
            }
        }
        (target, update) => {
            *target = update;
        }
    }
}
