//! User settings for the menu-bar app.
//!
//! A small JSON document under the user's application-support directory.
//! Loading tolerates a missing file and documents written by older
//! versions that predate some fields; saving is atomic (temp file then
//! rename).

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

/// Global mutex to prevent concurrent read-modify-write races on
/// settings.json.
static SETTINGS_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

const SETTINGS_DIR: &str = "halo";
const SETTINGS_FILE: &str = "settings.json";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Manual organization id, used when cookie discovery finds none
    pub organization_id: Option<String>,
    /// Manual session key, used when cookie discovery finds none
    pub session_key: Option<String>,
    /// Start a new quota window automatically when usage reports none.
    /// Absent in settings written by older versions; defaults to off.
    pub auto_trigger: bool,
    /// IANA timezone override for the trigger sequence
    pub timezone: Option<String>,
}

/// Get the path to the settings.json file
pub fn settings_path() -> Result<PathBuf, String> {
    let config_dir =
        dirs::config_dir().ok_or_else(|| "Failed to get config directory".to_string())?;
    Ok(config_dir.join(SETTINGS_DIR).join(SETTINGS_FILE))
}

impl Settings {
    pub fn load() -> Result<Self, String> {
        Self::load_from(&settings_path()?)
    }

    fn load_from(path: &Path) -> Result<Self, String> {
        let _guard = SETTINGS_LOCK
            .lock()
            .map_err(|e| format!("Settings lock error: {e}"))?;

        if !path.exists() {
            log::trace!("Settings file not found, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings file: {e}"))?;
        serde_json::from_str(&contents).map_err(|e| format!("Failed to parse settings: {e}"))
    }

    pub fn save(&self) -> Result<(), String> {
        self.save_to(&settings_path()?)
    }

    fn save_to(&self, path: &Path) -> Result<(), String> {
        let _guard = SETTINGS_LOCK
            .lock()
            .map_err(|e| format!("Settings lock error: {e}"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create settings directory: {e}"))?;
        }

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize settings: {e}"))?;

        let temp_path = path.with_extension("json.tmp");
        std::fs::write(&temp_path, json)
            .map_err(|e| format!("Failed to write settings file: {e}"))?;
        std::fs::rename(&temp_path, path)
            .map_err(|e| format!("Failed to replace settings file: {e}"))?;
        Ok(())
    }

    /// Timezone for the trigger sequence: the override when set,
    /// otherwise the local zone.
    pub fn resolve_timezone(&self) -> String {
        match &self.timezone {
            Some(timezone) => timezone.clone(),
            None => local_timezone(),
        }
    }
}

/// The local IANA timezone name, falling back to UTC.
pub fn local_timezone() -> String {
    match iana_time_zone::get_timezone() {
        Ok(timezone) => timezone,
        Err(e) => {
            log::warn!("Could not determine local timezone: {e}");
            "UTC".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("settings.json")).unwrap();
        assert!(!settings.auto_trigger);
        assert_eq!(settings.session_key, None);
    }

    #[test]
    fn test_legacy_document_without_auto_trigger_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"organizationId": "org-7"}"#).unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.organization_id.as_deref(), Some("org-7"));
        assert!(!settings.auto_trigger);
    }

    #[test]
    fn test_save_and_reload_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = Settings {
            organization_id: Some("org-7".to_string()),
            session_key: Some("sk-manual".to_string()),
            auto_trigger: true,
            timezone: Some("Europe/Paris".to_string()),
        };
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded.organization_id.as_deref(), Some("org-7"));
        assert!(loaded.auto_trigger);
        assert_eq!(loaded.resolve_timezone(), "Europe/Paris");
    }

    #[test]
    fn test_resolve_timezone_without_override_is_nonempty() {
        let settings = Settings::default();
        assert!(!settings.resolve_timezone().is_empty());
    }

    #[test]
    fn test_malformed_document_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(Settings::load_from(&path).is_err());
    }
}
