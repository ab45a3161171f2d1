//! Configuration loading (`spec.md` §6 recognized keys).
//!
//! Follows the donor's tolerant-defaults pattern: a missing or malformed
//! file falls back to defaults with a warning rather than aborting startup,
//! because a config file that can strand a lighting rig at boot is worse
//! than one that boots dim and logs loudly.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ConfigFile {
    pub com_port: String,
    pub baud_rate: u32,
    pub simulation_mode: bool,
    pub default_fade_time_ms: u32,
    pub default_intensity: u8,
    pub ambient_enabled: bool,
    pub ambient_sequence_id: String,
    pub login_fade_delay_ms: u64,
    pub log_retention_days: u32,
}

impl Default for ConfigFile {
    fn default() -> Self {
        ConfigFile {
            com_port: "/dev/ttyUSB0".to_string(),
            baud_rate: 38_400,
            simulation_mode: true,
            default_fade_time_ms: 1_000,
            default_intensity: 255,
            ambient_enabled: true,
            ambient_sequence_id: "breathe".to_string(),
            login_fade_delay_ms: 100,
            log_retention_days: 30,
        }
    }
}

/// Best-effort config path discovery: prefer a local `lumen.toml`, then a
/// platform config directory, else the bare relative filename.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("lumen.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("lumen").join("lumen.toml");
    }
    PathBuf::from("lumen.toml")
}

/// Load configuration from `path`, or from [`discover`] when `None`.
/// Never fails: a missing or unparsable file yields [`ConfigFile::default`].
pub fn load_from(path: Option<PathBuf>) -> ConfigFile {
    let path = path.unwrap_or_else(discover);
    match std::fs::read_to_string(&path) {
        Ok(content) => match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => file,
            Err(err) => {
                warn!(target: "config", path = %path.display(), %err, "config_parse_failed_using_defaults");
                ConfigFile::default()
            }
        },
        Err(_) => ConfigFile::default(),
    }
}

/// Recognized configuration keys, for lookups by string (e.g. from an
/// administrative API outside this crate's scope).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ComPort,
    BaudRate,
    SimulationMode,
    DefaultFadeTimeMs,
    DefaultIntensity,
    AmbientEnabled,
    AmbientSequenceId,
    LoginFadeDelayMs,
    LogRetentionDays,
}

impl ConfigKey {
    pub fn parse(key: &str) -> Option<Self> {
        Some(match key {
            "com_port" => ConfigKey::ComPort,
            "baud_rate" => ConfigKey::BaudRate,
            "simulation_mode" => ConfigKey::SimulationMode,
            "default_fade_time_ms" => ConfigKey::DefaultFadeTimeMs,
            "default_intensity" => ConfigKey::DefaultIntensity,
            "ambient_enabled" => ConfigKey::AmbientEnabled,
            "ambient_sequence_id" => ConfigKey::AmbientSequenceId,
            "login_fade_delay_ms" => ConfigKey::LoginFadeDelayMs,
            "log_retention_days" => ConfigKey::LogRetentionDays,
            _ => return None,
        })
    }
}

pub fn probe_exists(path: &Path) -> bool {
    path.exists()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_when_file_missing() {
        let cfg = load_from(Some(PathBuf::from("__does_not_exist_lumen__.toml")));
        assert_eq!(cfg.baud_rate, 38_400);
        assert!(cfg.simulation_mode);
    }

    #[test]
    fn parses_recognized_keys_from_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "com_port = \"/dev/ttyS0\"\nbaud_rate = 9600\nsimulation_mode = false\ndefault_fade_time_ms = 2000\ndefault_intensity = 200\nambient_enabled = false\nambient_sequence_id = \"wave\"\nlogin_fade_delay_ms = 250\nlog_retention_days = 7\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.com_port, "/dev/ttyS0");
        assert_eq!(cfg.baud_rate, 9600);
        assert!(!cfg.simulation_mode);
        assert_eq!(cfg.default_fade_time_ms, 2000);
        assert_eq!(cfg.default_intensity, 200);
        assert!(!cfg.ambient_enabled);
        assert_eq!(cfg.ambient_sequence_id, "wave");
        assert_eq!(cfg.login_fade_delay_ms, 250);
        assert_eq!(cfg.log_retention_days, 7);
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "not = [valid toml").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf()));
        assert_eq!(cfg.baud_rate, 38_400);
    }

    #[test]
    fn config_key_parse_rejects_unknown() {
        assert_eq!(ConfigKey::parse("com_port"), Some(ConfigKey::ComPort));
        assert_eq!(ConfigKey::parse("nonsense"), None);
    }
}
