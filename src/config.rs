//! Configuration management for Cadence

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::effects::EffectSettings;
use crate::session::PhasePlan;
use crate::stats::DayBoundary;

/// Environment variable that overrides the base directory (~/.cadence)
pub const HOME_ENV_VAR: &str = "CADENCE_HOME";

/// Categories of disk errors for user-friendly messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiskErrorKind {
    /// Disk is full or quota exceeded
    DiskFull,
    /// Permission denied (read or write)
    PermissionDenied,
    /// File or directory not found
    NotFound,
    /// Other IO error
    Other,
}

impl DiskErrorKind {
    /// Get a user-friendly message for this error kind
    pub fn user_message(&self) -> &'static str {
        match self {
            DiskErrorKind::DiskFull => "Disk full - free space needed to save session progress",
            DiskErrorKind::PermissionDenied => "Permission denied writing to ~/.cadence/",
            DiskErrorKind::NotFound => "File or directory not found",
            DiskErrorKind::Other => "Failed to save session data",
        }
    }
}

/// Categorize an IO error into a user-friendly category
pub fn categorize_io_error(e: &std::io::Error) -> DiskErrorKind {
    use std::io::ErrorKind;

    match e.kind() {
        ErrorKind::WriteZero => DiskErrorKind::DiskFull,
        ErrorKind::PermissionDenied => DiskErrorKind::PermissionDenied,
        ErrorKind::NotFound => DiskErrorKind::NotFound,
        _ => {
            #[cfg(unix)]
            {
                if let Some(os_error) = e.raw_os_error() {
                    // ENOSPC = 28, EDQUOT = 122 (Linux) / 69 (macOS)
                    if os_error == 28 || os_error == 122 || os_error == 69 {
                        return DiskErrorKind::DiskFull;
                    }
                    if os_error == 13 {
                        return DiskErrorKind::PermissionDenied;
                    }
                }
            }
            DiskErrorKind::Other
        }
    }
}

/// Create a user-friendly error message from an error chain
///
/// Walks the chain looking for an IO error; falls back to the plain error text.
pub fn friendly_error_message(e: &anyhow::Error, context: &str) -> String {
    let io_error = e
        .chain()
        .find_map(|cause| cause.downcast_ref::<std::io::Error>());

    match io_error.map(|io| (categorize_io_error(io), io)) {
        Some((DiskErrorKind::NotFound, _)) => {
            format!("{}: file or directory not found", context)
        }
        Some((DiskErrorKind::Other, io)) => format!("{}: {}", context, io),
        Some((kind, _)) => format!("{}: {}", context, kind.user_message()),
        None => format!("{}: {:#}", context, e),
    }
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Pomodoro work phase length in minutes (default: 25)
    #[serde(default = "default_work_minutes")]
    pub work_minutes: u64,

    /// Short break length in minutes (default: 5)
    #[serde(default = "default_short_break_minutes")]
    pub short_break_minutes: u64,

    /// Long break length in minutes (default: 15)
    #[serde(default = "default_long_break_minutes")]
    pub long_break_minutes: u64,

    /// Completed work phases before a long break (default: 4)
    #[serde(default = "default_cycles_before_long_break")]
    pub cycles_before_long_break: u32,

    /// Continue into the next phase without waiting for a manual resume
    #[serde(default = "default_true")]
    pub auto_start_next: bool,

    /// Session length used when `start` is given no duration (default: 25)
    #[serde(default = "default_focus_minutes")]
    pub default_focus_minutes: u64,

    /// Haptic pulses on start/pause/resume/complete/cancel
    #[serde(default = "default_true")]
    pub haptics_enabled: bool,

    /// Audible cue alongside notifications
    #[serde(default = "default_true")]
    pub sound_enabled: bool,

    /// Phase-complete and milestone notifications
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,

    /// Keep the screen awake while a session is running
    #[serde(default = "default_true")]
    pub keep_awake: bool,

    /// Dim the screen while a session is running (distraction blocking)
    #[serde(default)]
    pub distraction_blocking: bool,

    /// Seconds between motivational quote changes; 0 disables rotation
    #[serde(default = "default_quote_rotation_secs")]
    pub quote_rotation_secs: u64,

    /// Maximum number of entries kept in the session log (default: 500)
    #[serde(default = "default_max_log_entries")]
    pub max_log_entries: usize,

    /// Which calendar is used to bucket sessions into days
    #[serde(default)]
    pub day_boundary: DayBoundary,

    /// Shell command run for notifications, receives CADENCE_TITLE / CADENCE_BODY
    #[serde(default)]
    pub notify_command: Option<String>,

    /// Log file retention in days (default: 7)
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u64,
}

fn default_work_minutes() -> u64 {
    25
}

fn default_short_break_minutes() -> u64 {
    5
}

fn default_long_break_minutes() -> u64 {
    15
}

fn default_cycles_before_long_break() -> u32 {
    4
}

fn default_focus_minutes() -> u64 {
    25
}

fn default_true() -> bool {
    true
}

fn default_quote_rotation_secs() -> u64 {
    30
}

fn default_max_log_entries() -> usize {
    500
}

fn default_log_retention_days() -> u64 {
    7
}

impl Default for Config {
    fn default() -> Self {
        Self {
            work_minutes: default_work_minutes(),
            short_break_minutes: default_short_break_minutes(),
            long_break_minutes: default_long_break_minutes(),
            cycles_before_long_break: default_cycles_before_long_break(),
            auto_start_next: true,
            default_focus_minutes: default_focus_minutes(),
            haptics_enabled: true,
            sound_enabled: true,
            notifications_enabled: true,
            keep_awake: true,
            distraction_blocking: false,
            quote_rotation_secs: default_quote_rotation_secs(),
            max_log_entries: default_max_log_entries(),
            day_boundary: DayBoundary::default(),
            notify_command: None,
            log_retention_days: default_log_retention_days(),
        }
    }
}

impl Config {
    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        let path = config_file_path();
        if path.exists() {
            let content = std::fs::read_to_string(&path).context("Failed to read config file")?;
            let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
            Ok(config.normalized())
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(&path, content).context("Failed to write config file")?;
        Ok(())
    }

    /// Clamp durations and counts into usable ranges
    pub fn normalized(mut self) -> Self {
        self.work_minutes = self.work_minutes.clamp(1, 180);
        self.short_break_minutes = self.short_break_minutes.clamp(1, 60);
        self.long_break_minutes = self.long_break_minutes.clamp(1, 90);
        self.cycles_before_long_break = self.cycles_before_long_break.clamp(1, 12);
        self.default_focus_minutes = self.default_focus_minutes.clamp(1, 24 * 60);
        self.max_log_entries = self.max_log_entries.max(1);
        self
    }

    /// Phase lengths and cycling rules for the state machine
    pub fn phase_plan(&self) -> PhasePlan {
        PhasePlan {
            work_minutes: self.work_minutes,
            short_break_minutes: self.short_break_minutes,
            long_break_minutes: self.long_break_minutes,
            cycles_before_long_break: self.cycles_before_long_break,
            auto_start_next: self.auto_start_next,
        }
    }

    /// Toggles consulted by the side-effect dispatcher
    pub fn effect_settings(&self) -> EffectSettings {
        EffectSettings {
            haptics: self.haptics_enabled,
            sound: self.sound_enabled,
            notifications: self.notifications_enabled,
            keep_awake: self.keep_awake,
            dim_screen: self.distraction_blocking,
        }
    }
}

/// Get the base configuration directory (~/.cadence)
/// Falls back to ./.cadence if home directory cannot be determined
pub fn config_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(HOME_ENV_VAR).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    try_config_dir().unwrap_or_else(|| {
        tracing::warn!("Could not determine home directory, using current directory for config");
        PathBuf::from(".cadence")
    })
}

/// Try to get the base configuration directory, returning None if home dir is unavailable
pub fn try_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".cadence"))
}

/// Get the path to the config file
pub fn config_file_path() -> PathBuf {
    config_dir().join("config.toml")
}

/// Get the path to the session data directory
pub fn data_dir() -> PathBuf {
    config_dir().join("data")
}

/// Get the path to the logs directory
pub fn logs_dir() -> PathBuf {
    config_dir().join("logs")
}

/// Ensure all required directories exist
pub fn ensure_directories() -> Result<()> {
    std::fs::create_dir_all(config_dir()).context("Failed to create config directory")?;
    std::fs::create_dir_all(data_dir()).context("Failed to create data directory")?;
    std::fs::create_dir_all(logs_dir()).context("Failed to create logs directory")?;
    Ok(())
}
