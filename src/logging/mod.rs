//! Logging for Cadence
//!
//! File-based `tracing` output with timestamped log files and age-based
//! retention.

mod file_writer;
mod retention;

pub use file_writer::{create_log_file_path, init_file_logging, LogFileInfo, LoggingGuard};
pub use retention::cleanup_old_logs;

/// Prefix shared by every log file name
pub const LOG_FILE_PREFIX: &str = "cadence-";
