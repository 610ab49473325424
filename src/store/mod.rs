//! Local session persistence
//!
//! A small string key-value seam (`KeyValueStore`) with a JSON-file backend
//! and an in-memory backend, plus the typed `SessionStore` that owns the
//! three records the engine keeps: the in-flight session, the session log
//! and the stats aggregate.

pub mod file;
pub mod memory;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::session::Session;
use crate::stats::{SessionLogEntry, SessionStats};

pub use file::JsonFileStore;
pub use memory::MemoryStore;

pub const ACTIVE_SESSION_KEY: &str = "active_session";
pub const SESSION_LOG_KEY: &str = "session_log";
pub const SESSION_STATS_KEY: &str = "session_stats";

/// String key-value storage
pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;

    /// Drop a value that could not be parsed
    fn discard_corrupt(&mut self, key: &str) -> Result<()> {
        self.remove(key)
    }
}

/// Typed access to the engine's persisted records
#[derive(Debug)]
pub struct SessionStore<S> {
    backend: S,
}

impl<S: KeyValueStore> SessionStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Load the in-flight session, if any
    pub fn load_active(&mut self) -> Result<Option<Session>> {
        self.read_json(ACTIVE_SESSION_KEY)
    }

    pub fn save_active(&mut self, session: &Session) -> Result<()> {
        self.write_json(ACTIVE_SESSION_KEY, session)
    }

    pub fn clear_active(&mut self) -> Result<()> {
        self.backend
            .remove(ACTIVE_SESSION_KEY)
            .context("Failed to clear active session")
    }

    /// Load the session log, oldest first
    pub fn load_log(&mut self) -> Result<Vec<SessionLogEntry>> {
        Ok(self.read_json(SESSION_LOG_KEY)?.unwrap_or_default())
    }

    pub fn save_log(&mut self, log: &[SessionLogEntry]) -> Result<()> {
        self.write_json(SESSION_LOG_KEY, log)
    }

    pub fn load_stats(&mut self) -> Result<Option<SessionStats>> {
        self.read_json(SESSION_STATS_KEY)
    }

    pub fn save_stats(&mut self, stats: &SessionStats) -> Result<()> {
        self.write_json(SESSION_STATS_KEY, stats)
    }

    /// Read and parse a record; a record that fails to parse is discarded and reported as absent
    fn read_json<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        let Some(content) = self
            .backend
            .get(key)
            .with_context(|| format!("Failed to read {}", key))?
        else {
            return Ok(None);
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&content) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                tracing::warn!(key = key, error = %e, "Discarding unreadable record");
                if let Err(e) = self.backend.discard_corrupt(key) {
                    tracing::warn!(key = key, error = %e, "Failed to discard unreadable record");
                }
                Ok(None)
            }
        }
    }

    fn write_json<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<()> {
        let content = serde_json::to_string_pretty(value)
            .with_context(|| format!("Failed to serialize {}", key))?;
        self.backend
            .set(key, &content)
            .with_context(|| format!("Failed to write {}", key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{EndReason, PhasePlan, TimerVariant};
    use crate::stats::DayBoundary;

    fn ended_entry(minutes: u64) -> SessionLogEntry {
        let mut session = Session::new(TimerVariant::Focus, minutes, 0, &PhasePlan::default());
        session.elapsed_total_secs = minutes * 60;
        SessionLogEntry::from_ended(&session, 0, EndReason::Completed, DayBoundary::Utc)
    }

    #[test]
    fn test_active_session_lifecycle() {
        let mut store = SessionStore::new(MemoryStore::new());
        assert!(store.load_active().unwrap().is_none());

        let session = Session::new(TimerVariant::Pomodoro, 50, 7, &PhasePlan::default());
        store.save_active(&session).unwrap();
        assert_eq!(store.load_active().unwrap(), Some(session));

        store.clear_active().unwrap();
        assert!(store.load_active().unwrap().is_none());
    }

    #[test]
    fn test_corrupt_record_is_absent() {
        let mut backend = MemoryStore::new();
        backend.set(ACTIVE_SESSION_KEY, "{not json").unwrap();
        let mut store = SessionStore::new(backend);

        assert!(store.load_active().unwrap().is_none());
        assert!(store.backend().get(ACTIVE_SESSION_KEY).unwrap().is_none());
    }

    #[test]
    fn test_log_keeps_order() {
        let mut store = SessionStore::new(MemoryStore::new());
        assert!(store.load_log().unwrap().is_empty());

        let log: Vec<_> = (1..=3).map(ended_entry).collect();
        store.save_log(&log).unwrap();

        let durations: Vec<u64> = store.load_log().unwrap().iter().map(|e| e.duration).collect();
        assert_eq!(durations, vec![1, 2, 3]);
    }

    #[test]
    fn test_stats_roundtrip() {
        let mut store = SessionStore::new(MemoryStore::new());
        assert!(store.load_stats().unwrap().is_none());

        let stats = SessionStats {
            total_sessions: 4,
            current_streak: 2,
            longest_streak: 3,
            ..SessionStats::default()
        };
        store.save_stats(&stats).unwrap();
        assert_eq!(store.load_stats().unwrap(), Some(stats));
    }
}
