//! Immutable records of ended sessions

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::{EndReason, Session, TimerVariant};

use super::DayBoundary;

/// One ended session, appended exactly once to the session log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionLogEntry {
    pub id: Uuid,
    /// Start of counted time (rebased across pauses)
    pub start_time_ms: i64,
    pub end_time_ms: i64,
    pub variant: TimerVariant,
    /// Planned minutes
    pub duration: u64,
    /// Minutes actually elapsed, floored and never above `duration`
    pub completed_time: u64,
    /// Ran out naturally
    pub completed: bool,
    /// Explicitly cancelled
    pub interrupted: bool,
    #[serde(default)]
    pub completed_work_phases: u32,
    /// Calendar date the session ended on
    pub date: NaiveDate,
}

impl SessionLogEntry {
    /// Build the log record for a session that just ended
    pub fn from_ended(
        session: &Session,
        ended_at_ms: i64,
        reason: EndReason,
        boundary: DayBoundary,
    ) -> Self {
        Self {
            id: session.id,
            start_time_ms: session.start_timestamp_ms,
            end_time_ms: ended_at_ms,
            variant: session.variant,
            duration: session.planned_minutes,
            completed_time: session.elapsed_minutes(),
            completed: reason == EndReason::Completed,
            interrupted: reason == EndReason::Cancelled,
            completed_work_phases: session.completed_work_phases,
            date: boundary.date_of(ended_at_ms),
        }
    }
}

/// Append `entry`, evicting the oldest records beyond `max_entries`
pub fn push_capped(log: &mut Vec<SessionLogEntry>, entry: SessionLogEntry, max_entries: usize) {
    log.push(entry);
    let max_entries = max_entries.max(1);
    if log.len() > max_entries {
        let excess = log.len() - max_entries;
        log.drain(..excess);
    }
}

/// Union of two logs by session id, ordered by end time and capped
///
/// Entries in `cached` win over stored ones with the same id.
pub fn merge_logs(
    stored: Vec<SessionLogEntry>,
    cached: &[SessionLogEntry],
    max_entries: usize,
) -> Vec<SessionLogEntry> {
    let mut merged: Vec<SessionLogEntry> = stored
        .into_iter()
        .filter(|entry| !cached.iter().any(|c| c.id == entry.id))
        .collect();
    merged.extend_from_slice(cached);
    merged.sort_by_key(|entry| entry.end_time_ms);

    let max_entries = max_entries.max(1);
    if merged.len() > max_entries {
        let excess = merged.len() - max_entries;
        merged.drain(..excess);
    }
    merged
}
