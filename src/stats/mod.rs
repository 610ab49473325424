//! Session statistics
//!
//! This module provides:
//! - `SessionLogEntry`, the immutable record of an ended session
//! - `SessionStats`, updated incrementally as entries are appended
//! - Streak and focus-hour milestone detection
//! - The calendar-day policy used for dates and streaks

pub mod entry;
pub mod milestones;

use std::time::Duration;

use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use entry::{merge_logs, push_capped, SessionLogEntry};
pub use milestones::{milestones_between, Milestone};

/// Which clock decides the calendar date of a session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayBoundary {
    /// Device local time
    #[default]
    Local,
    Utc,
}

impl DayBoundary {
    /// Calendar date of an epoch-millisecond timestamp
    pub fn date_of(self, epoch_ms: i64) -> NaiveDate {
        let instant = DateTime::<Utc>::from_timestamp_millis(epoch_ms).unwrap_or_default();
        match self {
            DayBoundary::Local => instant.with_timezone(&Local).date_naive(),
            DayBoundary::Utc => instant.date_naive(),
        }
    }
}

/// Rolling aggregate over the session log
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionStats {
    pub total_sessions: u64,
    pub completed_sessions: u64,
    pub total_focus_minutes: u64,
    /// Consecutive days with a completed session, ending at `last_streak_date`
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Most recent date with a completed session
    pub last_streak_date: Option<NaiveDate>,
    pub sessions_today: u32,
    pub sessions_this_week: u32,
    pub sessions_this_month: u32,
    /// Percentage of sessions that ran out naturally
    pub completion_rate: f64,
}

impl SessionStats {
    /// Fold a newly appended entry into the stats
    ///
    /// `log` is the session log after the append; it is only used for the
    /// rolling day/week/month counts.
    pub fn record(&mut self, entry: &SessionLogEntry, log: &[SessionLogEntry], today: NaiveDate) {
        self.accumulate(entry);
        self.refresh_rolling(log, today);
    }

    /// Recompute everything from a full log
    pub fn rebuild(log: &[SessionLogEntry], today: NaiveDate) -> Self {
        let mut stats = Self::default();
        for entry in log {
            stats.accumulate(entry);
        }
        stats.refresh_rolling(log, today);
        stats
    }

    /// Recount the day/week/month windows relative to `today`
    pub fn refresh_rolling(&mut self, log: &[SessionLogEntry], today: NaiveDate) {
        let week = today.iso_week();
        let mut day_count = 0;
        let mut week_count = 0;
        let mut month_count = 0;

        for entry in log {
            if entry.date == today {
                day_count += 1;
            }
            if entry.date.iso_week() == week {
                week_count += 1;
            }
            if entry.date.year() == today.year() && entry.date.month() == today.month() {
                month_count += 1;
            }
        }

        self.sessions_today = day_count;
        self.sessions_this_week = week_count;
        self.sessions_this_month = month_count;
    }

    /// Streak as seen on `today`: zero once a whole day has passed without a completed session
    pub fn active_streak(&self, today: NaiveDate) -> u32 {
        match self.last_streak_date {
            Some(last) if last >= today.pred_opt().unwrap_or(today) => self.current_streak,
            _ => 0,
        }
    }

    /// Total focused time as a `Duration`
    pub fn total_focus(&self) -> Duration {
        Duration::from_secs(self.total_focus_minutes * 60)
    }

    fn accumulate(&mut self, entry: &SessionLogEntry) {
        self.total_sessions += 1;
        self.total_focus_minutes += entry.completed_time;
        if entry.completed {
            self.completed_sessions += 1;
            self.advance_streak(entry.date);
        }
        self.completion_rate = if self.total_sessions > 0 {
            (self.completed_sessions as f64 / self.total_sessions as f64) * 100.0
        } else {
            0.0
        };
    }

    fn advance_streak(&mut self, date: NaiveDate) {
        if let Some(last) = self.last_streak_date {
            // Same day, or a late entry for an older day
            if date <= last {
                return;
            }
            if last.succ_opt() == Some(date) {
                self.current_streak += 1;
            } else {
                self.current_streak = 1;
            }
        } else {
            self.current_streak = 1;
        }

        self.last_streak_date = Some(date);
        self.longest_streak = self.longest_streak.max(self.current_streak);
    }

    /// Format the completion rate as a display string
    pub fn format_completion_rate(&self) -> String {
        format!("{:.0}%", self.completion_rate)
    }
}

/// Format a duration as MM:SS or HH:MM:SS
pub fn format_duration(duration: Duration) -> String {
    let total_secs = duration.as_secs();
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, mins, secs)
    } else {
        format!("{:02}:{:02}", mins, secs)
    }
}

/// Format whole minutes as e.g. "3h 20m" or "45m"
pub fn format_minutes(minutes: u64) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}
