//! Focus session model
//!
//! This module provides:
//! - The persisted in-flight `Session` record
//! - Phase definitions for plain focus and Pomodoro sessions
//! - The `CountdownMachine` state machine and timestamp-based recovery

pub mod clock;
pub mod machine;
pub mod recovery;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use clock::{Clock, ManualClock, SystemClock};
pub use machine::{CountdownMachine, EndReason, EngineError, SessionEvent, SessionSnapshot};

/// Which kind of countdown a session runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerVariant {
    /// A single focus countdown
    Focus,
    /// Work/break rotation
    Pomodoro,
}

impl TimerVariant {
    /// Phase a freshly started session begins in
    pub fn initial_phase(self) -> Phase {
        match self {
            TimerVariant::Focus => Phase::Focus,
            TimerVariant::Pomodoro => Phase::Work,
        }
    }
}

impl std::fmt::Display for TimerVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimerVariant::Focus => write!(f, "focus"),
            TimerVariant::Pomodoro => write!(f, "pomodoro"),
        }
    }
}

/// Segment of a timed session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Plain focus countdown
    Focus,
    /// Pomodoro work block
    Work,
    ShortBreak,
    LongBreak,
    /// Session is over; no further ticking
    Done,
}

impl Phase {
    /// Check if this phase is a Pomodoro break
    pub fn is_break(self) -> bool {
        matches!(self, Phase::ShortBreak | Phase::LongBreak)
    }

    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Phase::Focus => "Focus",
            Phase::Work => "Work",
            Phase::ShortBreak => "Short break",
            Phase::LongBreak => "Long break",
            Phase::Done => "Done",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Phase lengths and cycling rules for Pomodoro sessions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhasePlan {
    pub work_minutes: u64,
    pub short_break_minutes: u64,
    pub long_break_minutes: u64,
    /// Every Nth completed work phase is followed by a long break
    pub cycles_before_long_break: u32,
    /// Continue into the next phase immediately instead of pausing
    pub auto_start_next: bool,
}

impl Default for PhasePlan {
    fn default() -> Self {
        Self {
            work_minutes: 25,
            short_break_minutes: 5,
            long_break_minutes: 15,
            cycles_before_long_break: 4,
            auto_start_next: true,
        }
    }
}

impl PhasePlan {
    /// Length of a Pomodoro phase in seconds (0 for phases with no fixed length)
    pub fn phase_secs(&self, phase: Phase) -> u64 {
        match phase {
            Phase::Work => self.work_minutes * 60,
            Phase::ShortBreak => self.short_break_minutes * 60,
            Phase::LongBreak => self.long_break_minutes * 60,
            Phase::Focus | Phase::Done => 0,
        }
    }

    /// Minutes in one full rotation ending with a long break
    pub fn full_cycle_minutes(&self) -> u64 {
        let cycles = u64::from(self.cycles_before_long_break.max(1));
        cycles * self.work_minutes + (cycles - 1) * self.short_break_minutes + self.long_break_minutes
    }

    /// Phase following `phase`, along with the updated completed-work counter
    pub fn advance(&self, phase: Phase, completed_work: u32) -> (Phase, u32) {
        match phase {
            Phase::Work => {
                let count = completed_work + 1;
                let cycles = self.cycles_before_long_break.max(1);
                if count % cycles == 0 {
                    (Phase::LongBreak, count)
                } else {
                    (Phase::ShortBreak, count)
                }
            }
            Phase::ShortBreak | Phase::LongBreak => (Phase::Work, completed_work),
            Phase::Focus | Phase::Done => (Phase::Done, completed_work),
        }
    }
}

/// The in-flight session record, persisted after every state change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Time-ordered opaque identifier
    pub id: Uuid,
    pub variant: TimerVariant,
    /// Planned session length; immutable for the session's lifetime
    pub planned_minutes: u64,
    /// Epoch milliseconds; rebased on resume so that now - start == elapsed
    pub start_timestamp_ms: i64,
    /// Seconds left in the current phase
    pub seconds_left: u64,
    pub elapsed_total_secs: u64,
    pub phase: Phase,
    pub is_paused: bool,
    /// Set only when the session ran out naturally
    pub completed: bool,
    #[serde(default)]
    pub completed_work_phases: u32,
    /// Elapsed offset at which the current phase began
    #[serde(default)]
    pub phase_started_elapsed: u64,
    /// Elapsed seconds frozen at the moment of pausing
    #[serde(default)]
    pub paused_elapsed_secs: Option<u64>,
    /// A skip was requested and the next tick ends the phase
    #[serde(default)]
    pub skip_requested: bool,
}

impl Session {
    /// Create a running session in the variant's initial phase
    pub fn new(variant: TimerVariant, planned_minutes: u64, now_ms: i64, plan: &PhasePlan) -> Self {
        let total = planned_minutes * 60;
        let seconds_left = match variant {
            TimerVariant::Focus => total,
            TimerVariant::Pomodoro => plan.phase_secs(Phase::Work).min(total),
        };

        Self {
            id: Uuid::now_v7(),
            variant,
            planned_minutes,
            start_timestamp_ms: now_ms,
            seconds_left,
            elapsed_total_secs: 0,
            phase: variant.initial_phase(),
            is_paused: false,
            completed: false,
            completed_work_phases: 0,
            phase_started_elapsed: 0,
            paused_elapsed_secs: None,
            skip_requested: false,
        }
    }

    /// Overall planned budget in seconds
    pub fn total_planned_secs(&self) -> u64 {
        self.planned_minutes * 60
    }

    /// Seconds of the overall budget not yet spent
    pub fn remaining_total_secs(&self) -> u64 {
        self.total_planned_secs()
            .saturating_sub(self.elapsed_total_secs)
    }

    /// Whole minutes actually elapsed, never more than planned
    pub fn elapsed_minutes(&self) -> u64 {
        (self.elapsed_total_secs / 60).min(self.planned_minutes)
    }

    /// Check if the session has not reached `Done`
    pub fn is_active(&self) -> bool {
        self.phase != Phase::Done
    }

    /// Check if the session is counting down
    pub fn is_running(&self) -> bool {
        self.is_active() && !self.is_paused
    }

    /// Check if `other` is this session with no pause, resume, skip or
    /// reset applied in between
    ///
    /// Tick counters are ignored; they are re-derived from the timestamps.
    pub fn same_controls(&self, other: &Session) -> bool {
        self.id == other.id
            && self.is_paused == other.is_paused
            && self.start_timestamp_ms == other.start_timestamp_ms
            && self.skip_requested == other.skip_requested
    }
}
