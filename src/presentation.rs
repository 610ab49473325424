//! View model derived from a machine snapshot

use std::time::Duration;

use serde::Serialize;

use crate::session::{Phase, PhasePlan, SessionSnapshot, TimerVariant};
use crate::stats::format_duration;

const QUOTES: [&str; 8] = [
    "One thing at a time.",
    "Deep work is rare and valuable.",
    "Start where you are.",
    "Small steps every day.",
    "Focus is a muscle.",
    "Done is better than perfect.",
    "Protect your attention.",
    "Rest is part of the work.",
];

const BAR_WIDTH: usize = 20;

/// Everything a front end needs to draw the timer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresentationState {
    pub phase_label: String,
    /// `MM:SS`, or `HH:MM:SS` past an hour
    pub countdown: String,
    /// Fraction of the current phase spent, in `[0, 1]`
    pub progress: f64,
    /// Fraction of the whole session budget spent, in `[0, 1]`
    pub overall_progress: f64,
    pub is_running: bool,
    pub is_paused: bool,
    /// Position within the long-break cycle, Pomodoro only
    pub cycle: Option<(u32, u32)>,
    pub quote: &'static str,
}

impl PresentationState {
    pub fn from_snapshot(
        snapshot: &SessionSnapshot,
        plan: &PhasePlan,
        quote_rotation_secs: u64,
    ) -> Self {
        let Some(phase) = snapshot.phase else {
            return Self::idle();
        };

        let phase_len = match phase {
            Phase::Focus => snapshot.total_planned_secs,
            Phase::Done => 0,
            _ => plan.phase_secs(phase).min(snapshot.total_planned_secs),
        };

        let progress = if phase == Phase::Done {
            1.0
        } else {
            ratio(phase_len.saturating_sub(snapshot.seconds_left), phase_len)
        };

        let cycle = (snapshot.variant == Some(TimerVariant::Pomodoro) && phase != Phase::Done)
            .then(|| {
                let cycles = plan.cycles_before_long_break.max(1);
                let done_in_cycle = snapshot.completed_work_phases % cycles;
                let position = match phase {
                    Phase::Work => done_in_cycle + 1,
                    // The counter already includes the work block before a long break
                    Phase::LongBreak => cycles,
                    _ => done_in_cycle.max(1),
                };
                (position, cycles)
            });

        let phase_label = if snapshot.is_paused {
            format!("{} (paused)", phase.label())
        } else {
            phase.label().to_string()
        };

        Self {
            phase_label,
            countdown: format_duration(Duration::from_secs(snapshot.seconds_left)),
            progress,
            overall_progress: ratio(snapshot.elapsed_total_secs, snapshot.total_planned_secs),
            is_running: snapshot.is_running,
            is_paused: snapshot.is_paused,
            cycle,
            quote: quote_for(snapshot.elapsed_total_secs, quote_rotation_secs),
        }
    }

    fn idle() -> Self {
        Self {
            phase_label: "Ready".to_string(),
            countdown: format_duration(Duration::ZERO),
            progress: 0.0,
            overall_progress: 0.0,
            is_running: false,
            is_paused: false,
            cycle: None,
            quote: QUOTES[0],
        }
    }

    /// Single status line for terminal output
    pub fn render_line(&self) -> String {
        let filled = (self.progress * BAR_WIDTH as f64).round() as usize;
        let filled = filled.min(BAR_WIDTH);
        let bar = format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled));
        let cycle = self
            .cycle
            .map(|(position, cycles)| format!(" {}/{}", position, cycles))
            .unwrap_or_default();

        format!(
            "{:<20} {:>8} [{}] {:>3.0}%{}  {}",
            self.phase_label,
            self.countdown,
            bar,
            self.overall_progress * 100.0,
            cycle,
            self.quote
        )
    }
}

/// Quote for the given elapsed time; rotates every `rotation_secs`
pub fn quote_for(elapsed_secs: u64, rotation_secs: u64) -> &'static str {
    if rotation_secs == 0 {
        return QUOTES[0];
    }
    let index = (elapsed_secs / rotation_secs) as usize % QUOTES.len();
    QUOTES[index]
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    (part as f64 / whole as f64).clamp(0.0, 1.0)
}
