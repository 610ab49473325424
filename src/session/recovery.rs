//! Timestamp-based session recovery
//!
//! Timers do not fire while the process is suspended or killed, so a restored
//! session never trusts its counted ticks. Elapsed time is recomputed from the
//! persisted start timestamp and the phase is derived by walking phase
//! boundaries forward from the last persisted phase.

use super::{Phase, PhasePlan, Session, TimerVariant};

/// Where a restored session stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recovered {
    pub elapsed_secs: u64,
    pub phase: Phase,
    pub seconds_left: u64,
    pub completed_work_phases: u32,
    pub phase_started_elapsed: u64,
    /// A boundary was crossed with auto-start disabled; the session waits for resume
    pub paused_at_boundary: bool,
    /// The budget (or a pending plain-focus skip) ran out while away
    pub finished: bool,
    /// The finishing boundary was a pending skip rather than the countdown
    pub skipped: bool,
}

/// Seconds between `start_ms` and `now_ms`, clamped to `[0, total_secs]`
pub fn elapsed_from_timestamp(start_ms: i64, now_ms: i64, total_secs: u64) -> u64 {
    if now_ms <= start_ms {
        return 0;
    }
    let secs = ((now_ms - start_ms) / 1000) as u64;
    secs.min(total_secs)
}

/// Derive the session's position at `now_ms`
pub fn recover(session: &Session, plan: &PhasePlan, now_ms: i64) -> Recovered {
    let total = session.total_planned_secs();

    if !session.is_active() {
        return Recovered {
            elapsed_secs: session.elapsed_total_secs.min(total),
            phase: Phase::Done,
            seconds_left: 0,
            completed_work_phases: session.completed_work_phases,
            phase_started_elapsed: session.phase_started_elapsed,
            paused_at_boundary: false,
            finished: true,
            skipped: false,
        };
    }

    if session.is_paused {
        let elapsed = session
            .paused_elapsed_secs
            .unwrap_or(session.elapsed_total_secs)
            .min(total);
        return Recovered {
            elapsed_secs: elapsed,
            phase: session.phase,
            seconds_left: session.seconds_left,
            completed_work_phases: session.completed_work_phases,
            phase_started_elapsed: session.phase_started_elapsed,
            paused_at_boundary: false,
            finished: false,
            skipped: false,
        };
    }

    let elapsed = elapsed_from_timestamp(session.start_timestamp_ms, now_ms, total);

    match session.variant {
        TimerVariant::Focus => recover_focus(session, elapsed, total),
        TimerVariant::Pomodoro => recover_pomodoro(session, plan, elapsed, total),
    }
}

fn recover_focus(session: &Session, elapsed: u64, total: u64) -> Recovered {
    let skip_point = session
        .skip_requested
        .then_some(session.elapsed_total_secs.min(total));

    let (elapsed, finished, skipped) = match skip_point {
        Some(point) => (point, true, true),
        None => (elapsed, elapsed >= total, false),
    };

    Recovered {
        elapsed_secs: elapsed,
        phase: if finished { Phase::Done } else { Phase::Focus },
        seconds_left: if finished { 0 } else { total - elapsed },
        completed_work_phases: 0,
        phase_started_elapsed: 0,
        paused_at_boundary: false,
        finished,
        skipped,
    }
}

fn recover_pomodoro(session: &Session, plan: &PhasePlan, elapsed: u64, total: u64) -> Recovered {
    let mut elapsed = elapsed;
    let mut phase = session.phase;
    let mut completed = session.completed_work_phases;
    let mut phase_start = session.phase_started_elapsed;
    let mut phase_end = if session.skip_requested {
        session.elapsed_total_secs.max(phase_start)
    } else if phase_start == 0 {
        // The opening work block is capped to the budget at start
        plan.phase_secs(phase).min(total)
    } else {
        phase_start + plan.phase_secs(phase)
    };
    let mut paused_at_boundary = false;
    let mut finished = false;

    loop {
        if phase_end >= total || elapsed < phase_end {
            finished = elapsed >= total;
            break;
        }

        let (next, count) = plan.advance(phase, completed);
        phase = next;
        completed = count;
        phase_start = phase_end;
        phase_end = phase_start + plan.phase_secs(next);

        if !plan.auto_start_next {
            elapsed = phase_start;
            paused_at_boundary = true;
            break;
        }

        // Zero-length phases would never advance the walk
        if phase_end == phase_start {
            finished = true;
            break;
        }
    }

    if finished {
        return Recovered {
            elapsed_secs: total,
            phase: Phase::Done,
            seconds_left: 0,
            completed_work_phases: completed,
            phase_started_elapsed: phase_start,
            paused_at_boundary: false,
            finished: true,
            skipped: false,
        };
    }

    Recovered {
        elapsed_secs: elapsed,
        phase,
        seconds_left: phase_end.min(total).saturating_sub(elapsed),
        completed_work_phases: completed,
        phase_started_elapsed: phase_start,
        paused_at_boundary,
        finished: false,
        skipped: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINUTE_MS: i64 = 60_000;

    fn running(variant: TimerVariant, minutes: u64, start_ms: i64) -> Session {
        Session::new(variant, minutes, start_ms, &PhasePlan::default())
    }

    #[test]
    fn test_elapsed_from_timestamp_clamps() {
        assert_eq!(elapsed_from_timestamp(10_000, 5_000, 100), 0);
        assert_eq!(elapsed_from_timestamp(0, 42_999, 100), 42);
        assert_eq!(elapsed_from_timestamp(0, 1_000_000, 100), 100);
    }

    #[test]
    fn test_focus_past_budget_is_done() {
        let session = running(TimerVariant::Focus, 30, 0);
        let recovered = recover(&session, &PhasePlan::default(), 40 * MINUTE_MS);
        assert!(recovered.finished);
        assert_eq!(recovered.phase, Phase::Done);
        assert_eq!(recovered.seconds_left, 0);
        assert_eq!(recovered.elapsed_secs, 1800);
    }

    #[test]
    fn test_focus_mid_session() {
        let session = running(TimerVariant::Focus, 30, 0);
        let recovered = recover(&session, &PhasePlan::default(), 10 * MINUTE_MS + 500);
        assert!(!recovered.finished);
        assert_eq!(recovered.elapsed_secs, 600);
        assert_eq!(recovered.seconds_left, 1200);
    }

    #[test]
    fn test_paused_session_ignores_wall_clock() {
        let mut session = running(TimerVariant::Focus, 30, 0);
        session.is_paused = true;
        session.elapsed_total_secs = 300;
        session.seconds_left = 1500;
        session.paused_elapsed_secs = Some(300);

        let recovered = recover(&session, &PhasePlan::default(), 600 * MINUTE_MS);
        assert_eq!(recovered.elapsed_secs, 300);
        assert_eq!(recovered.seconds_left, 1500);
        assert!(!recovered.finished);
    }

    #[test]
    fn test_pomodoro_lands_in_short_break() {
        let session = running(TimerVariant::Pomodoro, 120, 0);
        // 27 minutes: 25 work + 2 into the first short break
        let recovered = recover(&session, &PhasePlan::default(), 27 * MINUTE_MS);
        assert_eq!(recovered.phase, Phase::ShortBreak);
        assert_eq!(recovered.completed_work_phases, 1);
        assert_eq!(recovered.seconds_left, 180);
        assert_eq!(recovered.phase_started_elapsed, 1500);
    }

    #[test]
    fn test_pomodoro_walks_into_long_break() {
        let session = running(TimerVariant::Pomodoro, 240, 0);
        // 4 x 25 work + 3 x 5 short breaks = 115 minutes, then long break
        let recovered = recover(&session, &PhasePlan::default(), 120 * MINUTE_MS);
        assert_eq!(recovered.phase, Phase::LongBreak);
        assert_eq!(recovered.completed_work_phases, 4);
        assert_eq!(recovered.seconds_left, 10 * 60);
    }

    #[test]
    fn test_short_pomodoro_counts_down_against_budget() {
        let session = running(TimerVariant::Pomodoro, 10, 0);
        let recovered = recover(&session, &PhasePlan::default(), 5 * MINUTE_MS);
        assert_eq!(recovered.phase, Phase::Work);
        assert_eq!(recovered.seconds_left, 300);

        let recovered = recover(&session, &PhasePlan::default(), 11 * MINUTE_MS);
        assert!(recovered.finished);
    }

    #[test]
    fn test_pomodoro_break_cut_short_by_budget() {
        // 27 minutes leaves two minutes for the first short break
        let session = running(TimerVariant::Pomodoro, 27, 0);
        let recovered = recover(&session, &PhasePlan::default(), 26 * MINUTE_MS);
        assert_eq!(recovered.phase, Phase::ShortBreak);
        assert_eq!(recovered.seconds_left, 60);
        assert_eq!(recovered.elapsed_secs + recovered.seconds_left, 27 * 60);
    }

    #[test]
    fn test_pomodoro_without_auto_start_pauses_at_first_boundary() {
        let plan = PhasePlan {
            auto_start_next: false,
            ..PhasePlan::default()
        };
        let session = Session::new(TimerVariant::Pomodoro, 120, 0, &plan);
        let recovered = recover(&session, &plan, 90 * MINUTE_MS);
        assert!(recovered.paused_at_boundary);
        assert_eq!(recovered.phase, Phase::ShortBreak);
        assert_eq!(recovered.elapsed_secs, 1500);
        assert_eq!(recovered.seconds_left, 300);
    }

    #[test]
    fn test_pomodoro_pending_skip_ends_phase_at_skip_point() {
        let mut session = running(TimerVariant::Pomodoro, 120, 0);
        session.elapsed_total_secs = 600;
        session.seconds_left = 0;
        session.skip_requested = true;

        // Ten minutes into the session plus one more minute while away
        let recovered = recover(&session, &PhasePlan::default(), 11 * MINUTE_MS);
        assert_eq!(recovered.phase, Phase::ShortBreak);
        assert_eq!(recovered.phase_started_elapsed, 600);
        assert_eq!(recovered.seconds_left, 240);
    }

    #[test]
    fn test_focus_pending_skip_finishes_as_skipped() {
        let mut session = running(TimerVariant::Focus, 30, 0);
        session.elapsed_total_secs = 120;
        session.seconds_left = 0;
        session.skip_requested = true;

        let recovered = recover(&session, &PhasePlan::default(), 5 * MINUTE_MS);
        assert!(recovered.finished);
        assert!(recovered.skipped);
        assert_eq!(recovered.elapsed_secs, 120);
    }
}
