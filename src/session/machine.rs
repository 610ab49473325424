//! Countdown state machine
//!
//! Drives a single session through idle → running ⇄ paused → done. Every
//! operation takes the current wall-clock time and returns the events it
//! produced; persistence and side effects are the caller's business.

use serde::Serialize;
use thiserror::Error;

use super::recovery;
use super::{Phase, PhasePlan, Session, TimerVariant};

/// Rejections from `CountdownMachine::start`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("a session is already active ({phase})")]
    SessionActive { phase: Phase },
    #[error("session duration must be at least one minute")]
    InvalidDuration,
}

/// How a session came to an end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Countdown ran out on its own
    Completed,
    /// A plain focus session was skipped to the end
    Skipped,
    /// Explicitly cancelled
    Cancelled,
}

/// Something that happened to the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Started {
        variant: TimerVariant,
        planned_minutes: u64,
    },
    Paused,
    Resumed,
    PhaseChanged {
        from: Phase,
        to: Phase,
        completed_work_phases: u32,
        /// Auto-start is off; the machine paused at the boundary
        awaiting_resume: bool,
    },
    Ended {
        /// Final state of the session
        session: Session,
        ended_at_ms: i64,
        reason: EndReason,
    },
    Reset,
}

/// Read-only view of the machine for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SessionSnapshot {
    pub variant: Option<TimerVariant>,
    /// `None` while idle
    pub phase: Option<Phase>,
    pub is_running: bool,
    pub is_paused: bool,
    pub seconds_left: u64,
    pub elapsed_total_secs: u64,
    pub total_planned_secs: u64,
    pub completed_work_phases: u32,
}

/// Single-session countdown with Pomodoro cycling
#[derive(Debug, Clone)]
pub struct CountdownMachine {
    plan: PhasePlan,
    /// Current or most recently finished session
    session: Option<Session>,
}

impl CountdownMachine {
    pub fn new(plan: PhasePlan) -> Self {
        Self {
            plan,
            session: None,
        }
    }

    pub fn plan(&self) -> &PhasePlan {
        &self.plan
    }

    /// Replace the phase plan; applies from the next phase boundary
    pub fn set_plan(&mut self, plan: PhasePlan) {
        self.plan = plan;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Check if a session exists and has not reached `Done`
    pub fn is_active(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_active)
    }

    /// Check if a session is counting down
    pub fn is_running(&self) -> bool {
        self.session.as_ref().is_some_and(Session::is_running)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        match &self.session {
            Some(session) => SessionSnapshot {
                variant: Some(session.variant),
                phase: Some(session.phase),
                is_running: session.is_running(),
                is_paused: session.is_paused,
                seconds_left: session.seconds_left,
                elapsed_total_secs: session.elapsed_total_secs,
                total_planned_secs: session.total_planned_secs(),
                completed_work_phases: session.completed_work_phases,
            },
            None => SessionSnapshot::default(),
        }
    }

    /// Begin a new session; rejected while another one is active
    pub fn start(
        &mut self,
        variant: TimerVariant,
        duration_minutes: u64,
        now_ms: i64,
    ) -> Result<Vec<SessionEvent>, EngineError> {
        if duration_minutes == 0 {
            return Err(EngineError::InvalidDuration);
        }
        if let Some(active) = self.session.as_ref().filter(|s| s.is_active()) {
            return Err(EngineError::SessionActive {
                phase: active.phase,
            });
        }

        self.session = Some(Session::new(variant, duration_minutes, now_ms, &self.plan));

        Ok(vec![SessionEvent::Started {
            variant,
            planned_minutes: duration_minutes,
        }])
    }

    /// Stop counting and freeze progress; no-op unless running
    pub fn pause(&mut self) -> Vec<SessionEvent> {
        let Some(session) = self.session.as_mut().filter(|s| s.is_running()) else {
            return Vec::new();
        };

        session.is_paused = true;
        session.paused_elapsed_secs = Some(session.elapsed_total_secs);
        vec![SessionEvent::Paused]
    }

    /// Continue a paused session; no-op unless paused
    pub fn resume(&mut self, now_ms: i64) -> Vec<SessionEvent> {
        let Some(session) = self
            .session
            .as_mut()
            .filter(|s| s.is_active() && s.is_paused)
        else {
            return Vec::new();
        };

        session.is_paused = false;
        session.paused_elapsed_secs = None;
        session.start_timestamp_ms = now_ms - (session.elapsed_total_secs as i64) * 1000;
        vec![SessionEvent::Resumed]
    }

    /// Advance one second
    pub fn tick(&mut self, now_ms: i64) -> Vec<SessionEvent> {
        let plan = self.plan;
        let Some(session) = self.session.as_mut().filter(|s| s.is_running()) else {
            return Vec::new();
        };

        let total = session.total_planned_secs();
        if session.elapsed_total_secs >= total {
            return vec![finish(session, now_ms, EndReason::Completed)];
        }

        if session.seconds_left > 0 {
            session.seconds_left -= 1;
            session.elapsed_total_secs = (session.elapsed_total_secs + 1).min(total);
        } else if session.skip_requested {
            // The skipped second is not counted; keep now - start == elapsed
            session.start_timestamp_ms += 1000;
        }

        if session.seconds_left == 0 {
            return vec![end_phase(session, &plan, now_ms)];
        }

        Vec::new()
    }

    /// End the current phase early
    ///
    /// A running session transitions on its next tick; a paused one
    /// transitions immediately and stays paused.
    pub fn skip(&mut self, now_ms: i64) -> Vec<SessionEvent> {
        let plan = self.plan;
        let Some(session) = self.session.as_mut().filter(|s| s.is_active()) else {
            return Vec::new();
        };

        session.seconds_left = 0;
        session.skip_requested = true;

        if !session.is_paused {
            return Vec::new();
        }

        let event = end_phase(session, &plan, now_ms);
        if session.is_active() {
            session.is_paused = true;
            session.paused_elapsed_secs = Some(session.elapsed_total_secs);
        }
        vec![event]
    }

    /// Abandon the session without completing it
    pub fn cancel(&mut self, now_ms: i64) -> Vec<SessionEvent> {
        if !self.is_active() {
            return Vec::new();
        }
        let Some(mut session) = self.session.take() else {
            return Vec::new();
        };

        vec![finish(&mut session, now_ms, EndReason::Cancelled)]
    }

    /// Drop the session without ending it
    pub fn discard(&mut self) -> Option<Session> {
        self.session.take()
    }

    /// Rewind to the initial phase with counters zeroed, waiting for resume
    pub fn reset(&mut self, now_ms: i64) -> Vec<SessionEvent> {
        let Some(previous) = self.session.as_ref() else {
            return Vec::new();
        };

        let mut fresh = Session::new(
            previous.variant,
            previous.planned_minutes,
            now_ms,
            &self.plan,
        );
        fresh.is_paused = true;
        fresh.paused_elapsed_secs = Some(0);
        self.session = Some(fresh);

        vec![SessionEvent::Reset]
    }

    /// Adopt a persisted session, recomputing its position from timestamps
    pub fn restore(&mut self, mut session: Session, now_ms: i64) -> Vec<SessionEvent> {
        let recovered = recovery::recover(&session, &self.plan, now_ms);
        let from = session.phase;
        let was_active = session.is_active();

        session.elapsed_total_secs = recovered.elapsed_secs;
        session.seconds_left = recovered.seconds_left;
        session.completed_work_phases = recovered.completed_work_phases;
        session.phase_started_elapsed = recovered.phase_started_elapsed;

        let mut events = Vec::new();
        if recovered.finished && was_active {
            let ran_until = session.start_timestamp_ms + (recovered.elapsed_secs as i64) * 1000;
            let reason = if recovered.skipped {
                EndReason::Skipped
            } else {
                EndReason::Completed
            };
            events.push(finish(&mut session, ran_until.min(now_ms), reason));
        } else if recovered.phase != from {
            session.phase = recovered.phase;
            session.skip_requested = false;
            if recovered.paused_at_boundary {
                session.is_paused = true;
                session.paused_elapsed_secs = Some(recovered.elapsed_secs);
            }
            events.push(SessionEvent::PhaseChanged {
                from,
                to: recovered.phase,
                completed_work_phases: recovered.completed_work_phases,
                awaiting_resume: recovered.paused_at_boundary,
            });
        }

        self.session = Some(session);
        events
    }

    /// Re-derive a running session from its timestamps (e.g. after the
    /// process was suspended and ticks were missed)
    pub fn resync(&mut self, now_ms: i64) -> Vec<SessionEvent> {
        match self.session.clone().filter(Session::is_running) {
            Some(session) => self.restore(session, now_ms),
            None => Vec::new(),
        }
    }
}

fn finish(session: &mut Session, ended_at_ms: i64, reason: EndReason) -> SessionEvent {
    session.phase = Phase::Done;
    session.is_paused = false;
    session.paused_elapsed_secs = None;
    session.seconds_left = 0;
    session.skip_requested = false;
    session.completed = reason == EndReason::Completed;

    SessionEvent::Ended {
        session: session.clone(),
        ended_at_ms,
        reason,
    }
}

fn end_phase(session: &mut Session, plan: &PhasePlan, now_ms: i64) -> SessionEvent {
    match session.variant {
        TimerVariant::Focus => {
            let reason = if session.skip_requested {
                EndReason::Skipped
            } else {
                EndReason::Completed
            };
            finish(session, now_ms, reason)
        }
        TimerVariant::Pomodoro => {
            let from = session.phase;
            let (to, completed) = plan.advance(from, session.completed_work_phases);
            let awaiting_resume = !plan.auto_start_next;

            session.phase = to;
            session.completed_work_phases = completed;
            session.seconds_left = next_phase_secs(session, plan, to);
            session.phase_started_elapsed = session.elapsed_total_secs;
            session.skip_requested = false;
            if awaiting_resume {
                session.is_paused = true;
                session.paused_elapsed_secs = Some(session.elapsed_total_secs);
            }

            SessionEvent::PhaseChanged {
                from,
                to,
                completed_work_phases: completed,
                awaiting_resume,
            }
        }
    }
}

/// Length of the phase about to start, cut short by the remaining budget
///
/// An exhausted budget keeps the full length; the next tick ends the session.
fn next_phase_secs(session: &Session, plan: &PhasePlan, phase: Phase) -> u64 {
    let full = plan.phase_secs(phase);
    match session.remaining_total_secs() {
        0 => full,
        remaining => full.min(remaining),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_735_725_600_000;

    fn ticks(machine: &mut CountdownMachine, n: u64) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        for i in 0..n {
            events.extend(machine.tick(T0 + (i as i64 + 1) * 1000));
        }
        events
    }

    #[test]
    fn test_start_sets_initial_phase_and_seconds() {
        for minutes in [1, 10, 25, 90] {
            let mut machine = CountdownMachine::new(PhasePlan::default());
            machine.start(TimerVariant::Focus, minutes, T0).unwrap();
            let snapshot = machine.snapshot();
            assert_eq!(snapshot.phase, Some(Phase::Focus));
            assert_eq!(snapshot.seconds_left, minutes * 60);
            assert!(snapshot.is_running);
        }
    }

    #[test]
    fn test_start_rejected_while_active() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Focus, 25, T0).unwrap();
        let err = machine.start(TimerVariant::Pomodoro, 50, T0).unwrap_err();
        assert_eq!(
            err,
            EngineError::SessionActive {
                phase: Phase::Focus
            }
        );
        assert_eq!(machine.snapshot().variant, Some(TimerVariant::Focus));
    }

    #[test]
    fn test_start_rejects_zero_minutes() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        assert_eq!(
            machine.start(TimerVariant::Focus, 0, T0),
            Err(EngineError::InvalidDuration)
        );
        assert!(!machine.is_active());
    }

    #[test]
    fn test_ticks_track_elapsed_and_remaining() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Focus, 2, T0).unwrap();

        for n in 1..120u64 {
            machine.tick(T0 + n as i64 * 1000);
            let snapshot = machine.snapshot();
            assert_eq!(snapshot.elapsed_total_secs, n);
            assert_eq!(snapshot.seconds_left, 120 - n);
        }
    }

    #[test]
    fn test_focus_completes_naturally() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Focus, 1, T0).unwrap();
        let events = ticks(&mut machine, 60);

        let ended = events.iter().find_map(|e| match e {
            SessionEvent::Ended {
                session, reason, ..
            } => Some((session.clone(), *reason)),
            _ => None,
        });
        let (session, reason) = ended.expect("session should end");
        assert_eq!(reason, EndReason::Completed);
        assert!(session.completed);
        assert_eq!(session.phase, Phase::Done);
        assert!(!machine.is_running());

        // Done sessions never tick again
        assert!(machine.tick(T0 + 61_000).is_empty());
        assert_eq!(machine.snapshot().elapsed_total_secs, 60);
    }

    #[test]
    fn test_pause_twice_is_same_as_once() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Focus, 10, T0).unwrap();
        ticks(&mut machine, 30);

        assert_eq!(machine.pause(), vec![SessionEvent::Paused]);
        let after_first = machine.snapshot();
        assert!(machine.pause().is_empty());
        assert_eq!(machine.snapshot(), after_first);

        // Ticks while paused do nothing
        assert!(machine.tick(T0 + 100_000).is_empty());
        assert_eq!(machine.snapshot().elapsed_total_secs, 30);
    }

    #[test]
    fn test_pause_without_session_is_noop() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        assert!(machine.pause().is_empty());
        assert!(machine.resume(T0).is_empty());
        assert!(machine.cancel(T0).is_empty());
        assert!(machine.reset(T0).is_empty());
    }

    #[test]
    fn test_resume_rebases_start_timestamp() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Focus, 10, T0).unwrap();
        ticks(&mut machine, 90);
        machine.pause();

        let resumed_at = T0 + 3_600_000;
        assert_eq!(machine.resume(resumed_at), vec![SessionEvent::Resumed]);
        let session = machine.session().unwrap();
        assert_eq!(session.start_timestamp_ms, resumed_at - 90_000);
        assert!(session.paused_elapsed_secs.is_none());
    }

    #[test]
    fn test_pomodoro_work_to_short_break() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Pomodoro, 25, T0).unwrap();
        let events = ticks(&mut machine, 1500);

        assert_eq!(
            events,
            vec![SessionEvent::PhaseChanged {
                from: Phase::Work,
                to: Phase::ShortBreak,
                completed_work_phases: 1,
                awaiting_resume: false,
            }]
        );
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.phase, Some(Phase::ShortBreak));
        assert_eq!(snapshot.seconds_left, 300);

        // Budget is spent: the next tick ends the session mid-break
        let events = machine.tick(T0 + 1_501_000);
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Ended {
                reason: EndReason::Completed,
                ..
            }]
        ));
    }

    #[test]
    fn test_pomodoro_long_break_every_fourth_work_phase() {
        let plan = PhasePlan {
            work_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 1,
            cycles_before_long_break: 4,
            auto_start_next: true,
        };
        let mut machine = CountdownMachine::new(plan);
        machine.start(TimerVariant::Pomodoro, 60, T0).unwrap();

        let breaks: Vec<(u32, Phase)> = ticks(&mut machine, 24 * 60)
            .into_iter()
            .filter_map(|e| match e {
                SessionEvent::PhaseChanged {
                    from: Phase::Work,
                    to,
                    completed_work_phases,
                    ..
                } => Some((completed_work_phases, to)),
                _ => None,
            })
            .collect();

        assert_eq!(breaks.len(), 12);
        for (count, to) in breaks {
            let expected = if count % 4 == 0 {
                Phase::LongBreak
            } else {
                Phase::ShortBreak
            };
            assert_eq!(to, expected, "work phase {count}");
        }
    }

    #[test]
    fn test_pomodoro_without_auto_start_pauses_at_boundary() {
        let plan = PhasePlan {
            work_minutes: 1,
            auto_start_next: false,
            ..PhasePlan::default()
        };
        let mut machine = CountdownMachine::new(plan);
        machine.start(TimerVariant::Pomodoro, 30, T0).unwrap();
        ticks(&mut machine, 60);

        let snapshot = machine.snapshot();
        assert_eq!(snapshot.phase, Some(Phase::ShortBreak));
        assert!(snapshot.is_paused);
        assert!(!snapshot.is_running);
        assert!(machine.tick(T0 + 61_000).is_empty());
    }

    #[test]
    fn test_skip_transitions_on_next_tick() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Pomodoro, 120, T0).unwrap();
        ticks(&mut machine, 100);

        assert!(machine.skip(T0 + 100_000).is_empty());
        assert_eq!(machine.snapshot().seconds_left, 0);

        let events = machine.tick(T0 + 101_000);
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::PhaseChanged {
                to: Phase::ShortBreak,
                ..
            }]
        ));
        // The skipped tick does not count as elapsed time
        assert_eq!(machine.snapshot().elapsed_total_secs, 100);
        assert_eq!(machine.session().unwrap().phase_started_elapsed, 100);
    }

    #[test]
    fn test_skip_keeps_timestamps_in_step_with_ticks() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Pomodoro, 120, T0).unwrap();
        ticks(&mut machine, 100);
        machine.skip(T0 + 100_000);
        for n in 101..=400 {
            machine.tick(T0 + n * 1000);
        }

        let session = machine.session().unwrap().clone();
        assert_eq!(session.start_timestamp_ms, T0 + 1000);

        let mut relaunched = CountdownMachine::new(PhasePlan::default());
        relaunched.restore(session, T0 + 400_000);
        assert_eq!(relaunched.snapshot(), machine.snapshot());
        assert_eq!(machine.snapshot().phase, Some(Phase::ShortBreak));
        assert_eq!(machine.snapshot().seconds_left, 1);
    }

    #[test]
    fn test_break_cut_short_by_remaining_budget() {
        // A full work block leaves two minutes of a 27-minute budget
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Pomodoro, 27, T0).unwrap();
        ticks(&mut machine, 1500);

        let snapshot = machine.snapshot();
        assert_eq!(snapshot.phase, Some(Phase::ShortBreak));
        assert_eq!(snapshot.seconds_left, 120);
        assert_eq!(
            snapshot.seconds_left + snapshot.elapsed_total_secs,
            snapshot.total_planned_secs
        );

        for n in 1501..=1620 {
            machine.tick(T0 + n * 1000);
        }
        assert_eq!(machine.snapshot().elapsed_total_secs, 27 * 60);
        let events = machine.tick(T0 + 1_621_000);
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::Ended {
                reason: EndReason::Completed,
                ..
            }]
        ));
    }

    #[test]
    fn test_skip_focus_ends_uncompleted() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Focus, 25, T0).unwrap();
        ticks(&mut machine, 10);
        machine.skip(T0 + 10_000);

        let events = machine.tick(T0 + 11_000);
        match events.as_slice() {
            [SessionEvent::Ended {
                session, reason, ..
            }] => {
                assert_eq!(*reason, EndReason::Skipped);
                assert!(!session.completed);
            }
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_skip_while_paused_transitions_immediately() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Pomodoro, 120, T0).unwrap();
        ticks(&mut machine, 10);
        machine.pause();

        let events = machine.skip(T0 + 20_000);
        assert_eq!(events.len(), 1);
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.phase, Some(Phase::ShortBreak));
        assert!(snapshot.is_paused);
    }

    #[test]
    fn test_cancel_destroys_session() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Focus, 30, T0).unwrap();
        ticks(&mut machine, 600);

        let events = machine.cancel(T0 + 600_000);
        match events.as_slice() {
            [SessionEvent::Ended {
                session, reason, ..
            }] => {
                assert_eq!(*reason, EndReason::Cancelled);
                assert!(!session.completed);
                assert_eq!(session.elapsed_minutes(), 10);
            }
            other => panic!("unexpected events {other:?}"),
        }
        assert!(machine.session().is_none());
        assert!(machine.start(TimerVariant::Focus, 5, T0).is_ok());
    }

    #[test]
    fn test_reset_rewinds_and_waits() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Pomodoro, 120, T0).unwrap();
        ticks(&mut machine, 1600);
        assert_eq!(machine.snapshot().completed_work_phases, 1);

        assert_eq!(machine.reset(T0 + 1_700_000), vec![SessionEvent::Reset]);
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.phase, Some(Phase::Work));
        assert_eq!(snapshot.seconds_left, 1500);
        assert_eq!(snapshot.elapsed_total_secs, 0);
        assert_eq!(snapshot.completed_work_phases, 0);
        assert!(snapshot.is_paused);

        machine.resume(T0 + 1_800_000);
        assert!(machine.is_running());
    }

    #[test]
    fn test_reset_rearms_finished_session() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Focus, 1, T0).unwrap();
        ticks(&mut machine, 60);
        assert!(!machine.is_active());

        machine.reset(T0 + 70_000);
        assert!(machine.is_active());
        assert_eq!(machine.snapshot().seconds_left, 60);
    }

    #[test]
    fn test_restore_past_budget_finishes() {
        let plan = PhasePlan::default();
        let session = Session::new(TimerVariant::Focus, 30, T0, &plan);
        let mut machine = CountdownMachine::new(plan);

        let events = machine.restore(session, T0 + 40 * 60_000);
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.phase, Some(Phase::Done));
        assert_eq!(snapshot.seconds_left, 0);
        assert_eq!(snapshot.elapsed_total_secs, 1800);
        match events.as_slice() {
            [SessionEvent::Ended {
                ended_at_ms,
                reason: EndReason::Completed,
                ..
            }] => assert_eq!(*ended_at_ms, T0 + 1_800_000),
            other => panic!("unexpected events {other:?}"),
        }
    }

    #[test]
    fn test_resync_catches_up_after_suspension() {
        let mut machine = CountdownMachine::new(PhasePlan::default());
        machine.start(TimerVariant::Pomodoro, 120, T0).unwrap();
        ticks(&mut machine, 5);

        // Process was suspended for 26 minutes
        let events = machine.resync(T0 + 26 * 60_000);
        assert!(matches!(
            events.as_slice(),
            [SessionEvent::PhaseChanged {
                from: Phase::Work,
                to: Phase::ShortBreak,
                ..
            }]
        ));
        let snapshot = machine.snapshot();
        assert_eq!(snapshot.elapsed_total_secs, 26 * 60);
        assert_eq!(snapshot.seconds_left, 4 * 60);
        assert!(snapshot.is_running);
    }
}
