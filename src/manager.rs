//! Session manager
//!
//! Owns the countdown machine together with everything that reacts to it:
//! the persisted store, the session log, the stats aggregate and the effect
//! dispatcher. Every operation runs the machine and then applies the
//! resulting events in one place, so all write paths share the same update.
//!
//! Several processes may share one store (a foreground `watch` plus one-shot
//! commands from another terminal). A ticking manager re-reads the active
//! record before each tick and adopts whatever another process wrote there,
//! and the log is merged with its stored copy before every append.

use std::sync::Arc;

use anyhow::Result;
use chrono::NaiveDate;

use crate::config::Config;
use crate::effects::EffectDispatcher;
use crate::presentation::PresentationState;
use crate::session::{
    Clock, CountdownMachine, EndReason, EngineError, PhasePlan, Session, SessionEvent,
    SessionSnapshot, TimerVariant,
};
use crate::stats::{
    merge_logs, milestones_between, push_capped, DayBoundary, SessionLogEntry, SessionStats,
};
use crate::store::{KeyValueStore, SessionStore};

/// Application state for one device
pub struct SessionManager<S> {
    machine: CountdownMachine,
    store: SessionStore<S>,
    /// Cached session log, oldest first
    log: Vec<SessionLogEntry>,
    stats: SessionStats,
    effects: EffectDispatcher,
    clock: Arc<dyn Clock>,
    max_log_entries: usize,
    day_boundary: DayBoundary,
    quote_rotation_secs: u64,
    persistence_failures: u64,
    /// Active record as this process last wrote it
    written: Option<Session>,
}

impl<S: std::fmt::Debug> std::fmt::Debug for SessionManager<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("machine", &self.machine)
            .field("store", &self.store)
            .field("log_len", &self.log.len())
            .field("stats", &self.stats)
            .field("effects", &self.effects)
            .field("persistence_failures", &self.persistence_failures)
            .finish()
    }
}

impl<S: KeyValueStore> SessionManager<S> {
    /// Load the log and stats from `backend`
    ///
    /// Does not touch the in-flight session; call `rehydrate` for that.
    pub fn load(
        backend: S,
        config: &Config,
        effects: EffectDispatcher,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let mut store = SessionStore::new(backend);
        let log = store.load_log()?;
        let stored_stats = store.load_stats()?;

        let mut manager = Self {
            machine: CountdownMachine::new(config.phase_plan()),
            store,
            log,
            stats: SessionStats::default(),
            effects,
            clock,
            max_log_entries: config.max_log_entries,
            day_boundary: config.day_boundary,
            quote_rotation_secs: config.quote_rotation_secs,
            persistence_failures: 0,
            written: None,
        };

        let today = manager.today();
        match stored_stats {
            Some(mut stats) => {
                stats.refresh_rolling(&manager.log, today);
                manager.stats = stats;
            }
            None if !manager.log.is_empty() => {
                tracing::info!(
                    entries = manager.log.len(),
                    "Stats record missing, rebuilding from session log"
                );
                manager.stats = SessionStats::rebuild(&manager.log, today);
                manager.persist_stats();
            }
            None => {}
        }

        Ok(manager)
    }

    /// Pick up the persisted in-flight session, recomputing its position
    /// from timestamps
    pub fn rehydrate(&mut self) -> Result<Vec<SessionEvent>> {
        let Some(session) = self.store.load_active()? else {
            return Ok(Vec::new());
        };

        tracing::info!(
            id = %session.id,
            variant = %session.variant,
            phase = %session.phase,
            paused = session.is_paused,
            "Rehydrating session"
        );

        let events = self.machine.restore(session, self.clock.now_ms());
        self.apply_events(&events);
        self.effects.align_hold(self.machine.is_running());
        Ok(events)
    }

    pub fn start(
        &mut self,
        variant: TimerVariant,
        duration_minutes: u64,
    ) -> Result<Vec<SessionEvent>, EngineError> {
        let events = self
            .machine
            .start(variant, duration_minutes, self.clock.now_ms())?;
        self.apply_events(&events);
        Ok(events)
    }

    pub fn pause(&mut self) -> Vec<SessionEvent> {
        let events = self.machine.pause();
        self.apply_events(&events);
        events
    }

    pub fn resume(&mut self) -> Vec<SessionEvent> {
        let events = self.machine.resume(self.clock.now_ms());
        self.apply_events(&events);
        events
    }

    /// Advance one second
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        let mut events = self.adopt_external_changes();
        if !self.machine.is_running() {
            return events;
        }
        let ticked = self.machine.tick(self.clock.now_ms());
        tracing::trace!(seconds_left = self.machine.snapshot().seconds_left, "Tick");
        self.apply_events(&ticked);
        events.extend(ticked);
        events
    }

    /// Catch a running session up with the wall clock after missed ticks
    pub fn resync(&mut self) -> Vec<SessionEvent> {
        let mut events = self.adopt_external_changes();
        let resynced = self.machine.resync(self.clock.now_ms());
        self.apply_events(&resynced);
        events.extend(resynced);
        events
    }

    pub fn skip(&mut self) -> Vec<SessionEvent> {
        let events = self.machine.skip(self.clock.now_ms());
        self.apply_events(&events);
        events
    }

    pub fn cancel(&mut self) -> Vec<SessionEvent> {
        let events = self.machine.cancel(self.clock.now_ms());
        self.apply_events(&events);
        events
    }

    pub fn reset(&mut self) -> Vec<SessionEvent> {
        let events = self.machine.reset(self.clock.now_ms());
        self.apply_events(&events);
        events
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.machine.snapshot()
    }

    pub fn presentation(&self) -> PresentationState {
        PresentationState::from_snapshot(
            &self.machine.snapshot(),
            self.machine.plan(),
            self.quote_rotation_secs,
        )
    }

    pub fn session(&self) -> Option<&Session> {
        self.machine.session()
    }

    pub fn is_running(&self) -> bool {
        self.machine.is_running()
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Recount today/week/month against the current date
    pub fn refresh_stats(&mut self) {
        let today = self.today();
        self.stats.refresh_rolling(&self.log, today);
    }

    pub fn log(&self) -> &[SessionLogEntry] {
        &self.log
    }

    pub fn plan(&self) -> &PhasePlan {
        self.machine.plan()
    }

    pub fn set_plan(&mut self, plan: PhasePlan) {
        self.machine.set_plan(plan);
    }

    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    /// Calendar date of "now" under the configured day boundary
    pub fn today(&self) -> NaiveDate {
        self.day_boundary.date_of(self.clock.now_ms())
    }

    /// Store writes that failed since start-up
    pub fn persistence_failures(&self) -> u64 {
        self.persistence_failures
    }

    /// Side-effect calls that failed since start-up
    pub fn effect_failures(&self) -> u64 {
        self.effects.failures()
    }

    /// Pick up a pause, resume, skip, reset or cancel that another process
    /// wrote to the store while this one was running the session
    fn adopt_external_changes(&mut self) -> Vec<SessionEvent> {
        let Some(written) = self.written.clone() else {
            return Vec::new();
        };
        if !self.machine.is_running() {
            return Vec::new();
        }

        let stored = match self.store.load_active() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to re-read active session");
                return Vec::new();
            }
        };

        match stored {
            Some(stored) if stored.same_controls(&written) => Vec::new(),
            Some(stored) => {
                tracing::info!(
                    id = %stored.id,
                    paused = stored.is_paused,
                    "Session changed by another process"
                );
                self.written = Some(stored.clone());
                self.merge_stored_log();
                let events = self.machine.restore(stored, self.clock.now_ms());
                self.apply_events(&events);
                self.effects.align_hold(self.machine.is_running());
                events
            }
            None => {
                tracing::info!(id = %written.id, "Session ended by another process");
                self.written = None;
                self.machine.discard();
                self.merge_stored_log();
                self.effects.align_hold(false);
                Vec::new()
            }
        }
    }

    /// Fold in log entries another process appended since this one loaded
    fn merge_stored_log(&mut self) {
        let stored = match self.store.load_log() {
            Ok(stored) => stored,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to re-read session log");
                return;
            }
        };
        if stored.iter().all(|entry| self.log.iter().any(|e| e.id == entry.id)) {
            return;
        }

        self.log = merge_logs(stored, &self.log, self.max_log_entries);
        let today = self.today();
        self.stats = match self.store.load_stats() {
            Ok(Some(mut stats)) => {
                stats.refresh_rolling(&self.log, today);
                stats
            }
            Ok(None) => SessionStats::rebuild(&self.log, today),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to re-read stats, rebuilding from log");
                SessionStats::rebuild(&self.log, today)
            }
        };
        tracing::debug!(entries = self.log.len(), "Merged session log from store");
    }

    fn apply_events(&mut self, events: &[SessionEvent]) {
        for event in events {
            match event {
                SessionEvent::Started {
                    variant,
                    planned_minutes,
                } => tracing::info!(%variant, planned_minutes, "Session started"),
                SessionEvent::PhaseChanged {
                    from,
                    to,
                    completed_work_phases,
                    awaiting_resume,
                } => tracing::info!(
                    %from,
                    %to,
                    completed_work_phases,
                    awaiting_resume,
                    "Phase changed"
                ),
                SessionEvent::Ended { reason, .. } => {
                    tracing::info!(reason = ?reason, "Session ended")
                }
                other => tracing::info!(event = ?other, "Session updated"),
            }

            self.effects.dispatch(event);

            if let SessionEvent::Ended {
                session,
                ended_at_ms,
                reason,
            } = event
            {
                self.record_ended(session, *ended_at_ms, *reason);
            }
        }

        if !events.is_empty() || self.machine.is_running() {
            self.persist_active();
        }
    }

    fn record_ended(&mut self, session: &Session, ended_at_ms: i64, reason: EndReason) {
        self.merge_stored_log();
        if self.log.iter().any(|entry| entry.id == session.id) {
            tracing::debug!(id = %session.id, "Session already logged");
            return;
        }

        let entry = SessionLogEntry::from_ended(session, ended_at_ms, reason, self.day_boundary);
        let before = self.stats.clone();

        push_capped(&mut self.log, entry.clone(), self.max_log_entries);
        if let Err(e) = self.store.save_log(&self.log) {
            self.persistence_failures += 1;
            tracing::warn!(error = %e, "Failed to save session log");
        }

        let today = self.today();
        self.stats.record(&entry, &self.log, today);
        self.persist_stats();

        for milestone in milestones_between(&before, &self.stats) {
            tracing::info!(%milestone, "Milestone reached");
            self.effects.milestone(milestone);
        }
    }

    /// Save the in-flight session, or clear it once there is none
    fn persist_active(&mut self) {
        let active = self.machine.session().filter(|s| s.is_active()).cloned();
        let result = match &active {
            Some(session) => self.store.save_active(session),
            None => self.store.clear_active(),
        };
        match result {
            Ok(()) => self.written = active,
            Err(e) => {
                self.persistence_failures += 1;
                tracing::warn!(error = %e, "Failed to persist active session");
            }
        }
    }

    fn persist_stats(&mut self) {
        if let Err(e) = self.store.save_stats(&self.stats) {
            self.persistence_failures += 1;
            tracing::warn!(error = %e, "Failed to save stats");
        }
    }
}
