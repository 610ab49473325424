//! Best-effort side effects at session boundaries
//!
//! The dispatcher turns `SessionEvent`s and milestones into haptic pulses,
//! notifications and keep-awake/dim-screen toggles on one or more
//! `EffectSink`s. Sink failures are logged and counted; they never reach the
//! state machine.

pub mod sinks;

use anyhow::Result;

use crate::session::{EndReason, Phase, SessionEvent, TimerVariant};
use crate::stats::{format_minutes, Milestone};

pub use sinks::{CommandSink, TerminalSink};

/// Which side effects are enabled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectSettings {
    pub haptics: bool,
    pub sound: bool,
    pub notifications: bool,
    pub keep_awake: bool,
    pub dim_screen: bool,
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            haptics: true,
            sound: true,
            notifications: true,
            keep_awake: false,
            dim_screen: false,
        }
    }
}

/// Intensity class of a haptic pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticStrength {
    Light,
    Medium,
    Success,
    Warning,
}

/// Haptic cue for a lifecycle transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HapticPulse {
    Start,
    Pause,
    Resume,
    PhaseChange,
    Complete,
    Cancel,
}

impl HapticPulse {
    pub fn strength(self) -> HapticStrength {
        match self {
            HapticPulse::Start | HapticPulse::PhaseChange => HapticStrength::Medium,
            HapticPulse::Pause | HapticPulse::Resume => HapticStrength::Light,
            HapticPulse::Complete => HapticStrength::Success,
            HapticPulse::Cancel => HapticStrength::Warning,
        }
    }
}

/// Types of notifications the engine raises
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationKind {
    /// A Pomodoro phase ran out
    PhaseComplete { from: Phase, to: Phase },
    /// A session ended on its own or was skipped to the end
    SessionEnded {
        variant: TimerVariant,
        focused_minutes: u64,
        completed: bool,
    },
    Milestone(Milestone),
}

impl NotificationKind {
    /// Get a title for this notification type
    pub fn title(&self) -> &str {
        match self {
            NotificationKind::PhaseComplete { from, .. } if from.is_break() => "Break Over",
            NotificationKind::PhaseComplete { .. } => "Work Block Complete",
            NotificationKind::SessionEnded {
                completed: true, ..
            } => "Session Complete",
            NotificationKind::SessionEnded { .. } => "Session Ended",
            NotificationKind::Milestone(_) => "Milestone Reached",
        }
    }

    /// Get the message content
    pub fn message(&self) -> String {
        match self {
            NotificationKind::PhaseComplete { to, .. } => match to {
                Phase::ShortBreak => "Time for a short break".to_string(),
                Phase::LongBreak => "Time for a long break".to_string(),
                Phase::Work => "Back to work".to_string(),
                other => format!("Next up: {}", other.label()),
            },
            NotificationKind::SessionEnded {
                variant,
                focused_minutes,
                ..
            } => format!(
                "Your {} session lasted {}",
                variant,
                format_minutes(*focused_minutes)
            ),
            NotificationKind::Milestone(milestone) => format!("You reached a {}", milestone),
        }
    }
}

/// A notification handed to sinks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    /// Play an audible cue alongside it
    pub sound: bool,
}

impl Notification {
    pub fn title(&self) -> &str {
        self.kind.title()
    }

    pub fn message(&self) -> String {
        self.kind.message()
    }
}

/// Platform integration point for side effects
///
/// Every method defaults to doing nothing so a sink only implements what its
/// platform supports.
pub trait EffectSink: Send {
    fn haptic(&mut self, _pulse: HapticPulse) -> Result<()> {
        Ok(())
    }

    fn notify(&mut self, _notification: &Notification) -> Result<()> {
        Ok(())
    }

    fn keep_awake(&mut self, _enabled: bool) -> Result<()> {
        Ok(())
    }

    fn dim_screen(&mut self, _enabled: bool) -> Result<()> {
        Ok(())
    }
}

/// Routes session events to the configured sinks
pub struct EffectDispatcher {
    settings: EffectSettings,
    sinks: Vec<Box<dyn EffectSink>>,
    /// Keep-awake/dim are currently engaged
    holding: bool,
    failures: u64,
}

impl std::fmt::Debug for EffectDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectDispatcher")
            .field("settings", &self.settings)
            .field("sinks", &self.sinks.len())
            .field("holding", &self.holding)
            .field("failures", &self.failures)
            .finish()
    }
}

impl EffectDispatcher {
    pub fn new(settings: EffectSettings) -> Self {
        Self {
            settings,
            sinks: Vec::new(),
            holding: false,
            failures: 0,
        }
    }

    /// Add a sink
    pub fn with_sink(mut self, sink: impl EffectSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    pub fn settings(&self) -> EffectSettings {
        self.settings
    }

    pub fn set_settings(&mut self, settings: EffectSettings) {
        self.settings = settings;
    }

    /// Number of sink calls that failed
    pub fn failures(&self) -> u64 {
        self.failures
    }

    /// Check if keep-awake/dim are engaged
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Fire the effects for one session event
    pub fn dispatch(&mut self, event: &SessionEvent) {
        match event {
            SessionEvent::Started { .. } => {
                self.haptic(HapticPulse::Start);
                self.hold(true);
            }
            SessionEvent::Paused => {
                self.haptic(HapticPulse::Pause);
                self.hold(false);
            }
            SessionEvent::Resumed => {
                self.haptic(HapticPulse::Resume);
                self.hold(true);
            }
            SessionEvent::PhaseChanged {
                from,
                to,
                awaiting_resume,
                ..
            } => {
                self.haptic(HapticPulse::PhaseChange);
                self.notify(NotificationKind::PhaseComplete {
                    from: *from,
                    to: *to,
                });
                if *awaiting_resume {
                    self.hold(false);
                }
            }
            SessionEvent::Ended {
                session, reason, ..
            } => {
                match reason {
                    EndReason::Cancelled => self.haptic(HapticPulse::Cancel),
                    EndReason::Completed | EndReason::Skipped => {
                        self.haptic(HapticPulse::Complete);
                        self.notify(NotificationKind::SessionEnded {
                            variant: session.variant,
                            focused_minutes: session.elapsed_minutes(),
                            completed: *reason == EndReason::Completed,
                        });
                    }
                }
                self.hold(false);
            }
            SessionEvent::Reset => self.hold(false),
        }
    }

    /// Engage or release keep-awake/dim without a lifecycle cue, e.g. after
    /// picking up a session that was already running
    pub fn align_hold(&mut self, engaged: bool) {
        self.hold(engaged);
    }

    /// Announce a crossed milestone
    pub fn milestone(&mut self, milestone: Milestone) {
        self.notify(NotificationKind::Milestone(milestone));
    }

    fn haptic(&mut self, pulse: HapticPulse) {
        if self.settings.haptics {
            self.each("haptic", |sink| sink.haptic(pulse));
        }
    }

    fn notify(&mut self, kind: NotificationKind) {
        if !self.settings.notifications {
            return;
        }
        let notification = Notification {
            kind,
            sound: self.settings.sound,
        };
        self.each("notify", |sink| sink.notify(&notification));
    }

    fn hold(&mut self, engaged: bool) {
        if self.holding == engaged {
            return;
        }
        self.holding = engaged;

        if self.settings.keep_awake {
            self.each("keep_awake", |sink| sink.keep_awake(engaged));
        }
        if self.settings.dim_screen {
            self.each("dim_screen", |sink| sink.dim_screen(engaged));
        }
    }

    fn each(&mut self, effect: &str, mut call: impl FnMut(&mut dyn EffectSink) -> Result<()>) {
        for sink in self.sinks.iter_mut() {
            if let Err(e) = call(sink.as_mut()) {
                self.failures += 1;
                tracing::warn!(effect = effect, error = %e, "Side effect failed");
            }
        }
    }
}
