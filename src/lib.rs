//! Cadence - focus and Pomodoro session engine
//!
//! A single-user countdown timer that survives restarts by recomputing
//! progress from persisted timestamps, fires best-effort side effects at
//! phase boundaries and folds ended sessions into streaks and totals.

pub mod config;
pub mod effects;
pub mod logging;
pub mod manager;
pub mod presentation;
pub mod session;
pub mod stats;
pub mod store;
pub mod ticker;

pub use manager::SessionManager;
pub use session::{CountdownMachine, Phase, PhasePlan, Session, SessionEvent, TimerVariant};
