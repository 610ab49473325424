//! Periodic tick driver
//!
//! Runs the one-second countdown on a tokio interval and publishes a snapshot
//! after every tick. If the wall clock ran ahead of the interval (the process
//! was suspended or the machine slept), the session is resynced from its
//! timestamps instead of counting the missed ticks.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::manager::SessionManager;
use crate::session::SessionSnapshot;
use crate::store::KeyValueStore;

/// Handle to a running tick task
#[derive(Debug)]
pub struct Ticker {
    task: JoinHandle<()>,
    snapshots: watch::Receiver<SessionSnapshot>,
}

impl Ticker {
    /// Receive a snapshot after every tick
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop ticking immediately
    pub fn stop(self) {
        self.task.abort();
    }

    /// Wait until the session stops running
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            if !e.is_cancelled() {
                tracing::error!(error = %e, "Tick task failed");
            }
        }
    }
}

/// Drive `manager` every `period` until its session stops running
pub async fn spawn_ticker<S>(manager: Arc<Mutex<SessionManager<S>>>, period: Duration) -> Ticker
where
    S: KeyValueStore + 'static,
{
    let (initial, mut last_ms) = {
        let guard = manager.lock().await;
        (guard.snapshot(), guard.now_ms())
    };
    let (tx, rx) = watch::channel(initial);
    let period_ms = period.as_millis().max(1) as i64;

    let task = tokio::spawn(async move {
        let mut interval = time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;

            let snapshot = {
                let mut guard = manager.lock().await;
                if !guard.is_running() {
                    break;
                }

                let now = guard.now_ms();
                let behind_ms = now - last_ms;
                last_ms = now;

                if behind_ms > 2 * period_ms {
                    tracing::info!(behind_ms, "Clock ran ahead of ticks, resyncing");
                    guard.resync();
                } else {
                    guard.tick();
                }
                guard.snapshot()
            };

            tx.send_replace(snapshot);
            if !snapshot.is_running {
                break;
            }
        }

        tracing::debug!("Ticker stopped");
    });

    Ticker {
        task,
        snapshots: rx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::effects::{EffectDispatcher, EffectSettings};
    use crate::session::{ManualClock, Phase, TimerVariant};
    use crate::stats::DayBoundary;
    use crate::store::MemoryStore;

    const T0: i64 = 1_735_722_000_000;

    fn shared_manager(clock: Arc<ManualClock>) -> Arc<Mutex<SessionManager<MemoryStore>>> {
        let config = Config {
            day_boundary: DayBoundary::Utc,
            ..Config::default()
        };
        let manager = SessionManager::load(
            MemoryStore::new(),
            &config,
            EffectDispatcher::new(EffectSettings::default()),
            clock,
        )
        .unwrap();
        Arc::new(Mutex::new(manager))
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_runs_session_to_completion() {
        let clock = Arc::new(ManualClock::new(T0));
        let manager = shared_manager(clock);
        manager
            .lock()
            .await
            .start(TimerVariant::Focus, 1)
            .unwrap();

        let ticker = spawn_ticker(manager.clone(), Duration::from_secs(1)).await;
        let snapshots = ticker.subscribe();
        ticker.join().await;

        let last = *snapshots.borrow();
        assert_eq!(last.phase, Some(Phase::Done));
        assert_eq!(last.elapsed_total_secs, 60);
        assert_eq!(manager.lock().await.stats().completed_sessions, 1);
    }

    #[test]
    fn test_ticker_exits_without_running_session() {
        tokio_test::block_on(async {
            let manager = shared_manager(Arc::new(ManualClock::new(T0)));
            let ticker = spawn_ticker(manager, Duration::from_millis(10)).await;
            let snapshots = ticker.subscribe();
            ticker.join().await;
            assert_eq!(snapshots.borrow().phase, None);
        });
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_stops_when_paused() {
        let clock = Arc::new(ManualClock::new(T0));
        let manager = shared_manager(clock);
        manager
            .lock()
            .await
            .start(TimerVariant::Focus, 25)
            .unwrap();

        let ticker = spawn_ticker(manager.clone(), Duration::from_secs(1)).await;
        time::sleep(Duration::from_millis(3500)).await;
        manager.lock().await.pause();
        time::sleep(Duration::from_secs(2)).await;

        assert!(ticker.is_finished());
        assert_eq!(manager.lock().await.snapshot().elapsed_total_secs, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticker_resyncs_after_clock_jump() {
        let clock = Arc::new(ManualClock::new(T0));
        let manager = shared_manager(clock.clone());
        manager
            .lock()
            .await
            .start(TimerVariant::Pomodoro, 120)
            .unwrap();

        let ticker = spawn_ticker(manager.clone(), Duration::from_secs(1)).await;
        time::sleep(Duration::from_millis(1500)).await;

        // Laptop lid closed for 26 minutes
        clock.advance_secs(26 * 60);
        time::sleep(Duration::from_secs(1)).await;

        let snapshot = manager.lock().await.snapshot();
        assert_eq!(snapshot.phase, Some(Phase::ShortBreak));
        assert_eq!(snapshot.elapsed_total_secs, 26 * 60);
        ticker.stop();
    }
}
