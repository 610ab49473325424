//! cadence: command-line front end for the focus session engine
//!
//! Every invocation rehydrates the persisted session from its timestamps,
//! applies one command and prints the result. `watch`, and `start`/`resume`
//! without `--detach`, keep ticking in the foreground until the session ends,
//! is paused, or Ctrl-C detaches.

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;

use cadence::config::{self, Config};
use cadence::effects::{CommandSink, EffectDispatcher, TerminalSink};
use cadence::logging;
use cadence::session::SystemClock;
use cadence::stats::format_minutes;
use cadence::store::JsonFileStore;
use cadence::ticker::spawn_ticker;
use cadence::{SessionManager, TimerVariant};

type Manager = SessionManager<JsonFileStore>;

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Focus and Pomodoro timer with streaks and stats")]
#[command(version)]
struct Cli {
    /// Also print log events to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a new session
    Start {
        /// Session length in minutes (defaults from config)
        #[arg(value_name = "MINUTES")]
        minutes: Option<u64>,

        /// Cycle work blocks and breaks instead of a single countdown
        #[arg(short, long)]
        pomodoro: bool,

        /// Return immediately instead of ticking in the foreground
        #[arg(short, long)]
        detach: bool,
    },

    /// Pause the running session
    Pause,

    /// Resume a paused session
    Resume {
        /// Return immediately instead of ticking in the foreground
        #[arg(short, long)]
        detach: bool,
    },

    /// End the current phase early
    Skip,

    /// Abandon the session without completing it
    Cancel,

    /// Rewind the session to its first phase, paused
    Reset,

    /// Show the current session
    Status {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Show streaks and totals
    Stats {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Follow the running session until it ends or is paused
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Command failed");
            eprintln!("{}", config::friendly_error_message(&e, "cadence"));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    config::ensure_directories()?;
    let config = Config::load()?;

    let logs_dir = config::logs_dir();
    let (log_file_info, _guard) = logging::init_file_logging(&logs_dir, cli.verbose)?;
    match logging::cleanup_old_logs(
        &logs_dir,
        config.log_retention_days,
        Some(log_file_info.path.as_path()),
    ) {
        Ok(count) if count > 0 => tracing::info!("Cleaned up {} old log files", count),
        Ok(_) => {}
        Err(e) => tracing::warn!(error = %e, "Log cleanup failed"),
    }
    tracing::info!("Logging to: {}", log_file_info.path.display());

    let mut manager = open_manager(&config)?;
    manager.rehydrate()?;

    match cli.command {
        Commands::Start {
            minutes,
            pomodoro,
            detach,
        } => {
            let variant = if pomodoro {
                TimerVariant::Pomodoro
            } else {
                TimerVariant::Focus
            };
            let minutes = minutes.unwrap_or(match variant {
                TimerVariant::Focus => config.default_focus_minutes,
                TimerVariant::Pomodoro => manager.plan().full_cycle_minutes(),
            });

            manager
                .start(variant, minutes)
                .context("Could not start a session")?;
            println!("Started a {}-minute {} session", minutes, variant);
            follow_unless(manager, detach).await?;
        }
        Commands::Pause => {
            if manager.pause().is_empty() {
                println!("No running session to pause");
            }
            print_status(&manager);
        }
        Commands::Resume { detach } => {
            if manager.resume().is_empty() {
                println!("No paused session to resume");
                print_status(&manager);
            } else {
                follow_unless(manager, detach).await?;
            }
        }
        Commands::Skip => {
            if manager.skip().is_empty() && !manager.is_running() {
                println!("No active session to skip");
            }
            print_status(&manager);
        }
        Commands::Cancel => {
            if manager.cancel().is_empty() {
                println!("No active session to cancel");
            } else {
                println!("Session cancelled");
            }
        }
        Commands::Reset => {
            if manager.reset().is_empty() {
                println!("No session to reset");
            } else {
                print_status(&manager);
            }
        }
        Commands::Status { json } => {
            if json {
                let payload = serde_json::json!({
                    "snapshot": manager.snapshot(),
                    "presentation": manager.presentation(),
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print_status(&manager);
            }
        }
        Commands::Stats { json } => {
            manager.refresh_stats();
            if json {
                println!("{}", serde_json::to_string_pretty(manager.stats())?);
            } else {
                print_stats(&manager);
            }
        }
        Commands::Watch => follow_unless(manager, false).await?,
    }

    Ok(())
}

fn open_manager(config: &Config) -> Result<Manager> {
    let backend = JsonFileStore::open(config::data_dir())?;

    let mut effects =
        EffectDispatcher::new(config.effect_settings()).with_sink(TerminalSink::stderr());
    if let Some(command) = &config.notify_command {
        effects = effects.with_sink(CommandSink::new(command.clone()));
    }

    SessionManager::load(backend, config, effects, Arc::new(SystemClock))
}

async fn follow_unless(manager: Manager, detach: bool) -> Result<()> {
    if detach || !manager.is_running() {
        print_status(&manager);
        return Ok(());
    }
    follow(manager).await
}

/// Tick in the foreground, redrawing the status line
async fn follow(manager: Manager) -> Result<()> {
    let manager = Arc::new(Mutex::new(manager));
    let ticker = spawn_ticker(manager.clone(), Duration::from_secs(1)).await;
    let mut snapshots = ticker.subscribe();

    redraw(&manager.lock().await.presentation().render_line())?;

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let state = manager.lock().await.presentation();
                redraw(&state.render_line())?;
                if !state.is_running {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                ticker.stop();
                println!();
                println!("Detached. The session keeps running; `cadence status` to check in.");
                return Ok(());
            }
        }
    }

    ticker.join().await;
    println!();
    Ok(())
}

fn redraw(line: &str) -> Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "\r\x1b[2K{}", line)?;
    stdout.flush()?;
    Ok(())
}

fn print_status(manager: &Manager) {
    let Some(session) = manager.session().filter(|s| s.is_active()) else {
        println!("No active session");
        return;
    };

    println!("{}", manager.presentation().render_line());
    println!(
        "{} session, {} of {} minutes elapsed{}",
        session.variant,
        session.elapsed_minutes(),
        session.planned_minutes,
        if session.is_paused { " (paused)" } else { "" }
    );
}

fn print_stats(manager: &Manager) {
    let stats = manager.stats();
    let today = manager.today();

    println!(
        "Sessions:        {} ({} completed, {})",
        stats.total_sessions,
        stats.completed_sessions,
        stats.format_completion_rate()
    );
    println!("Focus time:      {}", format_minutes(stats.total_focus_minutes));
    println!(
        "Streak:          {} days (longest {})",
        stats.active_streak(today),
        stats.longest_streak
    );
    println!(
        "Today/week/month: {} / {} / {}",
        stats.sessions_today, stats.sessions_this_week, stats.sessions_this_month
    );
}
