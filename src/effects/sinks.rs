//! Built-in effect sinks

use std::io::Write;
use std::process::Stdio;

use anyhow::{Context, Result};

use super::{EffectSink, HapticPulse, HapticStrength, Notification};

const BELL: &str = "\x07";

/// Writes notifications to a terminal stream and rings the bell
///
/// Terminals have no haptics or screen control; strong haptic pulses map to
/// the bell and keep-awake/dim requests are only logged.
#[derive(Debug)]
pub struct TerminalSink<W = std::io::Stderr> {
    out: W,
}

impl TerminalSink {
    pub fn stderr() -> Self {
        Self {
            out: std::io::stderr(),
        }
    }
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write + Send> EffectSink for TerminalSink<W> {
    fn haptic(&mut self, pulse: HapticPulse) -> Result<()> {
        if matches!(
            pulse.strength(),
            HapticStrength::Success | HapticStrength::Warning
        ) {
            write!(self.out, "{}", BELL).context("Failed to ring terminal bell")?;
            self.out.flush().context("Failed to flush terminal")?;
        }
        Ok(())
    }

    fn notify(&mut self, notification: &Notification) -> Result<()> {
        let bell = if notification.sound { BELL } else { "" };
        writeln!(
            self.out,
            "{}[{}] {}",
            bell,
            notification.title(),
            notification.message()
        )
        .context("Failed to write notification")?;
        self.out.flush().context("Failed to flush terminal")?;
        Ok(())
    }

    fn keep_awake(&mut self, enabled: bool) -> Result<()> {
        tracing::debug!(enabled, "Keep-awake requested");
        Ok(())
    }

    fn dim_screen(&mut self, enabled: bool) -> Result<()> {
        tracing::debug!(enabled, "Screen dimming requested");
        Ok(())
    }
}

/// Runs a user-configured shell command for each notification
///
/// The command sees `CADENCE_TITLE` and `CADENCE_BODY` in its environment.
/// It runs on the current tokio runtime and is reaped by a background task,
/// so the dispatcher never waits on it.
#[derive(Debug, Clone)]
pub struct CommandSink {
    command: String,
}

impl CommandSink {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl EffectSink for CommandSink {
    fn notify(&mut self, notification: &Notification) -> Result<()> {
        let handle = tokio::runtime::Handle::try_current()
            .context("Notify command needs a running tokio runtime")?;

        let mut child = tokio::process::Command::new("sh")
            .arg("-c")
            .arg(&self.command)
            .env("CADENCE_TITLE", notification.title())
            .env("CADENCE_BODY", notification.message())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .with_context(|| format!("Failed to run notify command `{}`", self.command))?;

        handle.spawn(async move {
            match child.wait().await {
                Ok(status) if !status.success() => {
                    tracing::debug!(%status, "Notify command exited unsuccessfully")
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(error = %e, "Notify command wait failed"),
            }
        });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::NotificationKind;
    use crate::session::Phase;

    fn phase_done(sound: bool) -> Notification {
        Notification {
            kind: NotificationKind::PhaseComplete {
                from: Phase::Work,
                to: Phase::LongBreak,
            },
            sound,
        }
    }

    #[test]
    fn test_terminal_notification_line() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.notify(&phase_done(false)).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "[Work Block Complete] Time for a long break\n");
    }

    #[test]
    fn test_terminal_sound_rings_bell() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.notify(&phase_done(true)).unwrap();
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.starts_with(BELL));
    }

    #[test]
    fn test_terminal_light_haptics_are_silent() {
        let mut sink = TerminalSink::new(Vec::new());
        sink.haptic(HapticPulse::Pause).unwrap();
        sink.haptic(HapticPulse::Start).unwrap();
        assert!(sink.into_inner().is_empty());

        let mut sink = TerminalSink::new(Vec::new());
        sink.haptic(HapticPulse::Complete).unwrap();
        assert_eq!(sink.into_inner(), BELL.as_bytes());
    }

    #[tokio::test]
    async fn test_command_sink_passes_environment() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let out_path = temp_dir.path().join("notified.txt");
        let command = format!(
            "printf '%s|%s' \"$CADENCE_TITLE\" \"$CADENCE_BODY\" > {}",
            out_path.display()
        );
        let mut sink = CommandSink::new(command);
        sink.notify(&phase_done(false)).unwrap();

        let mut content = String::new();
        for _ in 0..50 {
            content = std::fs::read_to_string(&out_path).unwrap_or_default();
            if !content.is_empty() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        }
        assert_eq!(content, "Work Block Complete|Time for a long break");
    }

    #[test]
    fn test_command_sink_outside_runtime_reports_error() {
        let mut sink = CommandSink::new("true");
        assert!(sink.notify(&phase_done(false)).is_err());
    }
}
