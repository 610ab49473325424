//! Streak and focus-hour milestones

use serde::Serialize;

use super::SessionStats;

const STREAK_MILESTONES: [u32; 7] = [3, 7, 14, 30, 60, 100, 365];
const HOUR_MILESTONES: [u64; 9] = [1, 5, 10, 25, 50, 100, 250, 500, 1000];

/// A notable threshold crossed by the stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Milestone {
    StreakDays(u32),
    FocusHours(u64),
}

impl std::fmt::Display for Milestone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Milestone::StreakDays(days) => write!(f, "{}-day streak", days),
            Milestone::FocusHours(1) => write!(f, "1 hour of focus"),
            Milestone::FocusHours(hours) => write!(f, "{} hours of focus", hours),
        }
    }
}

/// Milestones crossed going from `before` to `after`
pub fn milestones_between(before: &SessionStats, after: &SessionStats) -> Vec<Milestone> {
    let streaks = STREAK_MILESTONES
        .iter()
        .filter(|&&days| before.current_streak < days && after.current_streak >= days)
        .map(|&days| Milestone::StreakDays(days));

    let hours = HOUR_MILESTONES
        .iter()
        .filter(|&&hours| {
            before.total_focus_minutes < hours * 60 && after.total_focus_minutes >= hours * 60
        })
        .map(|&hours| Milestone::FocusHours(hours));

    streaks.chain(hours).collect()
}
