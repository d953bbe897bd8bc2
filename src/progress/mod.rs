//! Streaks, achievements, the daily challenge and the local leaderboard.
//!
//! Everything here is pure; the db module supplies the counters.

pub mod achievements;
pub mod daily;
pub mod leaderboard;
pub mod streak;

pub use achievements::{achievement_views, newly_unlocked, AchievementId, AchievementView, ProgressSnapshot};
pub use daily::{daily_challenge, daily_seed, ChallengeKind, DailyChallenge};
pub use leaderboard::{compare_entries, rank_entries, LeaderboardEntry};
pub use streak::{calculate_streak, Streak};

use chrono::{Local, NaiveDate};

/// The learner's calendar day. Streaks and challenges roll over at local midnight.
pub fn today() -> NaiveDate {
  Local::now().date_naive()
}
