//! Achievement definitions and unlock rules.
//!
//! Achievements are evaluated against a [`ProgressSnapshot`] after every
//! submission. Unlocking is permanent: the caller persists new ids and
//! passes them back as `already` next time.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::config::MAX_SCORE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementId {
  FirstEmail,
  FirstSurvey,
  TenSubmissions,
  FiftySubmissions,
  PerfectScore,
  HighScorer,
  ThreeDayStreak,
  WeekStreak,
  MonthStreak,
  QuizStarter,
  QuizMaster,
  ChallengeChampion,
  Wordsmith,
}

/// Counters the unlock rules look at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
  pub task1_count: u32,
  pub task2_count: u32,
  pub best_score: u8,
  pub perfect_scores: u32,
  pub current_streak: u32,
  pub longest_streak: u32,
  pub quizzes_completed: u32,
  pub perfect_quizzes: u32,
  pub challenges_completed: u32,
  pub total_words: u64,
}

impl ProgressSnapshot {
  pub fn total_submissions(&self) -> u32 {
    self.task1_count + self.task2_count
  }
}

impl AchievementId {
  /// Every achievement, in definition (display) order
  pub const ALL: [AchievementId; 13] = [
    Self::FirstEmail,
    Self::FirstSurvey,
    Self::TenSubmissions,
    Self::FiftySubmissions,
    Self::PerfectScore,
    Self::HighScorer,
    Self::ThreeDayStreak,
    Self::WeekStreak,
    Self::MonthStreak,
    Self::QuizStarter,
    Self::QuizMaster,
    Self::ChallengeChampion,
    Self::Wordsmith,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::FirstEmail => "first_email",
      Self::FirstSurvey => "first_survey",
      Self::TenSubmissions => "ten_submissions",
      Self::FiftySubmissions => "fifty_submissions",
      Self::PerfectScore => "perfect_score",
      Self::HighScorer => "high_scorer",
      Self::ThreeDayStreak => "three_day_streak",
      Self::WeekStreak => "week_streak",
      Self::MonthStreak => "month_streak",
      Self::QuizStarter => "quiz_starter",
      Self::QuizMaster => "quiz_master",
      Self::ChallengeChampion => "challenge_champion",
      Self::Wordsmith => "wordsmith",
    }
  }

  pub fn from_str(s: &str) -> Option<Self> {
    Self::ALL.into_iter().find(|a| a.as_str() == s)
  }

  pub fn title(&self) -> &'static str {
    match self {
      Self::FirstEmail => "First Email",
      Self::FirstSurvey => "First Survey",
      Self::TenSubmissions => "Getting Serious",
      Self::FiftySubmissions => "Dedicated Writer",
      Self::PerfectScore => "Perfect 12",
      Self::HighScorer => "High Scorer",
      Self::ThreeDayStreak => "On a Roll",
      Self::WeekStreak => "Week Warrior",
      Self::MonthStreak => "Unstoppable",
      Self::QuizStarter => "Quiz Starter",
      Self::QuizMaster => "Quiz Master",
      Self::ChallengeChampion => "Challenge Champion",
      Self::Wordsmith => "Wordsmith",
    }
  }

  pub fn description(&self) -> &'static str {
    match self {
      Self::FirstEmail => "Submit your first Task 1 email",
      Self::FirstSurvey => "Submit your first Task 2 survey response",
      Self::TenSubmissions => "Submit 10 pieces of writing",
      Self::FiftySubmissions => "Submit 50 pieces of writing",
      Self::PerfectScore => "Score 12/12 on a submission",
      Self::HighScorer => "Score 10 or more on a submission",
      Self::ThreeDayStreak => "Practise 3 days in a row",
      Self::WeekStreak => "Practise 7 days in a row",
      Self::MonthStreak => "Practise 30 days in a row",
      Self::QuizStarter => "Complete your first quiz",
      Self::QuizMaster => "Answer every question of a quiz correctly",
      Self::ChallengeChampion => "Complete 5 daily challenges",
      Self::Wordsmith => "Write 10,000 words in total",
    }
  }

  pub fn is_earned(&self, s: &ProgressSnapshot) -> bool {
    let streak = s.current_streak.max(s.longest_streak);
    match self {
      Self::FirstEmail => s.task1_count >= 1,
      Self::FirstSurvey => s.task2_count >= 1,
      Self::TenSubmissions => s.total_submissions() >= 10,
      Self::FiftySubmissions => s.total_submissions() >= 50,
      Self::PerfectScore => s.perfect_scores >= 1 || s.best_score >= MAX_SCORE,
      Self::HighScorer => s.best_score >= 10,
      Self::ThreeDayStreak => streak >= 3,
      Self::WeekStreak => streak >= 7,
      Self::MonthStreak => streak >= 30,
      Self::QuizStarter => s.quizzes_completed >= 1,
      Self::QuizMaster => s.perfect_quizzes >= 1,
      Self::ChallengeChampion => s.challenges_completed >= 5,
      Self::Wordsmith => s.total_words >= 10_000,
    }
  }
}

/// Achievements earned by `snapshot` that are not yet in `already`, in definition order
pub fn newly_unlocked(snapshot: &ProgressSnapshot, already: &HashSet<AchievementId>) -> Vec<AchievementId> {
  AchievementId::ALL
    .into_iter()
    .filter(|a| !already.contains(a) && a.is_earned(snapshot))
    .collect()
}

/// Display row for the dashboard achievement grid
#[derive(Debug, Clone, Serialize)]
pub struct AchievementView {
  pub id: &'static str,
  pub title: &'static str,
  pub description: &'static str,
  pub unlocked: bool,
}

pub fn achievement_views(unlocked: &HashSet<AchievementId>) -> Vec<AchievementView> {
  AchievementId::ALL
    .into_iter()
    .map(|a| AchievementView {
      id: a.as_str(),
      title: a.title(),
      description: a.description(),
      unlocked: unlocked.contains(&a),
    })
    .collect()
}
