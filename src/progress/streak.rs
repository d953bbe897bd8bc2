use chrono::NaiveDate;
use serde::Serialize;

/// Consecutive-day practice streak
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streak {
  pub current: u32,
  pub longest: u32,
  pub last_active: Option<NaiveDate>,
}

impl Streak {
  /// Practised today already (vs. streak kept alive by yesterday)
  pub fn active_today(&self, today: NaiveDate) -> bool {
    self.last_active == Some(today)
  }
}

/// Compute the streak from activity dates.
///
/// The current run ends today, or yesterday when nothing has been done yet
/// today. Dates after `today` are ignored; duplicates collapse.
pub fn calculate_streak(dates: &[NaiveDate], today: NaiveDate) -> Streak {
  let mut days: Vec<NaiveDate> = dates.iter().copied().filter(|d| *d <= today).collect();
  days.sort_unstable();
  days.dedup();

  let Some(&last) = days.last() else {
    return Streak::default();
  };

  let mut longest = 0u32;
  let mut run = 0u32;
  let mut prev: Option<NaiveDate> = None;
  for &day in &days {
    run = match prev {
      Some(p) if p.succ_opt() == Some(day) => run + 1,
      _ => 1,
    };
    longest = longest.max(run);
    prev = Some(day);
  }

  // `run` now holds the length of the run ending at `last`
  let alive = last == today || last.succ_opt() == Some(today);
  Streak {
    current: if alive { run } else { 0 },
    longest,
    last_active: Some(last),
  }
}
