//! Statistics derived from the workout history.
//!
//! Everything here is a pure function of the history list; callers recompute
//! on demand whenever history changes. Only sessions with `completed = true`
//! count; cancelled sessions never reach the history in the first place.

use crate::types::WorkoutSession;
use chrono::{DateTime, NaiveDate, Utc};

/// Aggregate statistics over completed sessions
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorkoutStats {
    pub total_workouts: usize,
    pub total_duration_ms: i64,
    pub average_duration_ms: f64,
    /// Consecutive-calendar-day streak; zeroed when broken by inactivity.
    pub current_streak: u32,
    pub max_streak: u32,
    pub last_workout_date: Option<DateTime<Utc>>,
}

/// Derive statistics from the history, relative to `today`
///
/// Streak walk: completed sessions sorted by date descending; a whole-day
/// gap of exactly 1 extends the streak, more than 1 resets it, and repeats
/// on the same calendar day leave the counter untouched. A streak is
/// considered broken by inactivity when the most recent session is more
/// than one calendar day before `today` (`max_streak` is preserved).
pub fn compute_stats(history: &[WorkoutSession], today: NaiveDate) -> WorkoutStats {
    let mut completed: Vec<&WorkoutSession> = history.iter().filter(|s| s.completed).collect();
    completed.sort_by(|a, b| b.date.cmp(&a.date));

    let total_workouts = completed.len();
    let total_duration_ms: i64 = completed.iter().map(|s| s.duration_ms.unwrap_or(0)).sum();
    let average_duration_ms = if total_workouts > 0 {
        total_duration_ms as f64 / total_workouts as f64
    } else {
        0.0
    };

    let mut current_streak: u32 = 0;
    let mut max_streak: u32 = 0;
    let mut prev_day: Option<NaiveDate> = None;

    for session in &completed {
        let day = session.date.date_naive();
        match prev_day {
            None => {
                current_streak = 1;
                max_streak = 1;
            }
            Some(prev) => {
                let gap = (prev - day).num_days();
                if gap == 1 {
                    current_streak += 1;
                    max_streak = max_streak.max(current_streak);
                } else if gap > 1 {
                    current_streak = 1;
                }
                // gap == 0: same calendar day, counter unchanged
            }
        }
        prev_day = Some(day);
    }

    // Inactivity check against the most recent session
    if let Some(latest) = completed.first() {
        if (today - latest.date.date_naive()).num_days() > 1 {
            current_streak = 0;
        }
    }

    WorkoutStats {
        total_workouts,
        total_duration_ms,
        average_duration_ms,
        current_streak,
        max_streak,
        last_workout_date: completed.first().map(|s| s.date),
    }
}
