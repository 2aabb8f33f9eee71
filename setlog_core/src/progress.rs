//! Progress queries over the active session's set ledger.
//!
//! Pure functions; the session is the single source of truth and nothing
//! here mutates it.

use crate::types::{Exercise, WorkoutSession};

/// Completed/total set counts for one exercise
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SetCounts {
    pub completed: u32,
    pub total: u32,
}

/// Count completed sets for an exercise against its effective target
pub fn exercise_progress(session: &WorkoutSession, exercise: &Exercise) -> SetCounts {
    let completed = session
        .sets_progress
        .iter()
        .filter(|p| p.exercise_id == exercise.id && p.completed)
        .count() as u32;
    SetCounts {
        completed,
        total: exercise.effective_sets(),
    }
}

/// Whether every effective set of an exercise is complete
pub fn is_exercise_complete(session: &WorkoutSession, exercise: &Exercise) -> bool {
    let counts = exercise_progress(session, exercise);
    counts.completed >= counts.total
}

/// Overall workout completion percentage across the routine's exercises
///
/// Uses the raw target `sets` sums, so zero-set exercises contribute nothing
/// to the denominator. Returns 0.0 when the routine has no target sets.
pub fn workout_progress(session: &WorkoutSession, exercises: &[&Exercise]) -> f64 {
    let mut total_sets: u32 = 0;
    let mut completed_sets: u32 = 0;

    for exercise in exercises {
        total_sets += exercise.sets;
        completed_sets += session
            .sets_progress
            .iter()
            .filter(|p| p.exercise_id == exercise.id && p.completed)
            .count() as u32;
    }

    if total_sets == 0 {
        return 0.0;
    }
    (completed_sets as f64 / total_sets as f64) * 100.0
}
