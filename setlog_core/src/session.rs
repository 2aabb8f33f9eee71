//! Pure state transitions for the workout session state machine.
//!
//! Session lifecycle: no session → created (timer unset) → running
//! (`started_at` set) → completed (moved to history) or cancelled
//! (discarded). [`apply`] is a pure `(AppState, Action) -> AppState`
//! function; persistence lives in the engine adapter.
//!
//! Failure semantics: operations against a missing session or an unknown
//! routine/exercise id leave the state unchanged. Nothing here is fatal.

use crate::types::{AppState, SetProgress, SettingsPatch, WorkoutCatalog, WorkoutSession};
use chrono::{DateTime, Utc};

/// A user intent dispatched against the application state
#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    StartWorkout { routine_id: String },
    BeginWorkoutTimer,
    CompleteSet { exercise_id: String, set_number: u32 },
    UncompleteSet { exercise_id: String, set_number: u32 },
    CompleteWorkout,
    CancelWorkout,
    NextExercise,
    PreviousExercise,
    SelectExercise { index: usize },
    UpdateSettings(SettingsPatch),
}

/// Compute the next state for an action
///
/// Deterministic given `now`; the catalog is consulted only for id
/// resolution. Invalid actions return the input state unchanged.
pub fn apply(
    state: &AppState,
    action: &Action,
    catalog: &WorkoutCatalog,
    now: DateTime<Utc>,
) -> AppState {
    match action {
        Action::StartWorkout { routine_id } => start_workout(state, routine_id, catalog, now),

        Action::BeginWorkoutTimer => {
            let Some(session) = &state.current_session else {
                return state.clone();
            };
            if session.started_at.is_some() {
                // Timer already running; starting again never resets it
                return state.clone();
            }
            let mut next = state.clone();
            if let Some(s) = &mut next.current_session {
                s.started_at = Some(now);
            }
            next
        }

        Action::CompleteSet {
            exercise_id,
            set_number,
        } => {
            if state.current_session.is_none() {
                return state.clone();
            }
            if catalog.exercise(exercise_id).is_none() {
                tracing::warn!("Ignoring set completion for unknown exercise {:?}", exercise_id);
                return state.clone();
            }
            let mut next = state.clone();
            if let Some(session) = &mut next.current_session {
                // Upsert: at most one entry per (exercise, set) pair
                session
                    .sets_progress
                    .retain(|p| !(p.exercise_id == *exercise_id && p.set_number == *set_number));
                session.sets_progress.push(SetProgress {
                    exercise_id: exercise_id.clone(),
                    set_number: *set_number,
                    completed: true,
                    completed_at: Some(now),
                });
            }
            next
        }

        Action::UncompleteSet {
            exercise_id,
            set_number,
        } => {
            if state.current_session.is_none() {
                return state.clone();
            }
            let mut next = state.clone();
            if let Some(session) = &mut next.current_session {
                session
                    .sets_progress
                    .retain(|p| !(p.exercise_id == *exercise_id && p.set_number == *set_number));
            }
            next
        }

        Action::CompleteWorkout => {
            let Some(session) = &state.current_session else {
                return state.clone();
            };
            let mut finished = session.clone();
            finished.completed = true;
            finished.completed_at = Some(now);
            // An unstarted session finishes with zero duration
            let started = finished.started_at.unwrap_or(now);
            finished.duration_ms = Some((now - started).num_milliseconds().max(0));

            let mut next = state.clone();
            next.workout_history.push(finished);
            next.current_session = None;
            next.current_routine = None;
            next.current_exercise_index = 0;
            next
        }

        Action::CancelWorkout => {
            if state.current_session.is_none() {
                return state.clone();
            }
            let mut next = state.clone();
            next.current_session = None;
            next.current_routine = None;
            next.current_exercise_index = 0;
            next
        }

        Action::NextExercise => {
            let Some(routine) = &state.current_routine else {
                return state.clone();
            };
            let mut next = state.clone();
            next.current_exercise_index = state
                .current_exercise_index
                .saturating_add(1)
                .min(routine.exercises.len().saturating_sub(1));
            next
        }

        Action::PreviousExercise => {
            if state.current_routine.is_none() {
                return state.clone();
            }
            let mut next = state.clone();
            next.current_exercise_index = state.current_exercise_index.saturating_sub(1);
            next
        }

        Action::SelectExercise { index } => {
            let Some(routine) = &state.current_routine else {
                return state.clone();
            };
            let mut next = state.clone();
            // Caller-provided index is clamped rather than trusted
            next.current_exercise_index = (*index).min(routine.exercises.len().saturating_sub(1));
            next
        }

        Action::UpdateSettings(patch) => {
            let mut next = state.clone();
            next.settings.merge(patch);
            next
        }
    }
}

fn start_workout(
    state: &AppState,
    routine_id: &str,
    catalog: &WorkoutCatalog,
    now: DateTime<Utc>,
) -> AppState {
    let Some(routine) = catalog.routine(routine_id) else {
        tracing::warn!("Ignoring start for unknown routine {:?}", routine_id);
        return state.clone();
    };

    if let Some(session) = &state.current_session {
        if session.routine_id == routine_id && session.started_at.is_none() {
            // Starting the same routine twice before running keeps the
            // existing session identity
            let mut next = state.clone();
            next.current_routine = Some(routine.clone());
            next.current_exercise_index = 0;
            return next;
        }
        if session.routine_id != routine_id && session.started_at.is_some() {
            // A running session for another routine is never auto-cancelled;
            // the caller must resolve the conflict first
            tracing::warn!(
                "Refusing to replace running session for routine {:?}",
                session.routine_id
            );
            return state.clone();
        }
    }

    let mut next = state.clone();
    next.current_routine = Some(routine.clone());
    next.current_exercise_index = 0;
    next.current_session = Some(WorkoutSession::new(routine_id, now));
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::test_catalog;
    use chrono::Duration;

    fn started_state(catalog: &WorkoutCatalog, now: DateTime<Utc>) -> AppState {
        let state = apply(
            &AppState::default(),
            &Action::StartWorkout {
                routine_id: "day1".into(),
            },
            catalog,
            now,
        );
        apply(&state, &Action::BeginWorkoutTimer, catalog, now)
    }

    #[test]
    fn test_start_unknown_routine_is_noop() {
        let catalog = test_catalog();
        let state = AppState::default();
        let next = apply(
            &state,
            &Action::StartWorkout {
                routine_id: "nope".into(),
            },
            &catalog,
            Utc::now(),
        );
        assert_eq!(next, state);
    }

    #[test]
    fn test_start_creates_unstarted_session() {
        let catalog = test_catalog();
        let now = Utc::now();
        let next = apply(
            &AppState::default(),
            &Action::StartWorkout {
                routine_id: "day1".into(),
            },
            &catalog,
            now,
        );
        let session = next.current_session.expect("session created");
        assert_eq!(session.routine_id, "day1");
        assert!(session.started_at.is_none());
        assert!(!session.completed);
        assert!(session.sets_progress.is_empty());
        assert_eq!(next.current_exercise_index, 0);
        assert_eq!(next.current_routine.unwrap().id, "day1");
    }

    #[test]
    fn test_restart_before_running_keeps_session_identity() {
        let catalog = test_catalog();
        let now = Utc::now();
        let first = apply(
            &AppState::default(),
            &Action::StartWorkout {
                routine_id: "day1".into(),
            },
            &catalog,
            now,
        );
        let id = first.current_session.as_ref().unwrap().id;

        let second = apply(
            &first,
            &Action::StartWorkout {
                routine_id: "day1".into(),
            },
            &catalog,
            now + Duration::seconds(5),
        );
        assert_eq!(second.current_session.as_ref().unwrap().id, id);
        assert!(second.workout_history.is_empty());
    }

    #[test]
    fn test_start_never_replaces_running_session_of_other_routine() {
        let catalog = test_catalog();
        let now = Utc::now();
        let running = started_state(&catalog, now);
        let id = running.current_session.as_ref().unwrap().id;

        let next = apply(
            &running,
            &Action::StartWorkout {
                routine_id: "day2".into(),
            },
            &catalog,
            now,
        );
        assert_eq!(next.current_session.as_ref().unwrap().id, id);
        assert_eq!(next.current_routine.as_ref().unwrap().id, "day1");
    }

    #[test]
    fn test_start_replaces_unstarted_session_of_other_routine() {
        let catalog = test_catalog();
        let now = Utc::now();
        let created = apply(
            &AppState::default(),
            &Action::StartWorkout {
                routine_id: "day1".into(),
            },
            &catalog,
            now,
        );

        let next = apply(
            &created,
            &Action::StartWorkout {
                routine_id: "day2".into(),
            },
            &catalog,
            now,
        );
        let session = next.current_session.unwrap();
        assert_eq!(session.routine_id, "day2");
        assert!(next.workout_history.is_empty());
    }

    #[test]
    fn test_begin_timer_is_idempotent() {
        let catalog = test_catalog();
        let now = Utc::now();
        let state = started_state(&catalog, now);
        let first_start = state.current_session.as_ref().unwrap().started_at;
        assert_eq!(first_start, Some(now));

        let later = apply(
            &state,
            &Action::BeginWorkoutTimer,
            &catalog,
            now + Duration::minutes(3),
        );
        assert_eq!(later.current_session.unwrap().started_at, first_start);
    }

    #[test]
    fn test_complete_set_upserts_without_duplicates() {
        let catalog = test_catalog();
        let now = Utc::now();
        let state = started_state(&catalog, now);
        let action = Action::CompleteSet {
            exercise_id: "squat".into(),
            set_number: 2,
        };

        let once = apply(&state, &action, &catalog, now);
        let twice = apply(&once, &action, &catalog, now + Duration::seconds(30));

        let session = twice.current_session.unwrap();
        assert_eq!(session.sets_progress.len(), 1);
        let entry = session.set_entry("squat", 2).unwrap();
        assert!(entry.completed);
        assert_eq!(entry.completed_at, Some(now + Duration::seconds(30)));
    }

    #[test]
    fn test_complete_set_unknown_exercise_is_noop() {
        let catalog = test_catalog();
        let now = Utc::now();
        let state = started_state(&catalog, now);
        let next = apply(
            &state,
            &Action::CompleteSet {
                exercise_id: "ghost".into(),
                set_number: 1,
            },
            &catalog,
            now,
        );
        assert_eq!(next, state);
    }

    #[test]
    fn test_uncomplete_is_exact_inverse_of_complete() {
        let catalog = test_catalog();
        let now = Utc::now();
        let state = started_state(&catalog, now);

        let completed = apply(
            &state,
            &Action::CompleteSet {
                exercise_id: "squat".into(),
                set_number: 1,
            },
            &catalog,
            now,
        );
        let reverted = apply(
            &completed,
            &Action::UncompleteSet {
                exercise_id: "squat".into(),
                set_number: 1,
            },
            &catalog,
            now,
        );
        assert_eq!(
            reverted.current_session.as_ref().unwrap().sets_progress,
            state.current_session.as_ref().unwrap().sets_progress
        );
    }

    #[test]
    fn test_order_independent_completion() {
        let catalog = test_catalog();
        let now = Utc::now();
        let state = started_state(&catalog, now);

        let mut forward = state.clone();
        for n in 1..=3 {
            forward = apply(
                &forward,
                &Action::CompleteSet {
                    exercise_id: "squat".into(),
                    set_number: n,
                },
                &catalog,
                now,
            );
        }
        let mut backward = state;
        for n in [3, 1, 2] {
            backward = apply(
                &backward,
                &Action::CompleteSet {
                    exercise_id: "squat".into(),
                    set_number: n,
                },
                &catalog,
                now,
            );
        }

        let count = |s: &AppState| {
            s.current_session
                .as_ref()
                .unwrap()
                .sets_progress
                .iter()
                .filter(|p| p.completed)
                .count()
        };
        assert_eq!(count(&forward), 3);
        assert_eq!(count(&backward), 3);
    }

    #[test]
    fn test_complete_workout_moves_session_to_history() {
        let catalog = test_catalog();
        let now = Utc::now();
        let state = started_state(&catalog, now);
        let finish_at = now + Duration::minutes(42);

        let next = apply(&state, &Action::CompleteWorkout, &catalog, finish_at);
        assert!(next.current_session.is_none());
        assert!(next.current_routine.is_none());
        assert_eq!(next.current_exercise_index, 0);
        assert_eq!(next.workout_history.len(), 1);

        let archived = &next.workout_history[0];
        assert!(archived.completed);
        assert_eq!(archived.completed_at, Some(finish_at));
        assert_eq!(
            archived.duration_ms,
            Some(Duration::minutes(42).num_milliseconds())
        );
    }

    #[test]
    fn test_complete_unstarted_workout_has_zero_duration() {
        let catalog = test_catalog();
        let now = Utc::now();
        let created = apply(
            &AppState::default(),
            &Action::StartWorkout {
                routine_id: "day1".into(),
            },
            &catalog,
            now,
        );
        let next = apply(&created, &Action::CompleteWorkout, &catalog, now);
        assert_eq!(next.workout_history[0].duration_ms, Some(0));
    }

    #[test]
    fn test_cancel_discards_session() {
        let catalog = test_catalog();
        let now = Utc::now();
        let state = started_state(&catalog, now);

        let next = apply(&state, &Action::CancelWorkout, &catalog, now);
        assert!(next.current_session.is_none());
        assert!(next.current_routine.is_none());
        assert!(next.workout_history.is_empty());
    }

    #[test]
    fn test_lifecycle_actions_without_session_are_noops() {
        let catalog = test_catalog();
        let state = AppState::default();
        let now = Utc::now();
        for action in [
            Action::BeginWorkoutTimer,
            Action::CompleteSet {
                exercise_id: "squat".into(),
                set_number: 1,
            },
            Action::UncompleteSet {
                exercise_id: "squat".into(),
                set_number: 1,
            },
            Action::CompleteWorkout,
            Action::CancelWorkout,
        ] {
            assert_eq!(apply(&state, &action, &catalog, now), state);
        }
    }

    #[test]
    fn test_navigation_clamps_at_both_ends() {
        let catalog = test_catalog();
        let now = Utc::now();
        let state = started_state(&catalog, now);
        let len = state.current_routine.as_ref().unwrap().exercises.len();

        let back = apply(&state, &Action::PreviousExercise, &catalog, now);
        assert_eq!(back.current_exercise_index, 0);

        let mut fwd = state;
        for _ in 0..(len + 3) {
            fwd = apply(&fwd, &Action::NextExercise, &catalog, now);
        }
        assert_eq!(fwd.current_exercise_index, len - 1);
    }

    #[test]
    fn test_select_exercise_clamps_out_of_range() {
        let catalog = test_catalog();
        let now = Utc::now();
        let state = started_state(&catalog, now);
        let len = state.current_routine.as_ref().unwrap().exercises.len();

        let high = apply(
            &state,
            &Action::SelectExercise { index: 999 },
            &catalog,
            now,
        );
        assert_eq!(high.current_exercise_index, len - 1);

        let exact = apply(&state, &Action::SelectExercise { index: 1 }, &catalog, now);
        assert_eq!(exact.current_exercise_index, 1);
    }

    #[test]
    fn test_update_settings_merges() {
        let catalog = test_catalog();
        let next = apply(
            &AppState::default(),
            &Action::UpdateSettings(SettingsPatch {
                default_rest_timer: Some(120),
                ..Default::default()
            }),
            &catalog,
            Utc::now(),
        );
        assert_eq!(next.settings.default_rest_timer, 120);
        assert_eq!(next.settings.default_exercise_timer, 30);
    }
}
