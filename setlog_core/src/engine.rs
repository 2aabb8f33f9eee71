//! Workout engine: dispatch, persistence adapter and conflict protocol.
//!
//! [`WorkoutEngine`] is the single mutation surface over [`AppState`]. Every
//! action goes through the pure transition in [`crate::session`], then the
//! records whose values changed are flushed to the store *before* the new
//! state becomes observable.
//!
//! Only one session may be active at a time. Starting routine B while a
//! *running* session for routine A exists parks the intent as a pending
//! transition; an explicit confirm executes cancel → start → follow-up in
//! one synchronous step so no intermediate no-session state is observable.

use crate::progress::{self, SetCounts};
use crate::session::{apply, Action};
use crate::state as records;
use crate::stats::{compute_stats, WorkoutStats};
use crate::store::StoragePort;
use crate::types::{AppState, Exercise, SettingsPatch, WorkoutCatalog};
use chrono::{DateTime, Utc};

/// Short-lived conflict-resolution state for routine switching
#[derive(Clone, Debug, PartialEq)]
pub enum Pending {
    Idle,
    /// A start intent waiting on user confirmation; `follow_up` is the
    /// originally-intended action to replay after the switch.
    AwaitingConfirmation {
        routine_id: String,
        follow_up: Option<Action>,
    },
}

/// Result of a start request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A running session for another routine exists; the intent is parked
    /// until `confirm_pending` or `dismiss_pending`.
    NeedsConfirmation,
    /// Unknown routine id; state unchanged.
    Ignored,
}

/// Application state container wired to a storage port
pub struct WorkoutEngine<'c, S: StoragePort> {
    catalog: &'c WorkoutCatalog,
    store: S,
    state: AppState,
    pending: Pending,
}

impl<'c, S: StoragePort> WorkoutEngine<'c, S> {
    /// Build an engine over a store, restoring persisted state
    pub fn new(catalog: &'c WorkoutCatalog, store: S) -> Self {
        let state = AppState::load(&store);
        Self {
            catalog,
            store,
            state,
            pending: Pending::Idle,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn pending(&self) -> &Pending {
        &self.pending
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// Apply an action at a given instant, persisting changed records first
    pub fn dispatch_at(&mut self, action: Action, now: DateTime<Utc>) {
        let next = apply(&self.state, &action, self.catalog, now);
        self.persist_changes(&next);
        self.state = next;
    }

    /// Apply an action now
    pub fn dispatch(&mut self, action: Action) {
        self.dispatch_at(action, Utc::now());
    }

    fn persist_changes(&mut self, next: &AppState) {
        if next.current_session != self.state.current_session {
            records::save_current_session(&mut self.store, next.current_session.as_ref());
        }
        if next.workout_history != self.state.workout_history {
            records::save_history(&mut self.store, &next.workout_history);
        }
        if next.settings != self.state.settings {
            records::save_settings(&mut self.store, &next.settings);
        }
        if next.current_routine != self.state.current_routine
            || next.current_exercise_index != self.state.current_exercise_index
        {
            records::save_snapshot(
                &mut self.store,
                &records::Snapshot {
                    current_routine: next.current_routine.clone(),
                    current_exercise_index: next.current_exercise_index,
                },
            );
        }
    }

    // ------------------------------------------------------------------
    // Session lifecycle
    // ------------------------------------------------------------------

    /// Request a workout start, surfacing the switch-confirmation protocol
    ///
    /// `follow_up` is replayed after the session is created (used when the
    /// start was implied by another intent, e.g. completing a set).
    pub fn start_workout_at(
        &mut self,
        routine_id: &str,
        follow_up: Option<Action>,
        now: DateTime<Utc>,
    ) -> StartOutcome {
        if self.catalog.routine(routine_id).is_none() {
            tracing::warn!("Start requested for unknown routine {:?}", routine_id);
            return StartOutcome::Ignored;
        }

        if let Some(session) = &self.state.current_session {
            if session.routine_id != routine_id && session.started_at.is_some() {
                // A second start while one is pending replaces the intent
                self.pending = Pending::AwaitingConfirmation {
                    routine_id: routine_id.to_string(),
                    follow_up,
                };
                return StartOutcome::NeedsConfirmation;
            }
        }

        self.dispatch_at(
            Action::StartWorkout {
                routine_id: routine_id.to_string(),
            },
            now,
        );
        if let Some(action) = follow_up {
            self.dispatch_at(action, now);
        }
        StartOutcome::Started
    }

    pub fn start_workout(&mut self, routine_id: &str) -> StartOutcome {
        self.start_workout_at(routine_id, None, Utc::now())
    }

    /// Resolve a pending switch: cancel the running session, start the new
    /// one and replay the follow-up, all in one synchronous step
    ///
    /// Returns false if nothing was pending.
    pub fn confirm_pending_at(&mut self, now: DateTime<Utc>) -> bool {
        let Pending::AwaitingConfirmation {
            routine_id,
            follow_up,
        } = std::mem::replace(&mut self.pending, Pending::Idle)
        else {
            return false;
        };

        self.dispatch_at(Action::CancelWorkout, now);
        self.dispatch_at(Action::StartWorkout { routine_id }, now);
        if let Some(action) = follow_up {
            self.dispatch_at(action, now);
        }
        true
    }

    pub fn confirm_pending(&mut self) -> bool {
        self.confirm_pending_at(Utc::now())
    }

    /// Drop a pending switch intent, keeping the running session
    pub fn dismiss_pending(&mut self) -> bool {
        match std::mem::replace(&mut self.pending, Pending::Idle) {
            Pending::AwaitingConfirmation { .. } => true,
            Pending::Idle => false,
        }
    }

    pub fn begin_workout_timer(&mut self) {
        self.dispatch(Action::BeginWorkoutTimer);
    }

    pub fn complete_set(&mut self, exercise_id: &str, set_number: u32) {
        self.dispatch(Action::CompleteSet {
            exercise_id: exercise_id.to_string(),
            set_number,
        });
    }

    pub fn uncomplete_set(&mut self, exercise_id: &str, set_number: u32) {
        self.dispatch(Action::UncompleteSet {
            exercise_id: exercise_id.to_string(),
            set_number,
        });
    }

    pub fn complete_workout(&mut self) {
        self.dispatch(Action::CompleteWorkout);
    }

    pub fn cancel_workout(&mut self) {
        self.dispatch(Action::CancelWorkout);
    }

    pub fn next_exercise(&mut self) {
        self.dispatch(Action::NextExercise);
    }

    pub fn previous_exercise(&mut self) {
        self.dispatch(Action::PreviousExercise);
    }

    pub fn select_exercise(&mut self, index: usize) {
        self.dispatch(Action::SelectExercise { index });
    }

    pub fn update_settings(&mut self, patch: SettingsPatch) {
        self.dispatch(Action::UpdateSettings(patch));
    }

    /// Remove an archived session by id (maintenance operation)
    ///
    /// Returns true if a session was deleted.
    pub fn delete_session(&mut self, session_id: uuid::Uuid) -> bool {
        let mut next = self.state.clone();
        let before = next.workout_history.len();
        next.workout_history.retain(|s| s.id != session_id);
        if next.workout_history.len() == before {
            return false;
        }
        self.persist_changes(&next);
        self.state = next;
        true
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    /// Exercises of the selected routine in navigation order
    pub fn current_exercises(&self) -> Vec<&Exercise> {
        match &self.state.current_routine {
            Some(routine) => self.catalog.routine_exercises(routine),
            None => Vec::new(),
        }
    }

    /// The exercise under the navigation cursor
    pub fn current_exercise(&self) -> Option<&Exercise> {
        self.current_exercises()
            .get(self.state.current_exercise_index)
            .copied()
    }

    pub fn exercise_progress(&self, exercise: &Exercise) -> SetCounts {
        match &self.state.current_session {
            Some(session) => progress::exercise_progress(session, exercise),
            None => SetCounts {
                completed: 0,
                total: exercise.effective_sets(),
            },
        }
    }

    pub fn is_exercise_complete(&self, exercise: &Exercise) -> bool {
        match &self.state.current_session {
            Some(session) => progress::is_exercise_complete(session, exercise),
            None => false,
        }
    }

    /// Overall completion percentage of the active workout (0 without one)
    pub fn workout_progress(&self) -> f64 {
        match &self.state.current_session {
            Some(session) => progress::workout_progress(session, &self.current_exercises()),
            None => 0.0,
        }
    }

    /// Recompute statistics from the stored history
    pub fn stats(&self) -> WorkoutStats {
        compute_stats(&self.state.workout_history, Utc::now().date_naive())
    }
}
