//! Core domain types for the Setlog workout tracker.
//!
//! This module defines the fundamental types used throughout the system:
//! - Exercises and routines (immutable reference data)
//! - Workout sessions and their per-set progress ledger
//! - User settings
//! - The application state aggregate

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Reference Data Types
// ============================================================================

/// A single exercise definition (e.g., "Barbell Hip Thrust")
///
/// Reference data loaded once at startup; never mutated at runtime.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub name: String,
    /// Target set count. Zero means "untracked count" and is treated as a
    /// single effective set for progress purposes.
    pub sets: u32,
    /// Display string ("12-15", "AMRAP", ...), not parsed by the engine.
    pub reps: String,
    /// Display string ("1min", "45s"); empty falls back to "1min".
    #[serde(default)]
    pub rest_time: String,
    #[serde(default)]
    pub video_url: String,
    pub day: u32,
}

impl Exercise {
    /// The tracking count used for progress math: `max(sets, 1)`.
    pub fn effective_sets(&self) -> u32 {
        self.sets.max(1)
    }

    /// Parse the rest-time display string into seconds.
    ///
    /// "Nmin" → N*60 (1min if no digits), "Ns" → N (30 if no digits),
    /// anything else (including empty) → 60.
    pub fn rest_seconds(&self) -> u32 {
        let s = self.rest_time.trim();
        let digits: String = s.chars().filter(|c| c.is_ascii_digit()).collect();
        if s.contains("min") {
            digits.parse::<u32>().unwrap_or(1) * 60
        } else if s.contains('s') {
            digits.parse::<u32>().unwrap_or(30)
        } else {
            60
        }
    }
}

/// A named, ordered collection of exercises scheduled for a given day
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    pub id: String,
    pub name: String,
    pub day: u32,
    /// Exercise ids in display/navigation order.
    pub exercises: Vec<String>,
}

// ============================================================================
// Session Types
// ============================================================================

/// Completion record for one set of one exercise within a session
///
/// At most one entry exists per (exercise, set number) pair; re-completing a
/// set replaces the prior entry.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SetProgress {
    pub exercise_id: String,
    /// 1-based set number.
    pub set_number: u32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

/// One in-progress or completed attempt at a routine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutSession {
    pub id: Uuid,
    pub routine_id: String,
    /// Creation timestamp; streak math keys off this.
    pub date: DateTime<Utc>,
    /// Unset until the workout timer is explicitly begun.
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// Milliseconds; set only on completion.
    pub duration_ms: Option<i64>,
    pub completed: bool,
    pub sets_progress: Vec<SetProgress>,
}

impl WorkoutSession {
    /// Create a fresh session for a routine with an empty progress ledger
    pub fn new(routine_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            routine_id: routine_id.into(),
            date: now,
            started_at: None,
            completed_at: None,
            duration_ms: None,
            completed: false,
            sets_progress: Vec::new(),
        }
    }

    /// Look up the progress entry for a (exercise, set number) pair
    pub fn set_entry(&self, exercise_id: &str, set_number: u32) -> Option<&SetProgress> {
        self.sets_progress
            .iter()
            .find(|p| p.exercise_id == exercise_id && p.set_number == set_number)
    }
}

// ============================================================================
// Settings Types
// ============================================================================

/// User preferences, mutated via partial merge
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// Rest countdown default, in seconds.
    pub default_rest_timer: u32,
    /// Per-exercise countdown default, in seconds.
    pub default_exercise_timer: u32,
    pub sound_enabled: bool,
    pub vibration_enabled: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            default_rest_timer: 60,
            default_exercise_timer: 30,
            sound_enabled: true,
            vibration_enabled: true,
        }
    }
}

/// Partial update for [`UserSettings`]; `None` fields are left unchanged
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    pub default_rest_timer: Option<u32>,
    pub default_exercise_timer: Option<u32>,
    pub sound_enabled: Option<bool>,
    pub vibration_enabled: Option<bool>,
}

impl UserSettings {
    /// Merge a partial update into the current settings
    pub fn merge(&mut self, patch: &SettingsPatch) {
        if let Some(v) = patch.default_rest_timer {
            self.default_rest_timer = v;
        }
        if let Some(v) = patch.default_exercise_timer {
            self.default_exercise_timer = v;
        }
        if let Some(v) = patch.sound_enabled {
            self.sound_enabled = v;
        }
        if let Some(v) = patch.vibration_enabled {
            self.vibration_enabled = v;
        }
    }
}

// ============================================================================
// Catalog Type
// ============================================================================

/// The complete catalog of routines and exercises
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutCatalog {
    pub routines: Vec<Routine>,
    pub exercises: Vec<Exercise>,
}

impl WorkoutCatalog {
    pub fn routine(&self, id: &str) -> Option<&Routine> {
        self.routines.iter().find(|r| r.id == id)
    }

    pub fn exercise(&self, id: &str) -> Option<&Exercise> {
        self.exercises.iter().find(|e| e.id == id)
    }

    /// Resolve a routine's exercise ids in routine order, skipping unknowns
    pub fn routine_exercises(&self, routine: &Routine) -> Vec<&Exercise> {
        routine
            .exercises
            .iter()
            .filter_map(|id| self.exercise(id))
            .collect()
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Aggregate state composing the catalog cursor, active session, history
/// and settings
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    /// Denormalized copy of the selected routine, if any.
    pub current_routine: Option<Routine>,
    /// Cursor into the active routine's exercise list; clamped on navigation.
    pub current_exercise_index: usize,
    /// Non-null iff a workout is in progress; `completed` is always false
    /// here (a completed session moves to history).
    pub current_session: Option<WorkoutSession>,
    /// Append-only list of completed sessions; cancellations never land here.
    pub workout_history: Vec<WorkoutSession>,
    pub settings: UserSettings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exercise_with_rest(rest: &str) -> Exercise {
        Exercise {
            id: "e1".into(),
            name: "Test".into(),
            sets: 3,
            reps: "10".into(),
            rest_time: rest.into(),
            video_url: String::new(),
            day: 1,
        }
    }

    #[test]
    fn test_effective_sets_minimum_one() {
        let mut ex = exercise_with_rest("1min");
        ex.sets = 0;
        assert_eq!(ex.effective_sets(), 1);
        ex.sets = 4;
        assert_eq!(ex.effective_sets(), 4);
    }

    #[test]
    fn test_rest_seconds_parsing() {
        assert_eq!(exercise_with_rest("1min").rest_seconds(), 60);
        assert_eq!(exercise_with_rest("2min").rest_seconds(), 120);
        assert_eq!(exercise_with_rest("45s").rest_seconds(), 45);
        assert_eq!(exercise_with_rest("min").rest_seconds(), 60);
        assert_eq!(exercise_with_rest("s").rest_seconds(), 30);
        assert_eq!(exercise_with_rest("").rest_seconds(), 60);
        assert_eq!(exercise_with_rest("whenever").rest_seconds(), 60);
    }

    #[test]
    fn test_settings_merge_partial() {
        let mut settings = UserSettings::default();
        settings.merge(&SettingsPatch {
            default_rest_timer: Some(90),
            sound_enabled: Some(false),
            ..Default::default()
        });
        assert_eq!(settings.default_rest_timer, 90);
        assert!(!settings.sound_enabled);
        // Untouched fields keep their defaults
        assert_eq!(settings.default_exercise_timer, 30);
        assert!(settings.vibration_enabled);
    }

    #[test]
    fn test_session_serde_uses_camel_case() {
        let session = WorkoutSession::new("r1", Utc::now());
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"routineId\""));
        assert!(json.contains("\"setsProgress\""));
        assert!(json.contains("\"startedAt\""));
    }

    #[test]
    fn test_set_entry_lookup() {
        let mut session = WorkoutSession::new("r1", Utc::now());
        session.sets_progress.push(SetProgress {
            exercise_id: "e1".into(),
            set_number: 2,
            completed: true,
            completed_at: Some(Utc::now()),
        });
        assert!(session.set_entry("e1", 2).is_some());
        assert!(session.set_entry("e1", 1).is_none());
        assert!(session.set_entry("e2", 2).is_none());
    }
}
