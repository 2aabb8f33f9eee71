//! Typed persisted records over the storage port.
//!
//! Four independent records live in the store:
//! - `workout_history`: list of completed sessions
//! - `current_session`: the single active session (absent key ≡ none)
//! - `user_settings`: preferences
//! - `app_state`: informational resume snapshot (routine + cursor)
//!
//! Malformed records are logged and replaced with safe defaults; nothing
//! here propagates a fatal error.

use crate::store::StoragePort;
use crate::types::{AppState, Routine, UserSettings, WorkoutSession};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const KEY_WORKOUT_HISTORY: &str = "workout_history";
pub const KEY_CURRENT_SESSION: &str = "current_session";
pub const KEY_USER_SETTINGS: &str = "user_settings";
pub const KEY_APP_STATE: &str = "app_state";

/// Resume-state snapshot written after every change
///
/// Informational only; session logic never reads it back as authoritative.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub current_routine: Option<Routine>,
    pub current_exercise_index: usize,
}

fn load_record<T: DeserializeOwned>(store: &dyn StoragePort, key: &str) -> Option<T> {
    let raw = store.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Corrupt record {:?} ({}); using default", key, e);
            None
        }
    }
}

fn save_record<T: Serialize>(store: &mut dyn StoragePort, key: &str, value: &T) {
    match serde_json::to_string(value) {
        Ok(raw) => store.set(key, &raw),
        Err(e) => tracing::warn!("Failed to serialize record {:?}: {}", key, e),
    }
}

/// Load the full workout history, empty on missing/corrupt data
pub fn load_history(store: &dyn StoragePort) -> Vec<WorkoutSession> {
    load_record(store, KEY_WORKOUT_HISTORY).unwrap_or_default()
}

pub fn save_history(store: &mut dyn StoragePort, history: &[WorkoutSession]) {
    save_record(store, KEY_WORKOUT_HISTORY, &history);
}

/// Load the active session, if one is persisted
pub fn load_current_session(store: &dyn StoragePort) -> Option<WorkoutSession> {
    load_record(store, KEY_CURRENT_SESSION)
}

/// Persist or clear the active session; `None` removes the key
pub fn save_current_session(store: &mut dyn StoragePort, session: Option<&WorkoutSession>) {
    match session {
        Some(s) => save_record(store, KEY_CURRENT_SESSION, s),
        None => store.remove(KEY_CURRENT_SESSION),
    }
}

pub fn load_settings(store: &dyn StoragePort) -> UserSettings {
    load_record(store, KEY_USER_SETTINGS).unwrap_or_default()
}

pub fn save_settings(store: &mut dyn StoragePort, settings: &UserSettings) {
    save_record(store, KEY_USER_SETTINGS, settings);
}

pub fn load_snapshot(store: &dyn StoragePort) -> Snapshot {
    load_record(store, KEY_APP_STATE).unwrap_or_default()
}

pub fn save_snapshot(store: &mut dyn StoragePort, snapshot: &Snapshot) {
    save_record(store, KEY_APP_STATE, snapshot);
}

/// Delete a session from history by id (maintenance operation)
///
/// Returns true if a session was removed.
pub fn delete_session(store: &mut dyn StoragePort, session_id: Uuid) -> bool {
    let mut history = load_history(store);
    let before = history.len();
    history.retain(|s| s.id != session_id);
    if history.len() == before {
        return false;
    }
    save_history(store, &history);
    tracing::info!("Deleted session {} from history", session_id);
    true
}

impl AppState {
    /// Assemble the aggregate state from all four persisted records
    pub fn load(store: &dyn StoragePort) -> Self {
        let snapshot = load_snapshot(store);
        Self {
            current_routine: snapshot.current_routine,
            current_exercise_index: snapshot.current_exercise_index,
            current_session: load_current_session(store),
            workout_history: load_history(store),
            settings: load_settings(store),
        }
    }
}
