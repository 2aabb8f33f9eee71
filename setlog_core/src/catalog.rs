//! Workout catalog: built-in routines plus optional JSON override.
//!
//! The catalog is immutable reference data loaded once at startup. Routines
//! group exercises by day number; exercise order within a routine is the
//! display/navigation order.

use crate::types::{Exercise, Routine, WorkoutCatalog};
use crate::Result;
use once_cell::sync::Lazy;
use std::path::Path;

/// Cached built-in catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<WorkoutCatalog> = Lazy::new(build_default_catalog);

/// Get a reference to the cached built-in catalog
pub fn get_default_catalog() -> &'static WorkoutCatalog {
    &DEFAULT_CATALOG
}

struct ExerciseSpec(&'static str, &'static str, u32, &'static str, &'static str);

/// Builds the built-in five-day catalog
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns
/// a cached reference. This function is retained for testing and custom
/// catalog creation.
pub fn build_default_catalog() -> WorkoutCatalog {
    let days: [(&str, &[ExerciseSpec]); 5] = [
        (
            "Day 1: Glutes & Legs",
            &[
                ExerciseSpec("hip_thrust", "Barbell Hip Thrust", 4, "10-12", "2min"),
                ExerciseSpec("goblet_squat", "Goblet Squat", 3, "12", "1min"),
                ExerciseSpec("walking_lunge", "Walking Lunge", 3, "12 each", "1min"),
                ExerciseSpec("glute_kickback", "Cable Glute Kickback", 3, "15", "45s"),
            ],
        ),
        (
            "Day 2: Back & Biceps",
            &[
                ExerciseSpec("lat_pulldown", "Lat Pulldown", 4, "10-12", "1min"),
                ExerciseSpec("seated_row", "Seated Cable Row", 3, "12", "1min"),
                ExerciseSpec("db_curl", "Dumbbell Curl", 3, "12", "45s"),
                ExerciseSpec("face_pull", "Face Pull", 3, "15", "45s"),
            ],
        ),
        (
            "Day 3: Legs & Glutes",
            &[
                ExerciseSpec("romanian_dl", "Romanian Deadlift", 4, "8-10", "2min"),
                ExerciseSpec("leg_press", "Leg Press", 3, "12", "90s"),
                ExerciseSpec("hip_abduction", "Hip Abduction Machine", 3, "15", "45s"),
                ExerciseSpec("calf_raise", "Standing Calf Raise", 3, "15", "45s"),
            ],
        ),
        (
            "Day 4: Chest & Triceps",
            &[
                ExerciseSpec("db_bench", "Dumbbell Bench Press", 4, "10", "90s"),
                ExerciseSpec("incline_press", "Incline Machine Press", 3, "12", "1min"),
                ExerciseSpec("tricep_pushdown", "Tricep Rope Pushdown", 3, "12-15", "45s"),
                ExerciseSpec("chest_fly", "Cable Chest Fly", 3, "15", "45s"),
            ],
        ),
        (
            "Day 5: Shoulders & Abs",
            &[
                ExerciseSpec("shoulder_press", "Seated Shoulder Press", 4, "10", "90s"),
                ExerciseSpec("lateral_raise", "Lateral Raise", 3, "15", "45s"),
                ExerciseSpec("cable_crunch", "Cable Crunch", 3, "15", "45s"),
                ExerciseSpec("plank", "Plank Hold", 0, "60s", ""),
            ],
        ),
    ];

    let mut routines = Vec::new();
    let mut exercises = Vec::new();

    for (i, (name, specs)) in days.iter().enumerate() {
        let day = (i + 1) as u32;
        let mut ids = Vec::new();
        for ExerciseSpec(id, ex_name, sets, reps, rest) in specs.iter() {
            ids.push(id.to_string());
            exercises.push(Exercise {
                id: id.to_string(),
                name: ex_name.to_string(),
                sets: *sets,
                reps: reps.to_string(),
                rest_time: rest.to_string(),
                video_url: String::new(),
                day,
            });
        }
        routines.push(Routine {
            id: format!("day{}", day),
            name: name.to_string(),
            day,
            exercises: ids,
        });
    }

    WorkoutCatalog {
        routines,
        exercises,
    }
}

impl WorkoutCatalog {
    /// Load a catalog from a `{"routines": [...], "exercises": [...]}` file
    pub fn load_json(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let catalog: WorkoutCatalog = serde_json::from_str(&contents)?;
        tracing::info!(
            "Loaded catalog from {:?} ({} routines, {} exercises)",
            path,
            catalog.routines.len(),
            catalog.exercises.len()
        );
        Ok(catalog)
    }

    /// Load the catalog from an optional user path, falling back to the
    /// built-in catalog on a missing or unreadable file
    pub fn load_or_default(path: Option<&Path>) -> WorkoutCatalog {
        match path {
            Some(p) => match Self::load_json(p) {
                Ok(catalog) => catalog,
                Err(e) => {
                    tracing::warn!("Failed to load catalog {:?}: {}. Using built-in.", p, e);
                    get_default_catalog().clone()
                }
            },
            None => get_default_catalog().clone(),
        }
    }

    /// Validate the catalog for consistency and completeness
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut seen_exercise_ids = std::collections::HashSet::new();
        for exercise in &self.exercises {
            if exercise.id.is_empty() {
                errors.push("Exercise has empty ID".to_string());
            }
            if exercise.name.is_empty() {
                errors.push(format!("Exercise '{}' has empty name", exercise.id));
            }
            if !seen_exercise_ids.insert(&exercise.id) {
                errors.push(format!("Duplicate exercise ID '{}'", exercise.id));
            }
        }

        let mut seen_routine_ids = std::collections::HashSet::new();
        for routine in &self.routines {
            if routine.id.is_empty() {
                errors.push("Routine has empty ID".to_string());
            }
            if routine.name.is_empty() {
                errors.push(format!("Routine '{}' has empty name", routine.id));
            }
            if !seen_routine_ids.insert(&routine.id) {
                errors.push(format!("Duplicate routine ID '{}'", routine.id));
            }
            if routine.exercises.is_empty() {
                errors.push(format!("Routine '{}' has no exercises", routine.id));
            }

            for exercise_id in &routine.exercises {
                match self.exercise(exercise_id) {
                    None => errors.push(format!(
                        "Routine '{}' references non-existent exercise '{}'",
                        routine.id, exercise_id
                    )),
                    Some(exercise) if exercise.day != routine.day => errors.push(format!(
                        "Routine '{}' (day {}) includes exercise '{}' from day {}",
                        routine.id, routine.day, exercise_id, exercise.day
                    )),
                    Some(_) => {}
                }
            }
        }

        errors
    }
}

/// Small fixed catalog for unit tests across the crate
#[cfg(test)]
pub fn test_catalog() -> WorkoutCatalog {
    let ex = |id: &str, sets: u32, day: u32| Exercise {
        id: id.into(),
        name: id.to_uppercase(),
        sets,
        reps: "10".into(),
        rest_time: "1min".into(),
        video_url: String::new(),
        day,
    };
    WorkoutCatalog {
        routines: vec![
            Routine {
                id: "day1".into(),
                name: "Day 1".into(),
                day: 1,
                exercises: vec!["squat".into(), "lunge".into(), "plank".into()],
            },
            Routine {
                id: "day2".into(),
                name: "Day 2".into(),
                day: 2,
                exercises: vec!["bench".into(), "row".into(), "curl".into()],
            },
            Routine {
                id: "day3".into(),
                name: "Day 3".into(),
                day: 3,
                exercises: vec!["stretch".into()],
            },
        ],
        exercises: vec![
            ex("squat", 3, 1),
            ex("lunge", 4, 1),
            ex("plank", 0, 1),
            ex("bench", 4, 2),
            ex("row", 4, 2),
            ex("curl", 4, 2),
            ex("stretch", 0, 3),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_catalog_shape() {
        let catalog = build_default_catalog();
        assert_eq!(catalog.routines.len(), 5);
        assert!(catalog.exercises.len() >= 20);
        for (i, routine) in catalog.routines.iter().enumerate() {
            assert_eq!(routine.day, (i + 1) as u32);
        }
    }

    #[test]
    fn test_default_catalog_validates() {
        let errors = build_default_catalog().validate();
        assert!(errors.is_empty(), "validation errors: {:?}", errors);
    }

    #[test]
    fn test_routine_exercises_preserve_order() {
        let catalog = build_default_catalog();
        let routine = catalog.routine("day1").unwrap();
        let resolved = catalog.routine_exercises(routine);
        let ids: Vec<_> = resolved.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, routine.exercises);
    }

    #[test]
    fn test_validate_flags_dangling_reference() {
        let mut catalog = test_catalog();
        catalog.routines[0].exercises.push("missing".into());
        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("missing")));
    }

    #[test]
    fn test_validate_flags_day_mismatch() {
        let mut catalog = test_catalog();
        // bench belongs to day 2
        catalog.routines[0].exercises.push("bench".into());
        let errors = catalog.validate();
        assert!(errors.iter().any(|e| e.contains("from day 2")));
    }

    #[test]
    fn test_load_json_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");
        let catalog = test_catalog();
        std::fs::write(&path, serde_json::to_string(&catalog).unwrap()).unwrap();

        let loaded = WorkoutCatalog::load_json(&path).unwrap();
        assert_eq!(loaded, catalog);
    }

    #[test]
    fn test_load_or_default_falls_back_on_garbage() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("catalog.json");
        std::fs::write(&path, "not json").unwrap();

        let loaded = WorkoutCatalog::load_or_default(Some(&path));
        assert_eq!(loaded.routines.len(), 5);
    }
}
