use clap::{Parser, Subcommand};
use setlog_core::*;
use std::io::{self, Write};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "setlog")]
#[command(about = "Personal workout session tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// List available routines
    Routines,

    /// Start a workout for a routine
    Start {
        /// Routine id (e.g. day1)
        routine_id: String,

        /// Confirm switching away from a running workout without prompting
        #[arg(long)]
        yes: bool,
    },

    /// Begin the workout timer for the active session
    Begin,

    /// Mark a set as completed
    Set {
        exercise_id: String,
        /// 1-based set number
        set_number: u32,
    },

    /// Un-mark a completed set
    Unset {
        exercise_id: String,
        set_number: u32,
    },

    /// Show the active workout
    Status,

    /// Move the exercise cursor forward
    Next,

    /// Move the exercise cursor back
    Prev,

    /// Jump the exercise cursor to an index (clamped)
    Goto { index: usize },

    /// Finish the active workout and archive it
    Finish,

    /// Discard the active workout
    Cancel,

    /// Show totals, averages and streaks
    Stats,

    /// List archived sessions
    History {
        /// Delete a session from history by id
        #[arg(long)]
        delete: Option<uuid::Uuid>,
    },

    /// Show or change preferences
    Settings {
        /// Default rest timer in seconds
        #[arg(long)]
        rest: Option<u32>,

        /// Default exercise timer in seconds
        #[arg(long)]
        exercise: Option<u32>,

        /// Enable or disable sound (on/off)
        #[arg(long)]
        sound: Option<String>,

        /// Enable or disable vibration (on/off)
        #[arg(long)]
        vibration: Option<String>,
    },

    /// Export workout history to a CSV file
    Export { csv_path: PathBuf },

    /// Run a rest countdown
    Rest {
        /// Countdown length; defaults to the current exercise's rest time
        #[arg(long)]
        seconds: Option<u32>,
    },
}

fn main() -> Result<()> {
    setlog_core::logging::init();

    let cli = Cli::parse();

    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());

    let catalog = WorkoutCatalog::load_or_default(config.catalog.path.as_deref());
    let errors = catalog.validate();
    if !errors.is_empty() {
        eprintln!("Catalog validation errors:");
        for error in errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Catalog("Invalid catalog".into()));
    }

    let store = FileStore::open(&data_dir);
    let mut engine = WorkoutEngine::new(&catalog, store);

    match cli.command {
        Commands::Routines => cmd_routines(&catalog),
        Commands::Start { routine_id, yes } => cmd_start(&mut engine, &catalog, &routine_id, yes),
        Commands::Begin => {
            engine.begin_workout_timer();
            match &engine.state().current_session {
                Some(_) => println!("Workout timer running."),
                None => println!("No active workout."),
            }
            Ok(())
        }
        Commands::Set {
            exercise_id,
            set_number,
        } => cmd_set(&mut engine, &catalog, &exercise_id, set_number, true),
        Commands::Unset {
            exercise_id,
            set_number,
        } => cmd_set(&mut engine, &catalog, &exercise_id, set_number, false),
        Commands::Status => cmd_status(&engine, &catalog),
        Commands::Next => {
            engine.next_exercise();
            print_cursor(&engine);
            Ok(())
        }
        Commands::Prev => {
            engine.previous_exercise();
            print_cursor(&engine);
            Ok(())
        }
        Commands::Goto { index } => {
            engine.select_exercise(index);
            print_cursor(&engine);
            Ok(())
        }
        Commands::Finish => cmd_finish(&mut engine),
        Commands::Cancel => {
            if engine.state().current_session.is_none() {
                println!("No active workout.");
            } else {
                engine.cancel_workout();
                println!("Workout cancelled. Nothing was archived.");
            }
            Ok(())
        }
        Commands::Stats => cmd_stats(&engine),
        Commands::History { delete } => cmd_history(&mut engine, &catalog, delete),
        Commands::Settings {
            rest,
            exercise,
            sound,
            vibration,
        } => cmd_settings(&mut engine, rest, exercise, sound, vibration),
        Commands::Export { csv_path } => {
            let count = export_history(&engine.state().workout_history, &csv_path)?;
            println!("Exported {} sessions to {}", count, csv_path.display());
            Ok(())
        }
        Commands::Rest { seconds } => cmd_rest(&engine, seconds),
    }
}

fn cmd_routines(catalog: &WorkoutCatalog) -> Result<()> {
    for routine in &catalog.routines {
        println!("{}  {}", routine.id, routine.name);
        for exercise in catalog.routine_exercises(routine) {
            println!(
                "    {:<18} {} x {}  (rest {})",
                exercise.id,
                exercise.sets,
                exercise.reps,
                if exercise.rest_time.is_empty() {
                    "1min"
                } else {
                    &exercise.rest_time
                }
            );
        }
    }
    Ok(())
}

fn cmd_start(
    engine: &mut WorkoutEngine<'_, FileStore>,
    catalog: &WorkoutCatalog,
    routine_id: &str,
    yes: bool,
) -> Result<()> {
    match engine.start_workout(routine_id) {
        StartOutcome::Started => {
            let name = catalog
                .routine(routine_id)
                .map(|r| r.name.as_str())
                .unwrap_or(routine_id);
            println!("Workout ready: {}", name);
            println!("Run `setlog begin` to start the timer.");
            Ok(())
        }
        StartOutcome::NeedsConfirmation => {
            let running = engine
                .state()
                .current_session
                .as_ref()
                .map(|s| s.routine_id.clone())
                .unwrap_or_default();
            let confirmed = yes
                || prompt_yes_no(&format!(
                    "A workout for {} is running. Cancel it and start {}? [y/N] ",
                    running, routine_id
                ))?;
            if confirmed {
                engine.confirm_pending();
                println!("Switched to {}.", routine_id);
            } else {
                engine.dismiss_pending();
                println!("Keeping the running workout.");
            }
            Ok(())
        }
        StartOutcome::Ignored => {
            println!("Unknown routine: {}", routine_id);
            Ok(())
        }
    }
}

fn cmd_set(
    engine: &mut WorkoutEngine<'_, FileStore>,
    catalog: &WorkoutCatalog,
    exercise_id: &str,
    set_number: u32,
    complete: bool,
) -> Result<()> {
    if engine.state().current_session.is_none() {
        println!("No active workout. Start one with `setlog start <routine-id>`.");
        return Ok(());
    }
    if complete {
        engine.complete_set(exercise_id, set_number);
    } else {
        engine.uncomplete_set(exercise_id, set_number);
    }

    match catalog.exercise(exercise_id) {
        Some(exercise) => {
            let counts = engine.exercise_progress(exercise);
            println!(
                "{}: {}/{} sets  |  workout {:.0}%",
                exercise.name,
                counts.completed,
                counts.total,
                engine.workout_progress()
            );
        }
        None => println!("Unknown exercise: {}", exercise_id),
    }
    Ok(())
}

fn cmd_status(engine: &WorkoutEngine<'_, FileStore>, catalog: &WorkoutCatalog) -> Result<()> {
    let state = engine.state();
    let (Some(session), Some(routine)) = (&state.current_session, &state.current_routine) else {
        println!("No Active Workout");
        println!("Start a workout with `setlog start <routine-id>`.");
        return Ok(());
    };

    println!("{}", routine.name);
    match session.started_at {
        Some(started) => {
            let elapsed = (chrono::Utc::now() - started).num_seconds().max(0);
            println!("  elapsed: {}", fmt_mm_ss(elapsed));
        }
        None => println!("  ready to start (run `setlog begin`)"),
    }
    println!("  progress: {:.0}%", engine.workout_progress());
    println!();

    for (i, exercise) in catalog.routine_exercises(routine).iter().enumerate() {
        let counts = engine.exercise_progress(exercise);
        let cursor = if i == state.current_exercise_index {
            ">"
        } else {
            " "
        };
        let done = if engine.is_exercise_complete(exercise) {
            "✓"
        } else {
            " "
        };
        println!(
            "{} {} {:<24} {}/{} sets",
            cursor, done, exercise.name, counts.completed, counts.total
        );
    }
    Ok(())
}

fn cmd_finish(engine: &mut WorkoutEngine<'_, FileStore>) -> Result<()> {
    if engine.state().current_session.is_none() {
        println!("No active workout.");
        return Ok(());
    }
    engine.complete_workout();
    let seconds = engine
        .state()
        .workout_history
        .last()
        .and_then(|s| s.duration_ms)
        .unwrap_or(0)
        / 1000;
    println!("Workout complete! Duration: {}", fmt_mm_ss(seconds));
    Ok(())
}

fn cmd_stats(engine: &WorkoutEngine<'_, FileStore>) -> Result<()> {
    let stats = engine.stats();
    println!("Total workouts:   {}", stats.total_workouts);
    println!(
        "Total time:       {}",
        fmt_mm_ss(stats.total_duration_ms / 1000)
    );
    println!(
        "Average duration: {}",
        fmt_mm_ss((stats.average_duration_ms / 1000.0) as i64)
    );
    println!("Current streak:   {} days", stats.current_streak);
    println!("Best streak:      {} days", stats.max_streak);
    if let Some(last) = stats.last_workout_date {
        println!("Last workout:     {}", last.format("%Y-%m-%d"));
    }
    Ok(())
}

fn cmd_history(
    engine: &mut WorkoutEngine<'_, FileStore>,
    catalog: &WorkoutCatalog,
    delete: Option<uuid::Uuid>,
) -> Result<()> {
    if let Some(session_id) = delete {
        if engine.delete_session(session_id) {
            println!("Deleted session {}", session_id);
        } else {
            println!("No session with id {}", session_id);
        }
        return Ok(());
    }

    let history = &engine.state().workout_history;
    if history.is_empty() {
        println!("No workouts yet.");
        return Ok(());
    }
    for session in history {
        let routine_name = catalog
            .routine(&session.routine_id)
            .map(|r| r.name.as_str())
            .unwrap_or(session.routine_id.as_str());
        println!(
            "{}  {}  {}  {}",
            session.date.format("%Y-%m-%d"),
            session.id,
            routine_name,
            fmt_mm_ss(session.duration_ms.unwrap_or(0) / 1000)
        );
    }
    Ok(())
}

fn cmd_settings(
    engine: &mut WorkoutEngine<'_, FileStore>,
    rest: Option<u32>,
    exercise: Option<u32>,
    sound: Option<String>,
    vibration: Option<String>,
) -> Result<()> {
    let patch = SettingsPatch {
        default_rest_timer: rest,
        default_exercise_timer: exercise,
        sound_enabled: sound.as_deref().map(parse_on_off).transpose()?,
        vibration_enabled: vibration.as_deref().map(parse_on_off).transpose()?,
    };
    if patch != SettingsPatch::default() {
        engine.update_settings(patch);
    }

    let settings = &engine.state().settings;
    println!("rest timer:      {}s", settings.default_rest_timer);
    println!("exercise timer:  {}s", settings.default_exercise_timer);
    println!("sound:           {}", on_off(settings.sound_enabled));
    println!("vibration:       {}", on_off(settings.vibration_enabled));
    Ok(())
}

fn cmd_rest(engine: &WorkoutEngine<'_, FileStore>, seconds: Option<u32>) -> Result<()> {
    let seconds = seconds.unwrap_or_else(|| {
        engine
            .current_exercise()
            .map(|e| e.rest_seconds())
            .unwrap_or(engine.state().settings.default_rest_timer)
    });

    println!("Resting for {}...", fmt_mm_ss(seconds as i64));
    let (tx, rx) = std::sync::mpsc::channel();
    let handle = setlog_core::timer::countdown(
        seconds,
        |remaining| {
            print!("\r{}   ", fmt_mm_ss(remaining as i64));
            let _ = io::stdout().flush();
        },
        move || {
            let _ = tx.send(());
        },
    );
    let _ = rx.recv();
    drop(handle);
    println!("\rRest complete.        ");
    Ok(())
}

fn print_cursor(engine: &WorkoutEngine<'_, FileStore>) {
    match engine.current_exercise() {
        Some(exercise) => {
            let total = engine.current_exercises().len();
            println!(
                "Exercise {} of {}: {}",
                engine.state().current_exercise_index + 1,
                total,
                exercise.name
            );
        }
        None => println!("No routine selected."),
    }
}

fn fmt_mm_ss(seconds: i64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

fn on_off(value: bool) -> &'static str {
    if value {
        "on"
    } else {
        "off"
    }
}

fn parse_on_off(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(Error::Other(format!("Expected on/off, got {:?}", other))),
    }
}

fn prompt_yes_no(prompt: &str) -> Result<bool> {
    print!("{}", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}
