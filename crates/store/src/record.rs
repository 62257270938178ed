use exemplar::Model;
use gymlog_model::{
    Exercise, ExerciseRun, ExerciseStub, Routine, RoutineRun, RoutineStub, Timestamp,
    ValidationError,
};
use rusqlite::Connection;
use tracing::instrument;

use crate::StoreError;

/// Log a finished routine session into the live store. The routine's stub is
/// created (or its name refreshed) in the same transaction so the run stays
/// resolvable if the routine is later edited or deleted.
#[instrument(skip(conn, routine), fields(routine = %routine.name))]
pub fn log_routine_run(
    conn: &mut Connection,
    routine: &Routine,
    started_at: Timestamp,
    duration_secs: f64,
) -> Result<RoutineRun, StoreError> {
    if !duration_secs.is_finite() || duration_secs < 0.0 {
        return Err(ValidationError::new(format!(
            "Run duration must be >= 0 seconds, got {duration_secs}"
        ))
        .into());
    }

    let tx = conn.transaction()?;
    let run = {
        RoutineStub::get_or_create(&tx, &routine.archive_id, &routine.name)?;
        let run = RoutineRun::new(routine.archive_id, started_at, duration_secs);
        run.insert(&tx)?;
        Routine::set_last_started_at(&tx, &routine.id, started_at)?;
        run
    };
    tx.commit()?;

    Ok(run)
}

/// Log one exercise's completion within a run
#[instrument(skip(conn, exercise, run), fields(exercise = %exercise.name))]
pub fn log_exercise_run(
    conn: &mut Connection,
    exercise: &Exercise,
    run: &RoutineRun,
    completed_at: Timestamp,
    intensity: f64,
) -> Result<ExerciseRun, StoreError> {
    if completed_at < run.started_at {
        return Err(ValidationError::new(
            "Exercise completion predates the start of its run",
        )
        .into());
    }

    let tx = conn.transaction()?;
    let exercise_run = {
        ExerciseStub::get_or_create(
            &tx,
            &exercise.archive_id,
            &run.routine_archive_id,
            &exercise.name,
            exercise.units,
        )?;
        let exercise_run =
            ExerciseRun::new(run.id, exercise.archive_id, completed_at, intensity);
        exercise_run.insert(&tx)?;
        exercise_run
    };
    tx.commit()?;

    Ok(exercise_run)
}
