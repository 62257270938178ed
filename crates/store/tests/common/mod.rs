#![allow(dead_code)]

use gymlog_model::{Exercise, ExerciseRun, Routine, RoutineRun, Timestamp, Units};
use gymlog_store::{record, Settings, Stores};
use tempfile::TempDir;

pub fn open_test_stores() -> (TempDir, Stores) {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = Settings {
        live_connection_string: dir
            .path()
            .join("live.sqlite")
            .to_string_lossy()
            .into_owned(),
        archive_connection_string: dir
            .path()
            .join("archive.sqlite")
            .to_string_lossy()
            .into_owned(),
        transfer_threshold_secs: 3600,
        delete_source_after_transfer: false,
    };
    let stores = Stores::open(&settings).expect("open stores");
    (dir, stores)
}

pub struct Seeded {
    pub routine: Routine,
    pub exercises: Vec<Exercise>,
}

pub async fn seed_routine(stores: &Stores, name: &str, exercise_names: &[&str]) -> Seeded {
    let conn = stores.live_conn().await.expect("live conn");
    let name = name.to_owned();
    let exercise_names: Vec<String> = exercise_names.iter().map(|s| s.to_string()).collect();
    conn.interact(move |conn| -> Result<Seeded, rusqlite::Error> {
        let routine = Routine::create(conn, Routine::new(name, 0))?;
        let mut exercises = Vec::new();
        for (i, exercise_name) in exercise_names.into_iter().enumerate() {
            exercises.push(Exercise::create(
                conn,
                Exercise::new(&routine, exercise_name, i as i64, Units::Kilograms),
            )?);
        }
        Ok(Seeded { routine, exercises })
    })
    .await
    .expect("interact")
    .expect("seed routine")
}

/// Log a completed session into the live store. `completions` are
/// (exercise index, seconds after start, intensity) triples.
pub async fn log_run(
    stores: &Stores,
    seeded: &Seeded,
    started_at: Timestamp,
    duration_secs: f64,
    completions: &[(usize, i64, f64)],
) -> RoutineRun {
    let conn = stores.live_conn().await.expect("live conn");
    let routine = seeded.routine.clone();
    let exercises = seeded.exercises.clone();
    let completions = completions.to_vec();
    conn.interact(move |conn| -> Result<RoutineRun, gymlog_store::StoreError> {
        let run = record::log_routine_run(conn, &routine, started_at, duration_secs)?;
        for (index, offset_secs, intensity) in completions {
            record::log_exercise_run(
                conn,
                &exercises[index],
                &run,
                started_at.plus_secs(offset_secs),
                intensity,
            )?;
        }
        Ok(run)
    })
    .await
    .expect("interact")
    .expect("log run")
}

pub async fn live_counts(stores: &Stores) -> (i64, i64) {
    let conn = stores.live_conn().await.expect("live conn");
    conn.interact(|conn| -> Result<(i64, i64), rusqlite::Error> {
        Ok((RoutineRun::count(conn)?, ExerciseRun::count(conn)?))
    })
    .await
    .expect("interact")
    .expect("live counts")
}

pub async fn archive_counts(stores: &Stores) -> (i64, i64) {
    let conn = stores.archive_conn().await.expect("archive conn");
    conn.interact(|conn| -> Result<(i64, i64), rusqlite::Error> {
        Ok((RoutineRun::count(conn)?, ExerciseRun::count(conn)?))
    })
    .await
    .expect("interact")
    .expect("archive counts")
}
