use std::{
    fmt,
    io::{Cursor, Write},
};

use chrono::Utc;
use gymlog_model::{Exercise, ExerciseRun, ExerciseStub, Routine, RoutineRun, RoutineStub};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

use crate::{StoreError, Stores};

// Entry names are a stable interface relied on by spreadsheet import;
// never rename them.
const ROUTINES_PREFIX: &str = "routines";
const EXERCISES_PREFIX: &str = "exercises";
const ROUTINE_STUBS_PREFIX: &str = "zroutines";
const ROUTINE_RUNS_PREFIX: &str = "zroutineruns";
const EXERCISE_STUBS_PREFIX: &str = "zexercises";
const EXERCISE_RUNS_PREFIX: &str = "zexerciseruns";

/// Serialization formats the export bundle can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExportFormat {
    #[default]
    Csv,
    Json,
}

impl ExportFormat {
    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_extension().to_uppercase())
    }
}

/// Every row the bundle will contain, fetched up front so a failed fetch
/// aborts before any bytes are written
#[derive(Debug, Clone, Default)]
pub struct ExportSets {
    pub routines: Vec<Routine>,
    pub exercises: Vec<Exercise>,
    pub routine_stubs: Vec<RoutineStub>,
    pub routine_runs: Vec<RoutineRun>,
    pub exercise_stubs: Vec<ExerciseStub>,
    pub exercise_runs: Vec<ExerciseRun>,
}

/// Routines and exercises come from the live store; run history and stubs
/// from the archive store. User-removed runs are excluded.
pub async fn fetch_export_sets(stores: &Stores) -> Result<ExportSets, StoreError> {
    let live = stores.live_conn().await?;
    let (routines, exercises) = live
        .interact(|conn| -> Result<_, rusqlite::Error> {
            Ok((Routine::fetch_all(conn)?, Exercise::fetch_all(conn)?))
        })
        .await??;

    let archive = stores.archive_conn().await?;
    let (routine_stubs, routine_runs, exercise_stubs, exercise_runs) = archive
        .interact(|conn| -> Result<_, rusqlite::Error> {
            Ok((
                RoutineStub::fetch_all(conn)?,
                RoutineRun::fetch_visible(conn)?,
                ExerciseStub::fetch_all(conn)?,
                ExerciseRun::fetch_visible(conn)?,
            ))
        })
        .await??;

    Ok(ExportSets {
        routines,
        exercises,
        routine_stubs,
        routine_runs,
        exercise_stubs,
        exercise_runs,
    })
}

fn serialize_rows<T: Serialize>(rows: &[T], format: ExportFormat) -> Result<Vec<u8>, StoreError> {
    match format {
        ExportFormat::Csv => {
            let mut writer = csv::Writer::from_writer(Vec::new());
            for row in rows {
                writer.serialize(row)?;
            }
            Ok(writer.into_inner().map_err(|e| e.into_error())?)
        }
        ExportFormat::Json => Ok(serde_json::to_vec_pretty(rows)?),
    }
}

/// Assemble the six per-type files into a single in-memory ZIP
pub fn write_bundle(sets: &ExportSets, format: ExportFormat) -> Result<Vec<u8>, StoreError> {
    let mut bundle = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let entries: [(&str, Vec<u8>); 6] = [
        (ROUTINES_PREFIX, serialize_rows(&sets.routines, format)?),
        (EXERCISES_PREFIX, serialize_rows(&sets.exercises, format)?),
        (ROUTINE_STUBS_PREFIX, serialize_rows(&sets.routine_stubs, format)?),
        (ROUTINE_RUNS_PREFIX, serialize_rows(&sets.routine_runs, format)?),
        (EXERCISE_STUBS_PREFIX, serialize_rows(&sets.exercise_stubs, format)?),
        (EXERCISE_RUNS_PREFIX, serialize_rows(&sets.exercise_runs, format)?),
    ];

    for (prefix, bytes) in entries {
        bundle.start_file(format!("{prefix}.{}", format.file_extension()), options)?;
        bundle.write_all(&bytes)?;
    }

    Ok(bundle.finish()?.into_inner())
}

/// Produce the export bundle for sharing/saving. One-shot; nothing is
/// persisted, so a failed export is simply re-triggered.
#[instrument(skip(stores))]
pub async fn create_export_bundle(
    stores: &Stores,
    format: ExportFormat,
) -> Result<Vec<u8>, StoreError> {
    let sets = fetch_export_sets(stores).await?;
    let bundle = write_bundle(&sets, format)?;
    info!(bytes = bundle.len(), "export bundle assembled");
    Ok(bundle)
}

/// Timestamp-suffixed default file name for a saved bundle
pub fn export_file_name() -> String {
    format!("gymlog-{}.zip", Utc::now().format("%Y%m%d%H%M%S"))
}
