use std::{collections::HashMap, sync::Arc};

use exemplar::Model;
use gymlog_model::{ExerciseRun, ExerciseStub, RoutineRun, RoutineStub, Timestamp, Uuid};
use rusqlite::Connection;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{Settings, StoreError, Stores};

#[derive(Debug, Clone)]
pub struct TransferOptions {
    /// Minimum age, in seconds since started_at, before a run is archived.
    /// Keeps a session that is still in progress out of the archive.
    pub threshold_secs: u64,
    /// Remove run rows from the live store once the archive commit succeeds
    pub delete_source_after_transfer: bool,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self {
            threshold_secs: 86_400,
            delete_source_after_transfer: false,
        }
    }
}

impl From<&Settings> for TransferOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            threshold_secs: settings.transfer_threshold_secs,
            delete_source_after_transfer: settings.delete_source_after_transfer,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferOutcome {
    /// Another transfer was in flight and this invocation did nothing
    pub skipped: bool,
    /// Runs newly copied into the archive store
    pub routine_runs: usize,
    /// Exercise completions newly copied into the archive store
    pub exercise_runs: usize,
    /// Eligible runs already present in the archive, left untouched
    pub already_archived: usize,
    pub source_rows_deleted: usize,
}

impl TransferOutcome {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Default::default()
        }
    }
}

/// Rows snapshotted from the live store for one transfer batch
#[derive(Debug, Clone, Default)]
struct TransferBatch {
    routine_stubs: Vec<RoutineStub>,
    runs: Vec<RoutineRun>,
    exercise_stubs: Vec<ExerciseStub>,
    exercise_runs: Vec<ExerciseRun>,
}

impl TransferBatch {
    fn collect(conn: &Connection, cutoff: Timestamp) -> Result<Self, rusqlite::Error> {
        let mut batch = Self::default();

        for run in RoutineRun::fetch_eligible(conn, cutoff)? {
            let Some(stub) = RoutineStub::fetch_by_archive_id(conn, &run.routine_archive_id)?
            else {
                // A run without its stub can't be displayed from the archive;
                // leave it in the live store rather than orphan it.
                warn!(
                    routine_archive_id = %run.routine_archive_id,
                    "no routine stub for eligible run, leaving in live store"
                );
                continue;
            };
            if !batch
                .routine_stubs
                .iter()
                .any(|s| s.routine_archive_id == stub.routine_archive_id)
            {
                batch.routine_stubs.push(stub);
            }

            // Children move with their run, user-removed flag and all, so
            // the flag state survives a delete-source transfer
            for child in ExerciseRun::fetch_all_for_run(conn, &run.id)? {
                match ExerciseStub::fetch_by_archive_id(conn, &child.exercise_archive_id)? {
                    Some(stub) => {
                        if !batch
                            .exercise_stubs
                            .iter()
                            .any(|s| s.exercise_archive_id == stub.exercise_archive_id)
                        {
                            batch.exercise_stubs.push(stub);
                        }
                        batch.exercise_runs.push(child);
                    }
                    None => warn!(
                        exercise_archive_id = %child.exercise_archive_id,
                        "no exercise stub for completion, leaving in live store"
                    ),
                }
            }
            batch.runs.push(run);
        }

        Ok(batch)
    }

    fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Copy the batch into the archive store in one transaction. Runs already
/// present under their (archive id, timestamp) key are left untouched, so
/// re-driving the same batch never duplicates rows.
fn apply_batch(
    conn: &mut Connection,
    batch: TransferBatch,
) -> Result<TransferOutcome, rusqlite::Error> {
    let tx = conn.transaction()?;
    let mut outcome = TransferOutcome::default();

    for stub in &batch.routine_stubs {
        RoutineStub::get_or_create(&tx, &stub.routine_archive_id, &stub.name)?;
    }

    // Live run id -> archive run id, for re-parenting exercise runs
    let mut archive_run_ids: HashMap<Uuid, Uuid> = HashMap::new();
    for run in &batch.runs {
        match RoutineRun::fetch_by_key(&tx, &run.routine_archive_id, run.started_at)? {
            Some(existing) => {
                archive_run_ids.insert(run.id, existing.id);
                outcome.already_archived += 1;
            }
            None => {
                run.insert(&tx)?;
                archive_run_ids.insert(run.id, run.id);
                outcome.routine_runs += 1;
            }
        }
    }

    for stub in &batch.exercise_stubs {
        ExerciseStub::get_or_create(
            &tx,
            &stub.exercise_archive_id,
            &stub.routine_archive_id,
            &stub.name,
            stub.units,
        )?;
    }

    for child in &batch.exercise_runs {
        let Some(parent_id) = archive_run_ids.get(&child.routine_run_id) else {
            continue;
        };
        if ExerciseRun::fetch_by_key(&tx, &child.exercise_archive_id, child.completed_at)?
            .is_none()
        {
            let mut row = child.clone();
            row.routine_run_id = *parent_id;
            row.insert(&tx)?;
            outcome.exercise_runs += 1;
        }
    }

    tx.commit()?;
    Ok(outcome)
}

/// Move every eligible run record from the live store into the archive
/// store. Safe to re-drive at any time; a failed batch leaves no partial
/// rows behind the archive commit and the next invocation picks the same
/// records up again.
#[instrument(skip(stores, options))]
pub async fn transfer_to_archive(
    stores: &Stores,
    options: &TransferOptions,
) -> Result<TransferOutcome, StoreError> {
    let cutoff = Timestamp::now().minus_secs(options.threshold_secs as i64);

    let live = stores.live_conn().await?;
    let batch = live
        .interact(move |conn| TransferBatch::collect(conn, cutoff))
        .await??;
    if batch.is_empty() {
        debug!("no run records eligible for archival");
        return Ok(TransferOutcome::default());
    }

    let archive = stores.archive_conn().await?;
    let to_apply = batch.clone();
    let mut outcome = archive.interact(move |conn| apply_batch(conn, to_apply)).await??;

    if options.delete_source_after_transfer {
        let run_ids: Vec<Uuid> = batch.runs.iter().map(|r| r.id).collect();
        let exercise_run_ids: Vec<Uuid> = batch.exercise_runs.iter().map(|r| r.id).collect();
        outcome.source_rows_deleted = live
            .interact(move |conn| -> Result<usize, rusqlite::Error> {
                let tx = conn.transaction()?;
                let mut deleted = ExerciseRun::delete_by_ids(&tx, &exercise_run_ids)?;
                deleted += RoutineRun::delete_by_ids(&tx, &run_ids)?;
                tx.commit()?;
                Ok(deleted)
            })
            .await??;
    }

    info!(?outcome, "archive transfer complete");
    Ok(outcome)
}

/// Serializes transfer triggers: at most one batch runs at a time. A trigger
/// arriving while one is in flight reports a skipped outcome instead of
/// racing the idempotency checks.
#[derive(Debug, Clone)]
pub struct Transferrer {
    stores: Stores,
    options: TransferOptions,
    in_flight: Arc<Mutex<()>>,
}

impl Transferrer {
    pub fn new(stores: Stores, options: TransferOptions) -> Self {
        Self {
            stores,
            options,
            in_flight: Arc::new(Mutex::new(())),
        }
    }

    pub async fn run(&self) -> Result<TransferOutcome, StoreError> {
        let Ok(_guard) = self.in_flight.try_lock() else {
            debug!("transfer already in flight, skipping");
            return Ok(TransferOutcome::skipped());
        };
        transfer_to_archive(&self.stores, &self.options).await
    }
}
