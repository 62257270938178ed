use gymlog_model::{ExerciseRun, ExerciseStub, RoutineRun, RoutineStub};
use rusqlite::Connection;
use tracing::{info, instrument};

use crate::{StoreError, Stores};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PurgeOutcome {
    pub routine_runs: usize,
    pub exercise_runs: usize,
    pub routine_stubs: usize,
    pub exercise_stubs: usize,
}

impl PurgeOutcome {
    fn merge(&mut self, other: PurgeOutcome) {
        self.routine_runs += other.routine_runs;
        self.exercise_runs += other.exercise_runs;
        self.routine_stubs += other.routine_stubs;
        self.exercise_stubs += other.exercise_stubs;
    }
}

// Children before parents so the foreign keys hold mid-transaction
fn clear_run_history(conn: &mut Connection) -> Result<PurgeOutcome, rusqlite::Error> {
    let tx = conn.transaction()?;
    let outcome = PurgeOutcome {
        exercise_runs: ExerciseRun::delete_all(&tx)?,
        routine_runs: RoutineRun::delete_all(&tx)?,
        exercise_stubs: ExerciseStub::delete_all(&tx)?,
        routine_stubs: RoutineStub::delete_all(&tx)?,
    };
    tx.commit()?;
    Ok(outcome)
}

/// Physically delete all run history from the archive store only.
/// Irreversible; callers are expected to have confirmed with the user.
#[instrument(skip(stores))]
pub async fn purge_archive(stores: &Stores) -> Result<PurgeOutcome, StoreError> {
    let conn = stores.archive_conn().await?;
    let outcome = conn.interact(clear_run_history).await??;
    info!(?outcome, "purged archive store run history");
    Ok(outcome)
}

/// Physically delete all run history from both stores. Irreversible.
#[instrument(skip(stores))]
pub async fn clear_history(stores: &Stores) -> Result<PurgeOutcome, StoreError> {
    let live = stores.live_conn().await?;
    let mut outcome = live.interact(clear_run_history).await??;

    let archive = stores.archive_conn().await?;
    outcome.merge(archive.interact(clear_run_history).await??);

    info!(?outcome, "cleared run history from both stores");
    Ok(outcome)
}
