use gymlog_model::{ExerciseRun, RoutineRun, Timestamp, Uuid};
use tracing::instrument;

use crate::{StoreError, Stores};

/// Archived runs for display, newest first, user-removed rows excluded
pub async fn recent_routine_runs(
    stores: &Stores,
    limit: Option<u64>,
) -> Result<Vec<RoutineRun>, StoreError> {
    let conn = stores.archive_conn().await?;
    Ok(conn
        .interact(move |conn| RoutineRun::fetch_recent(conn, limit))
        .await??)
}

/// Visible exercise completions for one archived run, in completion order
pub async fn exercise_runs_for_run(
    stores: &Stores,
    routine_run_id: Uuid,
) -> Result<Vec<ExerciseRun>, StoreError> {
    let conn = stores.archive_conn().await?;
    Ok(conn
        .interact(move |conn| ExerciseRun::fetch_for_run(conn, &routine_run_id))
        .await??)
}

/// The most recent visible archived run, if any. Feeds time-since-last-
/// workout displays.
pub async fn latest_routine_run(stores: &Stores) -> Result<Option<RoutineRun>, StoreError> {
    let conn = stores.archive_conn().await?;
    Ok(conn
        .interact(|conn| RoutineRun::fetch_latest(conn))
        .await??)
}

/// Flag a run (and its exercise completions) user-removed wherever it
/// exists. Matching rows may sit on either side of a pending transfer, so
/// both stores are updated.
#[instrument(skip(stores))]
pub async fn remove_routine_run(
    stores: &Stores,
    routine_archive_id: Uuid,
    started_at: Timestamp,
) -> Result<(), StoreError> {
    for conn in [stores.live_conn().await?, stores.archive_conn().await?] {
        conn.interact(move |conn| -> Result<(), rusqlite::Error> {
            let tx = conn.transaction()?;
            let flagged = RoutineRun::user_remove(&tx, &routine_archive_id, started_at)?;
            ExerciseRun::user_remove_for_runs(&tx, &flagged)?;
            tx.commit()?;
            Ok(())
        })
        .await??;
    }
    Ok(())
}

/// Flag a single exercise completion user-removed in both stores
#[instrument(skip(stores))]
pub async fn remove_exercise_run(
    stores: &Stores,
    exercise_archive_id: Uuid,
    completed_at: Timestamp,
) -> Result<(), StoreError> {
    for conn in [stores.live_conn().await?, stores.archive_conn().await?] {
        conn.interact(move |conn| {
            ExerciseRun::user_remove(conn, &exercise_archive_id, completed_at)
        })
        .await??;
    }
    Ok(())
}
