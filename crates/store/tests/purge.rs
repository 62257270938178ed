mod common;

use gymlog_model::Timestamp;
use gymlog_store::{
    history,
    purge::{clear_history, purge_archive},
    transfer::{transfer_to_archive, TransferOptions},
};

fn keep_source_options() -> TransferOptions {
    TransferOptions {
        threshold_secs: 3600,
        delete_source_after_transfer: false,
    }
}

#[tokio::test]
async fn purge_archive_leaves_the_live_store_alone() {
    let (_dir, stores) = common::open_test_stores();
    let seeded = common::seed_routine(&stores, "Push Day", &["Bench Press"]).await;
    let old = Timestamp::now().minus_secs(20_000);
    common::log_run(&stores, &seeded, old, 500.0, &[(0, 100, 60.0)]).await;
    common::log_run(&stores, &seeded, old.plus_secs(60), 400.0, &[]).await;
    transfer_to_archive(&stores, &keep_source_options())
        .await
        .unwrap();

    let outcome = purge_archive(&stores).await.unwrap();
    assert_eq!(outcome.routine_runs, 2);
    assert_eq!(outcome.exercise_runs, 1);
    assert_eq!(outcome.routine_stubs, 1);

    assert_eq!(common::archive_counts(&stores).await, (0, 0));
    // Source copies were kept by the transfer and survive an archive purge
    assert_eq!(common::live_counts(&stores).await, (2, 1));
}

#[tokio::test]
async fn clear_history_wipes_run_records_from_both_stores() {
    let (_dir, stores) = common::open_test_stores();
    let seeded = common::seed_routine(&stores, "Pull Day", &["Deadlift"]).await;
    let old = Timestamp::now().minus_secs(20_000);
    // One archived, one still fresh in the live store
    common::log_run(&stores, &seeded, old, 500.0, &[(0, 90, 120.0)]).await;
    transfer_to_archive(&stores, &keep_source_options())
        .await
        .unwrap();
    common::log_run(&stores, &seeded, Timestamp::now(), 450.0, &[]).await;

    clear_history(&stores).await.unwrap();

    assert_eq!(common::live_counts(&stores).await, (0, 0));
    assert_eq!(common::archive_counts(&stores).await, (0, 0));

    // Routine and exercise definitions are not history; they stay
    let conn = stores.live_conn().await.unwrap();
    let (routines, exercises) = conn
        .interact(|conn| -> Result<(usize, usize), rusqlite::Error> {
            Ok((
                gymlog_model::Routine::fetch_all(conn)?.len(),
                gymlog_model::Exercise::fetch_all(conn)?.len(),
            ))
        })
        .await
        .unwrap()
        .unwrap();
    assert_eq!((routines, exercises), (1, 1));
}

#[tokio::test]
async fn soft_deleted_rows_are_still_counted_by_purge() {
    let (_dir, stores) = common::open_test_stores();
    let seeded = common::seed_routine(&stores, "Core", &["Plank"]).await;
    let old = Timestamp::now().minus_secs(20_000);
    common::log_run(&stores, &seeded, old, 200.0, &[(0, 50, 0.0)]).await;
    transfer_to_archive(&stores, &keep_source_options())
        .await
        .unwrap();

    history::remove_routine_run(&stores, seeded.routine.archive_id, old)
        .await
        .unwrap();

    // Hidden from views, but physically present until now
    let outcome = clear_history(&stores).await.unwrap();
    assert_eq!(outcome.routine_runs, 2);
    assert_eq!(outcome.exercise_runs, 2);
    assert_eq!(common::live_counts(&stores).await, (0, 0));
    assert_eq!(common::archive_counts(&stores).await, (0, 0));
}
