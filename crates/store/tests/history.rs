mod common;

use gymlog_model::{Routine, RoutineRun, RoutineStub, Timestamp};
use gymlog_store::{
    history,
    transfer::{transfer_to_archive, TransferOptions},
};

fn keep_source_options() -> TransferOptions {
    TransferOptions {
        threshold_secs: 3600,
        delete_source_after_transfer: false,
    }
}

#[tokio::test]
async fn listings_are_newest_first_and_exclude_removed_runs() {
    let (_dir, stores) = common::open_test_stores();
    let seeded = common::seed_routine(&stores, "Push Day", &["Bench Press"]).await;
    let first = Timestamp::now().minus_secs(20_000);
    let second = first.plus_secs(3600);
    common::log_run(&stores, &seeded, first, 500.0, &[]).await;
    common::log_run(&stores, &seeded, second, 400.0, &[]).await;
    transfer_to_archive(&stores, &keep_source_options())
        .await
        .unwrap();

    let runs = history::recent_routine_runs(&stores, None).await.unwrap();
    assert_eq!(runs.len(), 2);
    assert_eq!(runs[0].started_at, second);
    assert_eq!(runs[1].started_at, first);

    history::remove_routine_run(&stores, seeded.routine.archive_id, second)
        .await
        .unwrap();

    let runs = history::recent_routine_runs(&stores, None).await.unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].started_at, first);

    let latest = history::latest_routine_run(&stores).await.unwrap().unwrap();
    assert_eq!(latest.started_at, first);
}

#[tokio::test]
async fn removal_hides_the_run_on_both_sides_of_a_transfer() {
    let (_dir, stores) = common::open_test_stores();
    let seeded = common::seed_routine(&stores, "Pull Day", &["Row"]).await;
    let old = Timestamp::now().minus_secs(20_000);
    common::log_run(&stores, &seeded, old, 300.0, &[(0, 60, 50.0)]).await;
    // Keep-source transfer leaves a copy in each store
    transfer_to_archive(&stores, &keep_source_options())
        .await
        .unwrap();

    history::remove_routine_run(&stores, seeded.routine.archive_id, old)
        .await
        .unwrap();

    for conn in [
        stores.live_conn().await.unwrap(),
        stores.archive_conn().await.unwrap(),
    ] {
        let visible = conn
            .interact(|conn| RoutineRun::fetch_visible(conn))
            .await
            .unwrap()
            .unwrap();
        assert!(visible.is_empty());
    }
}

#[tokio::test]
async fn exercise_run_removal_is_scoped_to_one_completion() {
    let (_dir, stores) = common::open_test_stores();
    let seeded = common::seed_routine(&stores, "Arms", &["Curls", "Hammer Curls"]).await;
    let old = Timestamp::now().minus_secs(20_000);
    let run = common::log_run(
        &stores,
        &seeded,
        old,
        400.0,
        &[(0, 100, 20.0), (1, 200, 15.0)],
    )
    .await;
    transfer_to_archive(&stores, &keep_source_options())
        .await
        .unwrap();

    history::remove_exercise_run(
        &stores,
        seeded.exercises[0].archive_id,
        old.plus_secs(100),
    )
    .await
    .unwrap();

    let remaining = history::exercise_runs_for_run(&stores, run.id).await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].exercise_archive_id, seeded.exercises[1].archive_id);
}

#[tokio::test]
async fn archived_history_survives_deleting_the_live_routine() {
    let (_dir, stores) = common::open_test_stores();
    let seeded = common::seed_routine(&stores, "Back & Bicep", &["Rows", "Curls"]).await;
    let old = Timestamp::now().minus_secs(20_000);
    common::log_run(&stores, &seeded, old, 500.0, &[(0, 116, 25.0), (1, 289, 12.5)]).await;
    transfer_to_archive(&stores, &keep_source_options())
        .await
        .unwrap();

    let conn = stores.live_conn().await.unwrap();
    let routine_id = seeded.routine.id;
    conn.interact(move |conn| Routine::delete(conn, &routine_id))
        .await
        .unwrap()
        .unwrap();

    // History still lists the run, and its stub still resolves the name
    let runs = history::recent_routine_runs(&stores, None).await.unwrap();
    assert_eq!(runs.len(), 1);

    let archive = stores.archive_conn().await.unwrap();
    let routine_archive_id = seeded.routine.archive_id;
    let stub = archive
        .interact(move |conn| RoutineStub::fetch_by_archive_id(conn, &routine_archive_id))
        .await
        .unwrap()
        .unwrap()
        .expect("stub resolves after live routine deletion");
    assert_eq!(stub.name, "Back & Bicep");
}

#[tokio::test]
async fn stub_names_follow_the_latest_routine_name() {
    let (_dir, stores) = common::open_test_stores();
    let seeded = common::seed_routine(&stores, "Legs", &["Squat"]).await;
    let old = Timestamp::now().minus_secs(20_000);
    common::log_run(&stores, &seeded, old, 300.0, &[]).await;
    transfer_to_archive(&stores, &keep_source_options())
        .await
        .unwrap();

    // Rename, log another aged run, transfer again
    let conn = stores.live_conn().await.unwrap();
    let mut renamed = seeded.routine.clone();
    renamed.name = "Leg Day".to_owned();
    let update = renamed.clone();
    conn.interact(move |conn| update.update(conn))
        .await
        .unwrap()
        .unwrap();

    let reseeded = common::Seeded {
        routine: renamed,
        exercises: seeded.exercises.clone(),
    };
    common::log_run(&stores, &reseeded, old.plus_secs(60), 310.0, &[]).await;
    transfer_to_archive(&stores, &keep_source_options())
        .await
        .unwrap();

    let archive = stores.archive_conn().await.unwrap();
    let routine_archive_id = seeded.routine.archive_id;
    let stub = archive
        .interact(move |conn| RoutineStub::fetch_by_archive_id(conn, &routine_archive_id))
        .await
        .unwrap()
        .unwrap()
        .expect("stub present");
    assert_eq!(stub.name, "Leg Day");
}
