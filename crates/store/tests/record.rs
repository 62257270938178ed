mod common;

use gymlog_model::{RoutineRun, Timestamp};
use gymlog_store::{record, StoreError};

#[tokio::test]
async fn negative_durations_are_rejected() {
    let (_dir, stores) = common::open_test_stores();
    let seeded = common::seed_routine(&stores, "Push Day", &["Bench Press"]).await;

    let conn = stores.live_conn().await.unwrap();
    let routine = seeded.routine.clone();
    let result = conn
        .interact(move |conn| {
            record::log_routine_run(conn, &routine, Timestamp::now(), -1.0)
        })
        .await
        .unwrap();

    assert!(matches!(result, Err(StoreError::Validation(_))));
    assert_eq!(common::live_counts(&stores).await, (0, 0));
}

#[tokio::test]
async fn completions_cannot_predate_their_run() {
    let (_dir, stores) = common::open_test_stores();
    let seeded = common::seed_routine(&stores, "Pull Day", &["Row"]).await;
    let started_at = Timestamp::now().minus_secs(600);
    let run = common::log_run(&stores, &seeded, started_at, 300.0, &[]).await;

    let conn = stores.live_conn().await.unwrap();
    let exercise = seeded.exercises[0].clone();
    let result = conn
        .interact(move |conn| {
            record::log_exercise_run(
                conn,
                &exercise,
                &run,
                started_at.minus_secs(5),
                20.0,
            )
        })
        .await
        .unwrap();

    assert!(matches!(result, Err(StoreError::Validation(_))));
}

#[tokio::test]
async fn logging_a_run_stamps_the_routine_and_creates_its_stub() {
    let (_dir, stores) = common::open_test_stores();
    let seeded = common::seed_routine(&stores, "Legs", &["Squat"]).await;
    let started_at = Timestamp::now().minus_secs(900);
    let run = common::log_run(&stores, &seeded, started_at, 450.0, &[(0, 120, 80.0)]).await;

    let conn = stores.live_conn().await.unwrap();
    let routine_id = seeded.routine.id;
    let run_id = run.id;
    let (routine, stored) = conn
        .interact(move |conn| -> Result<_, rusqlite::Error> {
            Ok((
                gymlog_model::Routine::fetch_by_id(conn, &routine_id)?,
                RoutineRun::fetch_by_id(conn, &run_id)?,
            ))
        })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(routine.last_started_at, Some(started_at));
    assert_eq!(stored.routine_archive_id, seeded.routine.archive_id);
    assert_eq!(stored.duration_secs, 450.0);
    assert!(!stored.user_removed);
}
