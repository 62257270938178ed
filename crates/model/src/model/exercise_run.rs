use exemplar::Model;
use rusqlite::{Connection, OptionalExtension};
use sea_query::{enum_def, Expr, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;
use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, Uuid};

/// One exercise's completion inside a routine run; (exercise_archive_id,
/// completed_at) is the cross-store identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
#[table("exercise_run")]
#[check("../../../store/migrations/006-exercise_run/up.sql")]
#[enum_def]
pub struct ExerciseRun {
    pub id: Uuid,
    pub routine_run_id: Uuid,
    pub exercise_archive_id: Uuid,
    pub completed_at: Timestamp,
    pub intensity: f64,
    pub user_removed: bool,
}

impl ExerciseRun {
    pub fn new(
        routine_run_id: Uuid,
        exercise_archive_id: Uuid,
        completed_at: Timestamp,
        intensity: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            routine_run_id,
            exercise_archive_id,
            completed_at,
            intensity,
            user_removed: false,
        }
    }

    fn select_star() -> SelectStatement {
        let mut query = Query::select();
        query
            .columns([
                ExerciseRunIden::Id,
                ExerciseRunIden::RoutineRunId,
                ExerciseRunIden::ExerciseArchiveId,
                ExerciseRunIden::CompletedAt,
                ExerciseRunIden::Intensity,
                ExerciseRunIden::UserRemoved,
            ])
            .from(ExerciseRunIden::Table);
        query
    }

    pub fn fetch_by_key(
        conn: &Connection,
        exercise_archive_id: &Uuid,
        completed_at: Timestamp,
    ) -> Result<Option<ExerciseRun>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ExerciseRunIden::ExerciseArchiveId).eq(exercise_archive_id))
            .and_where(Expr::col(ExerciseRunIden::CompletedAt).eq(completed_at))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), ExerciseRun::from_row)
            .optional()?;
        Ok(res)
    }

    /// Visible completions for one run, in completion order
    pub fn fetch_for_run(
        conn: &Connection,
        routine_run_id: &Uuid,
    ) -> Result<Vec<ExerciseRun>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ExerciseRunIden::RoutineRunId).eq(routine_run_id))
            .and_where(Expr::col(ExerciseRunIden::UserRemoved).eq(false))
            .order_by(ExerciseRunIden::CompletedAt, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), ExerciseRun::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    /// Every completion for one run, user-removed rows included
    pub fn fetch_all_for_run(
        conn: &Connection,
        routine_run_id: &Uuid,
    ) -> Result<Vec<ExerciseRun>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ExerciseRunIden::RoutineRunId).eq(routine_run_id))
            .order_by(ExerciseRunIden::CompletedAt, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), ExerciseRun::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn fetch_visible(conn: &Connection) -> Result<Vec<ExerciseRun>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ExerciseRunIden::UserRemoved).eq(false))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), ExerciseRun::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn user_remove(
        conn: &Connection,
        exercise_archive_id: &Uuid,
        completed_at: Timestamp,
    ) -> Result<usize, rusqlite::Error> {
        let (sql, values) = Query::update()
            .table(ExerciseRunIden::Table)
            .values([(ExerciseRunIden::UserRemoved, true.into())])
            .and_where(Expr::col(ExerciseRunIden::ExerciseArchiveId).eq(exercise_archive_id))
            .and_where(Expr::col(ExerciseRunIden::CompletedAt).eq(completed_at))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.execute(&*values.as_params())?;
        Ok(res)
    }

    pub fn user_remove_for_runs(
        conn: &Connection,
        routine_run_ids: &[Uuid],
    ) -> Result<usize, rusqlite::Error> {
        if routine_run_ids.is_empty() {
            return Ok(0);
        }
        let (sql, values) = Query::update()
            .table(ExerciseRunIden::Table)
            .values([(ExerciseRunIden::UserRemoved, true.into())])
            .and_where(Expr::col(ExerciseRunIden::RoutineRunId).is_in(routine_run_ids.iter()))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.execute(&*values.as_params())?;
        Ok(res)
    }

    pub fn delete_by_ids(conn: &Connection, ids: &[Uuid]) -> Result<usize, rusqlite::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let (sql, values) = Query::delete()
            .from_table(ExerciseRunIden::Table)
            .and_where(Expr::col(ExerciseRunIden::Id).is_in(ids.iter()))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.execute(&*values.as_params())?;
        Ok(res)
    }

    pub fn delete_all(conn: &Connection) -> Result<usize, rusqlite::Error> {
        let (sql, values) = Query::delete()
            .from_table(ExerciseRunIden::Table)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.execute(&*values.as_params())?;
        Ok(res)
    }

    pub fn count(conn: &Connection) -> Result<i64, rusqlite::Error> {
        let (sql, values) = Query::select()
            .expr(Expr::col(ExerciseRunIden::Id).count())
            .from(ExerciseRunIden::Table)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.query_row(&*values.as_params(), |row| row.get(0))?;
        Ok(res)
    }
}
