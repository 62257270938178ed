use exemplar::Model;
use rusqlite::{Connection, OptionalExtension};
use sea_query::{enum_def, Expr, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;
use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, Uuid};

/// One completed (or abandoned) execution of a routine. Rows live in the
/// live store until the archive transfer moves them; (routine_archive_id,
/// started_at) is the cross-store identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
#[table("routine_run")]
#[check("../../../store/migrations/004-routine_run/up.sql")]
#[enum_def]
pub struct RoutineRun {
    pub id: Uuid,
    pub routine_archive_id: Uuid,
    pub started_at: Timestamp,
    pub duration_secs: f64,
    pub user_removed: bool,
}

impl RoutineRun {
    pub fn new(routine_archive_id: Uuid, started_at: Timestamp, duration_secs: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            routine_archive_id,
            started_at,
            duration_secs,
            user_removed: false,
        }
    }

    fn select_star() -> SelectStatement {
        let mut query = Query::select();
        query
            .columns([
                RoutineRunIden::Id,
                RoutineRunIden::RoutineArchiveId,
                RoutineRunIden::StartedAt,
                RoutineRunIden::DurationSecs,
                RoutineRunIden::UserRemoved,
            ])
            .from(RoutineRunIden::Table);
        query
    }

    pub fn fetch_by_id(conn: &Connection, id: &Uuid) -> Result<RoutineRun, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(RoutineRunIden::Id).eq(id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.query_row(&*values.as_params(), RoutineRun::from_row)?;
        Ok(res)
    }

    pub fn fetch_by_key(
        conn: &Connection,
        routine_archive_id: &Uuid,
        started_at: Timestamp,
    ) -> Result<Option<RoutineRun>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(RoutineRunIden::RoutineArchiveId).eq(routine_archive_id))
            .and_where(Expr::col(RoutineRunIden::StartedAt).eq(started_at))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), RoutineRun::from_row)
            .optional()?;
        Ok(res)
    }

    /// Visible runs old enough to be moved to the archive store
    pub fn fetch_eligible(
        conn: &Connection,
        cutoff: Timestamp,
    ) -> Result<Vec<RoutineRun>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(RoutineRunIden::UserRemoved).eq(false))
            .and_where(Expr::col(RoutineRunIden::StartedAt).lte(cutoff))
            .order_by(RoutineRunIden::StartedAt, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), RoutineRun::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    /// All runs not flagged user-removed, in creation order
    pub fn fetch_visible(conn: &Connection) -> Result<Vec<RoutineRun>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(RoutineRunIden::UserRemoved).eq(false))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), RoutineRun::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn fetch_recent(
        conn: &Connection,
        limit: Option<u64>,
    ) -> Result<Vec<RoutineRun>, rusqlite::Error> {
        let mut query = Self::select_star();
        query
            .and_where(Expr::col(RoutineRunIden::UserRemoved).eq(false))
            .order_by(RoutineRunIden::StartedAt, Order::Desc);
        if let Some(limit) = limit {
            query.limit(limit);
        }
        let (sql, values) = query.build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), RoutineRun::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn fetch_latest(conn: &Connection) -> Result<Option<RoutineRun>, rusqlite::Error> {
        Ok(Self::fetch_recent(conn, Some(1))?.pop())
    }

    /// Flag every run matching the cross-store key, returning the ids flagged
    pub fn user_remove(
        conn: &Connection,
        routine_archive_id: &Uuid,
        started_at: Timestamp,
    ) -> Result<Vec<Uuid>, rusqlite::Error> {
        let (sql, values) = Query::select()
            .column(RoutineRunIden::Id)
            .from(RoutineRunIden::Table)
            .and_where(Expr::col(RoutineRunIden::RoutineArchiveId).eq(routine_archive_id))
            .and_where(Expr::col(RoutineRunIden::StartedAt).eq(started_at))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let ids: Vec<Uuid> = stmt
            .query_map(&*values.as_params(), |row| row.get(0))?
            .collect::<Result<_, _>>()?;
        if ids.is_empty() {
            return Ok(ids);
        }

        let (sql, values) = Query::update()
            .table(RoutineRunIden::Table)
            .values([(RoutineRunIden::UserRemoved, true.into())])
            .and_where(Expr::col(RoutineRunIden::Id).is_in(ids.iter()))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        stmt.execute(&*values.as_params())?;

        Ok(ids)
    }

    pub fn delete_by_ids(conn: &Connection, ids: &[Uuid]) -> Result<usize, rusqlite::Error> {
        if ids.is_empty() {
            return Ok(0);
        }
        let (sql, values) = Query::delete()
            .from_table(RoutineRunIden::Table)
            .and_where(Expr::col(RoutineRunIden::Id).is_in(ids.iter()))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.execute(&*values.as_params())?;
        Ok(res)
    }

    pub fn delete_all(conn: &Connection) -> Result<usize, rusqlite::Error> {
        let (sql, values) = Query::delete()
            .from_table(RoutineRunIden::Table)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.execute(&*values.as_params())?;
        Ok(res)
    }

    pub fn count(conn: &Connection) -> Result<i64, rusqlite::Error> {
        let (sql, values) = Query::select()
            .expr(Expr::col(RoutineRunIden::Id).count())
            .from(RoutineRunIden::Table)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.query_row(&*values.as_params(), |row| row.get(0))?;
        Ok(res)
    }
}
