use exemplar::Model;
use rusqlite::{Connection, OptionalExtension};
use sea_query::{enum_def, Expr, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;
use serde::{Deserialize, Serialize};

use crate::types::{Timestamp, Uuid};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
#[table("routine")]
#[check("../../../store/migrations/001-routine/up.sql")]
#[enum_def]
pub struct Routine {
    pub id: Uuid,
    /// Stable identity run history is keyed by; never changes once assigned
    pub archive_id: Uuid,
    pub name: String,
    pub display_order: i64,
    pub last_started_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub last_updated_at: Timestamp,
}

impl Routine {
    pub fn new<T: Into<String>>(name: T, display_order: i64) -> Self {
        let now = Timestamp::now();
        Self {
            id: Uuid::new_v4(),
            archive_id: Uuid::new_v4(),
            name: name.into(),
            display_order,
            last_started_at: None,
            created_at: now,
            last_updated_at: now,
        }
    }

    fn select_star() -> SelectStatement {
        let mut query = Query::select();
        query
            .columns([
                RoutineIden::Id,
                RoutineIden::ArchiveId,
                RoutineIden::Name,
                RoutineIden::DisplayOrder,
                RoutineIden::LastStartedAt,
                RoutineIden::CreatedAt,
                RoutineIden::LastUpdatedAt,
            ])
            .from(RoutineIden::Table);
        query
    }

    pub fn fetch_by_id(conn: &Connection, id: &Uuid) -> Result<Routine, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(RoutineIden::Id).eq(id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.query_row(&*values.as_params(), Routine::from_row)?;
        Ok(res)
    }

    pub fn fetch_by_archive_id(
        conn: &Connection,
        archive_id: &Uuid,
    ) -> Result<Option<Routine>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(RoutineIden::ArchiveId).eq(archive_id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), Routine::from_row)
            .optional()?;
        Ok(res)
    }

    pub fn fetch_all(conn: &Connection) -> Result<Vec<Routine>, rusqlite::Error> {
        let (sql, values) = Self::select_star().build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), Routine::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn create(conn: &mut Connection, routine: Routine) -> Result<Routine, rusqlite::Error> {
        let tx = conn.transaction()?;
        let routine = {
            routine.insert(&tx)?;
            Routine::fetch_by_id(&tx, &routine.id)?
        };
        tx.commit()?;

        Ok(routine)
    }

    pub fn update(&self, conn: &Connection) -> Result<(), rusqlite::Error> {
        let (sql, values) = Query::update()
            .table(RoutineIden::Table)
            .values([
                (RoutineIden::Name, self.name.clone().into()),
                (RoutineIden::DisplayOrder, self.display_order.into()),
                (
                    RoutineIden::LastStartedAt,
                    self.last_started_at.map(|t| t.as_millis()).into(),
                ),
                (RoutineIden::LastUpdatedAt, Timestamp::now().into()),
            ])
            .and_where(Expr::col(RoutineIden::Id).eq(&self.id))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        stmt.execute(&*values.as_params())?;

        Ok(())
    }

    pub fn set_last_started_at(
        conn: &Connection,
        id: &Uuid,
        at: Timestamp,
    ) -> Result<(), rusqlite::Error> {
        let (sql, values) = Query::update()
            .table(RoutineIden::Table)
            .values([
                (RoutineIden::LastStartedAt, at.into()),
                (RoutineIden::LastUpdatedAt, Timestamp::now().into()),
            ])
            .and_where(Expr::col(RoutineIden::Id).eq(id))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        stmt.execute(&*values.as_params())?;

        Ok(())
    }

    pub fn delete(conn: &Connection, id: &Uuid) -> Result<usize, rusqlite::Error> {
        let (sql, values) = Query::delete()
            .from_table(RoutineIden::Table)
            .and_where(Expr::col(RoutineIden::Id).eq(id))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.execute(&*values.as_params())?;
        Ok(res)
    }
}
