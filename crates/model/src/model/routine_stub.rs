use exemplar::Model;
use rusqlite::{Connection, OptionalExtension};
use sea_query::{enum_def, Expr, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;
use serde::{Deserialize, Serialize};

use crate::types::Uuid;

/// Minimal copy of a Routine pinned by its archive id, so run history stays
/// resolvable after the live row is renamed or deleted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
#[table("routine_stub")]
#[check("../../../store/migrations/003-routine_stub/up.sql")]
#[enum_def]
pub struct RoutineStub {
    pub id: Uuid,
    pub routine_archive_id: Uuid,
    pub name: String,
}

impl RoutineStub {
    fn select_star() -> SelectStatement {
        let mut query = Query::select();
        query
            .columns([
                RoutineStubIden::Id,
                RoutineStubIden::RoutineArchiveId,
                RoutineStubIden::Name,
            ])
            .from(RoutineStubIden::Table);
        query
    }

    pub fn fetch_by_archive_id(
        conn: &Connection,
        routine_archive_id: &Uuid,
    ) -> Result<Option<RoutineStub>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(RoutineStubIden::RoutineArchiveId).eq(routine_archive_id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), RoutineStub::from_row)
            .optional()?;
        Ok(res)
    }

    pub fn fetch_all(conn: &Connection) -> Result<Vec<RoutineStub>, rusqlite::Error> {
        let (sql, values) = Self::select_star().build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), RoutineStub::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    /// Match by archive id, creating the stub if absent. The stored name is
    /// refreshed so history shows the routine's latest title.
    pub fn get_or_create(
        conn: &Connection,
        routine_archive_id: &Uuid,
        name: &str,
    ) -> Result<RoutineStub, rusqlite::Error> {
        if let Some(mut existing) = Self::fetch_by_archive_id(conn, routine_archive_id)? {
            if existing.name != name {
                let (sql, values) = Query::update()
                    .table(RoutineStubIden::Table)
                    .values([(RoutineStubIden::Name, name.into())])
                    .and_where(
                        Expr::col(RoutineStubIden::RoutineArchiveId).eq(routine_archive_id),
                    )
                    .build_rusqlite(SqliteQueryBuilder);

                let mut stmt = conn.prepare_cached(&sql)?;
                stmt.execute(&*values.as_params())?;
                existing.name = name.to_owned();
            }
            return Ok(existing);
        }

        let stub = RoutineStub {
            id: Uuid::new_v4(),
            routine_archive_id: *routine_archive_id,
            name: name.to_owned(),
        };
        stub.insert(conn)?;
        Ok(stub)
    }

    pub fn delete_all(conn: &Connection) -> Result<usize, rusqlite::Error> {
        let (sql, values) = Query::delete()
            .from_table(RoutineStubIden::Table)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.execute(&*values.as_params())?;
        Ok(res)
    }
}
