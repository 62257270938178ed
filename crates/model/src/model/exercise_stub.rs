use exemplar::Model;
use rusqlite::{Connection, OptionalExtension};
use sea_query::{enum_def, Expr, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;
use serde::{Deserialize, Serialize};

use crate::types::{Units, Uuid};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
#[table("exercise_stub")]
#[check("../../../store/migrations/005-exercise_stub/up.sql")]
#[enum_def]
pub struct ExerciseStub {
    pub id: Uuid,
    pub exercise_archive_id: Uuid,
    pub routine_archive_id: Uuid,
    pub name: String,
    pub units: Units,
}

impl ExerciseStub {
    fn select_star() -> SelectStatement {
        let mut query = Query::select();
        query
            .columns([
                ExerciseStubIden::Id,
                ExerciseStubIden::ExerciseArchiveId,
                ExerciseStubIden::RoutineArchiveId,
                ExerciseStubIden::Name,
                ExerciseStubIden::Units,
            ])
            .from(ExerciseStubIden::Table);
        query
    }

    pub fn fetch_by_archive_id(
        conn: &Connection,
        exercise_archive_id: &Uuid,
    ) -> Result<Option<ExerciseStub>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ExerciseStubIden::ExerciseArchiveId).eq(exercise_archive_id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_row(&*values.as_params(), ExerciseStub::from_row)
            .optional()?;
        Ok(res)
    }

    pub fn fetch_all(conn: &Connection) -> Result<Vec<ExerciseStub>, rusqlite::Error> {
        let (sql, values) = Self::select_star().build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), ExerciseStub::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn get_or_create(
        conn: &Connection,
        exercise_archive_id: &Uuid,
        routine_archive_id: &Uuid,
        name: &str,
        units: Units,
    ) -> Result<ExerciseStub, rusqlite::Error> {
        if let Some(mut existing) = Self::fetch_by_archive_id(conn, exercise_archive_id)? {
            if existing.name != name || existing.units != units {
                let (sql, values) = Query::update()
                    .table(ExerciseStubIden::Table)
                    .values([
                        (ExerciseStubIden::Name, name.into()),
                        (ExerciseStubIden::Units, units.into()),
                    ])
                    .and_where(
                        Expr::col(ExerciseStubIden::ExerciseArchiveId).eq(exercise_archive_id),
                    )
                    .build_rusqlite(SqliteQueryBuilder);

                let mut stmt = conn.prepare_cached(&sql)?;
                stmt.execute(&*values.as_params())?;
                existing.name = name.to_owned();
                existing.units = units;
            }
            return Ok(existing);
        }

        let stub = ExerciseStub {
            id: Uuid::new_v4(),
            exercise_archive_id: *exercise_archive_id,
            routine_archive_id: *routine_archive_id,
            name: name.to_owned(),
            units,
        };
        stub.insert(conn)?;
        Ok(stub)
    }

    pub fn delete_all(conn: &Connection) -> Result<usize, rusqlite::Error> {
        let (sql, values) = Query::delete()
            .from_table(ExerciseStubIden::Table)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.execute(&*values.as_params())?;
        Ok(res)
    }
}
