use exemplar::Model;
use rusqlite::Connection;
use sea_query::{enum_def, Expr, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_rusqlite::RusqliteBinder;
use serde::{Deserialize, Serialize};

use crate::{
    model::Routine,
    types::{Timestamp, Units, Uuid},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Model)]
#[table("exercise")]
#[check("../../../store/migrations/002-exercise/up.sql")]
#[enum_def]
pub struct Exercise {
    pub id: Uuid,
    pub routine_id: Uuid,
    pub archive_id: Uuid,
    pub name: String,
    pub display_order: i64,
    pub units: Units,
    pub created_at: Timestamp,
    pub last_updated_at: Timestamp,
}

impl Exercise {
    pub fn new<T: Into<String>>(
        routine: &Routine,
        name: T,
        display_order: i64,
        units: Units,
    ) -> Self {
        let now = Timestamp::now();
        Self {
            id: Uuid::new_v4(),
            routine_id: routine.id,
            archive_id: Uuid::new_v4(),
            name: name.into(),
            display_order,
            units,
            created_at: now,
            last_updated_at: now,
        }
    }

    fn select_star() -> SelectStatement {
        let mut query = Query::select();
        query
            .columns([
                ExerciseIden::Id,
                ExerciseIden::RoutineId,
                ExerciseIden::ArchiveId,
                ExerciseIden::Name,
                ExerciseIden::DisplayOrder,
                ExerciseIden::Units,
                ExerciseIden::CreatedAt,
                ExerciseIden::LastUpdatedAt,
            ])
            .from(ExerciseIden::Table);
        query
    }

    pub fn fetch_by_id(conn: &Connection, id: &Uuid) -> Result<Exercise, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ExerciseIden::Id).eq(id))
            .limit(1)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.query_row(&*values.as_params(), Exercise::from_row)?;
        Ok(res)
    }

    pub fn fetch_for_routine(
        conn: &Connection,
        routine_id: &Uuid,
    ) -> Result<Vec<Exercise>, rusqlite::Error> {
        let (sql, values) = Self::select_star()
            .and_where(Expr::col(ExerciseIden::RoutineId).eq(routine_id))
            .order_by(ExerciseIden::DisplayOrder, Order::Asc)
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), Exercise::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn fetch_all(conn: &Connection) -> Result<Vec<Exercise>, rusqlite::Error> {
        let (sql, values) = Self::select_star().build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt
            .query_map(&*values.as_params(), Exercise::from_row)?
            .collect::<Result<_, _>>()?;
        Ok(res)
    }

    pub fn create(conn: &mut Connection, exercise: Exercise) -> Result<Exercise, rusqlite::Error> {
        let tx = conn.transaction()?;
        let exercise = {
            exercise.insert(&tx)?;
            Exercise::fetch_by_id(&tx, &exercise.id)?
        };
        tx.commit()?;

        Ok(exercise)
    }

    pub fn delete(conn: &Connection, id: &Uuid) -> Result<usize, rusqlite::Error> {
        let (sql, values) = Query::delete()
            .from_table(ExerciseIden::Table)
            .and_where(Expr::col(ExerciseIden::Id).eq(id))
            .build_rusqlite(SqliteQueryBuilder);

        let mut stmt = conn.prepare_cached(&sql)?;
        let res = stmt.execute(&*values.as_params())?;
        Ok(res)
    }
}
