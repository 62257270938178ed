use rusqlite::{
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
    ToSql,
};
use serde::{Deserialize, Serialize};

/// How an exercise's intensity value is to be read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    None = 0,
    Kilograms = 1,
    Other = 2,
}

impl Units {
    pub fn label(&self) -> &'static str {
        match self {
            Units::None => "",
            Units::Kilograms => "kg",
            Units::Other => "",
        }
    }

    fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Units::None),
            1 => Some(Units::Kilograms),
            2 => Some(Units::Other),
            _ => None,
        }
    }
}

impl ToSql for Units {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Owned((*self as i64).into()))
    }
}

impl FromSql for Units {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = i64::column_result(value)?;
        Self::from_i64(raw).ok_or(FromSqlError::OutOfRange(raw))
    }
}

impl From<Units> for sea_query::Value {
    fn from(value: Units) -> Self {
        (value as i64).into()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn discriminants_round_trip() {
        for units in [Units::None, Units::Kilograms, Units::Other] {
            let ToSqlOutput::Owned(value) = units.to_sql().unwrap() else {
                panic!("expected owned value");
            };
            assert_eq!(Units::column_result(ValueRef::from(&value)).unwrap(), units);
        }
    }

    #[test]
    fn unknown_discriminant_is_rejected() {
        let value = rusqlite::types::Value::Integer(9);
        assert!(Units::column_result(ValueRef::from(&value)).is_err());
    }
}
