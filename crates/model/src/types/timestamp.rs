use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
    ToSql,
};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

/// Wall-clock instant persisted as whole milliseconds since the Unix epoch.
///
/// Run records are matched across stores by (archive id, timestamp), so the
/// persisted value must compare exactly; integer millis keep the in-memory
/// and on-disk representations identical.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn now() -> Self {
        Utc::now().into()
    }

    pub fn from_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(|_| Self(millis))
    }

    pub fn as_millis(&self) -> i64 {
        self.0
    }

    pub fn plus_secs(&self, secs: i64) -> Self {
        Self(self.0.saturating_add(secs.saturating_mul(1000)))
    }

    pub fn minus_secs(&self, secs: i64) -> Self {
        Self(self.0.saturating_sub(secs.saturating_mul(1000)))
    }

    fn datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.datetime().to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value.timestamp_millis())
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(value: Timestamp) -> Self {
        value.datetime()
    }
}

impl ToSql for Timestamp {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::Owned(self.0.into()))
    }
}

impl FromSql for Timestamp {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let millis = i64::column_result(value)?;
        Self::from_millis(millis).ok_or(FromSqlError::OutOfRange(millis))
    }
}

impl From<&Timestamp> for sea_query::Value {
    fn from(value: &Timestamp) -> Self {
        value.0.into()
    }
}

impl From<Timestamp> for sea_query::Value {
    fn from(value: Timestamp) -> Self {
        value.0.into()
    }
}

// Serialized as RFC 3339 text so exported files stay spreadsheet-friendly.
impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&text)
            .map(|dt| Self::from(dt.with_timezone(&Utc)))
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn millis_survive_sql_round_trip() {
        let ts = Timestamp::from_millis(1_700_000_000_123).unwrap();
        let ToSqlOutput::Owned(value) = ts.to_sql().unwrap() else {
            panic!("expected owned value");
        };
        let back = Timestamp::column_result(ValueRef::from(&value)).unwrap();
        assert_eq!(ts, back);
    }

    #[test]
    fn serde_round_trips_through_rfc3339() {
        let ts = Timestamp::from_millis(1_700_000_000_123).unwrap();
        let json = serde_json::to_string(&ts).unwrap();
        assert_eq!(json, "\"2023-11-14T22:13:20.123Z\"");
        let back: Timestamp = serde_json::from_str(&json).unwrap();
        assert_eq!(ts, back);
    }

    #[test]
    fn offsets_are_whole_seconds() {
        let ts = Timestamp::from_millis(10_000).unwrap();
        assert_eq!(ts.plus_secs(5).as_millis(), 15_000);
        assert_eq!(ts.minus_secs(5).as_millis(), 5_000);
        assert!(ts.minus_secs(5) < ts);
    }
}
