//! Repository traits and their SQL implementations

pub mod availability;
pub mod availability_sql;
pub mod busy_cache;
pub mod busy_cache_sql;
pub mod ledger;
pub mod ledger_sql;

pub use availability::AvailabilityRepository;
pub use availability_sql::SqlAvailabilityRepository;
pub use busy_cache::BusyCacheRepository;
pub use busy_cache_sql::SqlBusyCacheRepository;
pub use ledger::{LedgerRepository, NewAppointment};
pub use ledger_sql::SqlLedgerRepository;

pub(crate) mod codec {
    //! Column encodings shared by the SQL repositories.
    //!
    //! The Any driver only moves i64/f64/String/bool across the wire, so
    //! dates are ISO `YYYY-MM-DD` TEXT, instants are RFC3339 UTC TEXT with
    //! fixed second precision (which makes lexicographic range comparisons
    //! valid), and times-of-day are INTEGER minutes since local midnight.

    use crate::error::DbError;
    use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
    use uuid::Uuid;

    pub fn fmt_date(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    pub fn parse_date(s: &str) -> Result<NaiveDate, DbError> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| DbError::MappingError(format!("Bad date column '{s}': {e}")))
    }

    pub fn fmt_instant(at: DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    pub fn parse_instant(s: &str) -> Result<DateTime<Utc>, DbError> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| DbError::MappingError(format!("Bad timestamp column '{s}': {e}")))
    }

    pub fn parse_uuid(s: &str) -> Result<Uuid, DbError> {
        Uuid::parse_str(s).map_err(|e| DbError::MappingError(format!("Bad uuid column '{s}': {e}")))
    }

    pub fn minute_to_time(minute: i64) -> Result<NaiveTime, DbError> {
        bookwell_common::time::time_of_minute(minute)
            .ok_or_else(|| DbError::MappingError(format!("Bad minute-of-day column: {minute}")))
    }
}
