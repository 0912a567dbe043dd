/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A calendar day with no time or timezone component.
///
/// Streak and first-daily comparisons are made on whole days only.
pub type Day = chrono::NaiveDate;
