/// User and comment primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// Papers are keyed by an opaque string (arXiv id or upload hash).
pub type PaperId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
