/// Backend identifiers are opaque strings (`"cat1"`, ObjectIds, UUIDs).
pub type EntityId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
