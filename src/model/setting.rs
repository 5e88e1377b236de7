use serde::{Deserialize, Serialize};

/// One row of the flat key/value settings store. The engine reads
/// `officialCheckIn` / `officialCheckOut` out of this table.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    pub id: u64,
    pub key: String,
    pub value: String,
}
