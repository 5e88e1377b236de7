use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Raw activity event, append-only. The log is the source of truth for a
/// day's record; ordering within a day is by timestamp value.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "attendance_id": 1,
        "event_type": "CHECK_IN",
        "timestamp": "2024-05-01T09:15:00"
    })
)]
pub struct AttendanceLog {
    #[schema(example = 7)]
    pub id: u64,

    #[schema(example = 1)]
    pub attendance_id: u64,

    pub event_type: EventType,

    #[schema(example = "2024-05-01T09:15:00", value_type = String, format = "date-time")]
    pub timestamp: NaiveDateTime,
}

/// The four activity signals accepted on the wire and stored in
/// `attendance_logs.event_type`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    CheckIn,
    BreakStart,
    BreakEnd,
    CheckOut,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn event_type_round_trips_as_screaming_snake() {
        assert_eq!(EventType::from_str("CHECK_IN").unwrap(), EventType::CheckIn);
        assert_eq!(EventType::from_str("BREAK_END").unwrap(), EventType::BreakEnd);
        assert_eq!(EventType::CheckOut.to_string(), "CHECK_OUT");
        assert!(EventType::from_str("LUNCH").is_err());
    }
}
