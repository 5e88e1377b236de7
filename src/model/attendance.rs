use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Day-level attendance summary, one row per (employee_id, date).
///
/// The row is a materialized cache of the event log: `status` is decided
/// once at CHECK_IN time and never revisited, later events only touch
/// `check_out_time` and `remarks`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 101,
        "date": "2024-05-01",
        "status": "Late",
        "check_in_time": "09:15:00",
        "check_out_time": "16:30:00",
        "remarks": "Late (Checked in at 09:15:00); Left Early (Checked out at 16:30:00)"
    })
)]
pub struct Attendance {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 101)]
    pub employee_id: u64,

    #[schema(example = "2024-05-01", value_type = String, format = "date")]
    pub date: NaiveDate,

    pub status: AttendanceStatus,

    #[schema(example = "09:15:00", value_type = Option<String>, nullable = true)]
    pub check_in_time: Option<NaiveTime>,

    #[schema(example = "16:30:00", value_type = Option<String>, nullable = true)]
    pub check_out_time: Option<NaiveTime>,

    #[schema(example = "Late (Checked in at 09:15:00)", nullable = true)]
    pub remarks: Option<String>,
}

/// Stored verbatim in the `attendance.status` column.
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
    ToSchema,
)]
pub enum AttendanceStatus {
    Present,
    Absent,
    Late,
    Leave,
}
