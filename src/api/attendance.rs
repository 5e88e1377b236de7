use std::collections::HashMap;
use std::str::FromStr;

use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::engine::{self, Policy};
use crate::error::ApiError;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::attendance_log::{AttendanceLog, EventType};
use crate::utils::policy_cache;

#[derive(Deserialize, ToSchema)]
pub struct MarkAttendance {
    #[schema(example = 101)]
    pub employee_id: u64,
    /// One of CHECK_IN, BREAK_START, BREAK_END, CHECK_OUT.
    #[schema(example = "CHECK_IN")]
    pub event_type: String,
    #[schema(example = "2024-05-01T09:15:00")]
    pub timestamp: String,
}

/// Record one attendance event
///
/// Applies the event to the employee's day record: the first event of a day
/// must be CHECK_IN and fixes the status (Present/Late against the official
/// check-in time); CHECK_OUT updates the summary and remarks; breaks land
/// in the log only. The raw event is always appended to the log in the
/// same transaction.
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = MarkAttendance,
    responses(
        (status = 201, description = "Event recorded, returns the day record", body = Attendance),
        (status = 400, description = "Malformed input or no prior check-in", body = Object, example = json!({
            "error": "Must check in first"
        })),
        (status = 404, description = "Unknown employee"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    pool: web::Data<MySqlPool>,
    payload: web::Json<MarkAttendance>,
) -> actix_web::Result<impl Responder> {
    let event_type = EventType::from_str(&payload.event_type)
        .map_err(|_| ApiError::Validation(format!("Unknown event type `{}`", payload.event_type)))?;
    let timestamp = engine::parse_event_timestamp(&payload.timestamp)?;
    let employee_id = payload.employee_id;
    let date = timestamp.date();
    let time = timestamp.time();

    let known = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)")
        .bind(employee_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::Storage)?;
    if !known {
        return Err(ApiError::NotFound("Employee").into());
    }

    let settings = policy_cache::settings_map(pool.get_ref())
        .await
        .map_err(ApiError::Storage)?;
    let policy = Policy::from_settings(&settings);

    // Serialize concurrent events for the same (employee_id, date) key: the
    // row lock holds until the record update and log append commit together.
    let mut tx = pool.begin().await.map_err(ApiError::Storage)?;

    let existing = sqlx::query_as::<_, Attendance>(
        "SELECT id, employee_id, date, status, check_in_time, check_out_time, remarks \
         FROM attendance WHERE employee_id = ? AND date = ? FOR UPDATE",
    )
    .bind(employee_id)
    .bind(date)
    .fetch_optional(&mut *tx)
    .await
    .map_err(ApiError::Storage)?;

    let mut record = match existing {
        Some(record) => record,
        None => {
            if event_type != EventType::CheckIn {
                warn!(employee_id, %date, event = %event_type, "event before first check-in");
                return Err(ApiError::InvalidSequence.into());
            }

            let (status, remarks) = engine::check_in_outcome(time, &policy);
            let id = sqlx::query(
                "INSERT INTO attendance (employee_id, date, status, check_in_time, remarks) \
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(employee_id)
            .bind(date)
            .bind(status)
            .bind(time)
            .bind(&remarks)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::Storage)?
            .last_insert_id();

            Attendance {
                id,
                employee_id,
                date,
                status,
                check_in_time: Some(time),
                check_out_time: None,
                remarks: Some(remarks),
            }
        }
    };

    // Check-out refreshes the summary; a later check-out overwrites the
    // time and appends a second clause. Status never changes here.
    if event_type == EventType::CheckOut {
        let remarks =
            engine::append_remark(record.remarks.as_deref(), &engine::check_out_remark(time, &policy));

        sqlx::query("UPDATE attendance SET check_out_time = ?, remarks = ? WHERE id = ?")
            .bind(time)
            .bind(&remarks)
            .bind(record.id)
            .execute(&mut *tx)
            .await
            .map_err(ApiError::Storage)?;

        record.check_out_time = Some(time);
        record.remarks = Some(remarks);
    }

    sqlx::query(
        "INSERT INTO attendance_logs (attendance_id, event_type, timestamp) VALUES (?, ?, ?)",
    )
    .bind(record.id)
    .bind(event_type)
    .bind(timestamp)
    .execute(&mut *tx)
    .await
    .map_err(ApiError::Storage)?;

    tx.commit().await.map_err(ApiError::Storage)?;

    info!(employee_id, %date, event = %event_type, status = %record.status, "attendance event recorded");
    Ok(HttpResponse::Created().json(record))
}

/// Day record joined with the employee it belongs to.
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRow {
    pub id: u64,
    pub employee_id: u64,
    pub employee_code: String,
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "2024-05-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub status: AttendanceStatus,
    #[schema(value_type = Option<String>, nullable = true)]
    pub check_in_time: Option<NaiveTime>,
    #[schema(value_type = Option<String>, nullable = true)]
    pub check_out_time: Option<NaiveTime>,
    pub remarks: Option<String>,
}

/// List all attendance records
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    responses(
        (status = 200, description = "All day records, newest date first", body = [AttendanceRow]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let rows = sqlx::query_as::<_, AttendanceRow>(
        "SELECT a.id, a.employee_id, e.employee_code, e.first_name, e.last_name, \
                a.date, a.status, a.check_in_time, a.check_out_time, a.remarks \
         FROM attendance a \
         JOIN employees e ON e.id = a.employee_id \
         ORDER BY a.date DESC, a.id DESC",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::Storage)?;

    Ok(HttpResponse::Ok().json(rows))
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceWithLogs {
    pub record: Attendance,
    /// Raw events for the day, ascending by timestamp.
    pub logs: Vec<AttendanceLog>,
}

/// List one employee's attendance history
#[utoipa::path(
    get,
    path = "/api/v1/attendance/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Day records with their event logs, newest date first", body = [AttendanceWithLogs]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn attendance_by_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let records = sqlx::query_as::<_, Attendance>(
        "SELECT id, employee_id, date, status, check_in_time, check_out_time, remarks \
         FROM attendance WHERE employee_id = ? ORDER BY date DESC",
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::Storage)?;

    let mut logs_by_record: HashMap<u64, Vec<AttendanceLog>> = HashMap::new();
    if !records.is_empty() {
        let placeholders = vec!["?"; records.len()].join(", ");
        let sql = format!(
            "SELECT id, attendance_id, event_type, timestamp FROM attendance_logs \
             WHERE attendance_id IN ({placeholders}) ORDER BY timestamp ASC",
        );

        let mut query = sqlx::query_as::<_, AttendanceLog>(&sql);
        for record in &records {
            query = query.bind(record.id);
        }

        let logs = query
            .fetch_all(pool.get_ref())
            .await
            .map_err(ApiError::Storage)?;
        for log in logs {
            logs_by_record.entry(log.attendance_id).or_default().push(log);
        }
    }

    let response: Vec<AttendanceWithLogs> = records
        .into_iter()
        .map(|record| {
            let logs = logs_by_record.remove(&record.id).unwrap_or_default();
            AttendanceWithLogs { record, logs }
        })
        .collect();

    Ok(HttpResponse::Ok().json(response))
}
