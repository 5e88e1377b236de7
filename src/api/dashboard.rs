use actix_web::{HttpResponse, Responder, web};
use chrono::{Duration, NaiveDate, Utc};
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::model::attendance::AttendanceStatus;
use crate::stats::{self, DailySummary, TrendPoint};

/// Per-department slice of today's attendance. `present` counts employees
/// with a Present or Late record; `total` counts everyone assigned.
#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct DepartmentAttendance {
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = 8)]
    pub present: i64,
    #[schema(example = 11)]
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct DashboardStats {
    #[schema(example = 42)]
    pub total_employees: i64,
    #[schema(example = 5)]
    pub total_departments: i64,
    pub today: DailySummary,
    pub departments: Vec<DepartmentAttendance>,
    /// Last 7 calendar days including today, zero-filled, ascending.
    pub trend: Vec<TrendPoint>,
}

/// Dashboard statistics
///
/// Headline counts, today's Present/Late/Absent split, the per-department
/// breakdown for today and the 7-day attendance trend, in one payload.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/stats",
    responses(
        (status = 200, description = "Aggregated dashboard statistics", body = DashboardStats),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn dashboard_stats(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let today = Utc::now().date_naive();
    let window_start = today - Duration::days(6);

    let total_employees = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM employees")
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::Storage)?;

    let total_departments = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments")
        .fetch_one(pool.get_ref())
        .await
        .map_err(ApiError::Storage)?;

    let statuses = sqlx::query_scalar::<_, AttendanceStatus>(
        "SELECT status FROM attendance WHERE date = ?",
    )
    .bind(today)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::Storage)?;
    let today_summary = stats::daily_summary(&statuses, total_employees);

    let departments = sqlx::query_as::<_, DepartmentAttendance>(
        "SELECT d.name, \
                COUNT(DISTINCT CASE WHEN a.status IN ('Present', 'Late') THEN a.employee_id END) AS present, \
                COUNT(DISTINCT e.id) AS total \
         FROM departments d \
         LEFT JOIN employees e ON e.department_id = d.id \
         LEFT JOIN attendance a ON a.employee_id = e.id AND a.date = ? \
         GROUP BY d.id, d.name \
         ORDER BY d.id",
    )
    .bind(today)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::Storage)?;

    let counts = sqlx::query_as::<_, (NaiveDate, i64)>(
        "SELECT date, COUNT(*) FROM attendance \
         WHERE date BETWEEN ? AND ? AND status IN ('Present', 'Late') \
         GROUP BY date ORDER BY date",
    )
    .bind(window_start)
    .bind(today)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::Storage)?;
    let trend = stats::fill_trend(&counts, window_start, today);

    Ok(HttpResponse::Ok().json(DashboardStats {
        total_employees,
        total_departments,
        today: today_summary,
        departments,
        trend,
    }))
}
