use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, openapi};

use crate::api::attendance::{AttendanceRow, AttendanceWithLogs, MarkAttendance};
use crate::api::dashboard::{DashboardStats, DepartmentAttendance};
use crate::api::department::{CreateDepartment, DepartmentDetail, DepartmentRow};
use crate::api::employee::CreateEmployee;
use crate::model::attendance::{Attendance, AttendanceStatus};
use crate::model::attendance_log::{AttendanceLog, EventType};
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::stats::{DailySummary, TrendPoint};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance System API",
        version = "1.0.0",
        description = r#"
## Employee Attendance System

Records employee workday activity as timestamped events (check-in, break
start/end, check-out) and derives a per-day attendance record with a status
classification against configurable official check-in/check-out times.

### Key Features
- **Attendance Tracking**
  - Event recording with Present/Late classification and remark narratives
  - Per-employee history with raw event logs
- **Dashboard**
  - Today's Present/Late/Absent split, per-department breakdown, 7-day trend
- **Employee & Department Management**
  - CRUD with search and generated employee codes
- **Settings**
  - Flat key/value policy store (`officialCheckIn`, `officialCheckOut`)

### Security
All non-auth endpoints require **JWT Bearer authentication**; mutating
admin operations additionally require the **Admin** or **HR** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::mark_attendance,
        crate::api::attendance::list_attendance,
        crate::api::attendance::attendance_by_employee,

        crate::api::dashboard::dashboard_stats,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::department::list_departments,
        crate::api::department::get_department,
        crate::api::department::create_department,
        crate::api::department::update_department,
        crate::api::department::delete_department,

        crate::api::settings::get_settings,
        crate::api::settings::update_settings,
    ),
    components(
        schemas(
            MarkAttendance,
            Attendance,
            AttendanceStatus,
            AttendanceRow,
            AttendanceWithLogs,
            AttendanceLog,
            EventType,
            DashboardStats,
            DailySummary,
            TrendPoint,
            DepartmentAttendance,
            CreateEmployee,
            Employee,
            CreateDepartment,
            Department,
            DepartmentRow,
            DepartmentDetail,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance event recording and history"),
        (name = "Dashboard", description = "Aggregated attendance statistics"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Department", description = "Department management APIs"),
        (name = "Settings", description = "Policy settings APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
