use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::employee::Employee;
use crate::utils::patch::{EMPLOYEE_COLUMNS, apply_patch, build_patch};

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
    #[schema(example = "john@company.com", format = "email")]
    pub email: String,
    #[schema(example = "Software Engineer")]
    pub position: String,
    #[schema(example = 1)]
    pub department_id: u64,
    /// Defaults to today when omitted.
    #[schema(example = "2024-01-01", format = "date", value_type = Option<String>)]
    pub hire_date: Option<NaiveDate>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeQuery {
    /// Matches first name, last name or employee code.
    pub search: Option<String>,
    pub department_id: Option<u64>,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Str(String),
}

/// `DEP-YYYY-XXXX`: department prefix, hire year, 4-digit suffix.
fn employee_code(department_name: &str, hire_year: i32) -> String {
    let prefix = department_name.chars().take(3).collect::<String>().to_uppercase();
    let suffix = 1000 + (Uuid::new_v4().as_u128() % 9000) as u32;
    format!("{prefix}-{hire_year}-{suffix}")
}

/// Create Employee
#[utoipa::path(
    post,
    path = "/api/v1/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 404, description = "Department not found", body = Object, example = json!({
            "error": "Department not found"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn create_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let department_name = sqlx::query_scalar::<_, String>("SELECT name FROM departments WHERE id = ?")
        .bind(payload.department_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::Storage)?
        .ok_or(ApiError::NotFound("Department"))?;

    let hire_date = payload.hire_date.unwrap_or_else(|| Utc::now().date_naive());
    let code = employee_code(&department_name, hire_date.year());

    let id = sqlx::query(
        "INSERT INTO employees \
         (employee_code, first_name, last_name, email, position, department_id, hire_date) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&code)
    .bind(&payload.first_name)
    .bind(&payload.last_name)
    .bind(&payload.email)
    .bind(&payload.position)
    .bind(payload.department_id)
    .bind(hire_date)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to create employee");
        ApiError::Storage(e)
    })?
    .last_insert_id();

    Ok(HttpResponse::Created().json(Employee {
        id,
        employee_code: code,
        first_name: payload.first_name.clone(),
        last_name: payload.last_name.clone(),
        email: payload.email.clone(),
        position: payload.position.clone(),
        department_id: payload.department_id,
        hire_date,
    }))
}

/// List Employees
#[utoipa::path(
    get,
    path = "/api/v1/employees",
    params(
        ("search" = Option<String>, Query, description = "Match against first name, last name or employee code"),
        ("department_id" = Option<u64>, Query, description = "Filter by department")
    ),
    responses(
        (status = 200, description = "Employee list", body = [Employee]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn list_employees(
    pool: web::Data<MySqlPool>,
    query: web::Query<EmployeeQuery>,
) -> actix_web::Result<impl Responder> {
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(department_id) = query.department_id {
        where_sql.push_str(" AND department_id = ?");
        args.push(FilterValue::U64(department_id));
    }

    if let Some(search) = query.search.as_deref() {
        where_sql.push_str(" AND (first_name LIKE ? OR last_name LIKE ? OR employee_code LIKE ?)");
        let like = format!("%{search}%");
        args.push(FilterValue::Str(like.clone()));
        args.push(FilterValue::Str(like.clone()));
        args.push(FilterValue::Str(like));
    }

    let sql = format!(
        "SELECT id, employee_code, first_name, last_name, email, position, department_id, hire_date \
         FROM employees{where_sql} ORDER BY id",
    );
    debug!(sql = %sql, "Fetching employees");

    let mut data_query = sqlx::query_as::<_, Employee>(&sql);
    for arg in args {
        data_query = match arg {
            FilterValue::U64(v) => data_query.bind(v),
            FilterValue::Str(s) => data_query.bind(s),
        };
    }

    let employees = data_query
        .fetch_all(pool.get_ref())
        .await
        .map_err(ApiError::Storage)?;

    Ok(HttpResponse::Ok().json(employees))
}

/// Get Employee by ID
#[utoipa::path(
    get,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Employee found", body = Employee),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn get_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    let employee = sqlx::query_as::<_, Employee>(
        "SELECT id, employee_code, first_name, last_name, email, position, department_id, hire_date \
         FROM employees WHERE id = ?",
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(ApiError::Storage)?
    .ok_or(ApiError::NotFound("Employee"))?;

    Ok(HttpResponse::Ok().json(employee))
}

/// Update Employee
#[utoipa::path(
    put,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body(
        content = Object,
        description = "Subset of employee columns to update",
        example = json!({"position": "Staff Engineer"})
    ),
    responses(
        (status = 200, description = "Employee updated", body = Object, example = json!({
            "message": "Employee updated successfully"
        })),
        (status = 400, description = "Unknown field or empty payload"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn update_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let employee_id = path.into_inner();
    let patch = build_patch("employees", EMPLOYEE_COLUMNS, &body, employee_id)?;

    let affected = apply_patch(pool.get_ref(), patch)
        .await
        .map_err(ApiError::Storage)?;
    if affected == 0 {
        return Err(ApiError::NotFound("Employee").into());
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Employee updated successfully"
    })))
}

/// Delete Employee
#[utoipa::path(
    delete,
    path = "/api/v1/employees/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Employee"
)]
pub async fn delete_employee(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let employee_id = path.into_inner();

    let affected = sqlx::query("DELETE FROM employees WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to delete employee");
            ApiError::Storage(e)
        })?
        .rows_affected();

    if affected == 0 {
        return Err(ApiError::NotFound("Employee").into());
    }

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn employee_code_has_prefix_year_and_suffix() {
        let code = employee_code("Engineering", 2024);
        let parts: Vec<&str> = code.split('-').collect();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "ENG");
        assert_eq!(parts[1], "2024");
        let suffix: u32 = parts[2].parse().unwrap();
        assert!((1000..10000).contains(&suffix));
    }

    #[test]
    fn employee_code_survives_short_department_names() {
        let code = employee_code("hr", 2023);
        assert!(code.starts_with("HR-2023-"));
    }
}
