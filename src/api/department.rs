use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use sqlx::MySqlPool;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::utils::patch::{DEPARTMENT_COLUMNS, apply_patch, build_patch};

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub name: String,
}

#[derive(Serialize, sqlx::FromRow, ToSchema)]
pub struct DepartmentRow {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Engineering")]
    pub name: String,
    #[schema(example = 11)]
    pub employee_count: i64,
}

#[derive(Serialize, ToSchema)]
pub struct DepartmentDetail {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Engineering")]
    pub name: String,
    pub employees: Vec<Employee>,
}

/// List Departments
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "Departments with employee counts", body = [DepartmentRow]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Department"
)]
pub async fn list_departments(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let departments = sqlx::query_as::<_, DepartmentRow>(
        "SELECT d.id, d.name, COUNT(e.id) AS employee_count \
         FROM departments d \
         LEFT JOIN employees e ON e.department_id = d.id \
         GROUP BY d.id, d.name \
         ORDER BY d.id",
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::Storage)?;

    Ok(HttpResponse::Ok().json(departments))
}

/// Get Department by ID
#[utoipa::path(
    get,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id" = u64, Path, description = "Department ID")
    ),
    responses(
        (status = 200, description = "Department with its employees", body = DepartmentDetail),
        (status = 404, description = "Department not found"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Department"
)]
pub async fn get_department(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();

    let department = sqlx::query_as::<_, Department>("SELECT id, name FROM departments WHERE id = ?")
        .bind(department_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(ApiError::Storage)?
        .ok_or(ApiError::NotFound("Department"))?;

    let employees = sqlx::query_as::<_, Employee>(
        "SELECT id, employee_code, first_name, last_name, email, position, department_id, hire_date \
         FROM employees WHERE department_id = ? ORDER BY id",
    )
    .bind(department_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(ApiError::Storage)?;

    Ok(HttpResponse::Ok().json(DepartmentDetail {
        id: department.id,
        name: department.name,
        employees,
    }))
}

/// Create Department
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Department"
)]
pub async fn create_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDepartment>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let id = sqlx::query("INSERT INTO departments (name) VALUES (?)")
        .bind(&payload.name)
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::Storage)?
        .last_insert_id();

    Ok(HttpResponse::Created().json(Department {
        id,
        name: payload.name.clone(),
    }))
}

/// Update Department
#[utoipa::path(
    put,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id" = u64, Path, description = "Department ID")
    ),
    request_body(
        content = Object,
        description = "Subset of department columns to update",
        example = json!({"name": "Platform Engineering"})
    ),
    responses(
        (status = 200, description = "Department updated", body = Object, example = json!({
            "message": "Department updated successfully"
        })),
        (status = 400, description = "Unknown field or empty payload"),
        (status = 404, description = "Department not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Department"
)]
pub async fn update_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let department_id = path.into_inner();
    let patch = build_patch("departments", DEPARTMENT_COLUMNS, &body, department_id)?;

    let affected = apply_patch(pool.get_ref(), patch)
        .await
        .map_err(ApiError::Storage)?;
    if affected == 0 {
        return Err(ApiError::NotFound("Department").into());
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Department updated successfully"
    })))
}

/// Delete Department
#[utoipa::path(
    delete,
    path = "/api/v1/departments/{department_id}",
    params(
        ("department_id" = u64, Path, description = "Department ID")
    ),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 404, description = "Department not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Department"
)]
pub async fn delete_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    // Removing a department orphans employee rows; admins only.
    auth.require_admin()?;

    let department_id = path.into_inner();

    let affected = sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(department_id)
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::Storage)?
        .rows_affected();

    if affected == 0 {
        return Err(ApiError::NotFound("Department").into());
    }

    Ok(HttpResponse::NoContent().finish())
}
