use std::collections::HashMap;

use actix_web::{HttpResponse, Responder, web};
use sqlx::MySqlPool;
use tracing::info;

use crate::auth::auth::AuthUser;
use crate::error::ApiError;
use crate::utils::policy_cache;

/// Read all settings
///
/// Returns the flat key/value map, e.g. `officialCheckIn` and
/// `officialCheckOut` used by attendance classification.
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "All settings as a key/value map", body = Object, example = json!({
            "officialCheckIn": "09:00:00",
            "officialCheckOut": "17:00:00"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn get_settings(pool: web::Data<MySqlPool>) -> actix_web::Result<impl Responder> {
    let map = policy_cache::settings_map(pool.get_ref())
        .await
        .map_err(ApiError::Storage)?;

    Ok(HttpResponse::Ok().json(map))
}

/// Upsert settings
///
/// Every `{key: value}` pair in the body is inserted or overwritten; there
/// is no partial failure across keys and no history kept.
#[utoipa::path(
    post,
    path = "/api/v1/settings",
    request_body(
        content = Object,
        description = "Key/value pairs to upsert",
        example = json!({"officialCheckIn": "08:30:00"})
    ),
    responses(
        (status = 200, description = "Settings updated", body = Object, example = json!({
            "message": "Settings updated successfully"
        })),
        (status = 400, description = "Empty payload"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Settings"
)]
pub async fn update_settings(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<HashMap<String, String>>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let updates = payload.into_inner();
    if updates.is_empty() {
        return Err(ApiError::Validation("No settings provided".into()).into());
    }

    for (key, value) in &updates {
        sqlx::query(
            "INSERT INTO settings (`key`, `value`) VALUES (?, ?) \
             ON DUPLICATE KEY UPDATE `value` = VALUES(`value`)",
        )
        .bind(key.as_str())
        .bind(value.as_str())
        .execute(pool.get_ref())
        .await
        .map_err(ApiError::Storage)?;
    }

    policy_cache::invalidate().await;
    info!(keys = updates.len(), "settings updated");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Settings updated successfully"
    })))
}
