use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info, instrument};

use crate::auth::auth::AuthUser;
use crate::auth::jwt::{issue_token, verify_token};
use crate::auth::password::{hash_password, verify_password};
use crate::config::Config;
use crate::model::role::Role;
use crate::model::user::User;
use crate::models::{LoginReq, RefreshReq, RegisterReq, TokenType};

#[derive(Serialize)]
struct TokenPair {
    access_token: String,
    refresh_token: String,
}

async fn fetch_user(username: &str, pool: &MySqlPool) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "SELECT id, username, password, role_id, employee_id, is_active \
         FROM users WHERE username = ? AND is_active = 1",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

/// User registration handler
pub async fn register(user: web::Json<RegisterReq>, pool: web::Data<MySqlPool>) -> impl Responder {
    let username = user.username.trim().to_lowercase();

    if username.is_empty() || user.password.is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Username and password must not be empty"
        }));
    }

    if Role::from_id(user.role_id).is_none() {
        return HttpResponse::BadRequest().json(json!({
            "error": "Unknown role"
        }));
    }

    let hashed = match hash_password(&user.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            }));
        }
    };

    let result = sqlx::query(
        "INSERT INTO users (username, password, role_id, employee_id, is_active) \
         VALUES (?, ?, ?, ?, 1)",
    )
    .bind(&username)
    .bind(&hashed)
    .bind(user.role_id)
    .bind(user.employee_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => {
            info!(username = %username, "user registered");
            HttpResponse::Created().json(json!({
                "message": "User registered successfully"
            }))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return HttpResponse::Conflict().json(json!({
                        "error": "Username already exists"
                    }));
                }
            }

            error!(error = %e, "Failed to register user");
            HttpResponse::InternalServerError().json(json!({
                "error": "Failed to register user"
            }))
        }
    }
}

#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(username = %user.username)
)]
pub async fn login(
    user: web::Json<LoginReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let found = match fetch_user(&user.username.to_lowercase(), pool.get_ref()).await {
        Ok(found) => found,
        Err(e) => {
            error!(error = %e, "Login lookup failed");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal Server Error"
            }));
        }
    };

    // Same response for unknown user and bad password.
    let Some(record) = found else {
        return HttpResponse::Unauthorized().json(json!({
            "error": "Invalid username or password"
        }));
    };

    if !verify_password(&user.password, &record.password) {
        return HttpResponse::Unauthorized().json(json!({
            "error": "Invalid username or password"
        }));
    }

    let access_token = issue_token(
        &record,
        TokenType::Access,
        &config.jwt_secret,
        config.access_token_ttl,
    );
    let refresh_token = issue_token(
        &record,
        TokenType::Refresh,
        &config.jwt_secret,
        config.refresh_token_ttl,
    );

    info!("login succeeded");
    HttpResponse::Ok().json(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Exchanges a valid refresh token for a fresh access token.
pub async fn refresh_token(
    body: web::Json<RefreshReq>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let claims = match verify_token(&body.refresh_token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => {
            return HttpResponse::Unauthorized().json(json!({
                "error": "Invalid or expired refresh token"
            }));
        }
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().json(json!({
            "error": "Refresh token required"
        }));
    }

    // Re-read the user so a deactivated account stops refreshing.
    let found = match fetch_user(&claims.sub, pool.get_ref()).await {
        Ok(found) => found,
        Err(e) => {
            error!(error = %e, "Refresh lookup failed");
            return HttpResponse::InternalServerError().json(json!({
                "error": "Internal Server Error"
            }));
        }
    };

    let Some(record) = found else {
        return HttpResponse::Unauthorized().json(json!({
            "error": "Account disabled"
        }));
    };

    let access_token = issue_token(
        &record,
        TokenType::Access,
        &config.jwt_secret,
        config.access_token_ttl,
    );

    HttpResponse::Ok().json(json!({ "access_token": access_token }))
}

/// Tokens are stateless; the client discards them. Kept so clients have a
/// uniform endpoint to call.
pub async fn logout() -> impl Responder {
    HttpResponse::Ok().json(json!({ "message": "Logged out" }))
}

/// Identity of the calling principal.
pub async fn me(auth: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "user_id": auth.user_id,
        "username": auth.username,
        "role": format!("{:?}", auth.role),
        "employee_id": auth.employee_id,
    }))
}
