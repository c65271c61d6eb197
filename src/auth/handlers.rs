use actix_web::cookie::{time::Duration, Cookie};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::auth::auth::AuthUser;
use crate::auth::jwt::generate_session_token;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::AUTH_COOKIE;
use crate::config::Config;
use crate::db::Database;
use crate::error::ApiError;
use crate::model::role::Role;
use crate::models::{LoginReqDto, RegisterReqDto};
use crate::repository::users::NewUser;

/// Register a new account
///
/// Self-registration always produces a regular user; administrator accounts
/// are created through the user management API.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterReqDto,
    responses(
        (status = 201, description = "User registered successfully"),
        (status = 400, description = "Empty username or password"),
        (status = 409, description = "Username already taken")
    ),
    tag = "Auth"
)]
pub async fn register(
    payload: web::Json<RegisterReqDto>,
    db: web::Data<Database>,
) -> Result<impl Responder, ApiError> {
    let username = payload.username.trim();

    if username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password must not be empty".to_string(),
        ));
    }

    if db.users().get_by_username(username).await?.is_some() {
        return Err(ApiError::Conflict("Username already taken".to_string()));
    }

    let user = db
        .users()
        .insert(NewUser {
            username: username.to_string(),
            password: hash_password(&payload.password),
            full_name: payload.full_name.clone(),
            role_id: Role::User.id(),
            position_id: payload.position_id.clone(),
        })
        .await?;

    info!(username = %user.username, "User registered");

    Ok(HttpResponse::Created().json(json!({
        "message": "User registered successfully"
    })))
}

/// Log in
///
/// On success the response carries the HTTP-only `Authentication` cookie
/// holding the session token.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Logged in, session cookie set"),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(db, config, payload),
    fields(username = %payload.username)
)]
pub async fn login(
    payload: web::Json<LoginReqDto>,
    db: web::Data<Database>,
    config: web::Data<Config>,
) -> Result<impl Responder, ApiError> {
    info!("Login request received");

    if payload.username.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username or password required".to_string(),
        ));
    }

    debug!("Fetching user from database");

    let user = match db.users().get_by_username(&payload.username).await? {
        Some(user) => user,
        None => {
            info!("Invalid credentials: user not found");
            return Err(ApiError::Unauthorized("Invalid credentials"));
        }
    };

    debug!("Verifying password");

    if verify_password(&payload.password, &user.password).is_err() {
        info!("Invalid credentials: password mismatch");
        return Err(ApiError::Unauthorized("Invalid credentials"));
    }

    debug!("Generating session token");

    let token = generate_session_token(&user, &config.auth_secret, config.session_ttl);

    let cookie = Cookie::build(AUTH_COOKIE, token)
        .path("/")
        .http_only(true)
        .max_age(Duration::seconds(config.session_ttl as i64))
        .finish();

    info!("Login successful");

    Ok(HttpResponse::Ok().cookie(cookie).json(json!({
        "id": user.id,
        "username": user.username,
        "full_name": user.full_name,
        "role_id": user.role_id,
    })))
}

/// Log out
///
/// Clears the session cookie. Succeeds whether or not one was present.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 204, description = "Session cookie cleared")),
    tag = "Auth"
)]
pub async fn logout() -> impl Responder {
    let mut removal = Cookie::new(AUTH_COOKIE, "");
    removal.set_path("/");
    removal.make_removal();

    HttpResponse::NoContent().cookie(removal).finish()
}

/// Current principal's profile.
pub async fn me(auth: AuthUser, db: web::Data<Database>) -> Result<impl Responder, ApiError> {
    let user = db
        .users()
        .get_by_id(&auth.user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(HttpResponse::Ok().json(json!({
        "id": user.id,
        "username": user.username,
        "full_name": user.full_name,
        "role_id": user.role_id,
        "position_id": user.position_id,
    })))
}
