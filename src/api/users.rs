use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::auth::password::hash_password;
use crate::db::Database;
use crate::error::ApiError;
use crate::model::role::Role;
use crate::model::salary::Salary;
use crate::model::user::User;
use crate::repository::users::NewUser;

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "John Doe")]
    pub full_name: String,
    #[schema(example = 2)]
    pub role_id: u8,
    pub position_id: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            id: user.id,
            username: user.username,
            full_name: user.full_name,
            role_id: user.role_id,
            position_id: user.position_id,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateUser {
    #[schema(example = "jdoe")]
    pub username: String,
    pub password: String,
    #[schema(example = "John Doe")]
    pub full_name: String,
    #[schema(example = 2)]
    pub role_id: u8,
    pub position_id: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub password: Option<String>,
    pub full_name: Option<String>,
    pub role_id: Option<u8>,
    pub position_id: Option<String>,
}

/// Admin-or-owner guard for per-user resources.
pub fn require_self_or_administrator(auth: &AuthUser, user_id: &str) -> Result<(), ApiError> {
    if auth.is_administrator() || auth.user_id == user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Administrator or owner only"))
    }
}

/// List users
#[utoipa::path(
    get,
    path = "/api/users",
    responses((status = 200, body = [UserResponse])),
    security(("cookie_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    auth: AuthUser,
    db: web::Data<Database>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    let users = db.users().get_all().await?;
    let users: Vec<UserResponse> = users.into_iter().map(UserResponse::from).collect();

    Ok(HttpResponse::Ok().json(users))
}

/// Get user by id
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id", description = "User ID")),
    responses(
        (status = 200, body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let user_id = path.into_inner();
    require_self_or_administrator(&auth, &user_id)?;

    let user = db
        .users()
        .get_by_id(&user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Create user
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUser,
    responses(
        (status = 201, body = UserResponse),
        (status = 400, description = "Invalid payload"),
        (status = 409, description = "Username already taken")
    ),
    security(("cookie_auth" = [])),
    tag = "Users"
)]
pub async fn create_user(
    auth: AuthUser,
    db: web::Data<Database>,
    payload: web::Json<CreateUser>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    let username = payload.username.trim();
    if username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest(
            "Username and password must not be empty".to_string(),
        ));
    }

    if Role::from_id(payload.role_id).is_none() {
        return Err(ApiError::BadRequest("Unknown role".to_string()));
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
            role_id: payload.role_id,
            position_id: payload.position_id.clone(),
        })
        .await?;

    info!(username = %user.username, "User created");

    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

/// Update user
#[utoipa::path(
    put,
    path = "/api/users/{id}",
    params(("id", description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Users"
)]
pub async fn update_user(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
    payload: web::Json<UpdateUser>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    let user_id = path.into_inner();
    let mut user = db
        .users()
        .get_by_id(&user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    if let Some(username) = &payload.username {
        user.username = username.clone();
    }
    if let Some(password) = &payload.password {
        user.password = hash_password(password);
    }
    if let Some(full_name) = &payload.full_name {
        user.full_name = full_name.clone();
    }
    if let Some(role_id) = payload.role_id {
        if Role::from_id(role_id).is_none() {
            return Err(ApiError::BadRequest("Unknown role".to_string()));
        }
        user.role_id = role_id;
    }
    if let Some(position_id) = &payload.position_id {
        user.position_id = Some(position_id.clone());
    }

    db.users().update(&user).await?;

    Ok(HttpResponse::Ok().json(UserResponse::from(user)))
}

/// Delete user
#[utoipa::path(
    delete,
    path = "/api/users/{id}",
    params(("id", description = "User ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "User not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Users"
)]
pub async fn delete_user(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    let user_id = path.into_inner();
    db.users().delete(&user_id).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}

/// All salaries of one user
#[utoipa::path(
    get,
    path = "/api/users/{id}/salaries",
    params(("id", description = "User ID")),
    responses((status = 200, body = [Salary])),
    security(("cookie_auth" = [])),
    tag = "Users"
)]
pub async fn user_salaries(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let user_id = path.into_inner();
    require_self_or_administrator(&auth, &user_id)?;

    let salaries = db.salaries().get_for_user(&user_id).await?;

    Ok(HttpResponse::Ok().json(salaries))
}

/// One user's salary for a given month
#[utoipa::path(
    get,
    path = "/api/users/{id}/salaries/{year}/{month}",
    params(
        ("id", description = "User ID"),
        ("year", description = "Calendar year"),
        ("month", description = "Calendar month, 1-12")
    ),
    responses(
        (status = 200, body = Salary),
        (status = 404, description = "No salary for that month")
    ),
    security(("cookie_auth" = [])),
    tag = "Users"
)]
pub async fn user_salary_by_date(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<(String, u16, u8)>,
) -> Result<impl Responder, ApiError> {
    let (user_id, year, month) = path.into_inner();
    require_self_or_administrator(&auth, &user_id)?;

    let salary = db
        .salaries()
        .get_by_date(&user_id, year, month)
        .await?
        .ok_or(ApiError::NotFound("Salary"))?;

    Ok(HttpResponse::Ok().json(salary))
}
