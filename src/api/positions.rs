use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::db::Database;
use crate::error::ApiError;
use crate::model::position::Position;
use crate::repository::positions::NewPosition;

#[derive(Deserialize, ToSchema)]
pub struct CreatePosition {
    #[schema(example = "Sales clerk")]
    pub name: String,
    #[schema(example = 250.0)]
    pub hourly_rate: f64,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePosition {
    pub name: Option<String>,
    pub hourly_rate: Option<f64>,
}

/// List positions
#[utoipa::path(
    get,
    path = "/api/positions",
    responses((status = 200, body = [Position])),
    security(("cookie_auth" = [])),
    tag = "Positions"
)]
pub async fn list_positions(
    auth: AuthUser,
    db: web::Data<Database>,
) -> Result<impl Responder, ApiError> {
    auth.require_user()?;

    let positions = db.positions().get_all().await?;

    Ok(HttpResponse::Ok().json(positions))
}

/// Get position by id
#[utoipa::path(
    get,
    path = "/api/positions/{id}",
    params(("id", description = "Position ID")),
    responses(
        (status = 200, body = Position),
        (status = 404, description = "Position not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Positions"
)]
pub async fn get_position(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    auth.require_user()?;

    let position = db
        .positions()
        .get_by_id(&path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Position"))?;

    Ok(HttpResponse::Ok().json(position))
}

/// Create position
#[utoipa::path(
    post,
    path = "/api/positions",
    request_body = CreatePosition,
    responses((status = 201, body = Position)),
    security(("cookie_auth" = [])),
    tag = "Positions"
)]
pub async fn create_position(
    auth: AuthUser,
    db: web::Data<Database>,
    payload: web::Json<CreatePosition>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name must not be empty".to_string()));
    }
    if payload.hourly_rate < 0.0 {
        return Err(ApiError::BadRequest(
            "Hourly rate must not be negative".to_string(),
        ));
    }

    let position = db
        .positions()
        .insert(NewPosition {
            name: payload.name.trim().to_string(),
            hourly_rate: payload.hourly_rate,
        })
        .await?;

    Ok(HttpResponse::Created().json(position))
}

/// Update position
#[utoipa::path(
    put,
    path = "/api/positions/{id}",
    params(("id", description = "Position ID")),
    request_body = UpdatePosition,
    responses(
        (status = 200, body = Position),
        (status = 404, description = "Position not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Positions"
)]
pub async fn update_position(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
    payload: web::Json<UpdatePosition>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    let mut position = db
        .positions()
        .get_by_id(&path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Position"))?;

    if let Some(name) = &payload.name {
        position.name = name.clone();
    }
    if let Some(hourly_rate) = payload.hourly_rate {
        if hourly_rate < 0.0 {
            return Err(ApiError::BadRequest(
                "Hourly rate must not be negative".to_string(),
            ));
        }
        position.hourly_rate = hourly_rate;
    }

    db.positions().update(&position).await?;

    Ok(HttpResponse::Ok().json(position))
}

/// Delete position
#[utoipa::path(
    delete,
    path = "/api/positions/{id}",
    params(("id", description = "Position ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Position not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Positions"
)]
pub async fn delete_position(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    db.positions().delete(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}
