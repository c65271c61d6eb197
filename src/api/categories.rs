use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::db::Database;
use crate::error::ApiError;

#[derive(Deserialize)]
pub struct CategoryReq {
    pub name: String,
}

pub async fn list_categories(
    auth: AuthUser,
    db: web::Data<Database>,
) -> Result<impl Responder, ApiError> {
    auth.require_user()?;

    let categories = db.categories().get_all().await?;

    Ok(HttpResponse::Ok().json(categories))
}

pub async fn get_category(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    auth.require_user()?;

    let category = db
        .categories()
        .get_by_id(&path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Category"))?;

    Ok(HttpResponse::Ok().json(category))
}

pub async fn create_category(
    auth: AuthUser,
    db: web::Data<Database>,
    payload: web::Json<CategoryReq>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    let name = payload.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Name must not be empty".to_string()));
    }

    let category = db.categories().insert(name.to_string()).await?;

    Ok(HttpResponse::Created().json(category))
}

pub async fn update_category(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
    payload: web::Json<CategoryReq>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    let mut category = db
        .categories()
        .get_by_id(&path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Category"))?;

    category.name = payload.name.trim().to_string();
    db.categories().update(&category).await?;

    Ok(HttpResponse::Ok().json(category))
}

/// Deleting a category that still has products is a foreign-key violation
/// and surfaces as 409.
pub async fn delete_category(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    db.categories().delete(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}
