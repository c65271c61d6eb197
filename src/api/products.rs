use actix_web::{web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::db::Database;
use crate::error::ApiError;
use crate::model::product::Product;
use crate::repository::products::{NewProduct, ProductFilter};

#[derive(Deserialize, ToSchema)]
pub struct CreateProduct {
    #[schema(example = "Coffee beans 1kg")]
    pub name: String,
    #[schema(example = 18.5)]
    pub price: f64,
    pub category_id: String,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateProduct {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ProductQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,
    #[schema(example = 20)]
    pub per_page: Option<u32>,
    pub category_id: Option<String>,
    pub search: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct ProductListResponse {
    pub data: Vec<Product>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// List products
#[utoipa::path(
    get,
    path = "/api/products",
    params(ProductQuery),
    responses((status = 200, body = ProductListResponse)),
    security(("cookie_auth" = [])),
    tag = "Products"
)]
pub async fn list_products(
    auth: AuthUser,
    db: web::Data<Database>,
    query: web::Query<ProductQuery>,
) -> Result<impl Responder, ApiError> {
    auth.require_user()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let filter = ProductFilter {
        category_id: query.category_id.clone(),
        search: query.search.clone(),
    };
    debug!(?filter, page, per_page, "Fetching products");

    let total = db.products().count(&filter).await?;
    let data = db
        .products()
        .list(&filter, per_page as i64, offset as i64)
        .await?;

    Ok(HttpResponse::Ok().json(ProductListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Get product by id
#[utoipa::path(
    get,
    path = "/api/products/{id}",
    params(("id", description = "Product ID")),
    responses(
        (status = 200, body = Product),
        (status = 404, description = "Product not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Products"
)]
pub async fn get_product(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    auth.require_user()?;

    let product = db
        .products()
        .get_by_id(&path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Product"))?;

    Ok(HttpResponse::Ok().json(product))
}

/// Create product
#[utoipa::path(
    post,
    path = "/api/products",
    request_body = CreateProduct,
    responses(
        (status = 201, body = Product),
        (status = 409, description = "Unknown category")
    ),
    security(("cookie_auth" = [])),
    tag = "Products"
)]
pub async fn create_product(
    auth: AuthUser,
    db: web::Data<Database>,
    payload: web::Json<CreateProduct>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name must not be empty".to_string()));
    }
    if payload.price < 0.0 {
        return Err(ApiError::BadRequest(
            "Price must not be negative".to_string(),
        ));
    }

    let product = db
        .products()
        .insert(NewProduct {
            name: payload.name.trim().to_string(),
            price: payload.price,
            category_id: payload.category_id.clone(),
        })
        .await?;

    Ok(HttpResponse::Created().json(product))
}

/// Update product
#[utoipa::path(
    put,
    path = "/api/products/{id}",
    params(("id", description = "Product ID")),
    request_body = UpdateProduct,
    responses(
        (status = 200, body = Product),
        (status = 404, description = "Product not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Products"
)]
pub async fn update_product(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
    payload: web::Json<UpdateProduct>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    let mut product = db
        .products()
        .get_by_id(&path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Product"))?;

    if let Some(name) = &payload.name {
        product.name = name.clone();
    }
    if let Some(price) = payload.price {
        if price < 0.0 {
            return Err(ApiError::BadRequest(
                "Price must not be negative".to_string(),
            ));
        }
        product.price = price;
    }
    if let Some(category_id) = &payload.category_id {
        product.category_id = category_id.clone();
    }

    db.products().update(&product).await?;

    Ok(HttpResponse::Ok().json(product))
}

/// Delete product
#[utoipa::path(
    delete,
    path = "/api/products/{id}",
    params(("id", description = "Product ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Product not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Products"
)]
pub async fn delete_product(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    db.products().delete(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}
