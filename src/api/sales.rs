use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::api::users::require_self_or_administrator;
use crate::auth::auth::AuthUser;
use crate::db::Database;
use crate::error::ApiError;
use crate::model::sale::{Sale, SaleWithLines};
use crate::repository::sales::{NewSaleLine, SaleFilter};
use crate::service::salary::SalaryService;

#[derive(Deserialize, ToSchema)]
pub struct CreateSaleLine {
    pub product_id: String,
    #[schema(example = 2)]
    pub quantity: i64,
    /// Defaults to the product's current price when omitted.
    pub unit_price: Option<f64>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateSale {
    /// Defaults to the authenticated user; setting another seller requires
    /// the Administrator role.
    pub user_id: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub date_added: Option<DateTime<Utc>>,
    pub lines: Vec<CreateSaleLine>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateSale {
    pub user_id: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub date_added: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SaleQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub user_id: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub from: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub to: Option<DateTime<Utc>>,
}

#[derive(Serialize, ToSchema)]
pub struct SaleListResponse {
    pub data: Vec<Sale>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct SalesTotalQuery {
    pub user_id: String,
    #[schema(example = 2026)]
    pub year: u16,
    #[schema(example = 3)]
    pub month: u8,
}

/// Record a sale
#[utoipa::path(
    post,
    path = "/api/sales",
    request_body = CreateSale,
    responses(
        (status = 201, body = Sale),
        (status = 400, description = "No lines, or invalid quantity"),
        (status = 404, description = "Referenced product missing")
    ),
    security(("cookie_auth" = [])),
    tag = "Sales"
)]
pub async fn create_sale(
    auth: AuthUser,
    db: web::Data<Database>,
    payload: web::Json<CreateSale>,
) -> Result<impl Responder, ApiError> {
    auth.require_user()?;

    if payload.lines.is_empty() {
        return Err(ApiError::BadRequest(
            "A sale needs at least one line item".to_string(),
        ));
    }

    let user_id = match &payload.user_id {
        Some(other) if *other != auth.user_id => {
            auth.require_administrator()?;
            other.clone()
        }
        _ => auth.user_id.clone(),
    };

    let mut lines = Vec::with_capacity(payload.lines.len());
    for line in &payload.lines {
        if line.quantity <= 0 {
            return Err(ApiError::BadRequest(
                "Quantity must be positive".to_string(),
            ));
        }

        // Snapshot the current product price unless the caller fixed one.
        let unit_price = match line.unit_price {
            Some(price) => price,
            None => {
                db.products()
                    .get_by_id(&line.product_id)
                    .await?
                    .ok_or(ApiError::NotFound("Product"))?
                    .price
            }
        };

        lines.push(NewSaleLine {
            product_id: line.product_id.clone(),
            quantity: line.quantity,
            unit_price,
        });
    }

    let date_added = payload.date_added.unwrap_or_else(Utc::now);
    let sale = db.sales().create(&user_id, date_added, &lines).await?;

    debug!(id = %sale.id, "Sale recorded");

    Ok(HttpResponse::Created().json(sale))
}

/// List sales
#[utoipa::path(
    get,
    path = "/api/sales",
    params(SaleQuery),
    responses((status = 200, body = SaleListResponse)),
    security(("cookie_auth" = [])),
    tag = "Sales"
)]
pub async fn list_sales(
    auth: AuthUser,
    db: web::Data<Database>,
    query: web::Query<SaleQuery>,
) -> Result<impl Responder, ApiError> {
    auth.require_user()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let filter = SaleFilter {
        user_id: query.user_id.clone(),
        from: query.from,
        to: query.to,
    };

    let total = db.sales().count(&filter).await?;
    let data = db
        .sales()
        .list(&filter, per_page as i64, offset as i64)
        .await?;

    Ok(HttpResponse::Ok().json(SaleListResponse {
        data,
        page,
        per_page,
        total,
    }))
}

/// Get sale by id
///
/// Returns the sale row alone; use `/sales/{id}/full` for the line items.
#[utoipa::path(
    get,
    path = "/api/sales/{id}",
    params(("id", description = "Sale ID")),
    responses(
        (status = 200, body = Sale),
        (status = 404, description = "Sale not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Sales"
)]
pub async fn get_sale(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    auth.require_user()?;

    let sale = db
        .sales()
        .get_by_id(&path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Sale"))?;

    Ok(HttpResponse::Ok().json(sale))
}

/// Get sale with line items
#[utoipa::path(
    get,
    path = "/api/sales/{id}/full",
    params(("id", description = "Sale ID")),
    responses(
        (status = 200, body = SaleWithLines),
        (status = 404, description = "Sale not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Sales"
)]
pub async fn get_sale_full(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    auth.require_user()?;

    let sale = db
        .sales()
        .get_with_lines(&path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Sale"))?;

    Ok(HttpResponse::Ok().json(sale))
}

/// Update sale
#[utoipa::path(
    put,
    path = "/api/sales/{id}",
    params(("id", description = "Sale ID")),
    request_body = UpdateSale,
    responses(
        (status = 200, body = Sale),
        (status = 404, description = "Sale not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Sales"
)]
pub async fn update_sale(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
    payload: web::Json<UpdateSale>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    let mut sale = db
        .sales()
        .get_by_id(&path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Sale"))?;

    if let Some(user_id) = &payload.user_id {
        sale.user_id = user_id.clone();
    }
    if let Some(date_added) = payload.date_added {
        sale.date_added = date_added;
    }

    db.sales().update(&sale).await?;

    Ok(HttpResponse::Ok().json(sale))
}

/// Delete sale
///
/// Line items are removed with the sale; the referenced products stay.
#[utoipa::path(
    delete,
    path = "/api/sales/{id}",
    params(("id", description = "Sale ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Sale not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Sales"
)]
pub async fn delete_sale(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    db.sales().delete(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}

/// Monthly sales total for one seller
#[utoipa::path(
    get,
    path = "/api/sales/total",
    params(SalesTotalQuery),
    responses((status = 200, description = "Total revenue for the month")),
    security(("cookie_auth" = [])),
    tag = "Sales"
)]
pub async fn sales_total(
    auth: AuthUser,
    db: web::Data<Database>,
    query: web::Query<SalesTotalQuery>,
) -> Result<impl Responder, ApiError> {
    require_self_or_administrator(&auth, &query.user_id)?;

    let service = SalaryService::new(db.get_ref().clone());
    let total = service
        .monthly_sales_total(&query.user_id, query.year, query.month)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "user_id": query.user_id,
        "year": query.year,
        "month": query.month,
        "total": total,
    })))
}
