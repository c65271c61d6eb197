use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use tracing::info;
use utoipa::ToSchema;

use crate::api::users::require_self_or_administrator;
use crate::auth::auth::AuthUser;
use crate::db::Database;
use crate::error::ApiError;
use crate::model::salary::Salary;
use crate::repository::salaries::NewSalary;
use crate::service::salary::SalaryService;

#[derive(Deserialize, ToSchema)]
pub struct CreateSalary {
    pub user_id: String,
    #[schema(example = 2026)]
    pub year: u16,
    #[schema(example = 3)]
    pub month: u8,
    #[schema(example = 160.0)]
    pub hours_worked: f64,
    #[schema(example = 500.0)]
    pub bonus: Option<f64>,
    #[schema(example = 0.0)]
    pub deductions: Option<f64>,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateSalary {
    pub hours_worked: Option<f64>,
    pub bonus: Option<f64>,
    pub deductions: Option<f64>,
}

fn check_month(month: u8) -> Result<(), ApiError> {
    if (1..=12).contains(&month) {
        Ok(())
    } else {
        Err(ApiError::BadRequest("Month must be 1-12".to_string()))
    }
}

/// Create salary record
///
/// The net amount is computed from the user's position rate at creation
/// time; one record per user per calendar month.
#[utoipa::path(
    post,
    path = "/api/salaries",
    request_body = CreateSalary,
    responses(
        (status = 201, body = Salary),
        (status = 404, description = "User not found"),
        (status = 409, description = "Salary for that month already exists")
    ),
    security(("cookie_auth" = [])),
    tag = "Salaries"
)]
pub async fn create_salary(
    auth: AuthUser,
    db: web::Data<Database>,
    payload: web::Json<CreateSalary>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;
    check_month(payload.month)?;

    if db.users().get_by_id(&payload.user_id).await?.is_none() {
        return Err(ApiError::NotFound("User"));
    }

    let bonus = payload.bonus.unwrap_or(0.0);
    let deductions = payload.deductions.unwrap_or(0.0);

    let service = SalaryService::new(db.get_ref().clone());
    let rate = service.hourly_rate_for(&payload.user_id).await?;
    let amount = SalaryService::net_amount(rate, payload.hours_worked, bonus, deductions);

    let salary = db
        .salaries()
        .insert(NewSalary {
            user_id: payload.user_id.clone(),
            year: payload.year,
            month: payload.month,
            hours_worked: payload.hours_worked,
            bonus,
            deductions,
            amount,
        })
        .await?;

    info!(user_id = %salary.user_id, year = salary.year, month = salary.month, "Salary created");

    Ok(HttpResponse::Created().json(salary))
}

/// List salary records
#[utoipa::path(
    get,
    path = "/api/salaries",
    responses((status = 200, body = [Salary])),
    security(("cookie_auth" = [])),
    tag = "Salaries"
)]
pub async fn list_salaries(
    auth: AuthUser,
    db: web::Data<Database>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    let salaries = db.salaries().get_all().await?;

    Ok(HttpResponse::Ok().json(salaries))
}

/// Get salary by id
#[utoipa::path(
    get,
    path = "/api/salaries/{id}",
    params(("id", description = "Salary ID")),
    responses(
        (status = 200, body = Salary),
        (status = 404, description = "Salary not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Salaries"
)]
pub async fn get_salary(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    let salary = db
        .salaries()
        .get_by_id(&path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Salary"))?;

    require_self_or_administrator(&auth, &salary.user_id)?;

    Ok(HttpResponse::Ok().json(salary))
}

/// Update salary record
///
/// Hours, bonus and deductions are editable; the net amount is recomputed
/// from the owner's current position rate.
#[utoipa::path(
    put,
    path = "/api/salaries/{id}",
    params(("id", description = "Salary ID")),
    request_body = UpdateSalary,
    responses(
        (status = 200, body = Salary),
        (status = 404, description = "Salary not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Salaries"
)]
pub async fn update_salary(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
    payload: web::Json<UpdateSalary>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    let mut salary = db
        .salaries()
        .get_by_id(&path.into_inner())
        .await?
        .ok_or(ApiError::NotFound("Salary"))?;

    if let Some(hours_worked) = payload.hours_worked {
        salary.hours_worked = hours_worked;
    }
    if let Some(bonus) = payload.bonus {
        salary.bonus = bonus;
    }
    if let Some(deductions) = payload.deductions {
        salary.deductions = deductions;
    }

    let service = SalaryService::new(db.get_ref().clone());
    let rate = service.hourly_rate_for(&salary.user_id).await?;
    salary.amount =
        SalaryService::net_amount(rate, salary.hours_worked, salary.bonus, salary.deductions);

    db.salaries().update(&salary).await?;

    Ok(HttpResponse::Ok().json(salary))
}

/// Delete salary record
#[utoipa::path(
    delete,
    path = "/api/salaries/{id}",
    params(("id", description = "Salary ID")),
    responses(
        (status = 200, description = "Successfully deleted"),
        (status = 404, description = "Salary not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Salaries"
)]
pub async fn delete_salary(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    db.salaries().delete(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Successfully deleted" })))
}

/// Recalculate salary
///
/// Recomputes the stored net amount from the owner's current position rate.
#[utoipa::path(
    post,
    path = "/api/salaries/{id}/recalculate",
    params(("id", description = "Salary ID")),
    responses(
        (status = 200, body = Salary),
        (status = 404, description = "Salary not found")
    ),
    security(("cookie_auth" = [])),
    tag = "Salaries"
)]
pub async fn recalculate_salary(
    auth: AuthUser,
    db: web::Data<Database>,
    path: web::Path<String>,
) -> Result<impl Responder, ApiError> {
    auth.require_administrator()?;

    let service = SalaryService::new(db.get_ref().clone());
    let salary = service.recalculate(&path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(salary))
}
