use actix_web::{HttpResponse, Responder};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{openapi, Modify, OpenApi};

use crate::api::products::{
    CreateProduct, ProductListResponse, ProductQuery, UpdateProduct,
};
use crate::api::salaries::{CreateSalary, UpdateSalary};
use crate::api::sales::{
    CreateSale, CreateSaleLine, SaleListResponse, SaleQuery, SalesTotalQuery, UpdateSale,
};
use crate::api::users::{CreateUser, UpdateUser, UserResponse};
use crate::api::positions::{CreatePosition, UpdatePosition};
use crate::auth::AUTH_COOKIE;
use crate::model::position::Position;
use crate::model::product::Product;
use crate::model::salary::Salary;
use crate::model::sale::{Sale, SaleWithLines};
use crate::model::sale_product::SaleProduct;
use crate::models::{LoginReqDto, RegisterReqDto};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Salary & Sales Monitoring API",
        version = "1.0.0",
        description = r#"
Backend for monitoring sales and the monthly salaries derived from them.

- **Users & Positions**: accounts, roles and hourly rates
- **Catalog**: categories and products
- **Sales**: sale records with per-product line items
- **Salaries**: one record per user per month, recalculated on demand

Authentication is a session token carried in the HTTP-only `Authentication`
cookie; most endpoints additionally require the Administrator role.
"#,
    ),
    paths(
        crate::auth::handlers::register,
        crate::auth::handlers::login,
        crate::auth::handlers::logout,

        crate::api::users::list_users,
        crate::api::users::get_user,
        crate::api::users::create_user,
        crate::api::users::update_user,
        crate::api::users::delete_user,
        crate::api::users::user_salaries,
        crate::api::users::user_salary_by_date,

        crate::api::positions::list_positions,
        crate::api::positions::get_position,
        crate::api::positions::create_position,
        crate::api::positions::update_position,
        crate::api::positions::delete_position,

        crate::api::products::list_products,
        crate::api::products::get_product,
        crate::api::products::create_product,
        crate::api::products::update_product,
        crate::api::products::delete_product,

        crate::api::sales::create_sale,
        crate::api::sales::list_sales,
        crate::api::sales::get_sale,
        crate::api::sales::get_sale_full,
        crate::api::sales::update_sale,
        crate::api::sales::delete_sale,
        crate::api::sales::sales_total,

        crate::api::salaries::create_salary,
        crate::api::salaries::list_salaries,
        crate::api::salaries::get_salary,
        crate::api::salaries::update_salary,
        crate::api::salaries::delete_salary,
        crate::api::salaries::recalculate_salary
    ),
    components(
        schemas(
            RegisterReqDto,
            LoginReqDto,
            UserResponse,
            CreateUser,
            UpdateUser,
            Position,
            CreatePosition,
            UpdatePosition,
            Product,
            CreateProduct,
            UpdateProduct,
            ProductQuery,
            ProductListResponse,
            Sale,
            SaleProduct,
            SaleWithLines,
            CreateSale,
            CreateSaleLine,
            UpdateSale,
            SaleQuery,
            SaleListResponse,
            SalesTotalQuery,
            Salary,
            CreateSalary,
            UpdateSalary
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration and session management"),
        (name = "Users", description = "User management APIs"),
        (name = "Positions", description = "Position management APIs"),
        (name = "Products", description = "Product catalog APIs"),
        (name = "Sales", description = "Sales monitoring APIs"),
        (name = "Salaries", description = "Salary management APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "cookie_auth",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::new(AUTH_COOKIE))),
        );
    }
}

pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
