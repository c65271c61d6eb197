use crate::{
    api::{categories, positions, products, salaries, sales, users},
    auth::{handlers, middleware::auth_middleware},
    config::Config,
    docs,
};
use actix_governor::{
    governor::middleware::NoOpMiddleware, Governor, GovernorConfigBuilder, PeerIpKeyExtractor,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let register_limiter = Arc::new(build_limiter(config.rate_register_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::resource("/register")
                    .wrap(register_limiter)
                    .route(web::post().to(handlers::register)),
            )
            .service(
                web::resource("/logout")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::logout)),
            ),
    );

    cfg.service(web::resource("/api-doc/openapi.json").route(web::get().to(docs::openapi_json)));

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(web::resource("/me").route(web::get().to(handlers::me)))
            .service(
                web::scope("/users")
                    // /users
                    .service(
                        web::resource("")
                            .route(web::post().to(users::create_user))
                            .route(web::get().to(users::list_users)),
                    )
                    // /users/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(users::get_user))
                            .route(web::put().to(users::update_user))
                            .route(web::delete().to(users::delete_user)),
                    )
                    .service(
                        web::resource("/{id}/salaries")
                            .route(web::get().to(users::user_salaries)),
                    )
                    .service(
                        web::resource("/{id}/salaries/{year}/{month}")
                            .route(web::get().to(users::user_salary_by_date)),
                    ),
            )
            .service(
                web::scope("/positions")
                    .service(
                        web::resource("")
                            .route(web::post().to(positions::create_position))
                            .route(web::get().to(positions::list_positions)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(positions::get_position))
                            .route(web::put().to(positions::update_position))
                            .route(web::delete().to(positions::delete_position)),
                    ),
            )
            .service(
                web::scope("/categories")
                    .service(
                        web::resource("")
                            .route(web::post().to(categories::create_category))
                            .route(web::get().to(categories::list_categories)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(categories::get_category))
                            .route(web::put().to(categories::update_category))
                            .route(web::delete().to(categories::delete_category)),
                    ),
            )
            .service(
                web::scope("/products")
                    .service(
                        web::resource("")
                            .route(web::post().to(products::create_product))
                            .route(web::get().to(products::list_products)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(products::get_product))
                            .route(web::put().to(products::update_product))
                            .route(web::delete().to(products::delete_product)),
                    ),
            )
            .service(
                web::scope("/sales")
                    .service(
                        web::resource("")
                            .route(web::post().to(sales::create_sale))
                            .route(web::get().to(sales::list_sales)),
                    )
                    // registered before /{id} so "total" is not taken for a key
                    .service(web::resource("/total").route(web::get().to(sales::sales_total)))
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(sales::get_sale))
                            .route(web::put().to(sales::update_sale))
                            .route(web::delete().to(sales::delete_sale)),
                    )
                    .service(
                        web::resource("/{id}/full").route(web::get().to(sales::get_sale_full)),
                    ),
            )
            .service(
                web::scope("/salaries")
                    .service(
                        web::resource("")
                            .route(web::post().to(salaries::create_salary))
                            .route(web::get().to(salaries::list_salaries)),
                    )
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(salaries::get_salary))
                            .route(web::put().to(salaries::update_salary))
                            .route(web::delete().to(salaries::delete_salary)),
                    )
                    .service(
                        web::resource("/{id}/recalculate")
                            .route(web::post().to(salaries::recalculate_salary)),
                    ),
            ),
    );
}
