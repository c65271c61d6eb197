use actix_web::middleware::from_fn;
use actix_web::{http::StatusCode, test, web, App};
use serde_json::json;

use salesmon::api::categories;
use salesmon::auth::middleware::auth_middleware;
use salesmon::auth::{handlers, AUTH_COOKIE};
use salesmon::config::Config;
use salesmon::db::Database;

fn test_config() -> Config {
    Config {
        server_addr: "127.0.0.1:0".to_string(),
        database_path: ":memory:".to_string(),
        auth_secret: "test-secret".to_string(),
        session_ttl: 3600,
        rate_login_per_min: 60,
        rate_register_per_min: 30,
        rate_protected_per_min: 1000,
        api_prefix: "/api".to_string(),
    }
}

macro_rules! test_app {
    ($db:expr, $config:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($db.clone()))
                .app_data(web::Data::new($config.clone()))
                .service(
                    web::scope("/auth")
                        .route("/login", web::post().to(handlers::login))
                        .route("/register", web::post().to(handlers::register))
                        .route("/logout", web::post().to(handlers::logout)),
                )
                .service(
                    web::scope("/api")
                        .wrap(from_fn(auth_middleware))
                        .service(web::resource("/me").route(web::get().to(handlers::me)))
                        .service(
                            web::resource("/categories")
                                .route(web::post().to(categories::create_category))
                                .route(web::get().to(categories::list_categories)),
                        )
                        .service(
                            web::resource("/categories/{id}")
                                .route(web::get().to(categories::get_category))
                                .route(web::delete().to(categories::delete_category)),
                        ),
                ),
        )
        .await
    };
}

macro_rules! login_cookie {
    ($app:expr, $username:expr, $password:expr) => {{
        let req = test::TestRequest::post()
            .uri("/auth/login")
            .set_json(json!({ "username": $username, "password": $password }))
            .to_request();
        let resp = test::call_service(&$app, req).await;
        assert!(
            resp.status().is_success(),
            "login failed: {:?}",
            resp.status()
        );

        resp.response()
            .cookies()
            .find(|c| c.name() == AUTH_COOKIE)
            .expect("login must set the authentication cookie")
            .into_owned()
    }};
}

#[actix_web::test]
async fn login_sets_http_only_authentication_cookie() {
    let db = Database::in_memory().await.unwrap();
    let config = test_config();
    let app = test_app!(db, config);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "sa", "password": "123qwe" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == AUTH_COOKIE)
        .expect("authentication cookie");
    assert_eq!(cookie.http_only(), Some(true));
}

#[actix_web::test]
async fn wrong_password_is_unauthorized() {
    let db = Database::in_memory().await.unwrap();
    let config = test_config();
    let app = test_app!(db, config);

    let req = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "username": "sa", "password": "nope" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn protected_scope_rejects_requests_without_cookie() {
    let db = Database::in_memory().await.unwrap();
    let config = test_config();
    let app = test_app!(db, config);

    let req = test::TestRequest::get().uri("/api/categories").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn administrator_can_manage_categories() {
    let db = Database::in_memory().await.unwrap();
    let config = test_config();
    let app = test_app!(db, config);

    let cookie = login_cookie!(app, "sa", "123qwe");

    let req = test::TestRequest::post()
        .uri("/api/categories")
        .cookie(cookie.clone())
        .set_json(json!({ "name": "Beverages" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: serde_json::Value = test::read_body_json(resp).await;
    let id = created["id"].as_str().unwrap().to_string();

    let req = test::TestRequest::get()
        .uri("/api/categories")
        .cookie(cookie.clone())
        .to_request();
    let listed: serde_json::Value =
        test::call_and_read_body_json(&app, req).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/categories/{}", id))
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/categories/{}", id))
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn regular_user_is_denied_administrator_endpoints() {
    let db = Database::in_memory().await.unwrap();
    let config = test_config();
    let app = test_app!(db, config);

    let req = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "username": "jdoe",
            "password": "secret",
            "full_name": "John Doe"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let cookie = login_cookie!(app, "jdoe", "secret");

    // Reads are allowed under the User policy...
    let req = test::TestRequest::get()
        .uri("/api/categories")
        .cookie(cookie.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // ...but writes require the Administrator role.
    let req = test::TestRequest::post()
        .uri("/api/categories")
        .cookie(cookie)
        .set_json(json!({ "name": "Beverages" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn me_returns_the_logged_in_profile() {
    let db = Database::in_memory().await.unwrap();
    let config = test_config();
    let app = test_app!(db, config);

    let cookie = login_cookie!(app, "sa", "123qwe");

    let req = test::TestRequest::get()
        .uri("/api/me")
        .cookie(cookie)
        .to_request();
    let me: serde_json::Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["username"], "sa");
}
