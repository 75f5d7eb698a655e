// src/lib.rs

use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;
use crate::middleware::{api_key::API_KEY_HEADER, tenancy::ORG_ID_HEADER};

/// The complete HTTP surface, ready to be served.
pub fn app(app_state: AppState) -> Router {
    let organisation_routes = Router::new()
        .route(
            "/",
            post(handlers::organisations::create_organisation)
                .get(handlers::organisations::list_organisations),
        )
        .route("/{org_id}", put(handlers::organisations::update_organisation));

    let user_routes = Router::new()
        .route(
            "/",
            post(handlers::users::create_user).get(handlers::users::list_users),
        )
        .route("/login", post(handlers::users::login))
        .route("/admin/create", post(handlers::users::create_admin))
        .route("/owner/create", post(handlers::users::create_owner))
        .route("/roles", get(handlers::users::list_roles))
        .route("/statuses", get(handlers::users::list_statuses))
        .route("/uid/{uid}", put(handlers::users::update_user))
        .route("/uid/{uid}/setpassword", put(handlers::users::set_password))
        .route("/{user_id}", get(handlers::users::get_user));

    let prospect_routes = Router::new()
        .route(
            "/",
            post(handlers::prospects::create_prospect).get(handlers::prospects::list_prospects),
        )
        .route("/count", get(handlers::prospects::count_prospects))
        .route(
            "/{uid}",
            get(handlers::prospects::get_prospect).put(handlers::prospects::update_prospect),
        );

    let api_routes = Router::new()
        .nest("/organisations", organisation_routes)
        .nest("/users", user_routes)
        .nest("/prospects", prospect_routes);

    let cors = cors_layer(&app_state.config.cors_origins);

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(API_KEY_HEADER),
            HeaderName::from_static(ORG_ID_HEADER),
        ])
}
