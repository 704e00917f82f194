// src/main.rs

use std::env;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::{Pool, Postgres};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

mod capacity;
mod db;
mod models;
mod routes;

#[derive(Clone)]
pub struct AppState {
    pub pool: Pool<Postgres>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from .env if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Initialize DB pool
    let pool = db::connect().await?;
    let state = AppState { pool };

    // Very permissive CORS for local dev (tighten for prod)
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Root API router
    let api = Router::new()
        // health
        .route("/health", get(routes::health::health))
        // properties (tenants)
        .route(
            "/api/v1/properties",
            post(routes::properties::create_property).get(routes::properties::list_properties),
        )
        .route(
            "/api/v1/properties/:id",
            get(routes::properties::get_property)
                .patch(routes::properties::patch_property)
                .delete(routes::properties::delete_property),
        )
        // bookable resources
        .route(
            "/api/v1/properties/:property_id/resources",
            post(routes::resources::create_resource)
                .get(routes::resources::list_resources_for_property),
        )
        .route(
            "/api/v1/resources/:id",
            get(routes::resources::get_resource)
                .patch(routes::resources::patch_resource)
                .delete(routes::resources::delete_resource),
        )
        // bookings
        .route(
            "/api/v1/resources/:resource_id/bookings",
            post(routes::bookings::create_booking)
                .get(routes::bookings::list_bookings_for_resource),
        )
        .route("/api/v1/bookings", get(routes::bookings::list_bookings))
        .route(
            "/api/v1/bookings/:id",
            get(routes::bookings::get_booking)
                .patch(routes::bookings::patch_booking)
                .delete(routes::bookings::delete_booking),
        )
        // availability (materialized view + live check)
        .route(
            "/api/v1/resources/:id/availability",
            get(routes::availability::list_availability),
        )
        .route(
            "/api/v1/resources/:id/availability/rebuild",
            post(routes::availability::rebuild_availability),
        )
        .route(
            "/api/v1/resources/:id/availability/check",
            get(routes::availability::check_availability),
        )
        // state & middleware
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // Port (axum 0.7 style)
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(8080); // default 8080

    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;

    tracing::info!("🚀 API listening on http://127.0.0.1:{port}");

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}
