// src/main.rs

use std::env;

use axum::{
    routing::{delete, get, patch, post},
    Router,
};
use sqlx::{Pool, Postgres};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;

mod db;
mod engine;
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
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
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
        // hotels
        .route(
            "/api/v1/hotels",
            post(routes::hotels::create_hotel).get(routes::hotels::list_hotels),
        )
        .route(
            "/api/v1/hotels/:hotel_id",
            get(routes::hotels::get_hotel)
                .patch(routes::hotels::patch_hotel)
                .delete(routes::hotels::delete_hotel),
        )
        // locations
        .route(
            "/api/v1/hotels/:hotel_id/locations",
            post(routes::locations::create_location)
                .get(routes::locations::list_locations_for_hotel),
        )
        .route(
            "/api/v1/locations/:id",
            patch(routes::locations::patch_location).delete(routes::locations::delete_location),
        )
        // users
        .route(
            "/api/v1/users",
            post(routes::users::create_user).get(routes::users::list_users),
        )
        .route(
            "/api/v1/users/:id",
            patch(routes::users::patch_user).delete(routes::users::delete_user),
        )
        // assets
        .route(
            "/api/v1/assets",
            post(routes::assets::create_asset).get(routes::assets::list_assets),
        )
        .route(
            "/api/v1/assets/:id",
            get(routes::assets::get_asset)
                .patch(routes::assets::patch_asset)
                .delete(routes::assets::delete_asset),
        )
        // assignment rules
        .route(
            "/api/v1/hotels/:hotel_id/assignment-rules",
            post(routes::assignment_rules::create_rule)
                .get(routes::assignment_rules::list_rules),
        )
        .route(
            "/api/v1/assignment-rules/:id",
            get(routes::assignment_rules::get_rule)
                .patch(routes::assignment_rules::patch_rule)
                .delete(routes::assignment_rules::deactivate_rule),
        )
        // work orders (+ SLA lifecycle)
        .route(
            "/api/v1/work-orders",
            post(routes::work_orders::create_work_order)
                .get(routes::work_orders::list_work_orders),
        )
        .route(
            "/api/v1/work-orders/:id",
            get(routes::work_orders::get_work_order)
                .patch(routes::work_orders::patch_work_order)
                .delete(routes::work_orders::delete_work_order),
        )
        .route(
            "/api/v1/work-orders/:id/sla",
            get(routes::slas::get_for_work_order),
        )
        .route("/api/v1/slas/overdue", get(routes::slas::list_overdue))
        // preventive maintenance
        .route(
            "/api/v1/hotels/:hotel_id/ppm-schedules",
            post(routes::ppm::create_schedule).get(routes::ppm::list_schedules),
        )
        .route(
            "/api/v1/hotels/:hotel_id/ppm-schedules/generate-due",
            post(routes::ppm::generate_due),
        )
        .route(
            "/api/v1/ppm-schedules/:id",
            patch(routes::ppm::patch_schedule).delete(routes::ppm::delete_schedule),
        )
        // training compliance
        .route(
            "/api/v1/trainings",
            post(routes::trainings::create_training).get(routes::trainings::list_trainings),
        )
        .route("/api/v1/trainings/expiring", get(routes::trainings::list_expiring))
        .route("/api/v1/trainings/:id", delete(routes::trainings::delete_training))
        // reporting
        .route("/api/v1/kpi/:hotel_id", get(routes::kpi::get_kpi))
        .route(
            "/api/v1/hotels/:hotel_id/audit-packs",
            post(routes::audit_packs::create_pack).get(routes::audit_packs::list_packs),
        )
        .route("/api/v1/audit-packs/:id", get(routes::audit_packs::get_pack))
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

    let api_base = format!("http://127.0.0.1:{port}");
    println!("✅ PORT={}, using {}", port, addr);
    println!("🚀 API listening on {api_base}");

    axum::serve(listener, api.into_make_service()).await?;
    Ok(())
}
