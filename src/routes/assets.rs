// src/routes/assets.rs

use axum::{extract::{Path, Query, State}, Json};
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{query_as, query};
use crate::{AppState, models::Asset};
use super::internal_error;

#[derive(Deserialize)]
pub struct ListAssetsQ {
    pub hotel_id: Option<i64>,
    pub location_id: Option<i64>,
    pub status: Option<String>,
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateAssetBody {
    pub hotel_id: i64,
    pub location_id: Option<i64>,
    pub name: String,
    pub category: String,
    pub serial_no: Option<String>,
    #[serde(default = "default_status")] pub status: String,
    pub warranty_expiry: Option<NaiveDate>,
}
fn default_status() -> String { "operational".into() }

#[derive(Deserialize)]
pub struct PatchAssetBody {
    pub location_id: Option<i64>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub serial_no: Option<String>,
    pub status: Option<String>,
    pub warranty_expiry: Option<NaiveDate>,
}

pub async fn list_assets(
    State(state): State<AppState>,
    Query(q): Query<ListAssetsQ>,
) -> Result<Json<Vec<Asset>>, (axum::http::StatusCode, String)> {
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0).max(0);

    // optional filters collapse into one query
    let rows = query_as::<_, Asset>(
        r#"
        SELECT asset_id, hotel_id, location_id, name, category, serial_no, status, warranty_expiry, created_at, updated_at
        FROM public.assets
        WHERE ($1::bigint IS NULL OR hotel_id = $1)
          AND ($2::bigint IS NULL OR location_id = $2)
          AND ($3::text IS NULL OR status = $3)
          AND ($4::text IS NULL OR category = $4)
        ORDER BY asset_id DESC
        LIMIT $5 OFFSET $6
        "#
    )
    .bind(q.hotel_id)
    .bind(q.location_id)
    .bind(q.status)
    .bind(q.category)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn get_asset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Asset>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Asset>(
        r#"SELECT * FROM public.assets WHERE asset_id = $1"#
    )
    .bind(id)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn create_asset(
    State(state): State<AppState>,
    Json(b): Json<CreateAssetBody>,
) -> Result<Json<Asset>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Asset>(
        r#"
        INSERT INTO public.assets(hotel_id, location_id, name, category, serial_no, status, warranty_expiry)
        VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING asset_id, hotel_id, location_id, name, category, serial_no, status, warranty_expiry, created_at, updated_at
        "#
    )
    .bind(b.hotel_id)
    .bind(b.location_id)
    .bind(b.name)
    .bind(b.category)
    .bind(b.serial_no)
    .bind(b.status)
    .bind(b.warranty_expiry)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn patch_asset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchAssetBody>,
) -> Result<Json<Asset>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Asset>(
        r#"
        UPDATE public.assets SET
          location_id = COALESCE($2, location_id),
          name = COALESCE($3, name),
          category = COALESCE($4, category),
          serial_no = COALESCE($5, serial_no),
          status = COALESCE($6, status),
          warranty_expiry = COALESCE($7, warranty_expiry),
          updated_at = now()
        WHERE asset_id = $1
        RETURNING asset_id, hotel_id, location_id, name, category, serial_no, status, warranty_expiry, created_at, updated_at
        "#
    )
    .bind(id)
    .bind(b.location_id)
    .bind(b.name)
    .bind(b.category)
    .bind(b.serial_no)
    .bind(b.status)
    .bind(b.warranty_expiry)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_asset(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.assets WHERE asset_id = $1"#)
        .bind(id)
        .execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "deleted": res.rows_affected() > 0 })))
}
