// src/routes/hotels.rs

use axum::{extract::{Path, Query, State}, Json};
use serde::{Deserialize, Serialize};
use sqlx::{query_as, query};
use crate::AppState;
use crate::models::Hotel;
use super::internal_error;

#[derive(Deserialize)]
pub struct ListQ {
    pub status: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateHotelBody {
    pub name: String,
    #[serde(default = "default_tz")] pub time_zone: String,
    #[serde(default = "default_status")] pub status: String,
}
fn default_tz() -> String { "Asia/Bangkok".into() }
fn default_status() -> String { "active".into() }

#[derive(Deserialize)]
pub struct PatchHotelBody {
    pub name: Option<String>,
    pub time_zone: Option<String>,
    pub status: Option<String>,
}

#[derive(Serialize)]
pub struct Deleted { pub deleted: bool }

pub async fn list_hotels(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<Hotel>>, (axum::http::StatusCode, String)> {
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0).max(0);
    let rows = if let Some(st) = q.status {
        query_as::<_, Hotel>(
            r#"SELECT * FROM public.hotels WHERE status = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3"#
        )
        .bind(st)
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool).await.map_err(internal_error)?
    } else {
        query_as::<_, Hotel>(
            r#"SELECT * FROM public.hotels ORDER BY created_at DESC LIMIT $1 OFFSET $2"#
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&state.pool).await.map_err(internal_error)?
    };
    Ok(Json(rows))
}

pub async fn get_hotel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Hotel>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Hotel>(
        r#"SELECT * FROM public.hotels WHERE hotel_id = $1"#
    )
    .bind(id)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn create_hotel(
    State(state): State<AppState>,
    Json(body): Json<CreateHotelBody>,
) -> Result<Json<Hotel>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Hotel>(
        r#"
        INSERT INTO public.hotels(name, time_zone, status)
        VALUES ($1,$2,$3)
        RETURNING hotel_id, name, time_zone, status, created_at, updated_at
        "#
    )
    .bind(&body.name)
    .bind(&body.time_zone)
    .bind(&body.status)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn patch_hotel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PatchHotelBody>,
) -> Result<Json<Hotel>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Hotel>(
        r#"
        UPDATE public.hotels SET
            name = COALESCE($2, name),
            time_zone = COALESCE($3, time_zone),
            status = COALESCE($4, status),
            updated_at = now()
        WHERE hotel_id = $1
        RETURNING hotel_id, name, time_zone, status, created_at, updated_at
        "#
    )
    .bind(id)
    .bind(body.name)
    .bind(body.time_zone)
    .bind(body.status)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_hotel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Deleted>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.hotels WHERE hotel_id = $1"#)
        .bind(id)
        .execute(&state.pool)
        .await
        .map_err(internal_error)?;
    Ok(Json(Deleted { deleted: res.rows_affected() > 0 }))
}
