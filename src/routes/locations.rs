// src/routes/locations.rs

use axum::{extract::{Path, State}, Json};
use serde::Deserialize;
use sqlx::{query_as, query};
use crate::{AppState, models::Location};
use super::internal_error;

#[derive(Deserialize)]
pub struct CreateLocationBody {
    pub name: String,
    pub floor: Option<String>,
    #[serde(default = "default_kind")] pub kind: String,
}
fn default_kind() -> String { "room".into() }

#[derive(Deserialize)]
pub struct PatchLocationBody {
    pub name: Option<String>,
    pub floor: Option<String>,
    pub kind: Option<String>,
}

pub async fn create_location(
    State(state): State<AppState>,
    Path(hotel_id): Path<i64>,
    Json(body): Json<CreateLocationBody>,
) -> Result<Json<Location>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Location>(
        r#"
        INSERT INTO public.locations(hotel_id, name, floor, kind)
        VALUES ($1,$2,$3,$4)
        RETURNING location_id, hotel_id, name, floor, kind
        "#
    )
    .bind(hotel_id)
    .bind(&body.name)
    .bind(&body.floor)
    .bind(&body.kind)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_locations_for_hotel(
    State(state): State<AppState>,
    Path(hotel_id): Path<i64>,
) -> Result<Json<Vec<Location>>, (axum::http::StatusCode, String)> {
    let rows = query_as::<_, Location>(
        r#"
        SELECT location_id, hotel_id, name, floor, kind
        FROM public.locations
        WHERE hotel_id = $1
        ORDER BY location_id
        "#
    )
    .bind(hotel_id)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn patch_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PatchLocationBody>,
) -> Result<Json<Location>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, Location>(
        r#"
        UPDATE public.locations SET
          name = COALESCE($2, name),
          floor = COALESCE($3, floor),
          kind = COALESCE($4, kind)
        WHERE location_id = $1
        RETURNING location_id, hotel_id, name, floor, kind
        "#
    )
    .bind(id)
    .bind(body.name)
    .bind(body.floor)
    .bind(body.kind)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.locations WHERE location_id = $1"#)
        .bind(id)
        .execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "deleted": res.rows_affected() > 0 })))
}
