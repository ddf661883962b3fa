// src/routes/trainings.rs

use axum::{extract::{Path, Query, State}, Json};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::{query, query_as};
use crate::{AppState, models::TrainingRecord};
use super::internal_error;

#[derive(Deserialize)]
pub struct ListQ {
    pub hotel_id: Option<i64>,
    pub user_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateTrainingBody {
    pub hotel_id: i64,
    pub user_id: i64,
    pub course: String,
    pub completed_on: NaiveDate,
    pub expires_on: Option<NaiveDate>,
    pub certificate_no: Option<String>,
}

#[derive(Deserialize)]
pub struct ExpiringQ {
    pub hotel_id: i64,
    pub within_days: Option<i32>,
}

pub async fn create_training(
    State(state): State<AppState>,
    Json(b): Json<CreateTrainingBody>,
) -> Result<Json<TrainingRecord>, (StatusCode, String)> {
    let row = query_as::<_, TrainingRecord>(
        r#"
        INSERT INTO public.training_records
            (hotel_id, user_id, course, completed_on, expires_on, certificate_no)
        VALUES ($1,$2,$3,$4,$5,$6)
        RETURNING training_record_id, hotel_id, user_id, course, completed_on, expires_on,
                  certificate_no, created_at
        "#,
    )
    .bind(b.hotel_id)
    .bind(b.user_id)
    .bind(&b.course)
    .bind(b.completed_on)
    .bind(b.expires_on)
    .bind(&b.certificate_no)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_trainings(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<TrainingRecord>>, (StatusCode, String)> {
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0).max(0);

    let rows = query_as::<_, TrainingRecord>(
        r#"
        SELECT training_record_id, hotel_id, user_id, course, completed_on, expires_on,
               certificate_no, created_at
        FROM public.training_records
        WHERE ($1::bigint IS NULL OR hotel_id = $1)
          AND ($2::bigint IS NULL OR user_id = $2)
        ORDER BY completed_on DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(q.hotel_id)
    .bind(q.user_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

// GET /api/v1/trainings/expiring?hotel_id=&within_days=
pub async fn list_expiring(
    State(state): State<AppState>,
    Query(q): Query<ExpiringQ>,
) -> Result<Json<Vec<TrainingRecord>>, (StatusCode, String)> {
    let within_days = q.within_days.unwrap_or(30).max(0);
    let rows = query_as::<_, TrainingRecord>(
        r#"
        SELECT training_record_id, hotel_id, user_id, course, completed_on, expires_on,
               certificate_no, created_at
        FROM public.training_records
        WHERE hotel_id = $1
          AND expires_on IS NOT NULL
          AND expires_on <= CURRENT_DATE + $2::int
        ORDER BY expires_on
        "#,
    )
    .bind(q.hotel_id)
    .bind(within_days)
    .fetch_all(&state.pool).await.map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn delete_training(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let res = query(r#"DELETE FROM public.training_records WHERE training_record_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}
