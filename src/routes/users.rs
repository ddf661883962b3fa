// src/routes/users.rs

use axum::{extract::{Path, Query, State}, Json};
use serde::Deserialize;
use sqlx::{query_as, query};
use crate::{AppState, models::User};
use super::internal_error;

#[derive(Deserialize)]
pub struct ListUsersQ {
    pub hotel_id: Option<i64>,
    pub role: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct CreateUserBody {
    pub hotel_id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(default = "default_role")] pub role: String,
}
fn default_role() -> String { "STAFF".into() }

#[derive(Deserialize)]
pub struct PatchUserBody {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub is_active: Option<bool>,
}

pub async fn create_user(
    State(state): State<AppState>,
    Json(b): Json<CreateUserBody>,
) -> Result<Json<User>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, User>(
        r#"
        INSERT INTO public.users(hotel_id, full_name, email, role)
        VALUES ($1,$2,$3,$4)
        RETURNING user_id, hotel_id, full_name, email, role, is_active, created_at, updated_at
        "#
    )
    .bind(b.hotel_id).bind(b.full_name).bind(b.email).bind(b.role)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_users(
    State(state): State<AppState>,
    Query(q): Query<ListUsersQ>,
) -> Result<Json<Vec<User>>, (axum::http::StatusCode, String)> {
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0).max(0);

    let rows = match (q.hotel_id, q.role) {
        (Some(h), Some(role)) => {
            query_as::<_, User>(r#"SELECT * FROM public.users WHERE hotel_id=$1 AND role=$2 ORDER BY user_id DESC LIMIT $3 OFFSET $4"#)
                .bind(h).bind(role).bind(limit).bind(offset)
                .fetch_all(&state.pool).await.map_err(internal_error)?
        }
        (Some(h), None) => {
            query_as::<_, User>(r#"SELECT * FROM public.users WHERE hotel_id=$1 ORDER BY user_id DESC LIMIT $2 OFFSET $3"#)
                .bind(h).bind(limit).bind(offset)
                .fetch_all(&state.pool).await.map_err(internal_error)?
        }
        _ => {
            query_as::<_, User>(r#"SELECT * FROM public.users ORDER BY user_id DESC LIMIT $1 OFFSET $2"#)
                .bind(limit).bind(offset)
                .fetch_all(&state.pool).await.map_err(internal_error)?
        }
    };
    Ok(Json(rows))
}

pub async fn patch_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchUserBody>,
) -> Result<Json<User>, (axum::http::StatusCode, String)> {
    let row = query_as::<_, User>(
        r#"
        UPDATE public.users SET
          full_name = COALESCE($2, full_name),
          email = COALESCE($3, email),
          role = COALESCE($4, role),
          is_active = COALESCE($5, is_active),
          updated_at = now()
        WHERE user_id = $1
        RETURNING user_id, hotel_id, full_name, email, role, is_active, created_at, updated_at
        "#
    )
    .bind(id).bind(b.full_name).bind(b.email).bind(b.role).bind(b.is_active)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (axum::http::StatusCode, String)> {
    let res = query(r#"DELETE FROM public.users WHERE user_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}
