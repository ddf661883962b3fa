// src/routes/assignment_rules.rs

use axum::{extract::{Path, Query, State}, Json};
use axum::http::StatusCode;
use serde::Deserialize;
use sqlx::query_as;
use crate::{AppState, models::AssignmentRule};
use crate::engine::is_valid_priority;
use super::internal_error;

#[derive(Deserialize)]
pub struct ListQ {
    pub include_inactive: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateRuleBody {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: Option<String>,  // omit = any priority
    pub location_id: Option<i64>,  // omit = any location
    pub assignee_id: i64,
}

#[derive(Deserialize)]
pub struct PatchRuleBody {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub location_id: Option<i64>,
    pub assignee_id: Option<i64>,
    pub is_active: Option<bool>,
}

pub async fn create_rule(
    State(state): State<AppState>,
    Path(hotel_id): Path<i64>,
    Json(b): Json<CreateRuleBody>,
) -> Result<Json<AssignmentRule>, (StatusCode, String)> {
    if b.category.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "category must not be empty".into()));
    }
    if let Some(p) = &b.priority {
        if !is_valid_priority(p) {
            return Err((StatusCode::BAD_REQUEST, format!("unknown priority '{p}'")));
        }
    }

    let row = query_as::<_, AssignmentRule>(
        r#"
        INSERT INTO public.assignment_rules
            (hotel_id, name, description, category, priority, location_id, assignee_id)
        VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING rule_id, hotel_id, name, description, category, priority, location_id,
                  assignee_id, is_active, created_at, updated_at
        "#
    )
    .bind(hotel_id)
    .bind(&b.name)
    .bind(&b.description)
    .bind(&b.category)
    .bind(&b.priority)
    .bind(b.location_id)
    .bind(b.assignee_id)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_rules(
    State(state): State<AppState>,
    Path(hotel_id): Path<i64>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<AssignmentRule>>, (StatusCode, String)> {
    // evaluation order = rule_id ascending; the resolver sees the same order
    let rows = if q.include_inactive.unwrap_or(false) {
        query_as::<_, AssignmentRule>(
            r#"SELECT * FROM public.assignment_rules WHERE hotel_id=$1 ORDER BY rule_id"#)
            .bind(hotel_id).fetch_all(&state.pool).await.map_err(internal_error)?
    } else {
        query_as::<_, AssignmentRule>(
            r#"SELECT * FROM public.assignment_rules WHERE hotel_id=$1 AND is_active ORDER BY rule_id"#)
            .bind(hotel_id).fetch_all(&state.pool).await.map_err(internal_error)?
    };
    Ok(Json(rows))
}

pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AssignmentRule>, (StatusCode, String)> {
    let row = query_as::<_, AssignmentRule>(
        r#"SELECT * FROM public.assignment_rules WHERE rule_id=$1"#)
        .bind(id).fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn patch_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchRuleBody>,
) -> Result<Json<AssignmentRule>, (StatusCode, String)> {
    if let Some(p) = &b.priority {
        if !is_valid_priority(p) {
            return Err((StatusCode::BAD_REQUEST, format!("unknown priority '{p}'")));
        }
    }

    let row = query_as::<_, AssignmentRule>(
        r#"
        UPDATE public.assignment_rules SET
          name = COALESCE($2, name),
          description = COALESCE($3, description),
          category = COALESCE($4, category),
          priority = COALESCE($5, priority),
          location_id = COALESCE($6, location_id),
          assignee_id = COALESCE($7, assignee_id),
          is_active = COALESCE($8, is_active),
          updated_at = now()
        WHERE rule_id = $1
        RETURNING rule_id, hotel_id, name, description, category, priority, location_id,
                  assignee_id, is_active, created_at, updated_at
        "#
    )
    .bind(id)
    .bind(b.name)
    .bind(b.description)
    .bind(b.category)
    .bind(b.priority)
    .bind(b.location_id)
    .bind(b.assignee_id)
    .bind(b.is_active)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

// DELETE deactivates; rule rows are never removed
pub async fn deactivate_rule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let row = query_as::<_, AssignmentRule>(
        r#"
        UPDATE public.assignment_rules SET is_active = FALSE, updated_at = now()
        WHERE rule_id = $1
        RETURNING rule_id, hotel_id, name, description, category, priority, location_id,
                  assignee_id, is_active, created_at, updated_at
        "#
    )
    .bind(id)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "deactivated": true, "rule_id": row.rule_id })))
}
