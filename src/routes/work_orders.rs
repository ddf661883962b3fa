// src/routes/work_orders.rs

use axum::{extract::{Path, Query, State}, Json};
use axum::http::StatusCode;
use serde::Deserialize;
use sqlx::{query_as, Pool, Postgres};
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

use crate::engine::assignment::{resolve_assignee, AssigneeStatus, AssignmentResult, WorkRequest};
use crate::engine::{is_valid_priority, sla};
use crate::{AppState, models::{AssignmentRule, WorkOrder}};
use super::{internal_error, notify_webhook};

pub const STATUSES: [&str; 5] = ["LOGGED", "ASSIGNED", "IN_PROGRESS", "COMPLETED", "CANCELLED"];

// ─────────────────────────────────────────────────────────────────────────────
// Request / Response models
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateWorkOrderBody {
    pub hotel_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: String,
    pub location_id: Option<i64>,
    pub asset_id: Option<i64>,
    pub requested_by: Option<i64>,
    #[serde(default = "default_source")] pub source: String,
}
fn default_source() -> String { "web".into() }

#[derive(Deserialize)]
pub struct PatchWorkOrderBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_id: Option<i64>,
    pub asset_id: Option<i64>,
    pub assignee_id: Option<i64>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
pub struct ListQ {
    pub hotel_id: Option<i64>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub assignee_id: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Load the hotel's active rules plus a point-in-time view of the users they
/// reference, then run the resolver. Callers turn any error from this into a
/// soft "Assignment engine error" result; a work order is still logged when
/// the rule tables cannot be read.
pub(crate) async fn resolve_for_request(
    pool: &Pool<Postgres>,
    req: &WorkRequest,
) -> anyhow::Result<AssignmentResult> {
    let rules = query_as::<_, AssignmentRule>(
        r#"SELECT * FROM public.assignment_rules WHERE hotel_id = $1 AND is_active ORDER BY rule_id"#,
    )
    .bind(req.hotel_id)
    .fetch_all(pool)
    .await?;

    let assignee_ids: Vec<i64> = rules.iter().map(|r| r.assignee_id).collect();
    let users = query_as::<_, (i64, bool, String)>(
        r#"SELECT user_id, is_active, role FROM public.users WHERE user_id = ANY($1)"#,
    )
    .bind(&assignee_ids)
    .fetch_all(pool)
    .await?;

    let mut status_by_id: HashMap<i64, AssigneeStatus> = HashMap::new();
    for (uid, is_active, role) in users {
        status_by_id.insert(uid, AssigneeStatus { is_active, role });
    }

    Ok(resolve_assignee(req, &rules, &status_by_id))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/work-orders
pub async fn create_work_order(
    State(state): State<AppState>,
    Json(b): Json<CreateWorkOrderBody>,
) -> Result<Json<WorkOrder>, (StatusCode, String)> {
    // 0) Validate what the DB cannot
    if b.category.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "category must not be empty".into()));
    }
    if !is_valid_priority(&b.priority) {
        return Err((StatusCode::BAD_REQUEST, format!("unknown priority '{}'", b.priority)));
    }

    // 1) Pick an assignee; failures degrade to an unassigned order
    let request = WorkRequest {
        hotel_id: b.hotel_id,
        category: b.category.clone(),
        priority: b.priority.clone(),
        location_id: b.location_id,
    };
    let resolution = match resolve_for_request(&state.pool, &request).await {
        Ok(r) => r,
        Err(e) => {
            warn!("assignment engine error for hotel {}: {e}", b.hotel_id);
            AssignmentResult::engine_error()
        }
    };

    // 2) Persist the order with the resolver's verdict baked in
    let status = if resolution.assignee_id.is_some() { "ASSIGNED" } else { "LOGGED" };
    let row = query_as::<_, WorkOrder>(
        r#"
        INSERT INTO public.work_orders
            (hotel_id, tracking_code, title, description, category, priority,
             location_id, asset_id, status, assignee_id, requested_by, assignment_note, source)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,$12,$13)
        RETURNING work_order_id, hotel_id, tracking_code, title, description, category, priority,
                  location_id, asset_id, status, assignee_id, requested_by, assignment_note, source,
                  created_at, updated_at
        "#,
    )
    .bind(b.hotel_id)
    .bind(Uuid::new_v4())
    .bind(&b.title)
    .bind(&b.description)
    .bind(&b.category)
    .bind(&b.priority)
    .bind(b.location_id)
    .bind(b.asset_id)
    .bind(status)
    .bind(resolution.assignee_id)
    .bind(b.requested_by)
    .bind(&resolution.reason)
    .bind(&b.source)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;

    // 3) Open the SLA record (best effort) and stamp assignment if any
    sla::create_for_work_order(&state.pool, row.work_order_id, &row.category, &row.priority).await;
    if row.assignee_id.is_some() {
        sla::on_assignment(&state.pool, row.work_order_id).await;
    }

    // 4) Tell the outside world (best effort)
    notify_webhook(
        "work_order.created",
        serde_json::json!({
            "work_order_id": row.work_order_id,
            "hotel_id": row.hotel_id,
            "tracking_code": row.tracking_code,
            "priority": row.priority,
            "assignee_id": row.assignee_id,
            "note": row.assignment_note,
        }),
    )
    .await;

    Ok(Json(row))
}

// GET /api/v1/work-orders
pub async fn list_work_orders(
    State(state): State<AppState>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<WorkOrder>>, (StatusCode, String)> {
    let limit = q.limit.unwrap_or(50).clamp(1, 500);
    let offset = q.offset.unwrap_or(0).max(0);

    // optional filters collapse into one query
    let rows = query_as::<_, WorkOrder>(
        r#"
        SELECT work_order_id, hotel_id, tracking_code, title, description, category, priority,
               location_id, asset_id, status, assignee_id, requested_by, assignment_note, source,
               created_at, updated_at
        FROM public.work_orders
        WHERE ($1::bigint IS NULL OR hotel_id = $1)
          AND ($2::text IS NULL OR status = $2)
          AND ($3::text IS NULL OR priority = $3)
          AND ($4::bigint IS NULL OR assignee_id = $4)
        ORDER BY work_order_id DESC
        LIMIT $5 OFFSET $6
        "#,
    )
    .bind(q.hotel_id)
    .bind(q.status)
    .bind(q.priority)
    .bind(q.assignee_id)
    .bind(limit)
    .bind(offset)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(rows))
}

// GET /api/v1/work-orders/:id
pub async fn get_work_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WorkOrder>, (StatusCode, String)> {
    let row = query_as::<_, WorkOrder>(
        r#"SELECT * FROM public.work_orders WHERE work_order_id = $1"#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(row))
}

/// PATCH /api/v1/work-orders/:id drives the status lifecycle; SLA hooks fire
/// on the transitions, never the other way around.
pub async fn patch_work_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchWorkOrderBody>,
) -> Result<Json<WorkOrder>, (StatusCode, String)> {
    if let Some(st) = &b.status {
        if !STATUSES.contains(&st.as_str()) {
            return Err((StatusCode::BAD_REQUEST, format!("unknown status '{st}'")));
        }
    }

    // 1) Snapshot the old row to detect transitions afterwards
    let old = query_as::<_, WorkOrder>(
        r#"SELECT * FROM public.work_orders WHERE work_order_id = $1"#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;

    // 2) Manually assigning a LOGGED order moves it to ASSIGNED unless the
    //    caller picked a status explicitly
    let status = match (&b.status, b.assignee_id) {
        (Some(st), _) => st.clone(),
        (None, Some(_)) if old.status == "LOGGED" => "ASSIGNED".to_string(),
        _ => old.status.clone(),
    };

    let row = query_as::<_, WorkOrder>(
        r#"
        UPDATE public.work_orders SET
          title = COALESCE($2, title),
          description = COALESCE($3, description),
          location_id = COALESCE($4, location_id),
          asset_id = COALESCE($5, asset_id),
          assignee_id = COALESCE($6, assignee_id),
          status = $7,
          updated_at = now()
        WHERE work_order_id = $1
        RETURNING work_order_id, hotel_id, tracking_code, title, description, category, priority,
                  location_id, asset_id, status, assignee_id, requested_by, assignment_note, source,
                  created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(b.title)
    .bind(b.description)
    .bind(b.location_id)
    .bind(b.asset_id)
    .bind(b.assignee_id)
    .bind(&status)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;

    // 3) SLA bookkeeping per transition (all best effort)
    if row.assignee_id.is_some() && row.assignee_id != old.assignee_id {
        sla::on_assignment(&state.pool, id).await;
        notify_webhook(
            "work_order.assigned",
            serde_json::json!({
                "work_order_id": id,
                "hotel_id": row.hotel_id,
                "assignee_id": row.assignee_id,
            }),
        )
        .await;
    }
    if row.status != old.status && row.status == "IN_PROGRESS" {
        sla::on_first_response(&state.pool, id).await;
    }
    if row.status != old.status && row.status == "COMPLETED" {
        sla::on_resolution(&state.pool, id).await;
    }

    Ok(Json(row))
}

pub async fn delete_work_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let res = sqlx::query(r#"DELETE FROM public.work_orders WHERE work_order_id = $1"#)
        .bind(id)
        .execute(&state.pool)
        .await
        .map_err(internal_error)?;
    Ok(Json(serde_json::json!({ "deleted": res.rows_affected() > 0 })))
}
