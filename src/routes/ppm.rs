// src/routes/ppm.rs

use axum::{extract::{Path, Query, State}, Json};
use axum::http::StatusCode;
use chrono::{Duration, NaiveDate, Utc};
use serde::Deserialize;
use sqlx::{query, query_as};
use tracing::warn;
use uuid::Uuid;

use crate::engine::assignment::{AssignmentResult, WorkRequest};
use crate::engine::{is_valid_priority, sla};
use crate::{AppState, models::{GeneratedFromPpm, PpmSchedule, WorkOrder}};
use super::internal_error;
use super::work_orders::resolve_for_request;

#[derive(Deserialize)]
pub struct ListQ {
    pub include_inactive: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateScheduleBody {
    pub asset_id: Option<i64>,
    pub location_id: Option<i64>,
    pub name: String,
    pub category: String,
    #[serde(default = "default_priority")] pub priority: String,
    pub frequency_days: i32,
    pub next_due_date: NaiveDate,
}
fn default_priority() -> String { "MEDIUM".into() }

#[derive(Deserialize)]
pub struct PatchScheduleBody {
    pub asset_id: Option<i64>,
    pub location_id: Option<i64>,
    pub name: Option<String>,
    pub category: Option<String>,
    pub priority: Option<String>,
    pub frequency_days: Option<i32>,
    pub next_due_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

pub async fn create_schedule(
    State(state): State<AppState>,
    Path(hotel_id): Path<i64>,
    Json(b): Json<CreateScheduleBody>,
) -> Result<Json<PpmSchedule>, (StatusCode, String)> {
    if b.frequency_days <= 0 {
        return Err((StatusCode::BAD_REQUEST, "frequency_days must be positive".into()));
    }
    if !is_valid_priority(&b.priority) {
        return Err((StatusCode::BAD_REQUEST, format!("unknown priority '{}'", b.priority)));
    }

    let row = query_as::<_, PpmSchedule>(
        r#"
        INSERT INTO public.ppm_schedules
            (hotel_id, asset_id, location_id, name, category, priority, frequency_days, next_due_date)
        VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        RETURNING ppm_schedule_id, hotel_id, asset_id, location_id, name, category, priority,
                  frequency_days, next_due_date, is_active, created_at, updated_at
        "#,
    )
    .bind(hotel_id)
    .bind(b.asset_id)
    .bind(b.location_id)
    .bind(&b.name)
    .bind(&b.category)
    .bind(&b.priority)
    .bind(b.frequency_days)
    .bind(b.next_due_date)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_schedules(
    State(state): State<AppState>,
    Path(hotel_id): Path<i64>,
    Query(q): Query<ListQ>,
) -> Result<Json<Vec<PpmSchedule>>, (StatusCode, String)> {
    let rows = if q.include_inactive.unwrap_or(false) {
        query_as::<_, PpmSchedule>(
            r#"SELECT * FROM public.ppm_schedules WHERE hotel_id=$1 ORDER BY next_due_date"#)
            .bind(hotel_id).fetch_all(&state.pool).await.map_err(internal_error)?
    } else {
        query_as::<_, PpmSchedule>(
            r#"SELECT * FROM public.ppm_schedules WHERE hotel_id=$1 AND is_active ORDER BY next_due_date"#)
            .bind(hotel_id).fetch_all(&state.pool).await.map_err(internal_error)?
    };
    Ok(Json(rows))
}

pub async fn patch_schedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(b): Json<PatchScheduleBody>,
) -> Result<Json<PpmSchedule>, (StatusCode, String)> {
    if let Some(f) = b.frequency_days {
        if f <= 0 {
            return Err((StatusCode::BAD_REQUEST, "frequency_days must be positive".into()));
        }
    }
    if let Some(p) = &b.priority {
        if !is_valid_priority(p) {
            return Err((StatusCode::BAD_REQUEST, format!("unknown priority '{p}'")));
        }
    }

    let row = query_as::<_, PpmSchedule>(
        r#"
        UPDATE public.ppm_schedules SET
          asset_id = COALESCE($2, asset_id),
          location_id = COALESCE($3, location_id),
          name = COALESCE($4, name),
          category = COALESCE($5, category),
          priority = COALESCE($6, priority),
          frequency_days = COALESCE($7, frequency_days),
          next_due_date = COALESCE($8, next_due_date),
          is_active = COALESCE($9, is_active),
          updated_at = now()
        WHERE ppm_schedule_id = $1
        RETURNING ppm_schedule_id, hotel_id, asset_id, location_id, name, category, priority,
                  frequency_days, next_due_date, is_active, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(b.asset_id)
    .bind(b.location_id)
    .bind(b.name)
    .bind(b.category)
    .bind(b.priority)
    .bind(b.frequency_days)
    .bind(b.next_due_date)
    .bind(b.is_active)
    .fetch_one(&state.pool).await.map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let res = query(r#"DELETE FROM public.ppm_schedules WHERE ppm_schedule_id=$1"#)
        .bind(id).execute(&state.pool).await.map_err(internal_error)?;
    Ok(Json(serde_json::json!({"deleted": res.rows_affected() > 0})))
}

/// POST /api/v1/hotels/:hotel_id/ppm-schedules/generate-due
///
/// Materializes a work order for every active schedule whose due date has
/// passed, then rolls the schedule forward. Generated orders go through the
/// same assignment + SLA path as web-created ones.
pub async fn generate_due(
    State(state): State<AppState>,
    Path(hotel_id): Path<i64>,
) -> Result<Json<GeneratedFromPpm>, (StatusCode, String)> {
    let today = Utc::now().date_naive();

    // 1) Due schedules
    let due = query_as::<_, PpmSchedule>(
        r#"
        SELECT * FROM public.ppm_schedules
        WHERE hotel_id = $1 AND is_active AND next_due_date <= $2
        ORDER BY ppm_schedule_id
        "#,
    )
    .bind(hotel_id)
    .bind(today)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;

    let mut work_order_ids = Vec::with_capacity(due.len());

    for schedule in &due {
        // 2) Resolve an assignee per generated order
        let request = WorkRequest {
            hotel_id,
            category: schedule.category.clone(),
            priority: schedule.priority.clone(),
            location_id: schedule.location_id,
        };
        let resolution = match resolve_for_request(&state.pool, &request).await {
            Ok(r) => r,
            Err(e) => {
                warn!("assignment engine error for hotel {hotel_id}: {e}");
                AssignmentResult::engine_error()
            }
        };

        // 3) Insert the work order (source 'ppm')
        let status = if resolution.assignee_id.is_some() { "ASSIGNED" } else { "LOGGED" };
        let row = query_as::<_, WorkOrder>(
            r#"
            INSERT INTO public.work_orders
                (hotel_id, tracking_code, title, description, category, priority,
                 location_id, asset_id, status, assignee_id, assignment_note, source)
            VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11,'ppm')
            RETURNING work_order_id, hotel_id, tracking_code, title, description, category, priority,
                      location_id, asset_id, status, assignee_id, requested_by, assignment_note, source,
                      created_at, updated_at
            "#,
        )
        .bind(hotel_id)
        .bind(Uuid::new_v4())
        .bind(&schedule.name)
        .bind(format!("Preventive maintenance due {}", schedule.next_due_date))
        .bind(&schedule.category)
        .bind(&schedule.priority)
        .bind(schedule.location_id)
        .bind(schedule.asset_id)
        .bind(status)
        .bind(resolution.assignee_id)
        .bind(&resolution.reason)
        .fetch_one(&state.pool)
        .await
        .map_err(internal_error)?;

        sla::create_for_work_order(&state.pool, row.work_order_id, &row.category, &row.priority).await;
        if row.assignee_id.is_some() {
            sla::on_assignment(&state.pool, row.work_order_id).await;
        }

        // 4) Roll the schedule past today, preserving its cadence
        let step = Duration::days(i64::from(schedule.frequency_days));
        let mut next = schedule.next_due_date + step;
        while next <= today {
            next += step;
        }
        query(
            r#"UPDATE public.ppm_schedules SET next_due_date = $2, updated_at = now() WHERE ppm_schedule_id = $1"#,
        )
        .bind(schedule.ppm_schedule_id)
        .bind(next)
        .execute(&state.pool)
        .await
        .map_err(internal_error)?;

        work_order_ids.push(row.work_order_id);
    }

    Ok(Json(GeneratedFromPpm { generated: work_order_ids.len(), work_order_ids }))
}
