// src/routes/audit_packs.rs

use axum::{extract::{Path, State}, Json};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use sqlx::query_as;
use crate::{AppState, models::AuditPack};
use super::internal_error;

#[derive(Deserialize)]
pub struct CreatePackBody {
    pub title: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub created_by: Option<i64>,
}

/// POST /api/v1/hotels/:hotel_id/audit-packs
///
/// Snapshots the period into an immutable summary plus a content digest that
/// lets a handed-out pack be re-verified.
pub async fn create_pack(
    State(state): State<AppState>,
    Path(hotel_id): Path<i64>,
    Json(b): Json<CreatePackBody>,
) -> Result<Json<AuditPack>, (StatusCode, String)> {
    if b.period_end < b.period_start {
        return Err((StatusCode::BAD_REQUEST, "period_end before period_start".into()));
    }

    // 1) The period's numbers
    let (created, completed, cancelled, from_ppm): (i64, i64, i64, i64) = query_as(
        r#"
        SELECT count(*),
               count(*) FILTER (WHERE status='COMPLETED'),
               count(*) FILTER (WHERE status='CANCELLED'),
               count(*) FILTER (WHERE source='ppm')
        FROM public.work_orders
        WHERE hotel_id=$1 AND created_at::date BETWEEN $2 AND $3
        "#,
    )
    .bind(hotel_id)
    .bind(b.period_start)
    .bind(b.period_end)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;

    let (sla_breaches,): (i64,) = query_as(
        r#"
        SELECT count(*)
        FROM public.work_order_slas s
        JOIN public.work_orders w ON w.work_order_id = s.work_order_id
        WHERE w.hotel_id=$1 AND s.is_overdue AND s.created_at::date BETWEEN $2 AND $3
        "#,
    )
    .bind(hotel_id)
    .bind(b.period_start)
    .bind(b.period_end)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;

    let (trainings_expiring,): (i64,) = query_as(
        r#"
        SELECT count(*)
        FROM public.training_records
        WHERE hotel_id=$1 AND expires_on IS NOT NULL AND expires_on BETWEEN $2 AND $3
        "#,
    )
    .bind(hotel_id)
    .bind(b.period_start)
    .bind(b.period_end)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;

    let summary = serde_json::json!({
        "work_orders": {
            "created": created,
            "completed": completed,
            "cancelled": cancelled,
            "from_ppm": from_ppm,
        },
        "sla_breaches": sla_breaches,
        "trainings_expiring": trainings_expiring,
    });

    // 2) canonical hash of the summary
    let bytes = serde_json::to_vec(&summary).map_err(internal_error)?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let content_hash = format!("{:x}", hasher.finalize());

    // 3) Persist the pack (immutable once written)
    let row = query_as::<_, AuditPack>(
        r#"
        INSERT INTO public.audit_packs
            (hotel_id, title, period_start, period_end, summary, content_hash, created_by)
        VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING audit_pack_id, hotel_id, title, period_start, period_end, summary,
                  content_hash, created_by, created_at
        "#,
    )
    .bind(hotel_id)
    .bind(&b.title)
    .bind(b.period_start)
    .bind(b.period_end)
    .bind(&summary)
    .bind(&content_hash)
    .bind(b.created_by)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(row))
}

pub async fn list_packs(
    State(state): State<AppState>,
    Path(hotel_id): Path<i64>,
) -> Result<Json<Vec<AuditPack>>, (StatusCode, String)> {
    let rows = query_as::<_, AuditPack>(
        r#"SELECT * FROM public.audit_packs WHERE hotel_id=$1 ORDER BY created_at DESC"#,
    )
    .bind(hotel_id)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(rows))
}

pub async fn get_pack(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<AuditPack>, (StatusCode, String)> {
    let row = query_as::<_, AuditPack>(
        r#"SELECT * FROM public.audit_packs WHERE audit_pack_id=$1"#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(row))
}
