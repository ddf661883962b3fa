// src/routes/slas.rs

use axum::{extract::{Path, Query, State}, Json};
use axum::http::StatusCode;
use serde::Deserialize;
use sqlx::query_as;
use crate::engine::sla;
use crate::{AppState, models::WorkOrderSla};
use super::internal_error;

#[derive(Deserialize)]
pub struct OverdueQ {
    pub hotel_id: i64,
}

// GET /api/v1/work-orders/:id/sla
pub async fn get_for_work_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<WorkOrderSla>, (StatusCode, String)> {
    let row = query_as::<_, WorkOrderSla>(
        r#"SELECT * FROM public.work_order_slas WHERE work_order_id = $1"#,
    )
    .bind(id)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(row))
}

/// GET /api/v1/slas/overdue?hotel_id=
///
/// Re-derives the overdue flag for the hotel's unresolved SLAs before
/// listing, so a record that breached since its last lifecycle event still
/// shows up.
pub async fn list_overdue(
    State(state): State<AppState>,
    Query(q): Query<OverdueQ>,
) -> Result<Json<Vec<WorkOrderSla>>, (StatusCode, String)> {
    let stale = query_as::<_, (i64,)>(
        r#"
        SELECT s.work_order_id
        FROM public.work_order_slas s
        JOIN public.work_orders w ON w.work_order_id = s.work_order_id
        WHERE w.hotel_id = $1 AND NOT s.is_overdue AND s.resolved_at IS NULL
        "#,
    )
    .bind(q.hotel_id)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;

    for (work_order_id,) in stale {
        sla::refresh_overdue(&state.pool, work_order_id)
            .await
            .map_err(internal_error)?;
    }

    let rows = query_as::<_, WorkOrderSla>(
        r#"
        SELECT s.*
        FROM public.work_order_slas s
        JOIN public.work_orders w ON w.work_order_id = s.work_order_id
        WHERE w.hotel_id = $1 AND s.is_overdue
        ORDER BY s.created_at
        "#,
    )
    .bind(q.hotel_id)
    .fetch_all(&state.pool)
    .await
    .map_err(internal_error)?;
    Ok(Json(rows))
}
