// src/routes/kpi.rs

use axum::{extract::{Path, State}, Json};
use sqlx::query_as;
use crate::{AppState, models::HotelKpi};
use super::internal_error;

/// GET /api/v1/kpi/:hotel_id, the dashboard rollup for one property.
pub async fn get_kpi(
    State(state): State<AppState>,
    Path(hotel_id): Path<i64>,
) -> Result<Json<HotelKpi>, (axum::http::StatusCode, String)> {
    let (logged, assigned, in_progress, completed, cancelled): (i64, i64, i64, i64, i64) =
        query_as(
            r#"
            SELECT count(*) FILTER (WHERE status='LOGGED'),
                   count(*) FILTER (WHERE status='ASSIGNED'),
                   count(*) FILTER (WHERE status='IN_PROGRESS'),
                   count(*) FILTER (WHERE status='COMPLETED'),
                   count(*) FILTER (WHERE status='CANCELLED')
            FROM public.work_orders WHERE hotel_id=$1
            "#,
        )
        .bind(hotel_id)
        .fetch_one(&state.pool)
        .await
        .map_err(internal_error)?;

    let (overdue, resolved, resolved_on_time): (i64, i64, i64) = query_as(
        r#"
        SELECT count(*) FILTER (WHERE s.is_overdue),
               count(*) FILTER (WHERE s.resolved_at IS NOT NULL),
               count(*) FILTER (WHERE s.resolved_at IS NOT NULL
                                  AND s.actual_resolution_minutes <= s.expected_resolution_minutes)
        FROM public.work_order_slas s
        JOIN public.work_orders w ON w.work_order_id = s.work_order_id
        WHERE w.hotel_id=$1
        "#,
    )
    .bind(hotel_id)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;

    let (active_ppm_schedules,): (i64,) = query_as(
        r#"SELECT count(*) FROM public.ppm_schedules WHERE hotel_id=$1 AND is_active"#,
    )
    .bind(hotel_id)
    .fetch_one(&state.pool)
    .await
    .map_err(internal_error)?;

    let sla_compliance_pct = if resolved == 0 { 100 } else { resolved_on_time * 100 / resolved };

    Ok(Json(HotelKpi {
        hotel_id,
        open_work_orders: logged + assigned + in_progress,
        logged,
        assigned,
        in_progress,
        completed,
        cancelled,
        overdue,
        sla_compliance_pct,
        active_ppm_schedules,
    }))
}
