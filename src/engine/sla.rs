// src/engine/sla.rs

use chrono::{DateTime, Utc};
use sqlx::{query, query_as, Pool, Postgres};
use tracing::warn;

use crate::models::WorkOrderSla;

/// Priority → (expected response, expected resolution), in minutes.
/// Unrecognized labels fall back to the MEDIUM row.
pub fn sla_targets(priority: &str) -> (i64, i64) {
    match priority {
        "CRITICAL" => (60, 480),
        "HIGH" => (120, 720),
        "MEDIUM" => (240, 1440),
        "LOW" => (480, 2880),
        _ => (240, 1440),
    }
}

/// Overdue once either target is breached:
/// - unresolved past the resolution window,
/// - resolved but later than the resolution window,
/// - no first response past the response window.
pub fn compute_overdue(
    expected_response_minutes: i64,
    expected_resolution_minutes: i64,
    created_at: DateTime<Utc>,
    first_response_at: Option<DateTime<Utc>>,
    resolved_at: Option<DateTime<Utc>>,
    actual_resolution_minutes: Option<i64>,
    now: DateTime<Utc>,
) -> bool {
    let age_minutes = (now - created_at).num_minutes();

    let resolution_breached = if resolved_at.is_some() {
        actual_resolution_minutes.map_or(false, |m| m > expected_resolution_minutes)
    } else {
        age_minutes > expected_resolution_minutes
    };

    let response_breached = first_response_at.is_none() && age_minutes > expected_response_minutes;

    resolution_breached || response_breached
}

// ─────────────────────────────────────────────────────────────────────────────
// Lifecycle persistence. SLA tracking is best-effort telemetry: a failed write
// never blocks the work-order transition that triggered it, so every public
// entry point logs and swallows.
// ─────────────────────────────────────────────────────────────────────────────

pub async fn create_for_work_order(
    pool: &Pool<Postgres>,
    work_order_id: i64,
    category: &str,
    priority: &str,
) {
    let (response_minutes, resolution_minutes) = sla_targets(priority);
    let res = query(
        r#"
        INSERT INTO public.work_order_slas
            (work_order_id, category, priority, expected_response_minutes, expected_resolution_minutes)
        VALUES ($1,$2,$3,$4,$5)
        ON CONFLICT (work_order_id) DO NOTHING
        "#,
    )
    .bind(work_order_id)
    .bind(category)
    .bind(priority)
    .bind(response_minutes)
    .bind(resolution_minutes)
    .execute(pool)
    .await;

    if let Err(e) = res {
        warn!("SLA create skipped for work order {work_order_id}: {e}");
    }
}

pub async fn on_assignment(pool: &Pool<Postgres>, work_order_id: i64) {
    if let Err(e) = record_assignment(pool, work_order_id).await {
        warn!("SLA assignment update skipped for work order {work_order_id}: {e}");
    }
}

pub async fn on_first_response(pool: &Pool<Postgres>, work_order_id: i64) {
    if let Err(e) = record_first_response(pool, work_order_id).await {
        warn!("SLA first-response update skipped for work order {work_order_id}: {e}");
    }
}

pub async fn on_resolution(pool: &Pool<Postgres>, work_order_id: i64) {
    if let Err(e) = record_resolution(pool, work_order_id).await {
        warn!("SLA resolution update skipped for work order {work_order_id}: {e}");
    }
}

async fn fetch(pool: &Pool<Postgres>, work_order_id: i64) -> anyhow::Result<Option<WorkOrderSla>> {
    let row = query_as::<_, WorkOrderSla>(
        r#"SELECT * FROM public.work_order_slas WHERE work_order_id = $1"#,
    )
    .bind(work_order_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

async fn record_assignment(pool: &Pool<Postgres>, work_order_id: i64) -> anyhow::Result<()> {
    if fetch(pool, work_order_id).await?.is_none() {
        warn!("no SLA record for work order {work_order_id}");
        return Ok(());
    }
    query(
        r#"
        UPDATE public.work_order_slas
           SET assigned_at = now(), updated_at = now()
         WHERE work_order_id = $1 AND assigned_at IS NULL
        "#,
    )
    .bind(work_order_id)
    .execute(pool)
    .await?;
    refresh_overdue(pool, work_order_id).await
}

async fn record_first_response(pool: &Pool<Postgres>, work_order_id: i64) -> anyhow::Result<()> {
    if fetch(pool, work_order_id).await?.is_none() {
        warn!("no SLA record for work order {work_order_id}");
        return Ok(());
    }
    // first-write-wins: the IS NULL guard keeps a racing second response from
    // overwriting the recorded time
    query(
        r#"
        UPDATE public.work_order_slas
           SET first_response_at = now(),
               actual_response_minutes = floor(extract(epoch FROM (now() - created_at)) / 60)::bigint,
               updated_at = now()
         WHERE work_order_id = $1 AND first_response_at IS NULL
        "#,
    )
    .bind(work_order_id)
    .execute(pool)
    .await?;
    refresh_overdue(pool, work_order_id).await
}

async fn record_resolution(pool: &Pool<Postgres>, work_order_id: i64) -> anyhow::Result<()> {
    if fetch(pool, work_order_id).await?.is_none() {
        warn!("no SLA record for work order {work_order_id}");
        return Ok(());
    }
    query(
        r#"
        UPDATE public.work_order_slas
           SET resolved_at = now(),
               actual_resolution_minutes = floor(extract(epoch FROM (now() - created_at)) / 60)::bigint,
               updated_at = now()
         WHERE work_order_id = $1 AND resolved_at IS NULL
        "#,
    )
    .bind(work_order_id)
    .execute(pool)
    .await?;
    refresh_overdue(pool, work_order_id).await
}

/// Re-derive `is_overdue` from the current row state.
pub async fn refresh_overdue(pool: &Pool<Postgres>, work_order_id: i64) -> anyhow::Result<()> {
    let Some(sla) = fetch(pool, work_order_id).await? else {
        return Ok(());
    };
    let overdue = compute_overdue(
        sla.expected_response_minutes,
        sla.expected_resolution_minutes,
        sla.created_at,
        sla.first_response_at,
        sla.resolved_at,
        sla.actual_resolution_minutes,
        Utc::now(),
    );
    if overdue != sla.is_overdue {
        query(
            r#"UPDATE public.work_order_slas SET is_overdue = $2, updated_at = now() WHERE work_order_id = $1"#,
        )
        .bind(work_order_id)
        .bind(overdue)
        .execute(pool)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn targets_table() {
        assert_eq!(sla_targets("CRITICAL"), (60, 480));
        assert_eq!(sla_targets("HIGH"), (120, 720));
        assert_eq!(sla_targets("MEDIUM"), (240, 1440));
        assert_eq!(sla_targets("LOW"), (480, 2880));
    }

    #[test]
    fn unknown_priority_falls_back_to_medium() {
        assert_eq!(sla_targets("urgent"), (240, 1440));
        assert_eq!(sla_targets(""), (240, 1440));
    }

    #[test]
    fn response_never_exceeds_resolution() {
        for p in ["LOW", "MEDIUM", "HIGH", "CRITICAL", "bogus"] {
            let (response, resolution) = sla_targets(p);
            assert!(response <= resolution, "{p}");
        }
    }

    #[test]
    fn fresh_record_is_not_overdue() {
        let t0 = Utc::now();
        assert!(!compute_overdue(120, 720, t0, None, None, None, t0 + Duration::minutes(45)));
    }

    #[test]
    fn missed_response_window_is_overdue() {
        let t0 = Utc::now();
        assert!(compute_overdue(120, 720, t0, None, None, None, t0 + Duration::minutes(121)));
    }

    #[test]
    fn responded_in_time_stays_clean_until_resolution_window() {
        let t0 = Utc::now();
        let responded = Some(t0 + Duration::minutes(45));
        assert!(!compute_overdue(120, 720, t0, responded, None, None, t0 + Duration::minutes(300)));
        assert!(compute_overdue(120, 720, t0, responded, None, None, t0 + Duration::minutes(721)));
    }

    #[test]
    fn late_resolution_is_overdue_forever() {
        let t0 = Utc::now();
        let responded = Some(t0 + Duration::minutes(30));
        let resolved = Some(t0 + Duration::minutes(800));
        // even long after the fact the record stays breached
        assert!(compute_overdue(
            120,
            720,
            t0,
            responded,
            resolved,
            Some(800),
            t0 + Duration::minutes(10_000)
        ));
    }

    #[test]
    fn on_time_resolution_is_not_overdue() {
        let t0 = Utc::now();
        let responded = Some(t0 + Duration::minutes(30));
        let resolved = Some(t0 + Duration::minutes(400));
        assert!(!compute_overdue(
            120,
            720,
            t0,
            responded,
            resolved,
            Some(400),
            t0 + Duration::minutes(10_000)
        ));
    }

    #[test]
    fn resolved_without_response_still_flags_missed_response_window() {
        let t0 = Utc::now();
        let resolved = Some(t0 + Duration::minutes(200));
        assert!(compute_overdue(120, 720, t0, None, resolved, Some(200), t0 + Duration::minutes(300)));
    }
}
