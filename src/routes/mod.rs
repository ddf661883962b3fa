use axum::http::StatusCode;
use tracing::warn;

pub mod assets;
pub mod assignment_rules;
pub mod audit_packs;
pub mod health;
pub mod hotels;
pub mod kpi;
pub mod locations;
pub mod ppm;
pub mod slas;
pub mod trainings;
pub mod users;
pub mod work_orders;

// Common error mapper
pub fn internal_error<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, format!("internal error: {e}"))
}

// Best-effort webhook notification (WEBHOOK_URL env). Failures are logged and
// never surface to the caller.
pub async fn notify_webhook(event: &str, data: serde_json::Value) {
    let Ok(url) = std::env::var("WEBHOOK_URL") else { return };
    if url.is_empty() {
        return;
    }

    let client = match reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
    {
        Ok(c) => c,
        Err(e) => {
            warn!("webhook client build failed: {e}");
            return;
        }
    };

    let body = serde_json::json!({ "event": event, "data": data });
    if let Err(e) = client.post(&url).json(&body).send().await {
        warn!("webhook '{event}' delivery failed: {e}");
    }
}
