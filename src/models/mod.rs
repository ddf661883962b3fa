// src/models/mod.rs

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

// ───────────────────────────────────────
// Core tenancy
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Hotel {
    pub hotel_id: i64,
    pub name: String,
    pub time_zone: String,
    pub status: String,           // active|inactive
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Location {
    pub location_id: i64,
    pub hotel_id: i64,
    pub name: String,
    pub floor: Option<String>,
    pub kind: String,             // room|corridor|plant|public|other
}

// ───────────────────────────────────────
// Users (simple RBAC role string)
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: i64,
    pub hotel_id: i64,
    pub full_name: String,
    pub email: String,
    pub role: String,             // ADMIN|MANAGER|TECHNICIAN|STAFF
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───────────────────────────────────────
// Assets
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Asset {
    pub asset_id: i64,
    pub hotel_id: i64,
    pub location_id: Option<i64>,
    pub name: String,
    pub category: String,
    pub serial_no: Option<String>,
    pub status: String,           // operational|degraded|out_of_service|retired
    pub warranty_expiry: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───────────────────────────────────────
// Assignment rules (auto-assignment policy)
// ───────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AssignmentRule {
    pub rule_id: i64,
    pub hotel_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub category: String,         // matched case-insensitively
    pub priority: Option<String>, // NULL = any priority
    pub location_id: Option<i64>, // NULL = any location
    pub assignee_id: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───────────────────────────────────────
// Work orders + SLA tracking
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct WorkOrder {
    pub work_order_id: i64,
    pub hotel_id: i64,
    pub tracking_code: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub priority: String,         // LOW|MEDIUM|HIGH|CRITICAL
    pub location_id: Option<i64>,
    pub asset_id: Option<i64>,
    pub status: String,           // LOGGED|ASSIGNED|IN_PROGRESS|COMPLETED|CANCELLED
    pub assignee_id: Option<i64>,
    pub requested_by: Option<i64>,
    pub assignment_note: String,  // why the resolver did (not) assign
    pub source: String,           // web|phone|ppm
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct WorkOrderSla {
    pub sla_id: i64,
    pub work_order_id: i64,
    pub category: String,
    pub priority: String,
    pub expected_response_minutes: i64,
    pub expected_resolution_minutes: i64,
    pub actual_response_minutes: Option<i64>,
    pub actual_resolution_minutes: Option<i64>,
    pub assigned_at: Option<DateTime<Utc>>,
    pub first_response_at: Option<DateTime<Utc>>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub is_overdue: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───────────────────────────────────────
// Preventive maintenance
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct PpmSchedule {
    pub ppm_schedule_id: i64,
    pub hotel_id: i64,
    pub asset_id: Option<i64>,
    pub location_id: Option<i64>,
    pub name: String,
    pub category: String,
    pub priority: String,
    pub frequency_days: i32,      // > 0
    pub next_due_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ───────────────────────────────────────
// Compliance
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct TrainingRecord {
    pub training_record_id: i64,
    pub hotel_id: i64,
    pub user_id: i64,
    pub course: String,
    pub completed_on: NaiveDate,
    pub expires_on: Option<NaiveDate>,
    pub certificate_no: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct AuditPack {
    pub audit_pack_id: i64,
    pub hotel_id: i64,
    pub title: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub summary: serde_json::Value,
    pub content_hash: String,     // SHA256 hex of canonical summary JSON
    pub created_by: Option<i64>,
    pub created_at: DateTime<Utc>,
}

// ───────────────────────────────────────
// DTOs helpful for endpoints
// ───────────────────────────────────────
#[derive(Debug, Serialize, Deserialize)]
pub struct HotelKpi {
    pub hotel_id: i64,
    pub open_work_orders: i64,
    pub logged: i64,
    pub assigned: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub overdue: i64,
    pub sla_compliance_pct: i64,  // 0..100, completed within resolution target
    pub active_ppm_schedules: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedFromPpm {
    pub generated: usize,
    pub work_order_ids: Vec<i64>,
}
