// src/engine/assignment.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::AssignmentRule;

// Roles allowed to receive work orders
pub const ASSIGNABLE_ROLES: [&str; 3] = ["TECHNICIAN", "MANAGER", "ADMIN"];

/// Transient view of an incoming work request, enough to pick a rule.
#[derive(Debug, Clone)]
pub struct WorkRequest {
    pub hotel_id: i64,
    pub category: String,
    pub priority: String,         // LOW|MEDIUM|HIGH|CRITICAL
    pub location_id: Option<i64>,
}

/// Point-in-time status of a candidate assignee.
#[derive(Debug, Clone)]
pub struct AssigneeStatus {
    pub is_active: bool,
    pub role: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentResult {
    pub assignee_id: Option<i64>,
    pub rule_name: Option<String>,
    pub reason: String,           // always set, persisted as assignment_note
}

impl AssignmentResult {
    fn unassigned(reason: &str) -> Self {
        Self { assignee_id: None, rule_name: None, reason: reason.to_string() }
    }

    pub fn engine_error() -> Self {
        Self::unassigned("Assignment engine error")
    }
}

fn norm(s: &str) -> String {
    s.trim().to_lowercase()
}

pub fn is_assignable_role(role: &str) -> bool {
    ASSIGNABLE_ROLES.contains(&role)
}

// Specificity tiers, most specific first:
//   1. category + priority + location all equal
//   2. category + priority equal, rule location is a wildcard
//   3. category equal, rule priority is a wildcard, location equal
//   4. category equal, priority and location both wildcards
// Category comparison is trimmed + case-insensitive; priority and location
// compare by exact equality.
fn matches_tier(rule: &AssignmentRule, req: &WorkRequest, tier: u8) -> bool {
    if norm(&rule.category) != norm(&req.category) {
        return false;
    }
    let priority_eq = rule.priority.as_deref() == Some(req.priority.as_str());
    let location_eq = rule.location_id.is_some() && rule.location_id == req.location_id;
    match tier {
        1 => priority_eq && location_eq,
        2 => priority_eq && rule.location_id.is_none(),
        3 => rule.priority.is_none() && location_eq,
        4 => rule.priority.is_none() && rule.location_id.is_none(),
        _ => false,
    }
}

/// Pick the assignee for a work request from the hotel's active rules.
///
/// `rules` must already be scoped to the hotel and `is_active = true`, in
/// store order; within a tier the first rule in that order wins.
/// `assignees` is a point-in-time view of the users the rules reference.
pub fn resolve_assignee(
    req: &WorkRequest,
    rules: &[AssignmentRule],
    assignees: &HashMap<i64, AssigneeStatus>,
) -> AssignmentResult {
    if rules.is_empty() {
        return AssignmentResult::unassigned("No assignment rules configured for this hotel");
    }

    let matched = (1..=4u8).find_map(|tier| rules.iter().find(|r| matches_tier(r, req, tier)));

    let Some(rule) = matched else {
        return AssignmentResult::unassigned("No matching assignment rule found");
    };

    // The most specific match decides; an ineligible assignee does not fall
    // through to a lower tier.
    match assignees.get(&rule.assignee_id) {
        Some(u) if u.is_active && is_assignable_role(&u.role) => AssignmentResult {
            assignee_id: Some(rule.assignee_id),
            rule_name: Some(rule.name.clone()),
            reason: format!("Assigned via rule: {}", rule.name),
        },
        _ => AssignmentResult::unassigned("Assigned user is inactive"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn rule(
        rule_id: i64,
        category: &str,
        priority: Option<&str>,
        location_id: Option<i64>,
        assignee_id: i64,
    ) -> AssignmentRule {
        AssignmentRule {
            rule_id,
            hotel_id: 1,
            name: format!("rule-{rule_id}"),
            description: None,
            category: category.to_string(),
            priority: priority.map(str::to_string),
            location_id,
            assignee_id,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn req(category: &str, priority: &str, location_id: Option<i64>) -> WorkRequest {
        WorkRequest {
            hotel_id: 1,
            category: category.to_string(),
            priority: priority.to_string(),
            location_id,
        }
    }

    fn tech(id: i64) -> (i64, AssigneeStatus) {
        (id, AssigneeStatus { is_active: true, role: "TECHNICIAN".into() })
    }

    #[test]
    fn empty_rule_set_reports_no_configuration() {
        let out = resolve_assignee(&req("HVAC", "HIGH", None), &[], &HashMap::new());
        assert_eq!(out.assignee_id, None);
        assert_eq!(out.reason, "No assignment rules configured for this hotel");
    }

    #[test]
    fn no_category_match_reports_no_rule() {
        let rules = vec![rule(1, "Plumbing", None, None, 5)];
        let users = HashMap::from([tech(5)]);
        let out = resolve_assignee(&req("HVAC", "HIGH", None), &rules, &users);
        assert_eq!(out.assignee_id, None);
        assert_eq!(out.reason, "No matching assignment rule found");
    }

    #[test]
    fn exact_match_wins() {
        let rules = vec![rule(1, "HVAC", Some("CRITICAL"), None, 2)];
        let users = HashMap::from([tech(2)]);
        let out = resolve_assignee(&req("HVAC", "CRITICAL", None), &rules, &users);
        assert_eq!(out.assignee_id, Some(2));
        assert_eq!(out.rule_name.as_deref(), Some("rule-1"));
        assert_eq!(out.reason, "Assigned via rule: rule-1");
    }

    #[test]
    fn category_only_rule_catches_any_priority_and_location() {
        let rules = vec![rule(1, "Electrical", None, None, 5)];
        let users = HashMap::from([tech(5)]);
        let out = resolve_assignee(&req("Electrical", "LOW", Some(6)), &rules, &users);
        assert_eq!(out.assignee_id, Some(5));
    }

    #[test]
    fn exact_location_beats_location_wildcard_regardless_of_order() {
        // tier-2 rule listed before the tier-1 rule
        let rules = vec![
            rule(1, "HVAC", Some("HIGH"), None, 10),
            rule(2, "HVAC", Some("HIGH"), Some(7), 11),
        ];
        let users = HashMap::from([tech(10), tech(11)]);
        let out = resolve_assignee(&req("HVAC", "HIGH", Some(7)), &rules, &users);
        assert_eq!(out.assignee_id, Some(11));
        assert_eq!(out.rule_name.as_deref(), Some("rule-2"));
    }

    #[test]
    fn priority_wildcard_with_location_beats_full_wildcard() {
        let rules = vec![
            rule(1, "HVAC", None, None, 10),
            rule(2, "HVAC", None, Some(7), 11),
        ];
        let users = HashMap::from([tech(10), tech(11)]);
        let out = resolve_assignee(&req("HVAC", "LOW", Some(7)), &rules, &users);
        assert_eq!(out.assignee_id, Some(11));
    }

    #[test]
    fn first_rule_in_list_order_wins_within_a_tier() {
        let rules = vec![
            rule(1, "HVAC", Some("HIGH"), None, 10),
            rule(2, "HVAC", Some("HIGH"), None, 11),
        ];
        let users = HashMap::from([tech(10), tech(11)]);
        let out = resolve_assignee(&req("HVAC", "HIGH", None), &rules, &users);
        assert_eq!(out.assignee_id, Some(10));
    }

    #[test]
    fn category_match_is_case_insensitive_and_trimmed() {
        let rules = vec![rule(1, "  hvac ", Some("HIGH"), None, 10)];
        let users = HashMap::from([tech(10)]);
        let out = resolve_assignee(&req("HVAC", "HIGH", None), &rules, &users);
        assert_eq!(out.assignee_id, Some(10));
    }

    #[test]
    fn request_without_location_never_matches_location_bound_rules() {
        let rules = vec![rule(1, "HVAC", Some("HIGH"), Some(7), 10)];
        let users = HashMap::from([tech(10)]);
        let out = resolve_assignee(&req("HVAC", "HIGH", None), &rules, &users);
        assert_eq!(out.assignee_id, None);
        assert_eq!(out.reason, "No matching assignment rule found");
    }

    #[test]
    fn inactive_assignee_blocks_without_fallthrough() {
        // the tier-1 rule points at an inactive user; the tier-4 rule has an
        // active one, but must not be consulted
        let rules = vec![
            rule(1, "HVAC", Some("HIGH"), Some(7), 10),
            rule(2, "HVAC", None, None, 11),
        ];
        let users = HashMap::from([
            (10, AssigneeStatus { is_active: false, role: "TECHNICIAN".into() }),
            tech(11),
        ]);
        let out = resolve_assignee(&req("HVAC", "HIGH", Some(7)), &rules, &users);
        assert_eq!(out.assignee_id, None);
        assert_eq!(out.reason, "Assigned user is inactive");
    }

    #[test]
    fn non_assignable_role_blocks() {
        let rules = vec![rule(1, "HVAC", Some("HIGH"), None, 10)];
        let users = HashMap::from([(10, AssigneeStatus { is_active: true, role: "STAFF".into() })]);
        let out = resolve_assignee(&req("HVAC", "HIGH", None), &rules, &users);
        assert_eq!(out.assignee_id, None);
        assert_eq!(out.reason, "Assigned user is inactive");
    }

    #[test]
    fn unknown_assignee_blocks() {
        let rules = vec![rule(1, "HVAC", Some("HIGH"), None, 99)];
        let out = resolve_assignee(&req("HVAC", "HIGH", None), &rules, &HashMap::new());
        assert_eq!(out.assignee_id, None);
        assert_eq!(out.reason, "Assigned user is inactive");
    }

    #[test]
    fn resolution_is_deterministic() {
        let rules = vec![
            rule(1, "HVAC", Some("HIGH"), None, 10),
            rule(2, "HVAC", None, Some(7), 11),
            rule(3, "HVAC", None, None, 12),
        ];
        let users = HashMap::from([tech(10), tech(11), tech(12)]);
        let r = req("HVAC", "MEDIUM", Some(7));
        let first = resolve_assignee(&r, &rules, &users);
        for _ in 0..10 {
            let again = resolve_assignee(&r, &rules, &users);
            assert_eq!(again.assignee_id, first.assignee_id);
            assert_eq!(again.reason, first.reason);
        }
    }
}
