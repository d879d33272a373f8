use std::collections::BTreeMap;
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde_json::{json, Value};
use crate::api::models::CaseHistoryQuery;
use crate::api::AppState;
use crate::auth::Profile;
use crate::errors::CiphertraceError;
use crate::models::SessionOverview;

/// Per-tool status and session counts.
pub async fn dashboard(
    State(state): State<AppState>,
    Extension(profile): Extension<Profile>,
) -> Result<Json<Value>, CiphertraceError> {
    let mut tools = Vec::new();
    let mut total_sessions = 0;
    for service in state.registry.iter() {
        let history = service.history()?;
        total_sessions += history.len();
        tools.push(json!({
            "tool": service.kind(),
            "name": service.kind().display_name(),
            "status": service.status(),
            "sessions": history.len(),
            "records": history.iter().map(|s| s.record_count).sum::<usize>(),
            "last_scan": history.first().map(|s| s.created_at),
        }));
    }
    Ok(Json(json!({
        "user": { "full_name": profile.full_name, "role": profile.role },
        "tools": tools,
        "total_sessions": total_sessions,
    })))
}

/// Every retained session across tools, newest first.
pub async fn case_history(
    State(state): State<AppState>,
    Query(query): Query<CaseHistoryQuery>,
) -> Result<Json<Value>, CiphertraceError> {
    let services = match query.tool.as_deref() {
        Some(name) => vec![state.registry.resolve(name)?],
        None => state.registry.iter().cloned().collect(),
    };

    let mut sessions: Vec<SessionOverview> = Vec::new();
    for service in services {
        sessions.extend(service.history()?);
    }
    sessions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let total = sessions.len();
    if let Some(limit) = query.limit {
        sessions.truncate(limit);
    }

    Ok(Json(json!({ "sessions": sessions, "total": total })))
}

/// Risk distribution aggregated over each tool's retained history.
pub async fn report_center(State(state): State<AppState>) -> Result<Json<Value>, CiphertraceError> {
    let mut reports = Vec::new();
    let mut grand_total = 0usize;

    for service in state.registry.iter() {
        let history = service.history()?;
        let descriptor = service.descriptor();
        let mut distribution: BTreeMap<String, usize> =
            descriptor.risk_levels.iter().map(|l| (l.to_string(), 0)).collect();
        let mut records = 0usize;
        let mut score_sum = 0f64;

        for session in &history {
            for (label, count) in &session.summary.distribution {
                *distribution.entry(label.clone()).or_insert(0) += count;
            }
            records += session.summary.total;
            score_sum += session.summary.average_score * session.summary.total as f64;
        }
        grand_total += records;

        let average_score = if records == 0 { 0.0 } else { (score_sum / records as f64 * 100.0).round() / 100.0 };
        reports.push(json!({
            "tool": descriptor.kind,
            "name": descriptor.name,
            "sessions": history.len(),
            "records": records,
            "average_score": average_score,
            "distribution": distribution,
        }));
    }

    Ok(Json(json!({ "tools": reports, "total_records": grand_total })))
}
