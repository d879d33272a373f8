use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use crate::api::models::ExportQuery;
use crate::api::AppState;
use crate::errors::CiphertraceError;
use crate::export::ExportFormat;
use crate::input::ScanInput;
use crate::tools::ScanOutcome;

pub async fn list_tools(State(state): State<AppState>) -> Result<Json<Value>, CiphertraceError> {
    let mut tools = Vec::with_capacity(state.registry.len());
    for service in state.registry.iter() {
        let mut entry = serde_json::to_value(service.descriptor())?;
        entry["status"] = json!(service.status());
        tools.push(entry);
    }
    let total = tools.len();
    Ok(Json(json!({ "tools": tools, "total": total })))
}

pub async fn run_scan(
    State(state): State<AppState>,
    Path(tool): Path<String>,
    Json(input): Json<ScanInput>,
) -> Result<(StatusCode, Json<ScanOutcome>), CiphertraceError> {
    let service = state.registry.resolve(&tool)?;
    let outcome = service.run(&input, None).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

pub async fn get_current(
    State(state): State<AppState>,
    Path(tool): Path<String>,
) -> Result<Json<Value>, CiphertraceError> {
    let service = state.registry.resolve(&tool)?;
    Ok(Json(json!({
        "tool": service.kind(),
        "status": service.status(),
        "session": service.current()?,
    })))
}

pub async fn reset_current(
    State(state): State<AppState>,
    Path(tool): Path<String>,
) -> Result<Json<Value>, CiphertraceError> {
    let service = state.registry.resolve(&tool)?;
    let cleared = service.reset()?;
    Ok(Json(json!({
        "tool": service.kind(),
        "reset": cleared,
        "status": service.status(),
    })))
}

pub async fn list_history(
    State(state): State<AppState>,
    Path(tool): Path<String>,
) -> Result<Json<Value>, CiphertraceError> {
    let service = state.registry.resolve(&tool)?;
    let sessions = service.history()?;
    Ok(Json(json!({
        "tool": service.kind(),
        "total": sessions.len(),
        "cap": service.descriptor().history_cap,
        "sessions": sessions,
    })))
}

pub async fn get_session(
    State(state): State<AppState>,
    Path((tool, id)): Path<(String, String)>,
) -> Result<Json<Value>, CiphertraceError> {
    let service = state.registry.resolve(&tool)?;
    Ok(Json(service.session(&id)?))
}

/// Download an export. Defaults to JSON of the current session.
pub async fn export(
    State(state): State<AppState>,
    Path(tool): Path<String>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, CiphertraceError> {
    let service = state.registry.resolve(&tool)?;
    let format: ExportFormat = query.format.as_deref().unwrap_or("json").parse()?;
    let artifact = service.export(query.session.as_deref(), format, &query.filter(), &query.selection())?;

    let disposition = format!("attachment; filename=\"{}\"", artifact.filename);
    Ok((
        [
            (header::CONTENT_TYPE, artifact.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.body,
    )
        .into_response())
}
