use crate::infra::{default_guild_config, AppState};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use guild_loot::error::AppError;
use guild_loot::workflows::loot::{
    loot_router, AttendanceAggregator, AttendanceImporter, AttendanceRecord, AttendanceSummary,
    GuildScoringConfig, LootPriorityService, LootStore, MemberId,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::io::Cursor;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct AttendanceSummaryRequest {
    pub(crate) csv: String,
    #[serde(default)]
    pub(crate) today: Option<NaiveDate>,
    /// Scoring settings to preview; the service defaults apply when omitted.
    #[serde(default)]
    pub(crate) config: Option<GuildScoringConfig>,
}

#[derive(Debug, Serialize)]
pub(crate) struct AttendanceSummaryResponse {
    pub(crate) today: NaiveDate,
    pub(crate) records_imported: usize,
    pub(crate) members: Vec<MemberAttendanceView>,
}

#[derive(Debug, Serialize)]
pub(crate) struct MemberAttendanceView {
    pub(crate) member_id: MemberId,
    pub(crate) summary: AttendanceSummary,
}

pub(crate) fn with_loot_routes<S>(service: Arc<LootPriorityService<S>>) -> axum::Router
where
    S: LootStore + 'static,
{
    loot_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/loot/attendance/summary",
            axum::routing::post(attendance_summary_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Preview attendance contributions for an officer export before it is stored.
pub(crate) async fn attendance_summary_endpoint(
    Json(payload): Json<AttendanceSummaryRequest>,
) -> Result<Json<AttendanceSummaryResponse>, AppError> {
    let AttendanceSummaryRequest { csv, today, config } = payload;

    let records = AttendanceImporter::from_reader(Cursor::new(csv.into_bytes()))?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let config = config.unwrap_or_else(default_guild_config);

    Ok(Json(AttendanceSummaryResponse {
        today,
        records_imported: records.len(),
        members: summarize_by_member(&records, &config, today),
    }))
}

pub(crate) fn summarize_by_member(
    records: &[AttendanceRecord],
    config: &GuildScoringConfig,
    today: NaiveDate,
) -> Vec<MemberAttendanceView> {
    let mut by_member: BTreeMap<&MemberId, Vec<AttendanceRecord>> = BTreeMap::new();
    for record in records {
        by_member
            .entry(&record.member_id)
            .or_default()
            .push(record.clone());
    }

    let aggregator = AttendanceAggregator::new(config);
    by_member
        .into_iter()
        .map(|(member_id, history)| MemberAttendanceView {
            member_id: member_id.clone(),
            summary: aggregator.summarize(&history, today),
        })
        .collect()
}
