use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;

use super::domain::{
    GuildId, ItemId, MemberId, Rank, Submission, SubmissionId, SubmissionStatus, TierId,
};
use super::repository::{LootStore, RepositoryError};
use super::service::{LootPriorityService, LootServiceError};
use super::validation::SubmissionValidation;

type SharedService<S> = Arc<LootPriorityService<S>>;

/// Router builder exposing the submission, scoring and priority endpoints.
pub fn loot_router<S>(service: Arc<LootPriorityService<S>>) -> Router
where
    S: LootStore + 'static,
{
    Router::new()
        .route("/api/v1/loot/submissions", put(save_handler::<S>))
        .route(
            "/api/v1/loot/submissions/validate",
            post(validate_handler::<S>),
        )
        .route(
            "/api/v1/loot/submissions/:submission_id/status",
            post(status_handler::<S>),
        )
        .route(
            "/api/v1/loot/guilds/:guild_id/members/:member_id/score",
            get(score_handler::<S>),
        )
        .route(
            "/api/v1/loot/guilds/:guild_id/items/:item_id/priority",
            get(item_priority_handler::<S>),
        )
        .route(
            "/api/v1/loot/guilds/:guild_id/tiers/:tier_id/board",
            get(board_handler::<S>),
        )
        .route(
            "/api/v1/loot/guilds/:guild_id/members/:member_id/tiers/:tier_id/competition",
            get(competition_handler::<S>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusChange {
    status: SubmissionStatus,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScoreQuery {
    rank: u8,
    today: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AsOfQuery {
    today: Option<NaiveDate>,
}

pub(crate) async fn validate_handler<S>(
    State(service): State<SharedService<S>>,
    axum::Json(submission): axum::Json<Submission>,
) -> Response
where
    S: LootStore + 'static,
{
    match service.validate(&submission) {
        Ok(validation) => validation_response(StatusCode::OK, validation),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn save_handler<S>(
    State(service): State<SharedService<S>>,
    axum::Json(submission): axum::Json<Submission>,
) -> Response
where
    S: LootStore + 'static,
{
    match service.save_submission(submission) {
        Ok(validation) => validation_response(StatusCode::OK, validation),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn status_handler<S>(
    State(service): State<SharedService<S>>,
    Path(submission_id): Path<String>,
    axum::Json(change): axum::Json<StatusChange>,
) -> Response
where
    S: LootStore + 'static,
{
    let id = SubmissionId::new(submission_id);
    match service.transition_status(&id, change.status) {
        Ok(submission) => (StatusCode::OK, axum::Json(submission)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn score_handler<S>(
    State(service): State<SharedService<S>>,
    Path((guild_id, member_id)): Path<(String, String)>,
    Query(query): Query<ScoreQuery>,
) -> Response
where
    S: LootStore + 'static,
{
    let rank = match Rank::new(query.rank) {
        Ok(rank) => rank,
        Err(error) => {
            let payload = json!({ "error": error.to_string() });
            return (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response();
        }
    };

    match service.loot_score(
        &GuildId::new(guild_id),
        &MemberId::new(member_id),
        rank,
        query.today.unwrap_or_else(today),
    ) {
        Ok(breakdown) => {
            let payload = json!({
                "display_total": breakdown.display_total(),
                "breakdown": breakdown,
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn item_priority_handler<S>(
    State(service): State<SharedService<S>>,
    Path((guild_id, item_id)): Path<(String, String)>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    S: LootStore + 'static,
{
    match service.priority_for_item(
        &GuildId::new(guild_id),
        &ItemId::new(item_id),
        query.today.unwrap_or_else(today),
    ) {
        Ok(priority) => (StatusCode::OK, axum::Json(priority)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn board_handler<S>(
    State(service): State<SharedService<S>>,
    Path((guild_id, tier_id)): Path<(String, String)>,
    Query(query): Query<AsOfQuery>,
) -> Response
where
    S: LootStore + 'static,
{
    match service.priority_board(
        &GuildId::new(guild_id),
        &TierId::new(tier_id),
        query.today.unwrap_or_else(today),
    ) {
        Ok(board) => (StatusCode::OK, axum::Json(board)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn competition_handler<S>(
    State(service): State<SharedService<S>>,
    Path((guild_id, member_id, tier_id)): Path<(String, String, String)>,
) -> Response
where
    S: LootStore + 'static,
{
    match service.member_competition(
        &GuildId::new(guild_id),
        &MemberId::new(member_id),
        &TierId::new(tier_id),
    ) {
        Ok(views) => (StatusCode::OK, axum::Json(views)).into_response(),
        Err(error) => error_response(error),
    }
}

fn validation_response(status: StatusCode, validation: SubmissionValidation) -> Response {
    let payload = json!({
        "acceptable": validation.is_acceptable(),
        "messages": validation.messages(),
        "validation": validation,
    });
    (status, axum::Json(payload)).into_response()
}

fn error_response(error: LootServiceError) -> Response {
    let status = match &error {
        LootServiceError::Integrity(_) | LootServiceError::NotAcceptable { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LootServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        LootServiceError::Repository(RepositoryError::Conflict)
        | LootServiceError::Transition(_)
        | LootServiceError::Locked { .. } => StatusCode::CONFLICT,
        LootServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = match &error {
        LootServiceError::NotAcceptable { violations } => json!({
            "error": error.to_string(),
            "violations": violations,
        }),
        _ => json!({ "error": error.to_string() }),
    };
    (status, axum::Json(payload)).into_response()
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
