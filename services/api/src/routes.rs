use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use sailors_open::error::AppError;
use sailors_open::registration::{
    assess, registration_router, validate_answers, Category, ConfirmationPublisher, Market,
    Question, QuizAnswerSet, RegistrationRepository, RegistrationService, SkillAssessment,
    SkillLevel, MARKETS,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Serialize)]
pub(crate) struct CatalogResponse {
    pub(crate) generated_at: DateTime<Utc>,
    pub(crate) questions: Vec<Question>,
    pub(crate) categories: Vec<CategoryEntry>,
    pub(crate) markets: &'static [Market],
    pub(crate) skill_levels: Vec<SkillLevel>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CategoryEntry {
    pub(crate) label: Category,
    pub(crate) requires_partner: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct MatchmakerPreviewRequest {
    #[serde(default)]
    pub(crate) answers: QuizAnswerSet,
}

pub(crate) fn with_registration_routes<R, N>(
    service: Arc<RegistrationService<R, N>>,
) -> axum::Router
where
    R: RegistrationRepository + 'static,
    N: ConfirmationPublisher + 'static,
{
    registration_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/catalog", axum::routing::get(catalog_endpoint))
        .route(
            "/api/v1/matchmaker/preview",
            axum::routing::post(matchmaker_preview_endpoint),
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

/// Everything the registration page needs to render its selects and the quiz.
pub(crate) async fn catalog_endpoint(Extension(state): Extension<AppState>) -> Json<CatalogResponse> {
    Json(CatalogResponse {
        generated_at: Utc::now(),
        questions: state.catalog.questions().to_vec(),
        categories: Category::ALL
            .iter()
            .map(|category| CategoryEntry {
                label: *category,
                requires_partner: category.is_doubles(),
            })
            .collect(),
        markets: MARKETS,
        skill_levels: vec![
            SkillLevel::Beginner,
            SkillLevel::Intermediate,
            SkillLevel::Advanced,
        ],
    })
}

pub(crate) async fn matchmaker_preview_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<MatchmakerPreviewRequest>,
) -> Result<Json<SkillAssessment>, AppError> {
    validate_answers(&state.catalog, &payload.answers)?;
    Ok(Json(assess(&state.catalog, &payload.answers)))
}
