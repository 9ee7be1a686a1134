use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use tracing::error;

use super::domain::{RegistrationId, RegistrationSubmission};
use super::repository::{ConfirmationPublisher, RegistrationRepository, RepositoryError};
use super::roster::roster_csv;
use super::service::{RegistrationService, RegistrationServiceError};

const ROSTER_LIMIT: usize = 10_000;

/// Router builder exposing the registration backend over HTTP.
pub fn registration_router<R, N>(service: Arc<RegistrationService<R, N>>) -> Router
where
    R: RegistrationRepository + 'static,
    N: ConfirmationPublisher + 'static,
{
    Router::new()
        .route("/api/v1/registrations", post(submit_handler::<R, N>))
        .route(
            "/api/v1/registrations/:registration_id",
            get(status_handler::<R, N>),
        )
        .route("/api/v1/roster.csv", get(roster_handler::<R, N>))
        .with_state(service)
}

pub(crate) async fn submit_handler<R, N>(
    State(service): State<Arc<RegistrationService<R, N>>>,
    axum::Json(submission): axum::Json<RegistrationSubmission>,
) -> Response
where
    R: RegistrationRepository + 'static,
    N: ConfirmationPublisher + 'static,
{
    match service.submit(submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn status_handler<R, N>(
    State(service): State<Arc<RegistrationService<R, N>>>,
    Path(registration_id): Path<String>,
) -> Response
where
    R: RegistrationRepository + 'static,
    N: ConfirmationPublisher + 'static,
{
    let id = RegistrationId(registration_id);
    match service.get(&id) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(RegistrationServiceError::Repository(RepositoryError::NotFound)) => {
            let payload = json!({
                "error": "registration not found",
                "registration_id": id.0,
            });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn roster_handler<R, N>(
    State(service): State<Arc<RegistrationService<R, N>>>,
) -> Response
where
    R: RegistrationRepository + 'static,
    N: ConfirmationPublisher + 'static,
{
    let records = match service.roster(ROSTER_LIMIT) {
        Ok(records) => records,
        Err(err) => return error_response(err),
    };

    match roster_csv(&records) {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, mime::TEXT_CSV_UTF_8.to_string())],
            body,
        )
            .into_response(),
        Err(err) => {
            error!(error = %err, "roster export failed");
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

fn error_response(err: RegistrationServiceError) -> Response {
    let status = match &err {
        RegistrationServiceError::Draft(_) | RegistrationServiceError::Answers(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RegistrationServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        RegistrationServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        RegistrationServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    let payload = json!({
        "error": err.to_string(),
        "retryable": status == StatusCode::SERVICE_UNAVAILABLE,
    });
    (status, axum::Json(payload)).into_response()
}
