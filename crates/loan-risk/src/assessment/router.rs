use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::ApplicationForm;
use super::service::{AssessmentError, RiskAssessmentService};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct AssessQuery {
    #[serde(default)]
    pub(crate) include_features: bool,
}

/// Router builder exposing HTTP endpoints for scoring and schema inspection.
pub fn assessment_router(service: Arc<RiskAssessmentService>) -> Router {
    Router::new()
        .route("/api/v1/risk/assessments", post(assess_handler))
        .route("/api/v1/risk/features", post(features_handler))
        .route("/api/v1/risk/schema", get(schema_handler))
        .with_state(service)
}

pub(crate) async fn assess_handler(
    State(service): State<Arc<RiskAssessmentService>>,
    Query(query): Query<AssessQuery>,
    payload: Result<axum::Json<ApplicationForm>, JsonRejection>,
) -> Response {
    let form = match payload {
        Ok(axum::Json(form)) => form,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.assess(&form) {
        Ok(assessment) => {
            let view = assessment.view(query.include_features);
            (StatusCode::OK, axum::Json(view)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn features_handler(
    State(service): State<Arc<RiskAssessmentService>>,
    payload: Result<axum::Json<ApplicationForm>, JsonRejection>,
) -> Response {
    let form = match payload {
        Ok(axum::Json(form)) => form,
        Err(rejection) => return rejection_response(rejection),
    };
    match service.preview(&form) {
        Ok(features) => {
            let payload = json!({
                "schema_version": features.schema_version(),
                "features": features.named(),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn schema_handler(State(service): State<Arc<RiskAssessmentService>>) -> Response {
    let schema = service.assembler().schema();
    let payload = json!({
        "version": schema.version(),
        "columns": schema.columns(),
        "scorer_loaded": service.scorer().is_loaded(),
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

/// Unreadable bodies keep axum's status but answer in the same JSON shape as intake errors.
fn rejection_response(rejection: JsonRejection) -> Response {
    let payload = json!({
        "error": rejection.body_text(),
        "field": null,
    });
    (rejection.status(), axum::Json(payload)).into_response()
}

fn error_response(error: AssessmentError) -> Response {
    match error {
        AssessmentError::InvalidInput(invalid) => {
            let payload = json!({
                "error": invalid.to_string(),
                "field": invalid.field(),
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        other => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
