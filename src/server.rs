//! HTTP surface: the dashboard page and a small JSON API

use crate::error::{InputError, ModelError};
use crate::input::{validate_record, TransactionForm};
use crate::metrics::{DashboardMetrics, MetricsSnapshot};
use crate::models::InferenceEngine;
use crate::render::{render_page, PageState};
use crate::types::{ClassProbabilities, Evaluation, Explanation, TransactionRecord, Verdict};
use axum::{
    extract::{rejection::FormRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<InferenceEngine>,
    pub metrics: Arc<DashboardMetrics>,
}

impl AppState {
    pub fn new(engine: InferenceEngine) -> Self {
        Self {
            engine: Arc::new(engine),
            metrics: Arc::new(DashboardMetrics::new()),
        }
    }

    /// Run one trigger: evaluate the record and record metrics
    fn evaluate(&self, record: &TransactionRecord) -> Result<Evaluation, ModelError> {
        let start = Instant::now();

        match self.engine.evaluate(record) {
            Ok(evaluation) => {
                let elapsed = start.elapsed();
                self.metrics.record_evaluation(
                    elapsed,
                    evaluation.probabilities.fraud(),
                    evaluation.verdict,
                );
                info!(
                    evaluation_id = %evaluation.evaluation_id,
                    transaction_type = %record.transaction_type,
                    amount = record.amount,
                    label = evaluation.label,
                    fraud_probability = evaluation.probabilities.fraud(),
                    processing_time_us = elapsed.as_micros(),
                    "Transaction evaluated"
                );
                Ok(evaluation)
            }
            Err(e) => {
                self.metrics.record_failure();
                error!(
                    transaction_type = %record.transaction_type,
                    error = %e,
                    "Evaluation failed"
                );
                Err(e)
            }
        }
    }
}

/// Error returned by the JSON API
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Input(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// JSON view of an evaluation
#[derive(Debug, Serialize)]
pub struct EvaluationResponse {
    pub evaluation_id: String,
    pub record: TransactionRecord,
    pub label: i64,
    pub verdict: Verdict,
    pub message: &'static str,
    pub probabilities: ClassProbabilities,
    pub fraud_probability: String,
    pub explanation: Explanation,
}

impl From<Evaluation> for EvaluationResponse {
    fn from(evaluation: Evaluation) -> Self {
        Self {
            fraud_probability: evaluation.fraud_percent(),
            message: evaluation.verdict.message(),
            evaluation_id: evaluation.evaluation_id,
            record: evaluation.record,
            label: evaluation.label,
            verdict: evaluation.verdict,
            probabilities: evaluation.probabilities,
            explanation: evaluation.explanation,
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    model: String,
}

// ============================================================================
// Page handlers
// ============================================================================

/// GET / - Idle page
async fn index() -> Html<String> {
    Html(render_page(&TransactionForm::default(), &PageState::Idle))
}

/// POST /predict - Predict trigger from the sidebar form
async fn predict_page(
    State(state): State<AppState>,
    form: Result<Form<TransactionForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            let reason = rejection.body_text();
            return reject(&state, &TransactionForm::default(), &reason);
        }
    };

    let record = match form.collect() {
        Ok(record) => record,
        Err(e) => return reject(&state, &form, &e.to_string()),
    };

    match state.evaluate(&record) {
        Ok(evaluation) => Html(render_page(&form, &PageState::Evaluated(&evaluation))).into_response(),
        Err(e) => {
            let html = render_page(&form, &PageState::Failed(&e.to_string()));
            (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response()
        }
    }
}

/// Rejected submission: the page with an error alert and no evaluation
fn reject(state: &AppState, form: &TransactionForm, reason: &str) -> Response {
    state.metrics.record_rejected();
    warn!(error = %reason, "Rejected transaction input");
    let html = render_page(form, &PageState::Rejected(reason));
    (StatusCode::UNPROCESSABLE_ENTITY, Html(html)).into_response()
}

// ============================================================================
// API handlers
// ============================================================================

/// GET /api/health - Health check
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        model: state.engine.model_name().to_string(),
    })
}

/// POST /api/predict - Evaluate a JSON record
async fn predict_api(
    State(state): State<AppState>,
    Json(record): Json<TransactionRecord>,
) -> Result<Json<EvaluationResponse>, ApiError> {
    if let Err(e) = validate_record(&record) {
        state.metrics.record_rejected();
        return Err(e.into());
    }

    let evaluation = state.evaluate(&record)?;
    Ok(Json(evaluation.into()))
}

/// GET /api/metrics - Counters and latency stats
async fn metrics(State(state): State<AppState>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/predict", post(predict_api))
        .route("/metrics", get(metrics))
        .with_state(state.clone());

    Router::new()
        .route("/", get(index))
        .route("/predict", post(predict_page))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::inference::tests::{IdentityExplainer, StubClassifier};
    use crate::types::TransactionType;

    fn state(label: i64, fraud: f64) -> AppState {
        AppState::new(InferenceEngine::from_parts(
            Box::new(StubClassifier::new(label, fraud)),
            Box::new(IdentityExplainer),
        ))
    }

    #[test]
    fn test_evaluate_records_metrics() {
        let state = state(1, 0.8);
        state
            .evaluate(&TransactionRecord::new(TransactionType::Transfer, 10.0))
            .unwrap();

        let snapshot = state.metrics.snapshot();
        assert_eq!(snapshot.evaluations, 1);
        assert_eq!(snapshot.fraud_verdicts, 1);
        assert_eq!(snapshot.score_distribution[8], 1);
    }

    #[test]
    fn test_failed_evaluation_counted() {
        let state = state(3, 0.8);
        assert!(state.evaluate(&TransactionRecord::default()).is_err());
        assert_eq!(state.metrics.snapshot().failures, 1);
        assert_eq!(state.metrics.snapshot().evaluations, 0);
    }

    #[test]
    fn test_evaluation_response() {
        let state = state(0, 0.27);
        let eval = state.evaluate(&TransactionRecord::default()).unwrap();
        let response = EvaluationResponse::from(eval);

        assert_eq!(response.fraud_probability, "27.00%");
        assert_eq!(response.message, "This transaction looks like safe");
        assert_eq!(response.label, 0);
    }

    #[test]
    fn test_api_error_status() {
        let input = ApiError::from(InputError::NotFinite { field: "amount" }).into_response();
        assert_eq!(input.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let model = ApiError::from(ModelError::Backend("down".to_string())).into_response();
        assert_eq!(model.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
