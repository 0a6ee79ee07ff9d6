//! HTTP surface: the single page, a JSON endpoint and a health check.

use axum::{
    extract::State,
    http::StatusCode,
    response::Html,
    routing::{get, post},
    Form, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::artifacts::ModelContext;
use crate::classifier::{ModelKind, Sentiment};
use crate::error::AnalyzeError;
use crate::ui::{self, PageState};

pub struct AppState {
    pub context: Arc<ModelContext>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AnalyzeRequest {
    #[schema(example = "The product quality exceeded my expectations!")]
    pub review: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AnalyzeResponse {
    pub id: Uuid,
    pub label: Sentiment,
    /// Raw class predicted by the model (1 = positive).
    #[schema(example = 1)]
    pub prediction: i64,
    /// Percentage in [0, 100].
    #[schema(example = 87.7)]
    pub confidence: f64,
    #[schema(example = "product quality exceeded expectation")]
    pub cleaned_text: String,
    pub non_zero_features: usize,
    pub analyzed_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub model_kind: ModelKind,
    pub vocabulary_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct ReviewForm {
    #[serde(default)]
    pub review: String,
}

#[derive(OpenApi)]
#[openapi(
    paths(analyze, health),
    components(schemas(AnalyzeRequest, AnalyzeResponse, ErrorResponse, HealthResponse, Sentiment, ModelKind)),
    tags((name = "sentiment", description = "Review sentiment analysis"))
)]
pub struct ApiDoc;

pub fn router(state: Arc<AppState>, static_dir: &Path) -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(index).post(submit_review))
        .route("/api/analyze", post(analyze))
        .route("/health", get(health))
        .nest_service("/static", ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn render(review: &str, state: PageState<'_>) -> Result<Html<String>, StatusCode> {
    ui::render_page(review, state).map(Html).map_err(|e| {
        error!("page render failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })
}

pub async fn index() -> Result<Html<String>, StatusCode> {
    render("", PageState::Blank)
}

pub async fn submit_review(
    State(state): State<Arc<AppState>>,
    Form(form): Form<ReviewForm>,
) -> Result<Html<String>, StatusCode> {
    match state.context.analyze(&form.review) {
        Ok(analysis) => render(&form.review, PageState::Result(&analysis)),
        Err(e @ AnalyzeError::EmptyReview) => {
            info!("empty review submitted from page");
            render(&form.review, PageState::Warning(&e.to_string()))
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Review classified", body = AnalyzeResponse),
        (status = 422, description = "Review is empty", body = ErrorResponse)
    ),
    tag = "sentiment"
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let analysis = state.context.analyze(&req.review).map_err(|e| {
        info!("empty review submitted to API");
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(ErrorResponse {
                error: e.to_string(),
            }),
        )
    })?;

    let prediction = analysis.prediction;
    Ok(Json(AnalyzeResponse {
        id: Uuid::new_v4(),
        label: prediction.sentiment,
        prediction: prediction.class,
        confidence: prediction.confidence,
        cleaned_text: analysis.cleaned_text,
        non_zero_features: analysis.non_zero_features,
        analyzed_at: Utc::now(),
    }))
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Artifacts loaded", body = HealthResponse)),
    tag = "sentiment"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model_kind: state.context.classifier.kind(),
        vocabulary_size: state.context.vectorizer.vocabulary_size(),
    })
}
