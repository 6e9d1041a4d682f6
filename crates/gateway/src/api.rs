//! HTTP endpoints.
//!
//! - `GET  /`                   API info and endpoint map
//! - `GET  /health`             Status and loaded lesson count
//! - `GET  /lessons`            Flat lesson list
//! - `GET  /lessons/grouped`    Lessons by course and module
//! - `GET  /lessons/{id}`       One lesson with its content
//! - `GET  /models`             Model catalog and default model
//! - `POST /context/preview`    Token and cost estimate for a selection
//! - `POST /chat`               Chat completion over selected lessons
//! - `POST /artifacts`          Persist an artifact
//! - `GET  /artifacts`          List artifact metadata
//! - `GET  /artifacts/{id}`     Read one artifact
//!
//! Errors use the envelope `{"detail": "..."}`: 404 for unknown lessons and
//! artifacts, 422 for malformed requests, 500 otherwise. A 500 never carries
//! internal details; the cause is logged instead.

use crate::SharedState;
use axum::{
    Router,
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use lectern_core::error::ArtifactError;
use lectern_core::{
    Artifact, ArtifactMeta, ChatTurn, Lesson, LessonId, LessonSummary, ModelProfile, NewArtifact,
};
use lectern_lessons::{ContextBuilder, GroupedLessons};
use lectern_providers::{ChatInput, CompletionError};
use lectern_telemetry::{ContextEstimate, Cost, ModelPricing, TokenUsage};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use tracing::{debug, error, info};

const API_NAME: &str = "AI Learning Agent API";
const API_VERSION: &str = env!("CARGO_PKG_VERSION");

// ── Router ────────────────────────────────────────────────────────────────

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/lessons", get(list_lessons_handler))
        .route("/lessons/grouped", get(grouped_lessons_handler))
        .route("/lessons/{id}", get(get_lesson_handler))
        .route("/models", get(list_models_handler))
        .route("/context/preview", post(preview_context_handler))
        .route("/chat", post(chat_handler))
        .route("/artifacts", post(create_artifact_handler).get(list_artifacts_handler))
        .route("/artifacts/{id}", get(get_artifact_handler))
        .fallback(route_not_found)
        .with_state(state)
}

// ── Errors ────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(status: StatusCode, detail: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            detail: detail.into(),
        }),
    )
}

fn not_found(detail: impl Into<String>) -> ApiError {
    api_error(StatusCode::NOT_FOUND, detail)
}

fn unprocessable(detail: impl Into<String>) -> ApiError {
    api_error(StatusCode::UNPROCESSABLE_ENTITY, detail)
}

/// Log `cause` and answer with a generic 500.
fn internal(detail: &str, cause: &dyn Display) -> ApiError {
    error!(error = %cause, "{detail}");
    api_error(StatusCode::INTERNAL_SERVER_ERROR, detail)
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| unprocessable(rejection.body_text()))
}

async fn route_not_found() -> ApiError {
    not_found("Not Found")
}

// ── DTOs ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub lessons_loaded: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LessonListResponse {
    pub total: usize,
    pub lessons: Vec<LessonSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GroupedLessonsResponse {
    pub groups: GroupedLessons,
}

/// Catalog entry as exposed to clients, without sampling parameters.
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub context_length: u64,
    pub context_display: String,
    pub input_cost_per_1m: f64,
    pub output_cost_per_1m: f64,
}

impl From<&ModelProfile> for ModelInfo {
    fn from(p: &ModelProfile) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            description: p.description.clone(),
            context_length: p.context_length,
            context_display: p.context_display.clone(),
            input_cost_per_1m: p.input_cost_per_1m,
            output_cost_per_1m: p.output_cost_per_1m,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ModelListResponse {
    pub models: Vec<ModelInfo>,
    pub default_model: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct PreviewRequest {
    #[serde(default, alias = "lessonIds")]
    pub lesson_ids: Option<Vec<LessonId>>,
    /// Price the estimate with this model when it is in the catalog
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PreviewResponse {
    pub lesson_count: usize,
    pub estimated_tokens: usize,
    pub estimated_cost_input: f64,
    pub estimated_cost_output: f64,
    pub lessons: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default, alias = "lessonIds")]
    pub lesson_ids: Option<Vec<LessonId>>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default, alias = "conversationHistory")]
    pub conversation_history: Option<Vec<ChatTurn>>,
    #[serde(default)]
    pub images: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub model_used: String,
    pub lessons_used: Vec<String>,
    pub tokens_used: TokenUsage,
    pub cost: Cost,
    /// Characters in the context sent to the model
    pub context_length: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArtifactListResponse {
    pub items: Vec<ArtifactMeta>,
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn root_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": API_NAME,
        "version": API_VERSION,
        "status": "running",
        "endpoints": {
            "health": "/health",
            "lessons": "/lessons",
            "models": "/models",
            "chat": "/chat",
            "artifacts": "/artifacts",
        }
    }))
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: API_VERSION.into(),
        lessons_loaded: state.lessons.total(),
    })
}

async fn list_lessons_handler(State(state): State<SharedState>) -> Json<LessonListResponse> {
    let lessons = state.lessons.list();
    Json(LessonListResponse {
        total: lessons.len(),
        lessons,
    })
}

async fn grouped_lessons_handler(State(state): State<SharedState>) -> Json<GroupedLessonsResponse> {
    Json(GroupedLessonsResponse {
        groups: state.lessons.grouped(),
    })
}

async fn get_lesson_handler(
    State(state): State<SharedState>,
    id: Result<Path<LessonId>, PathRejection>,
) -> ApiResult<Lesson> {
    let Path(id) = id.map_err(|rejection| unprocessable(rejection.body_text()))?;
    state
        .lessons
        .require(id)
        .map(|lesson| Json(lesson.clone()))
        .map_err(|_| not_found(format!("Lesson with ID {id} not found")))
}

async fn list_models_handler(State(state): State<SharedState>) -> Json<ModelListResponse> {
    Json(ModelListResponse {
        models: state.completions.models().iter().map(ModelInfo::from).collect(),
        default_model: state.completions.default_model().to_string(),
    })
}

async fn preview_context_handler(
    State(state): State<SharedState>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> ApiResult<PreviewResponse> {
    let request = json_body(payload)?;
    let ids = request.lesson_ids.as_deref();
    let builder = ContextBuilder::new(&state.lessons);

    let lesson_count = match ids {
        Some(ids) if !ids.is_empty() => builder.selection(Some(ids)).len(),
        _ => state.lessons.total(),
    };

    let profile = request
        .model
        .as_deref()
        .and_then(|m| state.config.known_model(m).cloned())
        .unwrap_or_else(|| state.config.model(&state.config.default_model));
    let estimate = ContextEstimate::new(builder.estimate_tokens(ids), &ModelPricing::of(&profile));

    Ok(Json(PreviewResponse {
        lesson_count,
        estimated_tokens: estimate.estimated_tokens,
        estimated_cost_input: estimate.estimated_cost_input,
        estimated_cost_output: estimate.estimated_cost_output,
        lessons: builder.labels(ids),
    }))
}

async fn chat_handler(
    State(state): State<SharedState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<ChatResponse> {
    let request = json_body(payload)?;
    if request.message.trim().is_empty() {
        return Err(unprocessable("message must not be empty"));
    }

    info!(
        message_len = request.message.len(),
        lessons = ?request.lesson_ids,
        model = ?request.model,
        "Chat request"
    );

    let ids = request.lesson_ids.as_deref();
    let builder = ContextBuilder::new(&state.lessons);
    let lessons_used = builder.labels(ids);

    let input = ChatInput {
        context: builder.build(ids),
        message: request.message,
        history: request.conversation_history.unwrap_or_default(),
        model: request.model,
        images: request.images.unwrap_or_default(),
    };

    let result = state.completions.chat(&input).await.map_err(|e| match e {
        // Names the attempted models and carries no upstream detail.
        CompletionError::AllModelsFailed { .. } | CompletionError::ModelFailed { .. } => {
            error!(error = ?e, "Chat completion failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
        other => internal("Error processing chat request", &other),
    })?;

    Ok(Json(ChatResponse {
        response: result.response,
        model_used: result.model_used,
        lessons_used,
        tokens_used: result.tokens,
        cost: result.cost,
        context_length: result.context_length,
    }))
}

async fn create_artifact_handler(
    State(state): State<SharedState>,
    payload: Result<Json<NewArtifact>, JsonRejection>,
) -> ApiResult<Artifact> {
    let request = json_body(payload)?;

    // Image decoding and file writes stay off the async workers.
    let artifact = tokio::task::spawn_blocking(move || state.artifacts.create(request))
        .await
        .map_err(|e| internal("Failed to create artifact", &e))?
        .map_err(|e| internal("Failed to create artifact", &e))?;

    Ok(Json(artifact))
}

async fn list_artifacts_handler(State(state): State<SharedState>) -> ApiResult<ArtifactListResponse> {
    let items = state
        .artifacts
        .list()
        .map_err(|e| internal("Failed to list artifacts", &e))?;
    Ok(Json(ArtifactListResponse { items }))
}

async fn get_artifact_handler(
    State(state): State<SharedState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<Artifact> {
    // An id that does not decode to UTF-8 cannot name a stored artifact.
    let Path(id) = id.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "Rejected artifact id");
        not_found("Artifact not found")
    })?;
    match state.artifacts.get(&id) {
        Ok(artifact) => Ok(Json(artifact)),
        Err(ArtifactError::NotFound(_) | ArtifactError::InvalidId(_)) => {
            Err(not_found("Artifact not found"))
        }
        Err(e) => Err(internal("Failed to read artifact", &e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AppState;
    use axum::body::Body;
    use axum::http::Request;
    use base64::Engine as _;
    use http_body_util::BodyExt;
    use lectern_artifacts::ArtifactStore;
    use lectern_config::AppConfig;
    use lectern_core::error::ProviderError;
    use lectern_core::{
        ArtifactKind, PromptAssembler, Provider, ProviderRequest, ProviderResponse, Usage,
    };
    use lectern_lessons::{ALL_LESSONS_LABEL, LessonStore};
    use lectern_providers::CompletionGateway;
    use std::fs;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tower::ServiceExt;

    /// Lightweight mock provider: fails for the listed models, records calls.
    struct MockProvider {
        failing: Vec<String>,
        calls: Mutex<Vec<ProviderRequest>>,
    }

    impl MockProvider {
        fn new(failing: &[&str]) -> Self {
            Self {
                failing: failing.iter().map(|s| s.to_string()).collect(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn models_called(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.model.clone())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl Provider for MockProvider {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
            let model = request.model.clone();
            self.calls.lock().unwrap().push(request);
            if self.failing.contains(&model) {
                return Err(ProviderError::RateLimited {
                    retry_after_secs: 5,
                });
            }
            Ok(ProviderResponse {
                content: format!("Mock answer from {model}"),
                usage: Some(Usage {
                    prompt_tokens: 100,
                    completion_tokens: 50,
                    total_tokens: 150,
                }),
                model,
            })
        }
    }

    struct Harness {
        _tmp: TempDir,
        state: SharedState,
        provider: Arc<MockProvider>,
    }

    impl Harness {
        fn new(failing: &[&str]) -> Self {
            let tmp = tempfile::tempdir().unwrap();
            let root = tmp.path();

            let module = root.join("lessons/ai-web-learning/1-basics");
            fs::create_dir_all(&module).unwrap();
            fs::write(module.join("01-html.md"), "# Intro to HTML\n\nTags and elements.").unwrap();
            fs::write(module.join("02-css.md"), "# CSS Basics\n\nSelectors.").unwrap();
            fs::create_dir_all(root.join("prompts")).unwrap();
            fs::write(
                root.join("prompts/system_prompt.md"),
                "You are a tutor.\n\n{context}",
            )
            .unwrap();

            let mut config = AppConfig::default();
            config.api_key = Some("sk-or-test".into());
            config.paths.lessons_dir = root.join("lessons");
            config.paths.prompts_dir = root.join("prompts");
            config.paths.artifacts_dir = root.join("artifacts");

            let provider = Arc::new(MockProvider::new(failing));
            let prompts = Arc::new(PromptAssembler::new(&config.paths.prompts_dir));
            let completions = CompletionGateway::from_config(provider.clone(), prompts, &config);
            let state = Arc::new(AppState {
                lessons: LessonStore::load(&config.paths.lessons_dir),
                artifacts: ArtifactStore::new(&config.paths.artifacts_dir),
                completions,
                config,
            });

            Self {
                _tmp: tmp,
                state,
                provider,
            }
        }

        async fn send(&self, req: Request<Body>) -> (StatusCode, serde_json::Value) {
            let response = router(self.state.clone()).oneshot(req).await.unwrap();
            let status = response.status();
            let body = response.into_body().collect().await.unwrap().to_bytes();
            let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
            (status, json)
        }

        async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
            self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
        }

        async fn post(&self, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
            self.send(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
        }
    }

    fn png_data_url() -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(b"\x89PNG\r\n\x1a\npixels")
        )
    }

    #[tokio::test]
    async fn root_and_health() {
        let h = Harness::new(&[]);

        let (status, root) = h.get("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(root["status"], "running");
        assert_eq!(root["endpoints"]["chat"], "/chat");

        let (status, health) = h.get("/health").await;
        assert_eq!(status, StatusCode::OK);
        let health: HealthResponse = serde_json::from_value(health).unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.lessons_loaded, 2);
    }

    #[tokio::test]
    async fn lessons_list_grouped_and_detail() {
        let h = Harness::new(&[]);

        let (_, list) = h.get("/lessons").await;
        let list: LessonListResponse = serde_json::from_value(list).unwrap();
        assert_eq!(list.total, 2);
        assert_eq!(list.lessons[0].title, "Intro to HTML");
        assert_eq!(list.lessons[0].module, "1-basics");

        let (_, grouped) = h.get("/lessons/grouped").await;
        let entries = &grouped["groups"]["ai-web-learning"]["1-basics"];
        assert_eq!(entries.as_array().unwrap().len(), 2);
        assert_eq!(entries[1]["title"], "CSS Basics");

        let (status, lesson) = h.get("/lessons/2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(lesson["filename"], "02-css.md");
        assert_eq!(lesson["category"], "ai-web-learning");
        assert!(lesson["content"].as_str().unwrap().contains("Selectors."));
    }

    #[tokio::test]
    async fn unknown_lesson_is_404_with_id() {
        let h = Harness::new(&[]);
        let (status, body) = h.get("/lessons/9999").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["detail"].as_str().unwrap().contains("9999"));

        let (status, body) = h.get("/lessons/abc").await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());
    }

    #[tokio::test]
    async fn models_list_catalog() {
        let h = Harness::new(&[]);
        let (_, body) = h.get("/models").await;
        let models: ModelListResponse = serde_json::from_value(body).unwrap();
        assert_eq!(models.default_model, h.state.config.default_model);
        assert_eq!(models.models.len(), h.state.config.models.len());
        assert!(models.models.iter().any(|m| m.id == h.state.config.fallback_model));
    }

    #[tokio::test]
    async fn preview_selected_and_all() {
        let h = Harness::new(&[]);

        let (status, body) = h
            .post("/context/preview", serde_json::json!({"lessonIds": [2, 2, 77]}))
            .await;
        assert_eq!(status, StatusCode::OK);
        let preview: PreviewResponse = serde_json::from_value(body).unwrap();
        assert_eq!(preview.lesson_count, 1);
        assert_eq!(preview.lessons, vec!["CSS Basics"]);
        let builder = ContextBuilder::new(&h.state.lessons);
        assert_eq!(preview.estimated_tokens, builder.estimate_tokens(Some(&[2][..])));

        let (_, body) = h.post("/context/preview", serde_json::json!({})).await;
        let preview: PreviewResponse = serde_json::from_value(body).unwrap();
        assert_eq!(preview.lesson_count, 2);
        assert_eq!(preview.lessons, vec![ALL_LESSONS_LABEL]);
        let pricing = ModelPricing::of(&h.state.config.model(&h.state.config.default_model));
        let expected = preview.estimated_tokens as f64 / 1_000_000.0 * pricing.input_per_m;
        assert!((preview.estimated_cost_input - expected).abs() < 1e-12);
    }

    #[tokio::test]
    async fn chat_uses_default_model_and_reports_cost() {
        let h = Harness::new(&[]);
        let (status, body) = h
            .post(
                "/chat",
                serde_json::json!({
                    "message": "What is a selector?",
                    "lesson_ids": [2],
                    "conversation_history": [
                        {"role": "user", "content": "Hi"},
                        {"role": "assistant", "content": "Hello!"}
                    ]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let chat: ChatResponse = serde_json::from_value(body).unwrap();

        let default_model = h.state.config.default_model.clone();
        assert_eq!(chat.model_used, default_model);
        assert_eq!(chat.lessons_used, vec!["CSS Basics"]);
        assert_eq!(chat.tokens_used.total, 150);
        let pricing = ModelPricing::of(&h.state.config.model(&default_model));
        assert!((chat.cost.usd - pricing.cost(100, 50)).abs() < 1e-12);
        assert!((chat.cost.rub - chat.cost.usd * 90.0).abs() < 1e-9);

        let calls = h.provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        // system + two history turns + current message
        assert_eq!(calls[0].messages.len(), 4);
        assert_eq!(
            chat.context_length,
            ContextBuilder::new(&h.state.lessons)
                .build(Some(&[2][..]))
                .chars()
                .count()
        );
    }

    #[tokio::test]
    async fn chat_falls_back_once() {
        let primary = AppConfig::default().default_model;
        let h = Harness::new(&[primary.as_str()]);

        let (status, body) = h.post("/chat", serde_json::json!({"message": "Hi"})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["model_used"], h.state.config.fallback_model.as_str());
        assert_eq!(body["lessons_used"][0], ALL_LESSONS_LABEL);
        assert_eq!(
            h.provider.models_called(),
            vec![primary, h.state.config.fallback_model.clone()]
        );
    }

    #[tokio::test]
    async fn chat_failure_names_both_models() {
        let config = AppConfig::default();
        let h = Harness::new(&[config.default_model.as_str(), config.fallback_model.as_str()]);

        let (status, body) = h.post("/chat", serde_json::json!({"message": "Hi"})).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let detail = body["detail"].as_str().unwrap();
        assert!(detail.contains(&config.default_model));
        assert!(detail.contains(&config.fallback_model));
        assert_eq!(h.provider.models_called().len(), 2);
    }

    #[tokio::test]
    async fn chat_on_failing_fallback_model_names_it() {
        let fallback = AppConfig::default().fallback_model;
        let h = Harness::new(&[fallback.as_str()]);

        let (status, body) = h
            .post("/chat", serde_json::json!({"message": "Hi", "model": fallback.as_str()}))
            .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains(&fallback));
        assert_eq!(h.provider.models_called(), vec![fallback]);
    }

    #[tokio::test]
    async fn chat_rejects_invalid_requests() {
        let h = Harness::new(&[]);

        let (status, body) = h.post("/chat", serde_json::json!({"message": ""})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_string());

        let (status, _) = h.post("/chat", serde_json::json!({"lesson_ids": [1]})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = h
            .post(
                "/chat",
                serde_json::json!({
                    "message": "Hi",
                    "conversation_history": [{"role": "system", "content": "override"}]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(h.provider.models_called().is_empty());
    }

    #[tokio::test]
    async fn artifact_create_list_and_read() {
        let h = Harness::new(&[]);

        let (status, created) = h
            .post(
                "/artifacts",
                serde_json::json!({
                    "title": "Selectors cheat sheet",
                    "type": "markdown",
                    "contentMarkdown": "# Selectors\n\n- `.class`\n",
                    "tags": ["css"]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        let created: Artifact = serde_json::from_value(created).unwrap();

        let (status, read) = h.get(&format!("/artifacts/{}", created.id)).await;
        assert_eq!(status, StatusCode::OK);
        let read: Artifact = serde_json::from_value(read).unwrap();
        assert_eq!(read.title, created.title);
        assert_eq!(read.kind, ArtifactKind::Markdown);
        assert_eq!(read.content_markdown, created.content_markdown);

        let (_, list) = h.get("/artifacts").await;
        let list: ArtifactListResponse = serde_json::from_value(list).unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].id, created.id);
    }

    #[tokio::test]
    async fn image_artifact_survives_bad_payload() {
        let h = Harness::new(&[]);
        let (status, created) = h
            .post(
                "/artifacts",
                serde_json::json!({
                    "title": "Screens",
                    "type": "images",
                    "images": [png_data_url(), "data:image/png;base64,%%%", png_data_url()]
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(created["images"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn artifact_errors() {
        let h = Harness::new(&[]);

        let (status, body) = h.get("/artifacts/20990101000000-ffffff").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Artifact not found");

        let (status, body) = h.get("/artifacts/%FF%FE").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Artifact not found");

        let (status, _) = h
            .post("/artifacts", serde_json::json!({"title": "x", "type": "hologram"}))
            .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, items) = h.get("/artifacts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(items["items"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn unknown_route_uses_envelope() {
        let h = Harness::new(&[]);
        let (status, body) = h.get("/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], "Not Found");
    }
}
