//! API Handlers
use axum::extract::{Path, Request, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::info;
use wonder_core::{WonderError, WONDER_VERSION};
use wonder_quiz::{generate_quiz, score_attempt, ScoreReport};
use wonder_store::{Difficulty, StorageSummary, UserCreate};

use crate::auth::{ensure_owner, CurrentUser, MaybeUser};
use crate::error::ApiError;
use crate::extract::{read_generate_request, ApiForm, ApiJson};
use crate::orchestrator;
use crate::state::SharedState;

const DEFAULT_NUM_QUESTIONS: u32 = 5;
const MAX_NUM_QUESTIONS: u32 = 20;

// ============================================================================
// Generate
// ============================================================================

pub fn generate_routes() -> Router<SharedState> {
    Router::new().route("/generate", post(generate))
}

async fn generate(
    State(state): State<SharedState>,
    MaybeUser(user): MaybeUser,
    body: Request,
) -> Result<Json<Value>, ApiError> {
    let outcome = async {
        let request = read_generate_request(body).await?;
        orchestrator::generate(&state, request, user.as_ref()).await
    }
    .await;

    match outcome {
        Ok(outcome) => {
            state.metrics.record_route(outcome.route);
            Ok(Json(json!({ "outputs": outcome.result })))
        }
        Err(e) => {
            state.metrics.record_failure(&e);
            Err(e.into())
        }
    }
}

// ============================================================================
// Auth
// ============================================================================

pub fn auth_routes() -> Router<SharedState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

async fn register(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<UserCreate>,
) -> Result<Json<Value>, ApiError> {
    let user = state.store.register(request).await?;
    Ok(Json(json!({
        "message": "User registered successfully",
        "user": user,
    })))
}

async fn login(
    State(state): State<SharedState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> Result<Json<Value>, ApiError> {
    let user = state
        .store
        .authenticate(&request.username, &request.password)
        .await?;
    let token = state.store.issue_token(&user.id).await;
    info!(user_id = %user.id, "user logged in");
    Ok(Json(json!({
        "access_token": token.token,
        "token_type": "bearer",
        "user": user,
    })))
}

async fn me(CurrentUser(user): CurrentUser) -> Json<Value> {
    Json(json!({ "user": user }))
}

// ============================================================================
// Quiz
// ============================================================================

pub fn quiz_routes() -> Router<SharedState> {
    Router::new()
        .route("/quiz/generate", post(create_quiz))
        .route("/quiz/{quiz_id}", get(get_quiz))
        .route("/quiz/{quiz_id}/submit", post(submit_quiz))
        .route("/quiz/user/{user_id}/attempts", get(list_attempts))
}

#[derive(Debug, Deserialize)]
pub struct QuizForm {
    pub topic: String,
    pub explanation: String,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub num_questions: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct QuizSubmission {
    pub answers: BTreeMap<String, String>,
    /// Seconds spent, when the client tracks it
    #[serde(default)]
    pub time_taken: u64,
}

async fn create_quiz(
    State(state): State<SharedState>,
    CurrentUser(_user): CurrentUser,
    ApiForm(form): ApiForm<QuizForm>,
) -> Result<Json<Value>, ApiError> {
    let difficulty = match form.difficulty.as_deref().map(str::trim) {
        None | Some("") => Difficulty::default(),
        Some(value) => value.parse()?,
    };
    let num_questions = form.num_questions.unwrap_or(DEFAULT_NUM_QUESTIONS);
    if !(1..=MAX_NUM_QUESTIONS).contains(&num_questions) {
        return Err(WonderError::Validation(format!(
            "num_questions must be between 1 and {}",
            MAX_NUM_QUESTIONS
        ))
        .into());
    }
    state.require_ai()?;

    let quiz = generate_quiz(
        state.provider.as_ref(),
        &form.explanation,
        &form.topic,
        difficulty,
        num_questions,
    )
    .await?;
    state.store.save_quiz(quiz.clone()).await;
    Ok(Json(json!({ "quiz": quiz })))
}

async fn get_quiz(
    State(state): State<SharedState>,
    CurrentUser(_user): CurrentUser,
    Path(quiz_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let quiz = state
        .store
        .get_quiz(&quiz_id)
        .await
        .ok_or_else(|| WonderError::NotFound("Quiz not found".to_string()))?;
    Ok(Json(json!({ "quiz": quiz })))
}

async fn submit_quiz(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(quiz_id): Path<String>,
    ApiJson(submission): ApiJson<QuizSubmission>,
) -> Result<Json<ScoreReport>, ApiError> {
    let quiz = state
        .store
        .get_quiz(&quiz_id)
        .await
        .ok_or_else(|| WonderError::NotFound("Quiz not found".to_string()))?;

    let report = score_attempt(&quiz, &user.id, submission.answers, submission.time_taken);
    state.store.record_attempt(report.attempt.clone()).await;
    info!(quiz_id = %quiz.id, user_id = %user.id, score = report.score, "quiz submitted");
    Ok(Json(report))
}

async fn list_attempts(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    ensure_owner(&user, &user_id, "attempts")?;
    let attempts = state.store.attempts_for(&user_id).await;
    Ok(Json(json!({ "attempts": attempts })))
}

// ============================================================================
// Learning
// ============================================================================

pub fn learning_routes() -> Router<SharedState> {
    Router::new()
        .route("/sessions/{user_id}", get(list_sessions))
        .route("/learning/recommendations/{user_id}", get(recommendations))
}

async fn list_sessions(
    State(state): State<SharedState>,
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    ensure_owner(&user, &user_id, "sessions")?;
    let sessions = state.store.sessions_for(&user_id).await;
    Ok(Json(json!({ "sessions": sessions })))
}

async fn recommendations(
    CurrentUser(user): CurrentUser,
    Path(user_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    ensure_owner(&user, &user_id, "recommendations")?;
    Ok(Json(json!({ "recommendations": user.recommendations() })))
}

// ============================================================================
// Admin
// ============================================================================

pub fn admin_routes() -> Router<SharedState> {
    Router::new()
        .route("/clear-data", post(clear_data))
        .route("/debug/storage", get(debug_storage))
        .route("/health", get(health))
        .route("/metrics", get(metrics))
}

#[derive(Debug, Serialize)]
pub struct StorageReport {
    #[serde(flatten)]
    pub storage: StorageSummary,
    pub cache_size: usize,
}

async fn clear_data(State(state): State<SharedState>) -> Json<Value> {
    state.cache.clear().await;
    state.store.clear().await;
    info!("all data cleared");
    Json(json!({ "message": "All data cleared successfully" }))
}

async fn debug_storage(State(state): State<SharedState>) -> Result<Json<StorageReport>, ApiError> {
    if !state.debug_endpoints {
        return Err(WonderError::NotFound("Not Found".to_string()).into());
    }
    Ok(Json(StorageReport {
        storage: state.store.summary().await,
        cache_size: state.cache.len().await,
    }))
}

async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": WONDER_VERSION,
        "ai_configured": state.ai_configured,
        "safety_mode": state.safety_mode,
        "uptime_secs": state.start_time.elapsed().as_secs(),
    }))
}

async fn metrics(State(state): State<SharedState>) -> Result<String, (StatusCode, String)> {
    state
        .metrics
        .encode()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
}
