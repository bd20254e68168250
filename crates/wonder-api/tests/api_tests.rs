//! Router-level tests: every request goes through `create_app` with a
//! scripted provider and a temporary upload directory.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use wonder_api::orchestrator::{self, GenerateRequest, GenerationRoute};
use wonder_api::{create_app, AppState};
use wonder_core::ProviderError;
use wonder_policy::SafetyMode;
use wonder_provider::{AiProvider, ProviderCall, ScriptedProvider};

const BOUNDARY: &str = "wonderboundary";

struct Harness {
    app: Router,
    state: Arc<AppState>,
    provider: Arc<ScriptedProvider>,
    uploads: TempDir,
}

fn harness(provider: ScriptedProvider) -> Harness {
    harness_with(provider, true, SafetyMode::Advisory)
}

fn harness_with(provider: ScriptedProvider, ai_configured: bool, mode: SafetyMode) -> Harness {
    harness_configured(provider, ai_configured, |state| state.with_safety_mode(mode))
}

fn harness_configured(
    provider: ScriptedProvider,
    ai_configured: bool,
    configure: impl FnOnce(AppState) -> AppState,
) -> Harness {
    let provider = Arc::new(provider);
    let uploads = tempfile::tempdir().unwrap();
    let shared: Arc<dyn AiProvider> = provider.clone();
    let state = Arc::new(configure(
        AppState::new(shared, ai_configured, uploads.path()).unwrap(),
    ));
    Harness {
        app: create_app(state.clone()),
        state,
        provider,
        uploads,
    }
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn generate_request(parts: &[Part], token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/generate")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(multipart(parts))).unwrap()
}

fn urlencoded_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/generate")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn raw_request(method: &str, uri: &str, content_type: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn send_text(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8_lossy(&bytes).to_string())
}

fn pipeline_script(provider: ScriptedProvider) -> ScriptedProvider {
    provider
        .with_completion(r#"{"content": "Volcanoes are openings in the Earth where hot rock escapes."}"#)
        .with_completion(r#"{"status": "safe", "notes": ""}"#)
        .with_completion(r#"{"analogy": "Like a shaken soda bottle."}"#)
        .with_completion(r#"{"result": "Volcanoes are like shaken soda bottles for the Earth!"}"#)
}

fn completion_count(provider: &ScriptedProvider) -> usize {
    provider
        .calls()
        .iter()
        .filter(|call| matches!(call, ProviderCall::Complete { .. }))
        .count()
}

async fn register_and_login(app: &Router, username: &str) -> (String, String) {
    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/auth/register",
            json!({
                "username": username,
                "email": format!("{}@example.com", username),
                "password": "hunter22",
                "age": 8,
                "interests": "space, dinosaurs, trains, music"
            }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        app,
        json_request(
            "POST",
            "/auth/login",
            json!({"username": username, "password": "hunter22"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "bearer");
    (user_id, body["access_token"].as_str().unwrap().to_string())
}

// ============================================================================
// Input validation
// ============================================================================

#[tokio::test]
async fn test_topic_and_image_together_rejected_without_side_effects() {
    let h = harness(ScriptedProvider::new().with_completion("unused"));

    let (status, body) = send(
        &h.app,
        generate_request(
            &[
                Part::Text("topic", "What is a volcano?"),
                Part::File("image", "cat.png", b"\x89PNG fake"),
            ],
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Please provide either a question or an image, but not both."
    );
    assert!(h.provider.calls().is_empty());
    assert_eq!(h.state.cache.len().await, 0);
    assert_eq!(std::fs::read_dir(h.uploads.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_neither_topic_nor_image_rejected() {
    let h = harness(ScriptedProvider::new());
    let (status, _) = send(&h.app, generate_request(&[Part::Text("age", "7")], None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(h.provider.calls().is_empty());
}

#[tokio::test]
async fn test_empty_post_gets_json_error() {
    let h = harness(ScriptedProvider::new());
    let empty = Request::builder()
        .method("POST")
        .uri("/generate")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&h.app, empty).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Please provide either a question or an image, but not both."
    );

    let (status, body) = send(&h.app, urlencoded_request("")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Please provide either a question or an image, but not both."
    );
    assert!(h.provider.calls().is_empty());
}

#[tokio::test]
async fn test_broken_multipart_gets_json_error() {
    let h = harness(ScriptedProvider::new());
    let (status, body) = send(
        &h.app,
        raw_request("POST", "/generate", "multipart/form-data", "topic=rain"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid form data"));

    let (status, body) = send(&h.app, raw_request("POST", "/generate", "text/plain", "rain")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Unsupported content type"));
}

#[tokio::test]
async fn test_bad_age_rejected() {
    let h = harness(ScriptedProvider::new());
    let (status, body) = send(
        &h.app,
        generate_request(&[Part::Text("topic", "rain"), Part::Text("age", "seven")], None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Age must be a whole number");
}

#[tokio::test]
async fn test_missing_api_key_answers_503() {
    let h = harness_with(ScriptedProvider::new(), false, SafetyMode::Advisory);
    let (status, body) = send(
        &h.app,
        generate_request(&[Part::Text("topic", "What is rain?")], None),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("not configured"));
    assert!(h.provider.calls().is_empty());
}

// ============================================================================
// Routing and caching
// ============================================================================

#[tokio::test]
async fn test_simple_question_uses_fast_path_and_is_cached() {
    let h = harness(
        ScriptedProvider::new().with_completion("Volcanoes are mountains that let out hot lava."),
    );
    let request = || {
        generate_request(
            &[
                Part::Text("topic", "What is a volcano?"),
                Part::Text("age", "7"),
                Part::Text("interests", "dinosaurs"),
            ],
            None,
        )
    };

    let (status, first) = send(&h.app, request()).await;
    assert_eq!(status, StatusCode::OK, "{}", first);
    let outputs = &first["outputs"];
    assert_eq!(outputs["result"], "Volcanoes are mountains that let out hot lava.");
    assert!(outputs["diagram_url"].as_str().unwrap().starts_with("/uploaded_images/diagram_"));
    assert!(outputs["diagram_error"].is_null());
    assert!(outputs["audio_url"].as_str().unwrap().starts_with("/uploaded_images/audio_"));

    match &h.provider.calls()[0] {
        ProviderCall::Complete { prompt, max_tokens, .. } => {
            assert_eq!(*max_tokens, 150);
            assert!(prompt.contains("for a 7-year-old child"));
            assert!(prompt.contains("who loves dinosaurs"));
        }
        other => panic!("unexpected first call {:?}", other),
    }
    let calls_after_first = h.provider.calls().len();

    let (status, second) = send(&h.app, request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first, second);
    assert_eq!(h.provider.calls().len(), calls_after_first);

    let (_, metrics) = send_text(&h.app, get_request("/metrics", None)).await;
    assert!(metrics.contains(r#"wonder_generate_requests_total{route="fast_path"} 1"#));
    assert!(metrics.contains(r#"wonder_generate_requests_total{route="cache_hit"} 1"#));
}

#[tokio::test]
async fn test_urlencoded_form_is_accepted() {
    let h = harness(ScriptedProvider::new().with_completion("The sky scatters blue light the most."));

    let (status, body) = send(
        &h.app,
        urlencoded_request("topic=What+makes+the+sky+blue%3F&age=7&interests=space"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["outputs"]["result"], "The sky scatters blue light the most.");

    match &h.provider.calls()[0] {
        ProviderCall::Complete { prompt, .. } => {
            assert!(prompt.contains("What makes the sky blue?"));
            assert!(prompt.contains("for a 7-year-old child who loves space"));
        }
        other => panic!("unexpected first call {:?}", other),
    }

    let (status, body) = send(&h.app, urlencoded_request("topic=rain&age=seven")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Age must be a whole number");
}

#[tokio::test]
async fn test_cache_key_normalizes_topic_but_not_audience() {
    let h = harness(
        ScriptedProvider::new()
            .with_completion("Rain is water falling from clouds.")
            .with_completion("Rain is water falling from clouds, for big kids."),
    );

    send(&h.app, generate_request(&[Part::Text("topic", "What is rain?")], None)).await;
    let (_, same) = send(
        &h.app,
        generate_request(&[Part::Text("topic", "  what IS   rain? ")], None),
    )
    .await;
    assert_eq!(same["outputs"]["result"], "Rain is water falling from clouds.");
    assert_eq!(completion_count(&h.provider), 1);

    let (_, older) = send(
        &h.app,
        generate_request(&[Part::Text("topic", "What is rain?"), Part::Text("age", "11")], None),
    )
    .await;
    assert_eq!(older["outputs"]["result"], "Rain is water falling from clouds, for big kids.");
    assert_eq!(completion_count(&h.provider), 2);
}

#[tokio::test]
async fn test_open_topic_runs_full_pipeline() {
    let h = harness(pipeline_script(ScriptedProvider::new()));

    let (status, body) = send(
        &h.app,
        generate_request(&[Part::Text("topic", "Tell me about volcanoes")], None),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(
        body["outputs"]["result"],
        "Volcanoes are like shaken soda bottles for the Earth!"
    );
    assert_eq!(completion_count(&h.provider), 4);
    assert_eq!(h.provider.pending_completions(), 0);
}

#[tokio::test]
async fn test_outcome_carries_stage_trace() {
    let h = harness(
        pipeline_script(ScriptedProvider::new()).with_completion("Rain is water falling from clouds."),
    );

    let request = GenerateRequest {
        topic: Some("Tell me about volcanoes".into()),
        ..Default::default()
    };
    let outcome = orchestrator::generate(&h.state, request, None).await.unwrap();
    assert_eq!(outcome.route, GenerationRoute::Pipeline);
    let stages: Vec<&str> = outcome.trace.iter().map(|step| step.id.as_str()).collect();
    assert_eq!(
        stages,
        ["research.text.v1", "validate.safety.v1", "analogy.text.v1", "present.text.v1"]
    );

    let request = GenerateRequest {
        topic: Some("What is rain?".into()),
        ..Default::default()
    };
    let outcome = orchestrator::generate(&h.state, request, None).await.unwrap();
    assert_eq!(outcome.route, GenerationRoute::FastPath);
    assert!(outcome.trace.is_empty());
}

#[tokio::test]
async fn test_fast_path_failure_falls_back_to_pipeline() {
    let h = harness(pipeline_script(
        ScriptedProvider::new()
            .with_completion_error(ProviderError::Status { status: 500, message: "down".into() }),
    ));

    let (status, body) = send(
        &h.app,
        generate_request(&[Part::Text("topic", "What is a volcano?")], None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["outputs"]["result"],
        "Volcanoes are like shaken soda bottles for the Earth!"
    );
    assert_eq!(completion_count(&h.provider), 5);
}

#[tokio::test]
async fn test_pipeline_failure_answers_500_and_is_not_cached() {
    let h = harness(
        ScriptedProvider::new()
            .with_completion(r#"{"content": "Volcanoes are hot."}"#)
            .with_completion("I think this is fine."),
    );

    let (status, body) = send(
        &h.app,
        generate_request(&[Part::Text("topic", "Tell me about volcanoes")], None),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("MALFORMED"));
    assert_eq!(h.state.cache.len().await, 0);
}

// ============================================================================
// Post-processing
// ============================================================================

#[tokio::test]
async fn test_diagram_failure_still_returns_200() {
    let h = harness(
        ScriptedProvider::new()
            .with_completion("Clouds are tiny water drops floating together.")
            .with_image_result(Err(ProviderError::Status { status: 500, message: "boom".into() })),
    );

    let (status, body) = send(
        &h.app,
        generate_request(&[Part::Text("topic", "What are clouds?")], None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let outputs = &body["outputs"];
    assert_eq!(outputs["result"], "Clouds are tiny water drops floating together.");
    assert!(outputs["diagram_url"].as_str().unwrap().contains("placehold.co"));
    assert!(outputs["diagram_error"].is_string());
    assert!(outputs["audio_url"].as_str().unwrap().starts_with("/uploaded_images/audio_"));
}

#[tokio::test]
async fn test_generated_assets_are_served() {
    let h = harness(ScriptedProvider::new().with_completion("Stars are giant balls of gas."));

    let (_, body) = send(
        &h.app,
        generate_request(&[Part::Text("topic", "What are stars?")], None),
    )
    .await;
    let audio_url = body["outputs"]["audio_url"].as_str().unwrap().to_string();

    let response = h.app.clone().oneshot(get_request(&audio_url, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], wonder_provider::FAKE_MP3);
}

// ============================================================================
// Images
// ============================================================================

#[tokio::test]
async fn test_image_upload_cached_by_content() {
    let h = harness(
        ScriptedProvider::new()
            .with_description("This is a fluffy cat taking a nap.")
            .with_description("This is a red fire truck."),
    );
    let cat: &[u8] = b"\x89PNG\r\n\x1a\ncat-bytes";
    let truck: &[u8] = b"\x89PNG\r\n\x1a\ntruck-bytes";

    let (status, first) = send(
        &h.app,
        generate_request(&[Part::File("image", "cat.png", cat)], None),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", first);
    assert_eq!(first["outputs"]["result"], "This is a fluffy cat taking a nap.");
    let calls_after_first = h.provider.calls().len();

    let (_, again) = send(
        &h.app,
        generate_request(&[Part::File("image", "renamed.png", cat)], None),
    )
    .await;
    assert_eq!(again, first);
    assert_eq!(h.provider.calls().len(), calls_after_first);

    let (_, other) = send(
        &h.app,
        generate_request(&[Part::File("image", "truck.png", truck)], None),
    )
    .await;
    assert_eq!(other["outputs"]["result"], "This is a red fire truck.");
    assert_eq!(h.state.cache.len().await, 2);
}

#[tokio::test]
async fn test_image_falls_back_to_pipeline() {
    let h = harness(
        ScriptedProvider::new()
            .with_description_error(ProviderError::Timeout)
            .with_description(r#"{"image_description": "A photo of a cat sitting on a sofa."}"#)
            .with_completion(r#"{"result": "This is a cat resting on a comfy sofa!"}"#),
    );

    let (status, body) = send(
        &h.app,
        generate_request(&[Part::File("image", "cat.jpg", b"\xFF\xD8\xFFcat")], None),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["outputs"]["result"], "This is a cat resting on a comfy sofa!");
    let describes = h
        .provider
        .calls()
        .iter()
        .filter(|call| matches!(call, ProviderCall::DescribeImage { .. }))
        .count();
    assert_eq!(describes, 2);

    let stored: Vec<String> = std::fs::read_dir(h.uploads.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    assert!(stored.iter().any(|name| name.ends_with(".jpg")));
}

// ============================================================================
// Safety
// ============================================================================

#[tokio::test]
async fn test_enforced_safety_rejects_unsafe_explanation() {
    let h = harness_with(
        ScriptedProvider::new().with_completion("A bomb is a dangerous weapon."),
        true,
        SafetyMode::Enforce,
    );

    let (status, body) = send(
        &h.app,
        generate_request(&[Part::Text("topic", "What is a bomb?")], None),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
    assert_eq!(h.state.cache.len().await, 0);
    assert!(!h
        .provider
        .calls()
        .iter()
        .any(|call| matches!(call, ProviderCall::GenerateImage { .. })));
}

#[tokio::test]
async fn test_advisory_safety_only_logs() {
    let h = harness(ScriptedProvider::new().with_completion("A bomb is a dangerous weapon."));
    let (status, _) = send(
        &h.app,
        generate_request(&[Part::Text("topic", "What is a bomb?")], None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

// ============================================================================
// Auth and sessions
// ============================================================================

#[tokio::test]
async fn test_auth_flow_and_session_tracking() {
    let h = harness(ScriptedProvider::new().with_completion("Wind is moving air."));
    let (user_id, token) = register_and_login(&h.app, "mia").await;

    let (status, me) = send(&h.app, get_request("/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["user"]["username"], "mia");

    let (status, _) = send(
        &h.app,
        generate_request(&[Part::Text("topic", "What is wind?")], Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &h.app,
        get_request(&format!("/sessions/{}", user_id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let sessions = body["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["topic"], "What is wind?");
    assert_eq!(sessions[0]["explanation"], "Wind is moving air.");

    let (status, body) = send(
        &h.app,
        get_request(&format!("/learning/recommendations/{}", user_id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let recommendations = body["recommendations"].as_array().unwrap();
    assert_eq!(recommendations.len(), 3);
    assert_eq!(recommendations[0]["reason"], "Based on your interest in space");
}

#[tokio::test]
async fn test_auth_failures() {
    let h = harness(ScriptedProvider::new());
    let (mia_id, _) = register_and_login(&h.app, "mia").await;
    let (_, leo_token) = register_and_login(&h.app, "leo").await;

    let (status, body) = send(
        &h.app,
        json_request(
            "POST",
            "/auth/register",
            json!({"username": "mia", "email": "other@example.com", "password": "hunter22"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Username already registered");

    let (status, body) = send(
        &h.app,
        json_request(
            "POST",
            "/auth/login",
            json!({"username": "mia", "password": "nope-nope"}),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Incorrect username or password");

    let (status, _) = send(&h.app, get_request("/auth/me", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&h.app, get_request("/auth/me", Some("forged"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &h.app,
        get_request(&format!("/sessions/{}", mia_id), Some(&leo_token)),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Not authorized to access this user's sessions");
}

#[tokio::test]
async fn test_malformed_json_bodies_get_json_errors() {
    let h = harness(ScriptedProvider::new());

    let (status, body) = send(
        &h.app,
        json_request("POST", "/auth/register", json!({"username": "bob"}), None),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("missing field `email`"));

    let (status, body) = send(
        &h.app,
        raw_request("POST", "/auth/login", "application/json", "{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send(
        &h.app,
        raw_request("POST", "/auth/login", "text/plain", "bob"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// ============================================================================
// Quiz
// ============================================================================

fn quiz_form(token: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/quiz/generate")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_quiz_generate_submit_and_attempts() {
    let h = harness(ScriptedProvider::new().with_completion(
        r#"{"title": "Rain Quiz", "questions": [
            {"question": "Rain is water.", "question_type": "true_false", "correct_answer": "True"},
            {"question": "Rain falls from ___.", "question_type": "fill_blank", "correct_answer": "clouds"}
        ]}"#,
    ));
    let (user_id, token) = register_and_login(&h.app, "mia").await;

    let (status, body) = send(
        &h.app,
        quiz_form(&token, "topic=rain&explanation=Rain+falls+from+clouds.&difficulty=easy&num_questions=2"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["quiz"]["title"], "Rain Quiz");
    assert_eq!(body["quiz"]["difficulty"], "easy");
    let quiz_id = body["quiz"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(&h.app, get_request(&format!("/quiz/{}", quiz_id), Some(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quiz"]["questions"].as_array().unwrap().len(), 2);

    let (status, report) = send(
        &h.app,
        json_request(
            "POST",
            &format!("/quiz/{}/submit", quiz_id),
            json!({"answers": {"0": "true", "1": " Clouds "}}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["score"], 100.0);
    assert_eq!(report["correct_answers"], 2);
    assert!(report["feedback"].as_str().unwrap().contains("easy level expert"));
    assert!(report["attempt_id"].is_string());

    let (status, body) = send(
        &h.app,
        get_request(&format!("/quiz/user/{}/attempts", user_id), Some(&token)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attempts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_quiz_falls_back_and_unknown_quiz_is_404() {
    let h = harness(ScriptedProvider::new().with_completion("no json here"));
    let (_, token) = register_and_login(&h.app, "mia").await;

    let (status, body) = send(&h.app, quiz_form(&token, "topic=rain&explanation=Rain+is+wet.")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["quiz"]["title"], "Quick Quiz about rain");
    assert_eq!(body["quiz"]["difficulty"], "medium");

    let (status, body) = send(&h.app, get_request("/quiz/does-not-exist", Some(&token))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Quiz not found");

    let (status, _) = send(
        &h.app,
        quiz_form(&token, "topic=rain&explanation=Rain+is+wet.&difficulty=impossible"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&h.app, quiz_form(&token, "topic=rain")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("explanation"));

    let (status, body) = send(
        &h.app,
        json_request(
            "POST",
            "/quiz/some-quiz/submit",
            json!({"time_taken": 30}),
            Some(&token),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("missing field `answers`"));
}

// ============================================================================
// Admin
// ============================================================================

#[tokio::test]
async fn test_debug_storage_is_off_by_default() {
    let h = harness(ScriptedProvider::new());
    register_and_login(&h.app, "mia").await;

    let (status, body) = send(&h.app, get_request("/debug/storage", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body.get("users").is_none());
}

#[tokio::test]
async fn test_debug_storage_and_clear_data() {
    let h = harness_configured(
        ScriptedProvider::new().with_completion("Snow is frozen rain."),
        true,
        |state| state.with_debug_endpoints(true),
    );
    let (_, token) = register_and_login(&h.app, "mia").await;
    send(
        &h.app,
        generate_request(&[Part::Text("topic", "What is snow?")], Some(&token)),
    )
    .await;

    let (status, storage) = send(&h.app, get_request("/debug/storage", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(storage["total_users"], 1);
    assert_eq!(storage["total_sessions"], 1);
    assert_eq!(storage["cache_size"], 1);

    let (status, body) = send(&h.app, json_request("POST", "/clear-data", json!({}), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "All data cleared successfully");

    let (_, storage) = send(&h.app, get_request("/debug/storage", None)).await;
    assert_eq!(storage["total_users"], 0);
    assert_eq!(storage["cache_size"], 0);

    let (status, _) = send(&h.app, get_request("/auth/me", Some(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let h = harness_with(ScriptedProvider::new(), false, SafetyMode::Enforce);
    let (status, body) = send(&h.app, get_request("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["ai_configured"], false);
    assert_eq!(body["safety_mode"], "enforce");
}
