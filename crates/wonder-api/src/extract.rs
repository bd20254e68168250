//! Body extractors whose rejections keep the JSON `{error}` contract.

use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{FromRequest, Multipart, Request};
use axum::http::header::CONTENT_TYPE;
use axum::{Form, Json};
use serde::Deserialize;
use wonder_core::WonderError;

use crate::error::ApiError;
use crate::orchestrator::{GenerateRequest, UploadedImage};

/// `Json<T>` answering 400 `{error}` when the body is missing or malformed
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| WonderError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `Form<T>` answering 400 `{error}` when the body is missing or malformed
pub struct ApiForm<T>(pub T);

impl<T, S> FromRequest<S> for ApiForm<T>
where
    Form<T>: FromRequest<S, Rejection = FormRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Form(value) = Form::<T>::from_request(req, state)
            .await
            .map_err(|rejection| WonderError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// Url-encoded `/generate` fields. Images need multipart.
#[derive(Debug, Default, Deserialize)]
struct GenerateFields {
    topic: Option<String>,
    age: Option<String>,
    interests: Option<String>,
}

/// Read a `/generate` body as multipart or url-encoded form data.
/// A request without a content type reads as an empty form.
pub async fn read_generate_request(req: Request) -> Result<GenerateRequest, WonderError> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(str::to_ascii_lowercase);

    match content_type.as_deref() {
        Some(ct) if ct.starts_with("multipart/form-data") => {
            let multipart = Multipart::from_request(req, &())
                .await
                .map_err(|rejection| {
                    WonderError::Validation(format!("Invalid form data: {}", rejection.body_text()))
                })?;
            read_multipart(multipart).await
        }
        Some(ct) if ct.starts_with("application/x-www-form-urlencoded") => {
            let Form(fields) = Form::<GenerateFields>::from_request(req, &())
                .await
                .map_err(|rejection| {
                    WonderError::Validation(format!("Invalid form data: {}", rejection.body_text()))
                })?;
            let mut request = GenerateRequest::default();
            for (name, value) in [
                ("topic", fields.topic),
                ("age", fields.age),
                ("interests", fields.interests),
            ] {
                if let Some(value) = value {
                    apply_text_field(&mut request, name, &value)?;
                }
            }
            Ok(request)
        }
        None => Ok(GenerateRequest::default()),
        Some(other) => Err(WonderError::Validation(format!(
            "Unsupported content type '{}': send multipart/form-data or application/x-www-form-urlencoded",
            other
        ))),
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<GenerateRequest, WonderError> {
    let mut request = GenerateRequest::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| WonderError::Validation(format!("Invalid form data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| WonderError::Validation(format!("Invalid image upload: {}", e)))?;
                request.image = Some(UploadedImage { file_name, bytes });
            }
            "topic" | "age" | "interests" => {
                let value = field.text().await.map_err(|e| {
                    WonderError::Validation(format!("Invalid form field '{}': {}", name, e))
                })?;
                apply_text_field(&mut request, &name, &value)?;
            }
            _ => {}
        }
    }

    Ok(request)
}

/// Blank values are skipped.
fn apply_text_field(
    request: &mut GenerateRequest,
    name: &str,
    value: &str,
) -> Result<(), WonderError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    match name {
        "topic" => request.topic = Some(value.to_string()),
        "interests" => request.interests = Some(value.to_string()),
        "age" => {
            let age = value
                .parse()
                .map_err(|_| WonderError::Validation("Age must be a whole number".to_string()))?;
            request.age = Some(age);
        }
        _ => {}
    }
    Ok(())
}
