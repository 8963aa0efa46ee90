use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Multipart, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use rand::thread_rng;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::metadata::{self, GeneratedMetadata, KEYWORD_LIMIT};
use crate::youtube::{UploadForm, UploadOutcome, YouTubeClient};

const TOPIC_MIN_CHARS: usize = 3;
const TOPIC_MAX_CHARS: usize = 180;

pub struct AppState {
    pub config: AppConfig,
}

#[derive(Debug, Deserialize)]
pub struct MetadataRequest {
    topic: Option<String>,
    keywords: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = state.config.max_upload_bytes;
    Router::new()
        .route("/healthz", get(health))
        .route("/api/metadata", post(generate_metadata))
        .route("/api/upload", post(upload_video))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn generate_metadata(
    payload: Result<Json<MetadataRequest>, JsonRejection>,
) -> Result<Json<GeneratedMetadata>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::Validation(rejection.body_text()))?;
    let topic = validate_topic(request.topic.as_deref())?;
    let keywords = metadata::sanitize_keywords(request.keywords.as_deref(), KEYWORD_LIMIT);
    Ok(Json(metadata::generate(topic, &keywords, &mut thread_rng())))
}

async fn upload_video(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<UploadOutcome>, ApiError> {
    // Credential before body: a misconfigured deployment fails without
    // draining the whole upload.
    let client = YouTubeClient::connect(&state.config).await?;
    let form = collect_upload_form(multipart).await?;
    let outcome = client.upload(form).await?;
    Ok(Json(outcome))
}

/// Topic must be 3-180 characters once surrounding whitespace is dropped.
fn validate_topic(raw: Option<&str>) -> Result<&str, ApiError> {
    let topic = raw
        .map(str::trim)
        .ok_or_else(|| ApiError::Validation("topic is required".to_string()))?;
    let length = topic.chars().count();
    if length < TOPIC_MIN_CHARS {
        return Err(ApiError::Validation(format!(
            "topic must be at least {TOPIC_MIN_CHARS} characters"
        )));
    }
    if length > TOPIC_MAX_CHARS {
        return Err(ApiError::Validation(format!(
            "topic must be at most {TOPIC_MAX_CHARS} characters"
        )));
    }
    Ok(topic)
}

async fn collect_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "video" => {
                form.mime_type = field.content_type().map(str::to_string);
                form.file_name = field.file_name().map(str::to_string);
                form.video = Some(field.bytes().await?);
            }
            "title" => form.title = Some(field.text().await?),
            "description" => form.description = Some(field.text().await?),
            "privacyStatus" => form.privacy_status = Some(field.text().await?),
            "tags" => form.tags = Some(field.text().await?),
            _ => {}
        }
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_is_trimmed_before_length_checks() {
        assert_eq!(validate_topic(Some("  Intro to Go routines  ")).unwrap(), "Intro to Go routines");
        assert!(validate_topic(Some("  ab  ")).is_err());
    }

    #[test]
    fn topic_bounds_are_enforced() {
        assert!(validate_topic(None).is_err());
        assert!(validate_topic(Some("ab")).is_err());
        assert!(validate_topic(Some("abc")).is_ok());
        let long = "x".repeat(180);
        assert!(validate_topic(Some(&long)).is_ok());
        let too_long = "x".repeat(181);
        assert!(validate_topic(Some(&too_long)).is_err());
    }
}
