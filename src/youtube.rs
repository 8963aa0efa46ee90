use bytes::Bytes;
use chrono::{DateTime, Duration, Utc};
use oauth2::basic::BasicClient;
use oauth2::reqwest::async_http_client;
use oauth2::{AuthUrl, ClientId, ClientSecret, RedirectUrl, RefreshToken, TokenResponse, TokenUrl};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::metadata::{sanitize_keywords, TAG_LIMIT};

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
/// People & Blogs; the platform requires some category on insert.
const VIDEO_CATEGORY_ID: &str = "22";
const DEFAULT_TITLE: &str = "Untitled Upload";
const FALLBACK_UPLOAD_ERROR: &str = "Failed to upload video.";

/// Visibility of the uploaded video on the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    Public,
    Unlisted,
    #[default]
    Private,
}

impl std::str::FromStr for PrivacyStatus {
    type Err = ApiError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "public" => Ok(Self::Public),
            "unlisted" => Ok(Self::Unlisted),
            "private" => Ok(Self::Private),
            other => Err(ApiError::Validation(format!(
                "Unknown privacy status: {other}"
            ))),
        }
    }
}

/// Fields lifted out of the inbound multipart request, defaults not yet
/// applied.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub video: Option<Bytes>,
    pub mime_type: Option<String>,
    pub file_name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub privacy_status: Option<String>,
    pub tags: Option<String>,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InsertResponse {
    id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlatformError {
    error: Option<PlatformErrorBody>,
}

#[derive(Debug, Deserialize)]
struct PlatformErrorBody {
    message: Option<String>,
}

/// Authenticated handle to the one configured channel. Built fresh per
/// request; nothing is cached or shared across calls.
pub struct YouTubeClient {
    http: Client,
    access_token: String,
    token_expires_at: Option<DateTime<Utc>>,
    upload_url: String,
}

impl YouTubeClient {
    /// Wraps an access token obtained elsewhere. The upload timeout ceiling
    /// comes from configuration.
    pub fn with_access_token(
        access_token: impl Into<String>,
        config: &AppConfig,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(config.upload_timeout_secs))
            .build()
            .map_err(|err| ApiError::Internal(err.to_string()))?;

        Ok(Self {
            http,
            access_token: access_token.into(),
            token_expires_at: None,
            upload_url: config.youtube.upload_url.clone(),
        })
    }

    /// Exchanges the configured refresh token for an access token and
    /// returns a handle bound to the configured channel.
    pub async fn connect(config: &AppConfig) -> Result<Self, ApiError> {
        let creds = config.youtube.credentials()?;

        let oauth_client = BasicClient::new(
            ClientId::new(creds.client_id),
            Some(ClientSecret::new(creds.client_secret)),
            AuthUrl::new(GOOGLE_AUTH_URL.to_string())
                .map_err(|err| ApiError::Configuration(format!("Invalid auth URL: {err}")))?,
            Some(
                TokenUrl::new(config.youtube.token_url.clone())
                    .map_err(|err| ApiError::Configuration(format!("Invalid token URL: {err}")))?,
            ),
        )
        .set_redirect_uri(RedirectUrl::new(creds.redirect_uri).map_err(|err| {
            ApiError::Configuration(format!("Invalid GOOGLE_REDIRECT_URI: {err}"))
        })?);

        let token = oauth_client
            .exchange_refresh_token(&RefreshToken::new(creds.refresh_token))
            .request_async(async_http_client)
            .await
            .map_err(|err| ApiError::Upload(format!("Token refresh failed: {err}")))?;

        let token_expires_at = token
            .expires_in()
            .map(|ttl| Utc::now() + Duration::seconds(ttl.as_secs() as i64));
        tracing::debug!(?token_expires_at, "obtained access token");

        let mut client = Self::with_access_token(token.access_token().secret().clone(), config)?;
        client.token_expires_at = token_expires_at;
        Ok(client)
    }

    pub fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.token_expires_at
    }

    /// Runs one insert call against the platform: validate the payload,
    /// apply field defaults, stream the bytes out. A failure here is final;
    /// the caller decides whether to try again.
    pub async fn upload(&self, form: UploadForm) -> Result<UploadOutcome, ApiError> {
        let video = form
            .video
            .ok_or_else(|| ApiError::Validation("Video file is required.".to_string()))?;
        if video.is_empty() {
            return Err(ApiError::Validation("Uploaded file is empty.".to_string()));
        }

        let title = form
            .title
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| DEFAULT_TITLE.to_string());
        let description = form.description.unwrap_or_default();
        let privacy_status = match form.privacy_status.as_deref().filter(|raw| !raw.is_empty()) {
            Some(raw) => raw.parse::<PrivacyStatus>()?,
            None => PrivacyStatus::default(),
        };
        let tags = sanitize_keywords(form.tags.as_deref(), TAG_LIMIT);

        let mut snippet = json!({
            "title": title,
            "description": description,
            "categoryId": VIDEO_CATEGORY_ID,
        });
        // The platform distinguishes "no tags" from an empty list; omit the
        // key entirely when nothing survived sanitizing.
        if !tags.is_empty() {
            snippet["tags"] = json!(tags);
        }
        let metadata = json!({
            "snippet": snippet,
            "status": {
                "privacyStatus": privacy_status,
                "selfDeclaredMadeForKids": false,
            },
        });

        let mime_type = form
            .mime_type
            .filter(|mime| !mime.is_empty())
            .unwrap_or_else(|| "video/*".to_string());
        let file_name = form
            .file_name
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "video.mp4".to_string());
        let payload_bytes = video.len();

        // The bytes are already buffered from the inbound request; hand them
        // to the transport as a stream so no second full copy is made.
        let media = Part::stream(reqwest::Body::from(video))
            .file_name(file_name)
            .mime_str(&mime_type)
            .map_err(|err| ApiError::Validation(format!("Unsupported video MIME type: {err}")))?;
        let snippet_part = Part::text(metadata.to_string())
            .mime_str("application/json")
            .map_err(|err| ApiError::Internal(err.to_string()))?;
        let body = Form::new().part("snippet", snippet_part).part("media", media);

        tracing::info!(%title, payload_bytes, ?privacy_status, "uploading video");

        let response = self
            .http
            .post(&self.upload_url)
            .query(&[("uploadType", "multipart"), ("part", "snippet,status")])
            .bearer_auth(&self.access_token)
            .multipart(body)
            .send()
            .await
            .map_err(|err| ApiError::Upload(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ApiError::Upload(platform_error_message(status, &text)));
        }

        let inserted: InsertResponse = response
            .json()
            .await
            .map_err(|err| ApiError::Upload(err.to_string()))?;
        match &inserted.id {
            Some(id) => tracing::info!(video_id = %id, "upload accepted"),
            None => tracing::warn!("upload accepted but the platform returned no video id"),
        }

        let video_url = inserted
            .id
            .as_ref()
            .map(|id| format!("https://www.youtube.com/watch?v={id}"));
        Ok(UploadOutcome {
            video_id: inserted.id,
            video_url,
        })
    }
}

/// The platform's own message when the error body carries one, then the raw
/// body, then a generic fallback.
fn platform_error_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<PlatformError>(body) {
        if let Some(message) = parsed.error.and_then(|err| err.message) {
            return message;
        }
    }
    if body.trim().is_empty() {
        format!("{FALLBACK_UPLOAD_ERROR} (status {status})")
    } else {
        format!("Upload failed: {body}")
    }
}
