use std::env;

use crate::error::ApiError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 4000;
const DEFAULT_MAX_UPLOAD_MB: usize = 256;
const DEFAULT_UPLOAD_TIMEOUT_SECS: u64 = 300;

const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const YOUTUBE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/youtube/v3/videos";

/// Environment variables the upload path cannot run without.
pub const REQUIRED_OAUTH_VARS: [&str; 4] = [
    "GOOGLE_CLIENT_ID",
    "GOOGLE_CLIENT_SECRET",
    "GOOGLE_REDIRECT_URI",
    "YOUTUBE_REFRESH_TOKEN",
];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// Cap on the inbound request body; the video is buffered in full.
    pub max_upload_bytes: usize,
    /// Ceiling for the single outbound upload call. Once issued it cannot be
    /// cancelled, only timed out.
    pub upload_timeout_secs: u64,
    pub youtube: YouTubeSettings,
}

/// OAuth material and endpoints for the one configured channel. The four
/// credential values stay optional here so the metadata endpoint can serve
/// on a deployment that never configured uploads.
#[derive(Clone, Debug)]
pub struct YouTubeSettings {
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: Option<String>,
    refresh_token: Option<String>,
    pub token_url: String,
    pub upload_url: String,
}

/// The four values, all present. Handed to the uploader per request.
#[derive(Clone, Debug)]
pub struct YouTubeCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub refresh_token: String,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads configuration through `get` so tests can supply values without
    /// mutating the process environment.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match get("PORT") {
            Some(raw) => raw
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            None => DEFAULT_PORT,
        };

        let max_upload_mb = get("MAX_UPLOAD_SIZE_MB")
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(DEFAULT_MAX_UPLOAD_MB);

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            max_upload_bytes: max_upload_mb * 1024 * 1024,
            upload_timeout_secs: get("UPLOAD_TIMEOUT_SECS")
                .and_then(|raw| raw.parse().ok())
                .unwrap_or(DEFAULT_UPLOAD_TIMEOUT_SECS),
            youtube: YouTubeSettings {
                client_id: get(REQUIRED_OAUTH_VARS[0]),
                client_secret: get(REQUIRED_OAUTH_VARS[1]),
                redirect_uri: get(REQUIRED_OAUTH_VARS[2]),
                refresh_token: get(REQUIRED_OAUTH_VARS[3]),
                token_url: get("YOUTUBE_TOKEN_URL").unwrap_or_else(|| GOOGLE_TOKEN_URL.to_string()),
                upload_url: get("YOUTUBE_UPLOAD_URL")
                    .unwrap_or_else(|| YOUTUBE_UPLOAD_URL.to_string()),
            },
        })
    }
}

impl YouTubeSettings {
    /// All four OAuth values, or a configuration error naming every missing
    /// variable rather than just the first.
    pub fn credentials(&self) -> Result<YouTubeCredentials, ApiError> {
        let (Some(client_id), Some(client_secret), Some(redirect_uri), Some(refresh_token)) = (
            &self.client_id,
            &self.client_secret,
            &self.redirect_uri,
            &self.refresh_token,
        ) else {
            let missing: Vec<&str> = [
                (self.client_id.is_none(), REQUIRED_OAUTH_VARS[0]),
                (self.client_secret.is_none(), REQUIRED_OAUTH_VARS[1]),
                (self.redirect_uri.is_none(), REQUIRED_OAUTH_VARS[2]),
                (self.refresh_token.is_none(), REQUIRED_OAUTH_VARS[3]),
            ]
            .iter()
            .filter(|(absent, _)| *absent)
            .map(|(_, name)| *name)
            .collect();
            return Err(ApiError::Configuration(format!(
                "Missing environment variables: {}",
                missing.join(", ")
            )));
        };

        Ok(YouTubeCredentials {
            client_id: client_id.clone(),
            client_secret: client_secret.clone(),
            redirect_uri: redirect_uri.clone(),
            refresh_token: refresh_token.clone(),
        })
    }
}
