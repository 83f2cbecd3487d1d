//! Environment-driven settings for the remote clients.

use std::{env, time::Duration};

use crate::{Result, StudioError};

const DEFAULT_HTTP_TIMEOUT_SECONDS: u64 = 30;
const MIN_HTTP_TIMEOUT_SECONDS: u64 = 3;

/// Connection settings for the hosted database and its auth service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupabaseConfig {
    /// Project URL, without a trailing slash.
    pub url: String,
    /// Public anon key, sent as `apikey` on every request.
    pub anon_key: String,
    /// Per-request timeout.
    pub http_timeout: Duration,
}

impl SupabaseConfig {
    /// Reads `STUDIO_SUPABASE_URL`, `STUDIO_SUPABASE_ANON_KEY` and
    /// `STUDIO_HTTP_TIMEOUT_SECONDS`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            url: required_env("STUDIO_SUPABASE_URL")?
                .trim_end_matches('/')
                .to_string(),
            anon_key: required_env("STUDIO_SUPABASE_ANON_KEY")?,
            http_timeout: http_timeout_from_env(),
        })
    }

    /// HTTP client honouring [`Self::http_timeout`].
    pub fn http_client(&self) -> Result<reqwest::Client> {
        build_http_client(self.http_timeout)
    }
}

/// Unsigned upload settings for the media host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudinaryConfig {
    /// Cloud name, part of the upload URL.
    pub cloud_name: String,
    /// Unsigned upload preset configured on the media host.
    pub upload_preset: String,
    /// Per-request timeout.
    pub http_timeout: Duration,
}

impl CloudinaryConfig {
    /// Reads `STUDIO_CLOUDINARY_CLOUD_NAME` and
    /// `STUDIO_CLOUDINARY_UPLOAD_PRESET`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            cloud_name: required_env("STUDIO_CLOUDINARY_CLOUD_NAME")?,
            upload_preset: required_env("STUDIO_CLOUDINARY_UPLOAD_PRESET")?,
            http_timeout: http_timeout_from_env(),
        })
    }

    /// Upload endpoint for images.
    pub fn upload_url(&self) -> String {
        format!("https://api.cloudinary.com/v1_1/{}/image/upload", self.cloud_name)
    }
}

pub(crate) fn build_http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| StudioError::Config(format!("failed to build http client: {err}")))
}

fn required_env(key: &str) -> Result<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| StudioError::Config(format!("{key} is not set")))
}

fn http_timeout_from_env() -> Duration {
    let seconds = parse_timeout_seconds(env::var("STUDIO_HTTP_TIMEOUT_SECONDS").ok().as_deref());
    Duration::from_secs(seconds)
}

fn parse_timeout_seconds(raw: Option<&str>) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECONDS)
        .max(MIN_HTTP_TIMEOUT_SECONDS)
}
