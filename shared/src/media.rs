//! Image upload to the third-party media host.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::{config::CloudinaryConfig, Result, StudioError};

/// Destination for uploaded images.
#[async_trait]
pub trait MediaUploader: Send + Sync {
    /// Uploads one image and returns its public URL.
    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct UploadErrorBody {
    error: Option<UploadErrorDetail>,
}

#[derive(Debug, Deserialize)]
struct UploadErrorDetail {
    message: String,
}

/// Unsigned uploads through a preset; no API secret leaves the host.
pub struct CloudinaryUploader {
    config: CloudinaryConfig,
    client: reqwest::Client,
}

impl CloudinaryUploader {
    /// Builds the uploader with its own HTTP client.
    pub fn new(config: CloudinaryConfig) -> Result<Self> {
        let client = crate::config::build_http_client(config.http_timeout)?;
        Ok(Self {
            config,
            client,
        })
    }

    /// Reads [`CloudinaryConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        Self::new(CloudinaryConfig::from_env()?)
    }
}

#[async_trait]
impl MediaUploader for CloudinaryUploader {
    async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
        let form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("upload_preset", self.config.upload_preset.clone());

        let response = self
            .client
            .post(self.config.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|err| StudioError::Upload(format!("request failed: {err}")))?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| StudioError::Upload(format!("failed to read body: {err}")))?;
        if !status.is_success() {
            return Err(StudioError::Upload(upload_error_message(status.as_u16(), &body)));
        }

        let uploaded: UploadResponse = serde_json::from_str(&body)
            .map_err(|err| StudioError::Upload(format!("unexpected response: {err}")))?;
        tracing::info!("uploaded {file_name} -> {}", uploaded.secure_url);
        Ok(uploaded.secure_url)
    }
}

fn upload_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<UploadErrorBody>(body)
        .unwrap_or_default()
        .error
        .map(|detail| detail.message)
        .unwrap_or_else(|| format!("HTTP {status}"))
}

/// Reads a local image and uploads it under its file name.
pub async fn upload_file<U: MediaUploader + ?Sized>(uploader: &U, path: &Path) -> Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| StudioError::Upload(format!("failed to read {}: {err}", path.display())))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    uploader.upload_image(&file_name, bytes).await
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::{upload_error_message, upload_file, MediaUploader};
    use crate::{Result, StudioError};

    #[derive(Default)]
    struct RecordingUploader {
        seen: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl MediaUploader for RecordingUploader {
        async fn upload_image(&self, file_name: &str, bytes: Vec<u8>) -> Result<String> {
            self.seen
                .lock()
                .expect("lock")
                .push((file_name.to_string(), bytes.len()));
            Ok(format!("https://media.test/{file_name}"))
        }
    }

    #[test]
    fn error_message_comes_from_body_when_present() {
        let body = r#"{"error":{"message":"Upload preset not found"}}"#;
        assert_eq!(upload_error_message(400, body), "Upload preset not found");
        assert_eq!(upload_error_message(500, "oops"), "HTTP 500");
    }

    #[tokio::test]
    async fn upload_file_sends_file_name_and_bytes() {
        let dir = std::env::temp_dir().join(format!("studio-media-{}", std::process::id()));
        tokio::fs::create_dir_all(&dir).await.expect("create temp dir");
        let path = dir.join("render.jpg");
        tokio::fs::write(&path, b"jpeg").await.expect("write image");

        let uploader = RecordingUploader::default();
        let url = upload_file(&uploader, &path).await.expect("upload");
        assert_eq!(url, "https://media.test/render.jpg");
        assert_eq!(*uploader.seen.lock().expect("lock"), vec![("render.jpg".to_string(), 4)]);

        let missing = upload_file(&uploader, &dir.join("missing.jpg")).await;
        assert!(matches!(missing, Err(StudioError::Upload(_))));
        let _ = tokio::fs::remove_dir_all(&dir).await;
    }
}
