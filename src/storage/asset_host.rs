use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::{
    config::Config,
    errors::{AppError, AppResult},
    models::domain::AssetRef,
    storage::staging::StagedFile,
};

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    Image,
    Video,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Image => "image",
            ResourceType::Video => "video",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadOptions {
    pub folder: String,
    pub resource_type: ResourceType,
    /// Files above this many bytes are sent in sequential chunks.
    pub chunk_size: u64,
}

impl UploadOptions {
    pub const IMAGE_CHUNK_SIZE: u64 = 20_000_000;
    pub const VIDEO_CHUNK_SIZE: u64 = 50_000_000;

    pub fn image(folder: &str) -> Self {
        Self {
            folder: folder.to_string(),
            resource_type: ResourceType::Image,
            chunk_size: Self::IMAGE_CHUNK_SIZE,
        }
    }

    pub fn video(folder: &str) -> Self {
        Self {
            folder: folder.to_string(),
            resource_type: ResourceType::Video,
            chunk_size: Self::VIDEO_CHUNK_SIZE,
        }
    }
}

/// Remote media host. Uploads fail with `AppError::UploadFailed`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn upload(&self, file: &StagedFile, options: &UploadOptions) -> AppResult<AssetRef>;
    async fn destroy(&self, public_id: &str, resource_type: ResourceType) -> AppResult<()>;
}

#[derive(Debug, Deserialize)]
struct HostError {
    message: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: Option<String>,
    secure_url: Option<String>,
    error: Option<HostError>,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: Option<String>,
    error: Option<HostError>,
}

/// Byte ranges (inclusive start, exclusive end) for a chunked upload.
fn chunk_ranges(total: u64, chunk_size: u64) -> Vec<(u64, u64)> {
    if total == 0 || chunk_size == 0 {
        return vec![(0, total)];
    }
    (0..total)
        .step_by(chunk_size as usize)
        .map(|start| (start, (start + chunk_size).min(total)))
        .collect()
}

pub struct CloudinaryClient {
    http: reqwest::Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: SecretString,
}

impl CloudinaryClient {
    pub fn new(cloud_name: &str, api_key: &str, api_secret: SecretString) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: DEFAULT_API_BASE.to_string(),
            cloud_name: cloud_name.to_string(),
            api_key: api_key.to_string(),
            api_secret,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.asset_cloud_name,
            &config.asset_api_key,
            config.asset_api_secret.clone(),
        )
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, resource_type: ResourceType, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.api_base,
            self.cloud_name,
            resource_type.as_str(),
            action
        )
    }

    /// SHA-256 over the alphabetically sorted `key=value` pairs followed by the secret.
    fn sign(&self, params: &BTreeMap<&'static str, String>) -> String {
        let to_sign = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect::<Vec<_>>()
            .join("&");

        let mut hasher = Sha256::new();
        hasher.update(to_sign.as_bytes());
        hasher.update(self.api_secret.expose_secret().as_bytes());
        format!("{:x}", hasher.finalize())
    }

    fn upload_form(
        &self,
        params: &BTreeMap<&'static str, String>,
        signature: &str,
        file: &StagedFile,
        bytes: Vec<u8>,
    ) -> AppResult<Form> {
        let mut part = Part::bytes(bytes).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part
                .mime_str(content_type)
                .map_err(|e| AppError::UploadFailed(format!("Invalid content type: {}", e)))?;
        }

        let mut form = Form::new()
            .text("api_key", self.api_key.clone())
            .text("signature", signature.to_string());
        for (key, value) in params {
            form = form.text(*key, value.clone());
        }
        Ok(form.part("file", part))
    }

    async fn read_upload_response(response: reqwest::Response) -> AppResult<UploadResponse> {
        let status = response.status();
        let body: UploadResponse = response.json().await.map_err(|e| {
            AppError::UploadFailed(format!("Unreadable asset host response: {}", e))
        })?;

        if let Some(error) = body.error {
            return Err(AppError::UploadFailed(error.message));
        }
        if !status.is_success() {
            return Err(AppError::UploadFailed(format!(
                "Asset host responded with {}",
                status
            )));
        }
        Ok(body)
    }
}

#[async_trait]
impl AssetStore for CloudinaryClient {
    async fn upload(&self, file: &StagedFile, options: &UploadOptions) -> AppResult<AssetRef> {
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|e| AppError::UploadFailed(format!("Could not read staged file: {}", e)))?;
        let total = bytes.len() as u64;

        let mut params = BTreeMap::new();
        params.insert("folder", options.folder.clone());
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = self.sign(&params);
        let url = self.endpoint(options.resource_type, "upload");

        let ranges = chunk_ranges(total, options.chunk_size);
        let upload_id = Uuid::new_v4().simple().to_string();
        let chunked = ranges.len() > 1;
        let mut last = None;

        for (start, end) in ranges {
            let chunk = bytes[start as usize..end as usize].to_vec();
            let form = self.upload_form(&params, &signature, file, chunk)?;

            let mut request = self.http.post(&url).multipart(form);
            if chunked {
                request = request
                    .header("X-Unique-Upload-Id", upload_id.as_str())
                    .header(
                        "Content-Range",
                        format!("bytes {}-{}/{}", start, end - 1, total),
                    );
            }

            let response = request
                .send()
                .await
                .map_err(|e| AppError::UploadFailed(format!("Asset host unreachable: {}", e)))?;
            last = Some(Self::read_upload_response(response).await?);
        }

        let body = last.ok_or_else(|| AppError::UploadFailed("Nothing was uploaded".to_string()))?;
        match (body.public_id, body.secure_url) {
            (Some(public_id), Some(url)) => {
                log::info!("Uploaded {} to asset host as {}", file.file_name, public_id);
                Ok(AssetRef::new(public_id, url))
            }
            _ => Err(AppError::UploadFailed(
                "Asset host response is missing public_id or secure_url".to_string(),
            )),
        }
    }

    async fn destroy(&self, public_id: &str, resource_type: ResourceType) -> AppResult<()> {
        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = self.sign(&params);

        let response = self
            .http
            .post(self.endpoint(resource_type, "destroy"))
            .form(&[
                ("public_id", params["public_id"].as_str()),
                ("timestamp", params["timestamp"].as_str()),
                ("api_key", self.api_key.as_str()),
                ("signature", signature.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::InternalError(format!("Asset host unreachable: {}", e)))?;

        let body: DestroyResponse = response.json().await.map_err(|e| {
            AppError::InternalError(format!("Unreadable asset host response: {}", e))
        })?;

        if let Some(error) = body.error {
            return Err(AppError::InternalError(format!(
                "Asset host refused destroy of {}: {}",
                public_id, error.message
            )));
        }
        match body.result.as_deref() {
            Some("ok") => Ok(()),
            other => Err(AppError::InternalError(format!(
                "Asset host could not destroy {}: {}",
                public_id,
                other.unwrap_or("no result")
            ))),
        }
    }
}
