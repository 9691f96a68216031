use std::collections::HashMap;

use actix_multipart::Multipart;
use futures::TryStreamExt;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

use crate::{
    errors::{AppError, AppResult},
    storage::{StagedFile, StagingArea},
};

/// Multipart field that carries the uploaded media.
pub const FILE_FIELD: &str = "file";

const MAX_FILE_BYTES: u64 = 200 * 1024 * 1024;
const MAX_TEXT_BYTES: usize = 64 * 1024;

/// A multipart body split into its text fields and at most one staged file.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub fields: HashMap<String, String>,
    pub file: Option<StagedFile>,
}

impl UploadForm {
    /// Reads the whole body. The `file` part is streamed into staging; if
    /// anything fails midway the partial file is removed again.
    pub async fn read(mut payload: Multipart, staging: &StagingArea) -> AppResult<Self> {
        let mut form = UploadForm::default();

        let result: AppResult<()> = async {
            while let Some(mut field) = payload.try_next().await? {
                let (name, file_name) = match field.content_disposition() {
                    Some(cd) => (
                        cd.get_name().unwrap_or_default().to_string(),
                        cd.get_filename().map(str::to_string),
                    ),
                    None => continue,
                };

                if name == FILE_FIELD {
                    if form.file.is_some() {
                        return Err(AppError::ValidationFailed(
                            "Only one file may be uploaded".to_string(),
                        ));
                    }
                    let content_type = field.content_type().map(|mime| mime.to_string());
                    let original = file_name.unwrap_or_else(|| "upload".to_string());
                    let (mut out, staged) = staging.create(&original, content_type).await?;
                    form.file = Some(staged);

                    let mut size = 0u64;
                    while let Some(chunk) = field.try_next().await? {
                        size += chunk.len() as u64;
                        if size > MAX_FILE_BYTES {
                            return Err(AppError::ValidationFailed(
                                "Uploaded file is too large".to_string(),
                            ));
                        }
                        out.write_all(&chunk).await?;
                    }
                    out.flush().await?;

                    if let Some(staged) = form.file.as_mut() {
                        staged.size = size;
                    }
                } else {
                    let mut value = Vec::new();
                    while let Some(chunk) = field.try_next().await? {
                        if value.len() + chunk.len() > MAX_TEXT_BYTES {
                            return Err(AppError::ValidationFailed(format!(
                                "Field '{}' is too large",
                                name
                            )));
                        }
                        value.extend_from_slice(&chunk);
                    }
                    let value = String::from_utf8(value).map_err(|_| {
                        AppError::ValidationFailed(format!("Field '{}' is not valid UTF-8", name))
                    })?;
                    form.fields.insert(name, value);
                }
            }
            Ok::<(), AppError>(())
        }
        .await;

        if let Err(e) = result {
            form.discard(staging).await;
            return Err(e);
        }

        // A file input left empty by the browser still arrives as a part.
        if form.file.as_ref().is_some_and(|f| f.size == 0) {
            form.discard(staging).await;
        }
        Ok(form)
    }

    /// Deserializes the text fields into a request type.
    pub fn parse<T: DeserializeOwned>(&self) -> AppResult<T> {
        let map = self
            .fields
            .iter()
            .map(|(k, v)| (k.clone(), serde_json::Value::String(v.clone())))
            .collect::<serde_json::Map<_, _>>();

        serde_json::from_value(serde_json::Value::Object(map))
            .map_err(|e| AppError::ValidationFailed(format!("Invalid form: {}", e)))
    }

    /// Parses the text fields, removing the staged file when that fails.
    pub async fn parse_or_discard<T: DeserializeOwned>(
        &mut self,
        staging: &StagingArea,
    ) -> AppResult<T> {
        match self.parse() {
            Ok(value) => Ok(value),
            Err(e) => {
                self.discard(staging).await;
                Err(e)
            }
        }
    }

    async fn discard(&mut self, staging: &StagingArea) {
        if let Some(file) = self.file.take() {
            staging.discard(&file).await;
        }
    }
}
