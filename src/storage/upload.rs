use crate::{
    errors::{AppError, AppResult},
    models::domain::AssetRef,
    storage::{AssetStore, StagedFile, StagingArea, UploadOptions},
};

/// Sends a staged file to the asset host.
///
/// On success only that file is removed from staging. On failure the whole
/// staging directory is purged and the error is reported as `UploadFailed`,
/// whatever the underlying cause.
pub async fn upload_staged(
    assets: &dyn AssetStore,
    staging: &StagingArea,
    file: &StagedFile,
    options: UploadOptions,
) -> AppResult<AssetRef> {
    match assets.upload(file, &options).await {
        Ok(asset) => {
            staging.discard(file).await;
            Ok(asset)
        }
        Err(e) => {
            log::error!("Upload of {} failed: {}", file.file_name, e);
            match staging.purge_all().await {
                Ok(removed) => log::info!("Purged {} staged upload(s)", removed),
                Err(purge_err) => log::error!("Staging purge failed: {}", purge_err),
            }
            Err(match e {
                AppError::UploadFailed(message) => AppError::UploadFailed(message),
                other => AppError::UploadFailed(other.to_string()),
            })
        }
    }
}

/// Removes an optional staged file, ignoring failures.
pub async fn discard_staged(staging: &StagingArea, file: Option<&StagedFile>) {
    if let Some(file) = file {
        staging.discard(file).await;
    }
}
