pub mod asset_host;
pub mod staging;
pub mod upload;

pub use asset_host::{AssetStore, CloudinaryClient, ResourceType, UploadOptions};
pub use staging::{StagedFile, StagingArea};
pub use upload::{discard_staged, upload_staged};
