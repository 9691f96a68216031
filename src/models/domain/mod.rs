pub mod asset;
pub mod course;
pub mod user;
pub use asset::{AssetRef, AssetSlot};
pub use course::{Course, Lecture};
pub use user::{PlaylistItem, Role, Subscription, SubscriptionStatus, User};
