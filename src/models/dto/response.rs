use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::domain::{
    AssetSlot, Course, Lecture, PlaylistItem, Role, Subscription, User,
};

/// Success half of the response envelope: `{ success, message, ...payload }`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(flatten)]
    pub payload: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(message: impl Into<String>, payload: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            payload,
        }
    }
}

impl ApiResponse<NoPayload> {
    pub fn message(message: impl Into<String>) -> Self {
        Self::new(message, NoPayload {})
    }
}

#[derive(Debug, Serialize)]
pub struct NoPayload {}

#[derive(Debug, Serialize)]
pub struct CoursePayload {
    pub course: Course,
}

#[derive(Debug, Serialize)]
pub struct CoursesPayload {
    pub courses: Vec<Course>,
}

#[derive(Debug, Serialize)]
pub struct LecturesPayload {
    pub lectures: Vec<Lecture>,
}

#[derive(Debug, Serialize)]
pub struct UserPayload {
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct UsersPayload {
    pub users: Vec<UserDto>,
}

#[derive(Debug, Serialize)]
pub struct StatsPayload {
    pub stats: PlatformStats,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub users: u64,
    pub active_subscriptions: u64,
    pub courses: u64,
    pub views: i64,
}

/// Public view of a user; never carries the password or reset token.
#[derive(Debug, Clone, Serialize)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub subscription: Subscription,
    pub avatar: AssetSlot,
    pub playlist: Vec<PlaylistItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        UserDto {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            subscription: user.subscription,
            avatar: user.avatar,
            playlist: user.playlist,
            created_at: user.created_at,
        }
    }
}
