use serde::Deserialize;
use validator::Validate;

use crate::models::domain::{Role, SubscriptionStatus};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(
        required(message = "Please enter your name"),
        length(min = 1, max = 100)
    )]
    pub name: Option<String>,

    #[validate(
        required(message = "Please enter your email"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,

    #[validate(
        required(message = "Please enter a password"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(
        required(message = "Please enter your email"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,

    #[validate(required(message = "Please enter your password"))]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(required(message = "Please enter your current password"))]
    pub old_password: Option<String>,

    #[validate(
        required(message = "Please enter a new password"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub new_password: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(
        required(message = "Please enter your email"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(
        required(message = "Please enter a new password"),
        length(min = 6, message = "Password must be at least 6 characters")
    )]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistRequest {
    pub id: String,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourseRequest {
    #[validate(
        required(message = "Please enter a course title"),
        length(min = 1, max = 80)
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "Please enter a course description"),
        length(min = 1)
    )]
    pub description: Option<String>,

    #[validate(
        required(message = "Please enter a course category"),
        length(min = 1)
    )]
    pub category: Option<String>,

    #[validate(
        required(message = "Please enter the course creator"),
        length(min = 1)
    )]
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCourseRequest {
    #[validate(length(min = 1, max = 80))]
    pub title: Option<String>,

    #[validate(length(min = 1))]
    pub description: Option<String>,

    #[validate(length(min = 1))]
    pub category: Option<String>,
}

impl UpdateCourseRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.category.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AddLectureRequest {
    #[validate(
        required(message = "Please enter a lecture title"),
        length(min = 1, max = 80)
    )]
    pub title: Option<String>,

    #[validate(
        required(message = "Please enter a lecture description"),
        length(min = 1)
    )]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureRef {
    pub course_id: Option<String>,
    pub lecture_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CourseListQuery {
    pub keyword: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactRequest {
    #[validate(required(message = "All fields are mandatory"), length(min = 1))]
    pub name: Option<String>,

    #[validate(
        required(message = "All fields are mandatory"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,

    #[validate(required(message = "All fields are mandatory"), length(min = 1))]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CourseRequestForm {
    #[validate(required(message = "All fields are mandatory"), length(min = 1))]
    pub name: Option<String>,

    #[validate(
        required(message = "All fields are mandatory"),
        email(message = "Invalid email format")
    )]
    pub email: Option<String>,

    #[validate(required(message = "All fields are mandatory"), length(min = 1))]
    pub course: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserAccessRequest {
    pub role: Option<Role>,
    pub subscription_status: Option<SubscriptionStatus>,
}

/// Returns the value of a field already checked by `#[validate(required)]`.
pub fn take_required(field: Option<String>) -> String {
    field.unwrap_or_default()
}
