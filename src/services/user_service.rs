use std::sync::Arc;

use chrono::{Duration, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    auth::password::{hash_password, hash_token, verify_password},
    config::Config,
    errors::{AppError, AppResult},
    models::{
        domain::{PlaylistItem, SubscriptionStatus, User},
        dto::request::{
            take_required, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
            RegisterRequest, ResetPasswordRequest, UpdateProfileRequest, UpdateUserAccessRequest,
        },
    },
    repositories::{CourseRepository, UserRepository},
    services::mailer::Mailer,
    storage::{
        discard_staged, upload_staged, AssetStore, ResourceType, StagedFile, StagingArea,
        UploadOptions,
    },
};

fn user_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("User with id '{}' not found", id))
}

pub struct UserService {
    users: Arc<dyn UserRepository>,
    courses: Arc<dyn CourseRepository>,
    assets: Arc<dyn AssetStore>,
    mailer: Arc<dyn Mailer>,
    staging: StagingArea,
    asset_folder: String,
    frontend_url: String,
    reset_token_ttl: Duration,
}

impl UserService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        courses: Arc<dyn CourseRepository>,
        assets: Arc<dyn AssetStore>,
        mailer: Arc<dyn Mailer>,
        staging: StagingArea,
        config: &Config,
    ) -> Self {
        Self {
            users,
            courses,
            assets,
            mailer,
            staging,
            asset_folder: config.asset_folder.clone(),
            frontend_url: config.frontend_url.trim_end_matches('/').to_string(),
            reset_token_ttl: Duration::minutes(config.reset_token_ttl_minutes),
        }
    }

    pub async fn get_user(&self, id: &str) -> AppResult<User> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or_else(|| user_not_found(id))
    }

    pub async fn register(
        &self,
        request: RegisterRequest,
        avatar: Option<StagedFile>,
    ) -> AppResult<User> {
        if let Err(e) = request.validate() {
            discard_staged(&self.staging, avatar.as_ref()).await;
            return Err(e.into());
        }

        let email = take_required(request.email);
        if self.users.find_by_email(&email).await?.is_some() {
            discard_staged(&self.staging, avatar.as_ref()).await;
            return Err(AppError::AlreadyExists("User already exists".to_string()));
        }

        let password_hash = hash_password(&take_required(request.password))?;
        let mut user = User::new(&take_required(request.name), &email, password_hash);

        if let Some(file) = avatar {
            let asset = upload_staged(
                self.assets.as_ref(),
                &self.staging,
                &file,
                UploadOptions::image(&self.asset_folder),
            )
            .await?;
            user.avatar = asset.into();
        }

        let user = self.users.create(user).await?;
        log::info!("Registered user {}", user.id);
        Ok(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<User> {
        request.validate()?;

        let invalid = || AppError::Unauthenticated("Incorrect email or password".to_string());
        let user = self
            .users
            .find_by_email(&take_required(request.email))
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&take_required(request.password), &user.password_hash) {
            return Err(invalid());
        }
        Ok(user)
    }

    pub async fn change_password(
        &self,
        user_id: &str,
        request: ChangePasswordRequest,
    ) -> AppResult<()> {
        request.validate()?;

        let mut user = self.get_user(user_id).await?;
        if !verify_password(&take_required(request.old_password), &user.password_hash) {
            return Err(AppError::ValidationFailed("Incorrect old password".to_string()));
        }

        user.password_hash = hash_password(&take_required(request.new_password))?;
        self.users.replace(user).await?;
        Ok(())
    }

    pub async fn update_profile(
        &self,
        user_id: &str,
        request: UpdateProfileRequest,
    ) -> AppResult<User> {
        request.validate()?;

        let mut user = self.get_user(user_id).await?;
        if let Some(name) = request.name {
            user.name = name;
        }
        if let Some(email) = request.email {
            let email = email.trim().to_lowercase();
            if email != user.email {
                if self.users.find_by_email(&email).await?.is_some() {
                    return Err(AppError::AlreadyExists(
                        "Email is already in use".to_string(),
                    ));
                }
                user.email = email;
            }
        }
        self.users.replace(user).await
    }

    /// Uploads the new avatar first, then drops the previous one from the asset host.
    pub async fn update_avatar(&self, user_id: &str, file: Option<StagedFile>) -> AppResult<User> {
        let file = file.ok_or_else(|| {
            AppError::ValidationFailed("Please upload a profile picture".to_string())
        })?;

        let mut user = match self.users.find_by_id(user_id).await? {
            Some(user) => user,
            None => {
                self.staging.discard(&file).await;
                return Err(user_not_found(user_id));
            }
        };

        let asset = upload_staged(
            self.assets.as_ref(),
            &self.staging,
            &file,
            UploadOptions::image(&self.asset_folder),
        )
        .await?;

        let previous = user.avatar.replace(asset);
        let user = self.users.replace(user).await?;

        if let Some(previous) = previous {
            self.destroy_quietly(&previous.public_id).await;
        }
        Ok(user)
    }

    pub async fn delete_user(&self, user_id: &str) -> AppResult<()> {
        let user = self.get_user(user_id).await?;
        self.users.delete(user_id).await?;

        if let Some(public_id) = user.avatar.public_id() {
            self.destroy_quietly(public_id).await;
        }
        log::info!("Deleted user {}", user_id);
        Ok(())
    }

    /// Stores a hashed reset token and mails the raw one. Returns the address mailed.
    pub async fn forgot_password(&self, request: ForgotPasswordRequest) -> AppResult<String> {
        request.validate()?;

        let mut user = self
            .users
            .find_by_email(&take_required(request.email))
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let token = Uuid::new_v4().simple().to_string();
        user.reset_password_token = Some(hash_token(&token));
        user.reset_password_expire = Some(Utc::now() + self.reset_token_ttl);
        let user = self.users.replace(user).await?;

        let link = format!("{}/resetpassword/{}", self.frontend_url, token);
        let body = format!(
            "Click on the link to reset your password. {}\n\nIf you did not request this, ignore this email.",
            link
        );
        self.mailer
            .send(&user.email, "Lectern password reset", &body)
            .await?;
        Ok(user.email)
    }

    pub async fn reset_password(&self, token: &str, request: ResetPasswordRequest) -> AppResult<()> {
        request.validate()?;

        let invalid =
            || AppError::ValidationFailed("Reset token is invalid or has expired".to_string());
        let mut user = self
            .users
            .find_by_reset_token(&hash_token(token))
            .await?
            .ok_or_else(invalid)?;

        match user.reset_password_expire {
            Some(expire) if expire > Utc::now() => {}
            _ => return Err(invalid()),
        }

        user.password_hash = hash_password(&take_required(request.password))?;
        user.reset_password_token = None;
        user.reset_password_expire = None;
        self.users.replace(user).await?;
        Ok(())
    }

    pub async fn add_to_playlist(&self, user_id: &str, course_id: &str) -> AppResult<User> {
        let mut user = self.get_user(user_id).await?;
        let course = self
            .courses
            .find_by_id(course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid course id".to_string()))?;

        if user.has_in_playlist(&course.id) {
            return Err(AppError::AlreadyExists("Course is already in playlist".to_string()));
        }

        user.playlist.push(PlaylistItem {
            course: course.id.clone(),
            poster: course.thumbnail.url().map(str::to_string),
        });
        self.users.replace(user).await
    }

    pub async fn remove_from_playlist(&self, user_id: &str, course_id: &str) -> AppResult<User> {
        let mut user = self.get_user(user_id).await?;
        if !user.has_in_playlist(course_id) {
            return Err(AppError::NotFound("Course is not in playlist".to_string()));
        }

        user.playlist.retain(|item| item.course != course_id);
        self.users.replace(user).await
    }

    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        self.users.find_all().await
    }

    /// Sets role and/or subscription status. There is no payment flow, so
    /// admins grant subscriptions directly.
    pub async fn update_access(
        &self,
        user_id: &str,
        request: UpdateUserAccessRequest,
    ) -> AppResult<User> {
        if request.role.is_none() && request.subscription_status.is_none() {
            return Err(AppError::ValidationFailed(
                "Provide a role or subscriptionStatus".to_string(),
            ));
        }

        let mut user = self.get_user(user_id).await?;
        if let Some(role) = request.role {
            user.role = role;
        }
        if let Some(status) = request.subscription_status {
            user.subscription.status = status;
            if status == SubscriptionStatus::Inactive {
                user.subscription.id = None;
            }
        }

        log::info!(
            "Updated access for user {}: role={:?} subscription={:?}",
            user.id,
            user.role,
            user.subscription.status
        );
        self.users.replace(user).await
    }

    async fn destroy_quietly(&self, public_id: &str) {
        if let Err(e) = self.assets.destroy(public_id, ResourceType::Image).await {
            log::warn!("Could not delete remote image {}: {}", public_id, e);
        }
    }
}


#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{
        models::domain::{AssetRef, Course, Role},
        services::mailer::MockMailer,
        storage::asset_host::MockAssetStore,
        test_utils::{
            fixtures::{test_user, TEST_PASSWORD},
            InMemoryCourseRepository, InMemoryUserRepository,
        },
    };

    struct Harness {
        users: Arc<InMemoryUserRepository>,
        courses: Arc<InMemoryCourseRepository>,
        staging: StagingArea,
        _dir: tempfile::TempDir,
    }

    impl Harness {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            Self {
                users: Arc::new(InMemoryUserRepository::new()),
                courses: Arc::new(InMemoryCourseRepository::new()),
                staging: StagingArea::new(dir.path()),
                _dir: dir,
            }
        }

        fn service(&self, assets: MockAssetStore, mailer: MockMailer) -> UserService {
            UserService::new(
                self.users.clone(),
                self.courses.clone(),
                Arc::new(assets),
                Arc::new(mailer),
                self.staging.clone(),
                &Config::test_config(),
            )
        }
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: Some("Ada".to_string()),
            email: Some(email.to_string()),
            password: Some(TEST_PASSWORD.to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let harness = Harness::new();
        let service = harness.service(MockAssetStore::new(), MockMailer::new());

        let user = service
            .register(register_request("Ada@Example.com"), None)
            .await
            .unwrap();
        assert_eq!(user.email, "ada@example.com");
        assert_ne!(user.password_hash, TEST_PASSWORD);
        assert!(user.avatar.is_empty());

        let logged_in = service
            .login(LoginRequest {
                email: Some("ada@example.com".to_string()),
                password: Some(TEST_PASSWORD.to_string()),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.id, user.id);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let harness = Harness::new();
        let service = harness.service(MockAssetStore::new(), MockMailer::new());

        service
            .register(register_request("ada@example.com"), None)
            .await
            .unwrap();
        let result = service
            .register(register_request("ada@example.com"), None)
            .await;

        assert!(matches!(result, Err(AppError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthenticated() {
        let harness = Harness::new();
        harness
            .users
            .create(test_user("ada@example.com"))
            .await
            .unwrap();
        let service = harness.service(MockAssetStore::new(), MockMailer::new());

        let result = service
            .login(LoginRequest {
                email: Some("ada@example.com".to_string()),
                password: Some("wrong-password".to_string()),
            })
            .await;

        assert!(matches!(result, Err(AppError::Unauthenticated(_))));
    }

    #[tokio::test]
    async fn test_change_password_checks_old_password() {
        let harness = Harness::new();
        let user = harness
            .users
            .create(test_user("ada@example.com"))
            .await
            .unwrap();
        let service = harness.service(MockAssetStore::new(), MockMailer::new());

        let wrong = service
            .change_password(
                &user.id,
                ChangePasswordRequest {
                    old_password: Some("nope".to_string()),
                    new_password: Some("newsecret".to_string()),
                },
            )
            .await;
        assert!(matches!(wrong, Err(AppError::ValidationFailed(_))));

        service
            .change_password(
                &user.id,
                ChangePasswordRequest {
                    old_password: Some(TEST_PASSWORD.to_string()),
                    new_password: Some("newsecret".to_string()),
                },
            )
            .await
            .unwrap();

        let stored = harness.users.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(verify_password("newsecret", &stored.password_hash));
    }

    #[tokio::test]
    async fn test_forgot_and_reset_password() {
        let harness = Harness::new();
        let user = harness
            .users
            .create(test_user("ada@example.com"))
            .await
            .unwrap();

        let sent = Arc::new(Mutex::new(String::new()));
        let captured = sent.clone();
        let mut mailer = MockMailer::new();
        mailer
            .expect_send()
            .withf(|to, _, body| to == "ada@example.com" && body.contains("/resetpassword/"))
            .times(1)
            .returning(move |_, _, body| {
                *captured.lock().unwrap() = body.to_string();
                Ok(())
            });

        let service = harness.service(MockAssetStore::new(), mailer);
        service
            .forgot_password(ForgotPasswordRequest {
                email: Some("ada@example.com".to_string()),
            })
            .await
            .unwrap();

        let body = sent.lock().unwrap().clone();
        let token = body
            .split("/resetpassword/")
            .nth(1)
            .and_then(|rest| rest.split_whitespace().next())
            .unwrap()
            .to_string();

        let stored = harness.users.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.reset_password_token, Some(hash_token(&token)));

        service
            .reset_password(
                &token,
                ResetPasswordRequest {
                    password: Some("brandnew".to_string()),
                },
            )
            .await
            .unwrap();

        let stored = harness.users.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(verify_password("brandnew", &stored.password_hash));
        assert!(stored.reset_password_token.is_none());

        let reused = service
            .reset_password(
                &token,
                ResetPasswordRequest {
                    password: Some("again123".to_string()),
                },
            )
            .await;
        assert!(matches!(reused, Err(AppError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn test_reset_password_rejects_expired_token() {
        let harness = Harness::new();
        let mut user = test_user("ada@example.com");
        user.reset_password_token = Some(hash_token("stale"));
        user.reset_password_expire = Some(Utc::now() - Duration::minutes(1));
        harness.users.create(user).await.unwrap();

        let service = harness.service(MockAssetStore::new(), MockMailer::new());
        let result = service
            .reset_password(
                "stale",
                ResetPasswordRequest {
                    password: Some("brandnew".to_string()),
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::ValidationFailed(_))));
    }

    #[tokio::test]
    async fn test_update_avatar_destroys_previous() {
        let harness = Harness::new();
        let mut user = test_user("ada@example.com");
        user.avatar = AssetRef::new("lectern/old", "https://cdn/old.png").into();
        let user = harness.users.create(user).await.unwrap();

        let mut assets = MockAssetStore::new();
        assets
            .expect_upload()
            .times(1)
            .returning(|_, _| Ok(AssetRef::new("lectern/new", "https://cdn/new.png")));
        assets
            .expect_destroy()
            .withf(|public_id, resource_type| {
                public_id == "lectern/old" && *resource_type == ResourceType::Image
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let file = harness.staging.write("me.png", None, b"png").await.unwrap();
        let updated = harness
            .service(assets, MockMailer::new())
            .update_avatar(&user.id, Some(file))
            .await
            .unwrap();

        assert_eq!(updated.avatar.public_id(), Some("lectern/new"));
    }

    #[tokio::test]
    async fn test_playlist_add_and_remove() {
        let harness = Harness::new();
        let user = harness
            .users
            .create(test_user("ada@example.com"))
            .await
            .unwrap();
        let mut course = Course::new("Algebra", "Intro", "Math", "u1");
        course.thumbnail = AssetRef::new("lectern/t", "https://cdn/t.png").into();
        let course = harness.courses.create(course).await.unwrap();

        let service = harness.service(MockAssetStore::new(), MockMailer::new());

        let user_after_add = service.add_to_playlist(&user.id, &course.id).await.unwrap();
        assert_eq!(user_after_add.playlist.len(), 1);
        assert_eq!(
            user_after_add.playlist[0].poster.as_deref(),
            Some("https://cdn/t.png")
        );

        let again = service.add_to_playlist(&user.id, &course.id).await;
        assert!(matches!(again, Err(AppError::AlreadyExists(_))));

        let unknown = service.add_to_playlist(&user.id, "missing").await;
        assert!(matches!(unknown, Err(AppError::NotFound(_))));

        let user_after_remove = service
            .remove_from_playlist(&user.id, &course.id)
            .await
            .unwrap();
        assert!(user_after_remove.playlist.is_empty());
    }

    #[tokio::test]
    async fn test_update_access_grants_admin_and_subscription() {
        let harness = Harness::new();
        let user = harness
            .users
            .create(test_user("ada@example.com"))
            .await
            .unwrap();
        let service = harness.service(MockAssetStore::new(), MockMailer::new());

        let empty = service
            .update_access(&user.id, UpdateUserAccessRequest::default())
            .await;
        assert!(matches!(empty, Err(AppError::ValidationFailed(_))));

        let updated = service
            .update_access(
                &user.id,
                UpdateUserAccessRequest {
                    role: Some(Role::Admin),
                    subscription_status: Some(SubscriptionStatus::Active),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.subscription.status, SubscriptionStatus::Active);
    }

    #[tokio::test]
    async fn test_delete_user_tolerates_remote_failure() {
        let harness = Harness::new();
        let mut user = test_user("ada@example.com");
        user.avatar = AssetRef::new("lectern/old", "https://cdn/old.png").into();
        let user = harness.users.create(user).await.unwrap();

        let mut assets = MockAssetStore::new();
        assets
            .expect_destroy()
            .returning(|_, _| Err(AppError::InternalError("down".to_string())));

        harness
            .service(assets, MockMailer::new())
            .delete_user(&user.id)
            .await
            .unwrap();

        assert!(harness.users.find_by_id(&user.id).await.unwrap().is_none());
    }
}
