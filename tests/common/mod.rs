#![allow(dead_code)]

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use secrecy::SecretString;
use tokio::sync::RwLock;

use lectern_server::{
    app_state::{AppState, Backends},
    auth::password::hash_password,
    config::Config,
    errors::{AppError, AppResult},
    models::domain::{AssetRef, Course, Role, SubscriptionStatus, User},
    repositories::{CourseFilter, CourseRepository, UserRepository},
    services::Mailer,
    storage::{AssetStore, ResourceType, StagedFile, UploadOptions},
};

pub const PASSWORD: &str = "secret123";

pub struct InMemoryCourseRepository {
    courses: Arc<RwLock<HashMap<String, Course>>>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self {
            courses: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn all(&self) -> Vec<Course> {
        self.courses.read().await.values().cloned().collect()
    }
}

fn course_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Course with id '{}' not found", id))
}

fn matches_filter(value: &str, needle: Option<&str>) -> bool {
    needle
        .filter(|n| !n.is_empty())
        .map(|n| value.to_lowercase().contains(&n.to_lowercase()))
        .unwrap_or(true)
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn create(&self, course: Course) -> AppResult<Course> {
        let mut courses = self.courses.write().await;
        courses.insert(course.id.clone(), course.clone());
        Ok(course)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>> {
        Ok(self.courses.read().await.get(id).cloned())
    }

    async fn list(&self, filter: &CourseFilter) -> AppResult<Vec<Course>> {
        let courses = self.courses.read().await;
        let mut items: Vec<Course> = courses
            .values()
            .filter(|c| matches_filter(&c.title, filter.keyword.as_deref()))
            .filter(|c| matches_filter(&c.category, filter.category.as_deref()))
            .cloned()
            .map(|mut c| {
                c.lectures.clear();
                c
            })
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn replace(&self, course: Course) -> AppResult<Course> {
        let mut courses = self.courses.write().await;
        if !courses.contains_key(&course.id) {
            return Err(course_not_found(&course.id));
        }
        courses.insert(course.id.clone(), course.clone());
        Ok(course)
    }

    async fn update_fields(&self, id: &str, update_doc: Document) -> AppResult<Course> {
        let mut courses = self.courses.write().await;
        let course = courses.get_mut(id).ok_or_else(|| course_not_found(id))?;

        if let Ok(set) = update_doc.get_document("$set") {
            for (key, value) in set {
                if let Bson::String(value) = value {
                    match key.as_str() {
                        "title" => course.title = value.clone(),
                        "description" => course.description = value.clone(),
                        "category" => course.category = value.clone(),
                        _ => {}
                    }
                }
            }
        }
        Ok(course.clone())
    }

    async fn increment_views(&self, id: &str) -> AppResult<()> {
        let mut courses = self.courses.write().await;
        let course = courses.get_mut(id).ok_or_else(|| course_not_found(id))?;
        course.views += 1;
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut courses = self.courses.write().await;
        courses
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| course_not_found(id))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.courses.read().await.len() as u64)
    }

    async fn total_views(&self) -> AppResult<i64> {
        Ok(self.courses.read().await.values().map(|c| c.views).sum())
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

fn user_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("User with id '{}' not found", id))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::AlreadyExists("User already exists".to_string()));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.reset_password_token.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        Ok(self.users.read().await.values().cloned().collect())
    }

    async fn replace(&self, user: User) -> AppResult<User> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(user_not_found(&user.id));
        }
        users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let mut users = self.users.write().await;
        users.remove(id).map(|_| ()).ok_or_else(|| user_not_found(id))
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn count_by_subscription(&self, status: SubscriptionStatus) -> AppResult<u64> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .filter(|u| u.subscription.status == status)
            .count() as u64)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        Ok(())
    }
}

/// Asset host stand-in. Uploads succeed unless `failing()` was used.
pub struct FakeAssetStore {
    fail_uploads: bool,
    fail_destroys: bool,
    pub uploads: Mutex<Vec<(String, UploadOptions)>>,
    pub destroyed: Mutex<Vec<(String, ResourceType)>>,
}

impl FakeAssetStore {
    pub fn new() -> Self {
        Self {
            fail_uploads: false,
            fail_destroys: false,
            uploads: Mutex::new(Vec::new()),
            destroyed: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_uploads: true,
            fail_destroys: true,
            ..Self::new()
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    pub fn destroyed_ids(&self) -> Vec<String> {
        self.destroyed
            .lock()
            .unwrap()
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }
}

#[async_trait]
impl AssetStore for FakeAssetStore {
    async fn upload(&self, file: &StagedFile, options: &UploadOptions) -> AppResult<AssetRef> {
        if self.fail_uploads {
            return Err(AppError::UploadFailed("asset host unavailable".to_string()));
        }
        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((file.file_name.clone(), options.clone()));

        let public_id = format!("{}/asset-{}", options.folder, uploads.len());
        let url = format!("https://cdn.test/{}", public_id);
        Ok(AssetRef::new(public_id, url))
    }

    async fn destroy(&self, public_id: &str, resource_type: ResourceType) -> AppResult<()> {
        self.destroyed
            .lock()
            .unwrap()
            .push((public_id.to_string(), resource_type));
        if self.fail_destroys {
            return Err(AppError::InternalError("asset host unavailable".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap()
            .push((to.to_string(), subject.to_string(), body.to_string()));
        Ok(())
    }
}

pub fn test_config(staging_dir: &Path) -> Config {
    let mut config = Config::from_env();
    config.jwt_secret = SecretString::from("integration_test_secret_key".to_string());
    config.jwt_expiration_hours = 1;
    config.cookie_secure = false;
    config.asset_folder = "lectern".to_string();
    config.staging_dir = staging_dir.to_path_buf();
    config.frontend_url = "http://localhost:3000".to_string();
    config.contact_inbox = "support@lectern.local".to_string();
    config
}

pub struct TestContext {
    pub state: AppState,
    pub users: Arc<InMemoryUserRepository>,
    pub courses: Arc<InMemoryCourseRepository>,
    pub assets: Arc<FakeAssetStore>,
    pub mailer: Arc<RecordingMailer>,
    pub staging_dir: tempfile::TempDir,
}

impl TestContext {
    pub fn new(assets: FakeAssetStore) -> Self {
        let staging_dir = tempfile::tempdir().unwrap();
        let users = Arc::new(InMemoryUserRepository::new());
        let courses = Arc::new(InMemoryCourseRepository::new());
        let assets = Arc::new(assets);
        let mailer = Arc::new(RecordingMailer::default());

        let state = AppState::from_parts(
            test_config(staging_dir.path()),
            Backends {
                users: users.clone(),
                courses: courses.clone(),
                assets: assets.clone(),
                mailer: mailer.clone(),
            },
        );

        Self {
            state,
            users,
            courses,
            assets,
            mailer,
            staging_dir,
        }
    }

    pub async fn add_user(&self, email: &str, role: Role, status: SubscriptionStatus) -> User {
        let mut user = User::new("Test User", email, hash_password(PASSWORD).unwrap());
        user.role = role;
        user.subscription.status = status;
        self.users.create(user).await.unwrap()
    }

    /// Session cookie value for `user`, as login would issue it.
    pub fn token_for(&self, user: &User) -> String {
        self.state.jwt_service.create_token(user).unwrap()
    }

    pub fn staged_entries(&self) -> usize {
        std::fs::read_dir(self.staging_dir.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
