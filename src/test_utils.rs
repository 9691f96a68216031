use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};
use tokio::sync::RwLock;

use crate::{
    errors::{AppError, AppResult},
    models::domain::{Course, SubscriptionStatus, User},
    repositories::{CourseFilter, CourseRepository, UserRepository},
};

pub struct InMemoryCourseRepository {
    courses: Arc<RwLock<HashMap<String, Course>>>,
}

impl InMemoryCourseRepository {
    pub fn new() -> Self {
        Self {
            courses: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

fn contains_ignore_case(haystack: &str, needle: Option<&str>) -> bool {
    match needle.filter(|n| !n.is_empty()) {
        Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
        None => true,
    }
}

fn course_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Course with id '{}' not found", id))
}

#[async_trait]
impl CourseRepository for InMemoryCourseRepository {
    async fn create(&self, course: Course) -> AppResult<Course> {
        let mut courses = self.courses.write().await;
        if courses.contains_key(&course.id) {
            return Err(AppError::AlreadyExists(format!(
                "Course with id '{}' already exists",
                course.id
            )));
        }
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
            .filter(|c| contains_ignore_case(&c.title, filter.keyword.as_deref()))
            .filter(|c| contains_ignore_case(&c.category, filter.category.as_deref()))
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

        let set = update_doc
            .get_document("$set")
            .map_err(|e| AppError::InternalError(e.to_string()))?;
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
        course.touch();
        Ok(course.clone())
    }

    async fn increment_views(&self, id: &str) -> AppResult<()> {
        let mut courses = self.courses.write().await;
        let course = courses.get_mut(id).ok_or_else(|| course_not_found(id))?;
        course.views += 1;
        Ok(())
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        self.courses
            .write()
            .await
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
            return Err(AppError::AlreadyExists(format!(
                "User with email '{}' already exists",
                user.email
            )));
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
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
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
        self.users
            .write()
            .await
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| user_not_found(id))
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

pub mod fixtures {
    use crate::{
        auth::password::hash_password,
        models::domain::{SubscriptionStatus, User},
    };

    pub const TEST_PASSWORD: &str = "secret123";

    pub fn test_user(email: &str) -> User {
        let hash = hash_password(TEST_PASSWORD).unwrap();
        User::new("Test User", email, hash)
    }

    pub fn test_subscriber() -> User {
        let mut user = test_user("subscriber@example.com");
        user.subscription.status = SubscriptionStatus::Active;
        user
    }
}
