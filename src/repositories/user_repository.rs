use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::doc,
    error::{ErrorKind, WriteFailure},
    options::{FindOptions, IndexOptions, ReplaceOptions},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::{SubscriptionStatus, User},
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: User) -> AppResult<User>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>>;
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;
    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>>;
    async fn find_all(&self) -> AppResult<Vec<User>>;
    async fn replace(&self, user: User) -> AppResult<User>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn count(&self) -> AppResult<u64>;
    async fn count_by_subscription(&self, status: SubscriptionStatus) -> AppResult<u64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("User with id '{}' not found", id))
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

fn status_name(status: SubscriptionStatus) -> &'static str {
    match status {
        SubscriptionStatus::Active => "active",
        SubscriptionStatus::Inactive => "inactive",
    }
}

pub struct MongoUserRepository {
    collection: Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn create(&self, user: User) -> AppResult<User> {
        self.collection.insert_one(&user).await.map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::AlreadyExists(format!("User with email '{}' already exists", user.email))
            } else {
                AppError::from(e)
            }
        })?;
        Ok(user)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<User>> {
        let user = self.collection.find_one(doc! { "id": id }).await?;
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.trim().to_lowercase();
        let user = self.collection.find_one(doc! { "email": email }).await?;
        Ok(user)
    }

    async fn find_by_reset_token(&self, token_hash: &str) -> AppResult<Option<User>> {
        let user = self
            .collection
            .find_one(doc! { "reset_password_token": token_hash })
            .await?;
        Ok(user)
    }

    async fn find_all(&self) -> AppResult<Vec<User>> {
        let find_options = FindOptions::builder().sort(doc! { "created_at": -1 }).build();
        let cursor = self.collection.find(doc! {}).with_options(find_options).await?;
        let users: Vec<User> = cursor.try_collect().await?;
        Ok(users)
    }

    async fn replace(&self, user: User) -> AppResult<User> {
        let options = ReplaceOptions::builder().upsert(false).build();
        let result = self
            .collection
            .replace_one(doc! { "id": &user.id }, &user)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(not_found(&user.id));
        }
        Ok(user)
    }

    async fn delete(&self, id: &str) -> AppResult<()> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;

        if result.deleted_count == 0 {
            return Err(not_found(id));
        }
        Ok(())
    }

    async fn count(&self) -> AppResult<u64> {
        Ok(self.collection.count_documents(doc! {}).await?)
    }

    async fn count_by_subscription(&self, status: SubscriptionStatus) -> AppResult<u64> {
        let count = self
            .collection
            .count_documents(doc! { "subscription.status": status_name(status) })
            .await?;
        Ok(count)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        let email_model = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(email_model).await?;
        log::info!("Created unique index on users.email");

        let id_model = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();
        self.collection.create_index(id_model).await?;
        log::info!("Created unique index on users.id");

        let reset_model = IndexModel::builder()
            .keys(doc! { "reset_password_token": 1 })
            .options(IndexOptions::builder().sparse(true).build())
            .build();
        self.collection.create_index(reset_model).await?;
        log::info!("Created index on users.reset_password_token");

        Ok(())
    }
}
