use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    options::{FindOneAndUpdateOptions, FindOptions, IndexOptions, ReplaceOptions, ReturnDocument},
    Collection, IndexModel,
};

use crate::{
    db::Database,
    errors::{AppError, AppResult},
    models::domain::Course,
};

/// Filters for the public course listing. Both match case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct CourseFilter {
    pub keyword: Option<String>,
    pub category: Option<String>,
}

impl CourseFilter {
    fn to_document(&self) -> Document {
        let mut filter = doc! {};
        if let Some(keyword) = self.keyword.as_deref().filter(|k| !k.is_empty()) {
            filter.insert(
                "title",
                doc! { "$regex": regex::escape(keyword), "$options": "i" },
            );
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            filter.insert(
                "category",
                doc! { "$regex": regex::escape(category), "$options": "i" },
            );
        }
        filter
    }
}

#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: Course) -> AppResult<Course>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>>;
    /// Lists courses without their lecture lists.
    async fn list(&self, filter: &CourseFilter) -> AppResult<Vec<Course>>;
    async fn replace(&self, course: Course) -> AppResult<Course>;
    /// Applies a `$set` document and returns the merged course.
    async fn update_fields(&self, id: &str, update_doc: Document) -> AppResult<Course>;
    async fn increment_views(&self, id: &str) -> AppResult<()>;
    async fn delete(&self, id: &str) -> AppResult<()>;
    async fn count(&self) -> AppResult<u64>;
    async fn total_views(&self) -> AppResult<i64>;
    async fn ensure_indexes(&self) -> AppResult<()>;
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Course with id '{}' not found", id))
}

pub struct MongoCourseRepository {
    collection: Collection<Course>,
}

impl MongoCourseRepository {
    pub fn new(db: &Database, collection_name: &str) -> Self {
        let collection = db.get_collection(collection_name);
        Self { collection }
    }
}

#[async_trait]
impl CourseRepository for MongoCourseRepository {
    async fn create(&self, course: Course) -> AppResult<Course> {
        self.collection.insert_one(&course).await?;
        Ok(course)
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Course>> {
        let course = self.collection.find_one(doc! { "id": id }).await?;
        Ok(course)
    }

    async fn list(&self, filter: &CourseFilter) -> AppResult<Vec<Course>> {
        let find_options = FindOptions::builder()
            .projection(doc! { "lectures": 0 })
            .sort(doc! { "createdAt": -1 })
            .build();

        let cursor = self
            .collection
            .find(filter.to_document())
            .with_options(find_options)
            .await?;
        let courses: Vec<Course> = cursor.try_collect().await?;
        Ok(courses)
    }

    async fn replace(&self, course: Course) -> AppResult<Course> {
        let options = ReplaceOptions::builder().upsert(false).build();
        let result = self
            .collection
            .replace_one(doc! { "id": &course.id }, &course)
            .with_options(options)
            .await?;

        if result.matched_count == 0 {
            return Err(not_found(&course.id));
        }
        Ok(course)
    }

    async fn update_fields(&self, id: &str, update_doc: Document) -> AppResult<Course> {
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        self.collection
            .find_one_and_update(doc! { "id": id }, update_doc)
            .with_options(options)
            .await?
            .ok_or_else(|| not_found(id))
    }

    async fn increment_views(&self, id: &str) -> AppResult<()> {
        let result = self
            .collection
            .update_one(doc! { "id": id }, doc! { "$inc": { "views": 1_i64 } })
            .await?;

        if result.matched_count == 0 {
            return Err(not_found(id));
        }
        Ok(())
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

    async fn total_views(&self) -> AppResult<i64> {
        let pipeline = vec![doc! { "$group": { "_id": Bson::Null, "views": { "$sum": "$views" } } }];
        let mut cursor = self.collection.aggregate(pipeline).await?;

        let total = match cursor.try_next().await? {
            Some(group) => match group.get("views") {
                Some(Bson::Int64(v)) => *v,
                Some(Bson::Int32(v)) => i64::from(*v),
                Some(Bson::Double(v)) => *v as i64,
                _ => 0,
            },
            None => 0,
        };
        Ok(total)
    }

    async fn ensure_indexes(&self) -> AppResult<()> {
        log::info!("Creating indexes for courses collection");

        let id_index = IndexModel::builder()
            .keys(doc! { "id": 1 })
            .options(
                IndexOptions::builder()
                    .unique(true)
                    .name("id_unique".to_string())
                    .build(),
            )
            .build();
        self.collection.create_index(id_index).await?;

        let category_index = IndexModel::builder().keys(doc! { "category": 1 }).build();
        self.collection.create_index(category_index).await?;

        log::info!("Successfully created indexes for courses collection");
        Ok(())
    }
}
