//! Course and lecture mutations.
//!
//! Course creation runs `validate -> persist draft -> upload -> persist`, so a
//! failed thumbnail upload leaves the draft in place and returns `UploadFailed`.

use std::sync::Arc;

use mongodb::bson::{doc, Document};
use validator::Validate;

use crate::{
    errors::{AppError, AppResult},
    models::{
        domain::{AssetSlot, Course, Lecture},
        dto::request::{
            take_required, AddLectureRequest, CreateCourseRequest, LectureRef,
            UpdateCourseRequest,
        },
    },
    repositories::{CourseFilter, CourseRepository},
    storage::{
        discard_staged, upload_staged, AssetStore, ResourceType, StagedFile, StagingArea,
        UploadOptions,
    },
};

pub struct CourseService {
    repository: Arc<dyn CourseRepository>,
    assets: Arc<dyn AssetStore>,
    staging: StagingArea,
    asset_folder: String,
}

fn course_not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Course with id '{}' not found", id))
}

impl CourseService {
    pub fn new(
        repository: Arc<dyn CourseRepository>,
        assets: Arc<dyn AssetStore>,
        staging: StagingArea,
        asset_folder: &str,
    ) -> Self {
        Self {
            repository,
            assets,
            staging,
            asset_folder: asset_folder.to_string(),
        }
    }

    pub async fn list_courses(&self, filter: &CourseFilter) -> AppResult<Vec<Course>> {
        self.repository.list(filter).await
    }

    pub async fn get_course(&self, id: &str) -> AppResult<Course> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| course_not_found(id))
    }

    /// Returns the lecture list and counts one view.
    pub async fn get_lectures(&self, id: &str) -> AppResult<Vec<Lecture>> {
        let course = self.get_course(id).await?;
        self.repository.increment_views(id).await?;
        Ok(course.lectures)
    }

    pub async fn create_course(
        &self,
        request: CreateCourseRequest,
        file: Option<StagedFile>,
    ) -> AppResult<Course> {
        if let Err(e) = request.validate() {
            discard_staged(&self.staging, file.as_ref()).await;
            return Err(e.into());
        }

        let course = Course::new(
            &take_required(request.title),
            &take_required(request.description),
            &take_required(request.category),
            &take_required(request.created_by),
        );
        let mut course = self.repository.create(course).await?;
        log::info!("Created course {} ('{}')", course.id, course.title);

        if let Some(file) = file {
            let thumbnail = upload_staged(
                self.assets.as_ref(),
                &self.staging,
                &file,
                UploadOptions::image(&self.asset_folder),
            )
            .await?;
            course.thumbnail = thumbnail.into();
            course.touch();
            course = self.repository.replace(course).await?;
        }

        Ok(course)
    }

    pub async fn add_lecture(
        &self,
        course_id: &str,
        request: AddLectureRequest,
        file: Option<StagedFile>,
    ) -> AppResult<Course> {
        let mut course = match self.repository.find_by_id(course_id).await? {
            Some(course) => course,
            None => {
                discard_staged(&self.staging, file.as_ref()).await;
                return Err(course_not_found(course_id));
            }
        };

        if let Err(e) = request.validate() {
            discard_staged(&self.staging, file.as_ref()).await;
            return Err(e.into());
        }

        // No file is not an error: the lecture is stored with an empty video slot.
        let video = match file {
            Some(file) => AssetSlot::from(
                upload_staged(
                    self.assets.as_ref(),
                    &self.staging,
                    &file,
                    UploadOptions::video(&self.asset_folder),
                )
                .await?,
            ),
            None => AssetSlot::empty(),
        };

        let lecture = Lecture::new(
            &take_required(request.title),
            &take_required(request.description),
            video,
        );
        log::info!("Adding lecture {} to course {}", lecture.id, course.id);

        course.push_lecture(lecture);
        course.touch();
        self.repository.replace(course).await
    }

    pub async fn remove_lecture(&self, lecture_ref: LectureRef) -> AppResult<Course> {
        let (course_id, lecture_id) = match (lecture_ref.course_id, lecture_ref.lecture_id) {
            (Some(course_id), Some(lecture_id))
                if !course_id.is_empty() && !lecture_id.is_empty() =>
            {
                (course_id, lecture_id)
            }
            _ => {
                return Err(AppError::ValidationFailed(
                    "Both courseId and lectureId are required".to_string(),
                ))
            }
        };

        let mut course = self.get_course(&course_id).await?;
        let lecture = course.find_lecture(&lecture_id).cloned().ok_or_else(|| {
            AppError::NotFound(format!(
                "Lecture with id '{}' not found in course '{}'",
                lecture_id, course_id
            ))
        })?;

        // Best-effort: a failed remote delete is logged and the lecture still goes.
        if let Some(public_id) = lecture.video.public_id() {
            if let Err(e) = self.assets.destroy(public_id, ResourceType::Video).await {
                log::warn!(
                    "Could not delete remote video {} for lecture {}: {}",
                    public_id,
                    lecture.id,
                    e
                );
            }
        }

        course.remove_lecture(&lecture_id);
        course.touch();
        log::info!("Removed lecture {} from course {}", lecture_id, course_id);
        self.repository.replace(course).await
    }

    pub async fn update_course(&self, id: &str, request: UpdateCourseRequest) -> AppResult<Course> {
        request.validate()?;

        if request.is_empty() {
            return self.get_course(id).await;
        }

        self.repository.update_fields(id, update_document(&request)).await
    }

    /// Removes the course record only; remote thumbnail and lecture videos stay.
    pub async fn delete_course(&self, id: &str) -> AppResult<()> {
        self.get_course(id).await?;
        self.repository.delete(id).await?;
        log::info!("Deleted course {}", id);
        Ok(())
    }
}

fn update_document(request: &UpdateCourseRequest) -> Document {
    let mut set = doc! { "modifiedAt": chrono::Utc::now().to_rfc3339() };
    if let Some(title) = &request.title {
        set.insert("title", title);
    }
    if let Some(description) = &request.description {
        set.insert("description", description);
    }
    if let Some(category) = &request.category {
        set.insert("category", category);
    }
    doc! { "$set": set }
}
