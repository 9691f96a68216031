use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{AdminUser, Subscriber},
    errors::AppError,
    handlers::upload_form::UploadForm,
    middleware::get_request_id,
    models::dto::{
        request::{
            AddLectureRequest, CourseListQuery, CreateCourseRequest, LectureRef,
            UpdateCourseRequest,
        },
        response::{ApiResponse, CoursePayload, CoursesPayload, LecturesPayload},
    },
    repositories::CourseFilter,
};

/// Public listing, lectures omitted. `keyword` matches the title, `category`
/// the category; both case-insensitive.
#[get("/courses")]
pub async fn list_courses(
    state: web::Data<AppState>,
    query: web::Query<CourseListQuery>,
) -> Result<HttpResponse, AppError> {
    let query = query.into_inner();
    let filter = CourseFilter {
        keyword: query.keyword,
        category: query.category,
    };
    let courses = state.course_service.list_courses(&filter).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Courses fetched",
        CoursesPayload { courses },
    )))
}

/// Multipart: `title`, `description`, `category`, `createdBy`, optional `file` thumbnail.
#[post("/createcourse")]
pub async fn create_course(
    req: HttpRequest,
    state: web::Data<AppState>,
    AdminUser(claims): AdminUser,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let mut form = UploadForm::read(payload, &state.staging).await?;
    let request: CreateCourseRequest = form.parse_or_discard(&state.staging).await?;

    let course = state
        .course_service
        .create_course(request, form.file.take())
        .await?;
    log::info!(
        "[{}] Admin {} created course {}",
        get_request_id(&req).unwrap_or_default(),
        claims.sub,
        course.id
    );

    Ok(HttpResponse::Created().json(ApiResponse::new(
        "Course created successfully. You can add lectures now.",
        CoursePayload { course },
    )))
}

#[get("/course/{id}")]
pub async fn get_course_lectures(
    state: web::Data<AppState>,
    _subscriber: Subscriber,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let lectures = state.course_service.get_lectures(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Lectures fetched",
        LecturesPayload { lectures },
    )))
}

/// Multipart: `title`, `description`, optional `file` video.
#[post("/course/{id}")]
pub async fn add_lecture(
    state: web::Data<AppState>,
    _admin: AdminUser,
    id: web::Path<String>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let mut form = UploadForm::read(payload, &state.staging).await?;
    let request: AddLectureRequest = form.parse_or_discard(&state.staging).await?;

    let course = state
        .course_service
        .add_lecture(&id, request, form.file.take())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Lecture added to course",
        CoursePayload { course },
    )))
}

#[put("/course/{id}")]
pub async fn update_course(
    state: web::Data<AppState>,
    _admin: AdminUser,
    id: web::Path<String>,
    body: web::Json<UpdateCourseRequest>,
) -> Result<HttpResponse, AppError> {
    let course = state
        .course_service
        .update_course(&id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Course updated successfully",
        CoursePayload { course },
    )))
}

#[delete("/course/{id}")]
pub async fn delete_course(
    req: HttpRequest,
    state: web::Data<AppState>,
    AdminUser(claims): AdminUser,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    state.course_service.delete_course(&id).await?;
    log::info!(
        "[{}] Admin {} deleted course {}",
        get_request_id(&req).unwrap_or_default(),
        claims.sub,
        id
    );
    Ok(HttpResponse::Ok().json(ApiResponse::message("Course deleted successfully")))
}

#[delete("/lecture")]
pub async fn delete_lecture(
    state: web::Data<AppState>,
    _admin: AdminUser,
    query: web::Query<LectureRef>,
) -> Result<HttpResponse, AppError> {
    let course = state
        .course_service
        .remove_lecture(query.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Lecture deleted successfully",
        CoursePayload { course },
    )))
}
