use actix_web::{post, web, HttpResponse};

use crate::{
    app_state::AppState,
    errors::AppError,
    models::dto::{
        request::{ContactRequest, CourseRequestForm},
        response::ApiResponse,
    },
};

#[post("/contact")]
pub async fn contact(
    state: web::Data<AppState>,
    body: web::Json<ContactRequest>,
) -> Result<HttpResponse, AppError> {
    state.contact_service.contact(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Your message has been sent")))
}

#[post("/courserequest")]
pub async fn course_request(
    state: web::Data<AppState>,
    body: web::Json<CourseRequestForm>,
) -> Result<HttpResponse, AppError> {
    state.contact_service.request_course(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Your request has been sent")))
}
