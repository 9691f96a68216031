pub mod admin_handler;
pub mod auth_handler;
pub mod contact_handler;
pub mod course_handler;
pub mod health_handler;
pub mod upload_form;
pub mod user_handler;

use actix_web::{error::Error as ActixError, web, HttpRequest};

use crate::errors::AppError;

pub const API_PREFIX: &str = "/api/v1";

fn json_error(err: actix_web::error::JsonPayloadError, _req: &HttpRequest) -> ActixError {
    AppError::ValidationFailed(format!("Invalid request body: {}", err)).into()
}

fn query_error(err: actix_web::error::QueryPayloadError, _req: &HttpRequest) -> ActixError {
    AppError::ValidationFailed(format!("Invalid query string: {}", err)).into()
}

/// Registers every route. Body and query rejections use the same error
/// envelope as handler errors.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error))
        .app_data(web::QueryConfig::default().error_handler(query_error))
        .service(health_handler::health_check)
        .service(health_handler::health_check_ready)
        .service(
            web::scope(API_PREFIX)
                .service(auth_handler::register)
                .service(auth_handler::login)
                .service(auth_handler::logout)
                .service(auth_handler::forgot_password)
                .service(auth_handler::reset_password)
                .service(user_handler::get_my_profile)
                .service(user_handler::delete_my_profile)
                .service(user_handler::change_password)
                .service(user_handler::update_profile)
                .service(user_handler::update_profile_picture)
                .service(user_handler::add_to_playlist)
                .service(user_handler::remove_from_playlist)
                .service(course_handler::list_courses)
                .service(course_handler::create_course)
                .service(course_handler::get_course_lectures)
                .service(course_handler::add_lecture)
                .service(course_handler::update_course)
                .service(course_handler::delete_course)
                .service(course_handler::delete_lecture)
                .service(contact_handler::contact)
                .service(contact_handler::course_request)
                .service(admin_handler::get_stats)
                .service(admin_handler::list_users)
                .service(admin_handler::update_user_access)
                .service(admin_handler::delete_user),
        );
}
