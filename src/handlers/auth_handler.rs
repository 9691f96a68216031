use actix_multipart::Multipart;
use actix_web::{get, http::StatusCode, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{clear_session_cookie, session_cookie},
    errors::AppError,
    handlers::upload_form::UploadForm,
    models::{
        domain::User,
        dto::{
            request::{ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest},
            response::{ApiResponse, UserPayload},
        },
    },
};

fn session_response(
    state: &AppState,
    user: User,
    message: String,
    status: StatusCode,
) -> Result<HttpResponse, AppError> {
    let token = state.jwt_service.create_token(&user)?;
    Ok(HttpResponse::build(status)
        .cookie(session_cookie(token, &state.config))
        .json(ApiResponse::new(message, UserPayload { user: user.into() })))
}

/// Multipart: `name`, `email`, `password`, optional `file` avatar.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let mut form = UploadForm::read(payload, &state.staging).await?;
    let request: RegisterRequest = form.parse_or_discard(&state.staging).await?;

    let user = state.user_service.register(request, form.file.take()).await?;
    let message = "Registered successfully".to_string();
    session_response(&state, user, message, StatusCode::CREATED)
}

#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.login(body.into_inner()).await?;
    log::info!("User {} logged in", user.id);

    let message = format!("Welcome back, {}", user.name);
    session_response(&state, user, message, StatusCode::OK)
}

#[get("/logout")]
pub async fn logout() -> HttpResponse {
    HttpResponse::Ok()
        .cookie(clear_session_cookie())
        .json(ApiResponse::message("Logged out successfully"))
}

#[post("/forgetpassword")]
pub async fn forgot_password(
    state: web::Data<AppState>,
    body: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    let email = state.user_service.forgot_password(body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message(format!(
        "Reset token has been sent to {}",
        email
    ))))
}

#[put("/resetpassword/{token}")]
pub async fn reset_password(
    state: web::Data<AppState>,
    token: web::Path<String>,
    body: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse, AppError> {
    state
        .user_service
        .reset_password(&token.into_inner(), body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Password changed successfully")))
}
