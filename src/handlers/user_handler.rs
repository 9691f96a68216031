use actix_multipart::Multipart;
use actix_web::{delete, get, post, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::{clear_session_cookie, Authenticated},
    errors::AppError,
    handlers::upload_form::UploadForm,
    models::dto::{
        request::{ChangePasswordRequest, PlaylistRequest, UpdateProfileRequest},
        response::{ApiResponse, UserPayload},
    },
};

#[get("/me")]
pub async fn get_my_profile(
    state: web::Data<AppState>,
    Authenticated(claims): Authenticated,
) -> Result<HttpResponse, AppError> {
    let user = state.user_service.get_user(&claims.sub).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Profile fetched",
        UserPayload { user: user.into() },
    )))
}

#[delete("/me")]
pub async fn delete_my_profile(
    state: web::Data<AppState>,
    Authenticated(claims): Authenticated,
) -> Result<HttpResponse, AppError> {
    state.user_service.delete_user(&claims.sub).await?;
    Ok(HttpResponse::Ok()
        .cookie(clear_session_cookie())
        .json(ApiResponse::message("User deleted successfully")))
}

#[put("/changepassword")]
pub async fn change_password(
    state: web::Data<AppState>,
    Authenticated(claims): Authenticated,
    body: web::Json<ChangePasswordRequest>,
) -> Result<HttpResponse, AppError> {
    state
        .user_service
        .change_password(&claims.sub, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("Password changed successfully")))
}

#[put("/updateprofile")]
pub async fn update_profile(
    state: web::Data<AppState>,
    Authenticated(claims): Authenticated,
    body: web::Json<UpdateProfileRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .user_service
        .update_profile(&claims.sub, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Profile updated successfully",
        UserPayload { user: user.into() },
    )))
}

/// Multipart with a single `file` part.
#[put("/updateprofilepicture")]
pub async fn update_profile_picture(
    state: web::Data<AppState>,
    Authenticated(claims): Authenticated,
    payload: Multipart,
) -> Result<HttpResponse, AppError> {
    let mut form = UploadForm::read(payload, &state.staging).await?;
    let user = state
        .user_service
        .update_avatar(&claims.sub, form.file.take())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Profile picture updated successfully",
        UserPayload { user: user.into() },
    )))
}

#[post("/addtoplaylist")]
pub async fn add_to_playlist(
    state: web::Data<AppState>,
    Authenticated(claims): Authenticated,
    body: web::Json<PlaylistRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .user_service
        .add_to_playlist(&claims.sub, &body.id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Added to playlist",
        UserPayload { user: user.into() },
    )))
}

#[delete("/removefromplaylist")]
pub async fn remove_from_playlist(
    state: web::Data<AppState>,
    Authenticated(claims): Authenticated,
    query: web::Query<PlaylistRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .user_service
        .remove_from_playlist(&claims.sub, &query.id)
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "Removed from playlist",
        UserPayload { user: user.into() },
    )))
}
