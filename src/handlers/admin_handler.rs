use actix_web::{delete, get, put, web, HttpResponse};

use crate::{
    app_state::AppState,
    auth::AdminUser,
    errors::AppError,
    models::dto::{
        request::UpdateUserAccessRequest,
        response::{ApiResponse, StatsPayload, UserDto, UserPayload, UsersPayload},
    },
};

#[get("/admin/stats")]
pub async fn get_stats(
    state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let stats = state.stats_service.snapshot().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new("Stats fetched", StatsPayload { stats })))
}

#[get("/admin/users")]
pub async fn list_users(
    state: web::Data<AppState>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    let users = state
        .user_service
        .list_users()
        .await?
        .into_iter()
        .map(UserDto::from)
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::new("Users fetched", UsersPayload { users })))
}

/// Takes effect on the user's next login; issued sessions keep their claims.
#[put("/admin/user/{id}")]
pub async fn update_user_access(
    state: web::Data<AppState>,
    _admin: AdminUser,
    id: web::Path<String>,
    body: web::Json<UpdateUserAccessRequest>,
) -> Result<HttpResponse, AppError> {
    let user = state
        .user_service
        .update_access(&id, body.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        "User updated",
        UserPayload { user: user.into() },
    )))
}

#[delete("/admin/user/{id}")]
pub async fn delete_user(
    state: web::Data<AppState>,
    AdminUser(claims): AdminUser,
    id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    if claims.sub == *id {
        return Err(AppError::ValidationFailed(
            "Use DELETE /me to remove your own account".to_string(),
        ));
    }
    state.user_service.delete_user(&id).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::message("User deleted successfully")))
}
