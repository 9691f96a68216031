use std::future::{ready, Ready};

use actix_web::{
    cookie::{time::Duration as CookieDuration, Cookie, SameSite},
    dev::Payload,
    web, FromRequest, HttpRequest,
};

use crate::{
    app_state::AppState,
    auth::{
        guard::{require_active_subscription, require_role},
        Claims,
    },
    config::Config,
    errors::{AppError, AppResult},
    models::domain::Role,
};

pub const TOKEN_COOKIE: &str = "token";

/// Verified session claims. Taking this as a handler argument means the
/// token was checked before the handler body runs.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Claims);

/// Session claims that also passed `require_role(&[Role::Admin])`.
#[derive(Debug, Clone)]
pub struct AdminUser(pub Claims);

/// Session claims that also passed `require_active_subscription`.
#[derive(Debug, Clone)]
pub struct Subscriber(pub Claims);

fn authenticate(req: &HttpRequest) -> AppResult<Claims> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::InternalError("Session verifier not configured".to_string()))?;

    let cookie = req.cookie(TOKEN_COOKIE);
    state.jwt_service.verify(cookie.as_ref().map(|c| c.value()))
}

impl FromRequest for Authenticated {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(Authenticated))
    }
}

impl FromRequest for AdminUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = authenticate(req).and_then(|claims| {
            require_role(&claims, &[Role::Admin])?;
            Ok(AdminUser(claims))
        });
        ready(result)
    }
}

impl FromRequest for Subscriber {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = authenticate(req).and_then(|claims| {
            require_active_subscription(&claims)?;
            Ok(Subscriber(claims))
        });
        ready(result)
    }
}

pub fn session_cookie(token: String, config: &Config) -> Cookie<'static> {
    // Browsers drop SameSite=None cookies that are not also Secure.
    let same_site = if config.cookie_secure {
        SameSite::None
    } else {
        SameSite::Lax
    };

    Cookie::build(TOKEN_COOKIE, token)
        .path("/")
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(same_site)
        .max_age(CookieDuration::hours(config.jwt_expiration_hours))
        .finish()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(TOKEN_COOKIE, "")
        .path("/")
        .http_only(true)
        .finish();
    cookie.make_removal();
    cookie
}
