pub mod claims;
pub mod extractor;
pub mod guard;
pub mod jwt;
pub mod password;

pub use claims::Claims;
pub use extractor::{
    clear_session_cookie, session_cookie, AdminUser, Authenticated, Subscriber, TOKEN_COOKIE,
};
pub use guard::{require_active_subscription, require_role};
pub use jwt::JwtService;
