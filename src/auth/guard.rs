use crate::{
    auth::Claims,
    errors::{AppError, AppResult},
    models::domain::{Role, SubscriptionStatus},
};

/// Admits the request only if the claim's role is one of `allowed`.
pub fn require_role(claims: &Claims, allowed: &[Role]) -> AppResult<()> {
    debug_assert!(!allowed.is_empty(), "require_role needs at least one role");

    if !allowed.contains(&claims.role) {
        return Err(AppError::Forbidden(format!(
            "Role {:?} is not allowed to access this resource",
            claims.role
        )));
    }
    Ok(())
}

/// Admins always pass; everyone else needs an active subscription.
pub fn require_active_subscription(claims: &Claims) -> AppResult<()> {
    if !claims.is_admin() && claims.subscription != SubscriptionStatus::Active {
        return Err(AppError::Forbidden(
            "Only subscribers can access this resource".to_string(),
        ));
    }
    Ok(())
}
