use std::sync::Arc;

use crate::{
    errors::AppResult,
    models::{domain::SubscriptionStatus, dto::response::PlatformStats},
    repositories::{CourseRepository, UserRepository},
};

/// Read-only platform counters for the admin dashboard.
pub struct StatsService {
    users: Arc<dyn UserRepository>,
    courses: Arc<dyn CourseRepository>,
}

impl StatsService {
    pub fn new(users: Arc<dyn UserRepository>, courses: Arc<dyn CourseRepository>) -> Self {
        Self { users, courses }
    }

    pub async fn snapshot(&self) -> AppResult<PlatformStats> {
        let (users, active_subscriptions, courses, views) = futures::try_join!(
            self.users.count(),
            self.users.count_by_subscription(SubscriptionStatus::Active),
            self.courses.count(),
            self.courses.total_views(),
        )?;

        Ok(PlatformStats {
            users,
            active_subscriptions,
            courses,
            views,
        })
    }
}
