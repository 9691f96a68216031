use std::sync::Arc;

use validator::Validate;

use crate::{
    errors::AppResult,
    models::dto::request::{take_required, ContactRequest, CourseRequestForm},
    services::mailer::Mailer,
};

/// Forwards public contact and course-request forms to the support inbox.
pub struct ContactService {
    mailer: Arc<dyn Mailer>,
    inbox: String,
}

impl ContactService {
    pub fn new(mailer: Arc<dyn Mailer>, inbox: &str) -> Self {
        Self {
            mailer,
            inbox: inbox.to_string(),
        }
    }

    pub async fn contact(&self, request: ContactRequest) -> AppResult<()> {
        request.validate()?;

        let body = format!(
            "I am {}, my email is {}.\n{}",
            take_required(request.name),
            take_required(request.email),
            take_required(request.message)
        );
        self.mailer
            .send(&self.inbox, "Contact from Lectern", &body)
            .await
    }

    pub async fn request_course(&self, request: CourseRequestForm) -> AppResult<()> {
        request.validate()?;

        let body = format!(
            "I am {}, my email is {}.\nPlease add the course: {}",
            take_required(request.name),
            take_required(request.email),
            take_required(request.course)
        );
        self.mailer
            .send(&self.inbox, "Requesting a course on Lectern", &body)
            .await
    }
}
