pub mod contact_service;
pub mod course_service;
pub mod mailer;
pub mod stats_service;
pub mod user_service;

pub use contact_service::ContactService;
pub use course_service::CourseService;
pub use mailer::{Mailer, SmtpMailer};
pub use stats_service::StatsService;
pub use user_service::UserService;
