pub mod course_repository;
pub mod user_repository;

pub use course_repository::{CourseFilter, CourseRepository, MongoCourseRepository};
pub use user_repository::{MongoUserRepository, UserRepository};
