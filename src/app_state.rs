use std::sync::Arc;

use crate::{
    auth::JwtService,
    config::Config,
    db::Database,
    errors::AppResult,
    repositories::{CourseRepository, MongoCourseRepository, MongoUserRepository, UserRepository},
    services::{
        ContactService, CourseService, Mailer, SmtpMailer, StatsService, UserService,
    },
    storage::{AssetStore, CloudinaryClient, StagingArea},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub jwt_service: Arc<JwtService>,
    pub staging: StagingArea,
    pub course_service: Arc<CourseService>,
    pub user_service: Arc<UserService>,
    pub stats_service: Arc<StatsService>,
    pub contact_service: Arc<ContactService>,
    /// `None` when wired without MongoDB, which makes readiness report unavailable.
    pub db: Option<Database>,
}

/// Collaborators behind the service traits. Production uses MongoDB,
/// the asset host and SMTP; tests swap in their own.
pub struct Backends {
    pub users: Arc<dyn UserRepository>,
    pub courses: Arc<dyn CourseRepository>,
    pub assets: Arc<dyn AssetStore>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn new(config: Config) -> AppResult<Self> {
        let db = Database::connect(&config).await?;

        let users = Arc::new(MongoUserRepository::new(&db, &config.users_collection));
        users.ensure_indexes().await?;

        let courses = Arc::new(MongoCourseRepository::new(&db, &config.courses_collection));
        courses.ensure_indexes().await?;

        let backends = Backends {
            users,
            courses,
            assets: Arc::new(CloudinaryClient::from_config(&config)),
            mailer: Arc::new(SmtpMailer::from_config(&config)?),
        };

        let mut state = Self::from_parts(config, backends);
        state.staging.ensure_exists().await?;
        state.db = Some(db);
        Ok(state)
    }

    pub fn from_parts(config: Config, backends: Backends) -> Self {
        let staging = StagingArea::new(config.staging_dir.clone());
        let jwt_service = Arc::new(JwtService::new(
            &config.jwt_secret,
            config.jwt_expiration_hours,
        ));

        let course_service = Arc::new(CourseService::new(
            backends.courses.clone(),
            backends.assets.clone(),
            staging.clone(),
            &config.asset_folder,
        ));
        let user_service = Arc::new(UserService::new(
            backends.users.clone(),
            backends.courses.clone(),
            backends.assets,
            backends.mailer.clone(),
            staging.clone(),
            &config,
        ));
        let stats_service = Arc::new(StatsService::new(backends.users, backends.courses));
        let contact_service = Arc::new(ContactService::new(backends.mailer, &config.contact_inbox));

        Self {
            config: Arc::new(config),
            jwt_service,
            staging,
            course_service,
            user_service,
            stats_service,
            contact_service,
            db: None,
        }
    }
}
