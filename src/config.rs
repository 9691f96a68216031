use std::{env, path::PathBuf};

use secrecy::SecretString;

#[derive(Clone, Debug)]
pub struct Config {
    pub mongo_conn_string: String,
    pub mongo_db_name: String,
    pub users_collection: String,
    pub courses_collection: String,
    pub web_server_host: String,
    pub web_server_port: u16,
    pub frontend_url: String,
    pub jwt_secret: SecretString,
    pub jwt_expiration_hours: i64,
    pub cookie_secure: bool,
    pub asset_cloud_name: String,
    pub asset_api_key: String,
    pub asset_api_secret: SecretString,
    pub asset_folder: String,
    pub staging_dir: PathBuf,
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: String,
    pub smtp_password: SecretString,
    pub mail_from: String,
    pub contact_inbox: String,
    pub reset_token_ttl_minutes: i64,
}

const DEFAULT_JWT_SECRET: &str = "dev_secret_key_change_in_production";
const DEFAULT_ASSET_SECRET: &str = "asset_api_secret";

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            mongo_conn_string: var_or("MONGO_CONN_STRING", "mongodb://localhost:27017"),
            mongo_db_name: var_or("MONGO_DB_NAME", "lectern-local"),
            users_collection: var_or("USERS_COLLECTION", "users"),
            courses_collection: var_or("COURSES_COLLECTION", "courses"),
            web_server_host: var_or("WEB_SERVER_HOST", "localhost"),
            web_server_port: parsed_or("WEB_SERVER_PORT", 8080),
            frontend_url: var_or("FRONTEND_URL", "http://localhost:3000"),
            jwt_secret: SecretString::from(var_or("JWT_SECRET", DEFAULT_JWT_SECRET)),
            jwt_expiration_hours: parsed_or("JWT_EXPIRATION_HOURS", 15 * 24),
            cookie_secure: parsed_or("COOKIE_SECURE", false),
            asset_cloud_name: var_or("ASSET_CLOUD_NAME", "demo"),
            asset_api_key: var_or("ASSET_API_KEY", "asset_api_key"),
            asset_api_secret: SecretString::from(var_or("ASSET_API_SECRET", DEFAULT_ASSET_SECRET)),
            asset_folder: var_or("ASSET_FOLDER", "lectern"),
            staging_dir: PathBuf::from(var_or("STAGING_DIR", "uploads")),
            smtp_host: var_or("SMTP_HOST", "localhost"),
            smtp_port: parsed_or("SMTP_PORT", 587),
            smtp_username: var_or("SMTP_USERNAME", ""),
            smtp_password: SecretString::from(var_or("SMTP_PASSWORD", "")),
            mail_from: var_or("MAIL_FROM", "Lectern <no-reply@lectern.local>"),
            contact_inbox: var_or("CONTACT_INBOX", "support@lectern.local"),
            reset_token_ttl_minutes: parsed_or("RESET_TOKEN_TTL_MINUTES", 15),
        }
    }

    pub fn bind_address(&self) -> (String, u16) {
        (self.web_server_host.clone(), self.web_server_port)
    }

    /// Validate that production-critical configuration is set
    /// Panics if required secrets are using default values
    pub fn validate_for_production(&self) {
        use secrecy::ExposeSecret;

        let jwt_secret = self.jwt_secret.expose_secret();

        if jwt_secret == DEFAULT_JWT_SECRET {
            panic!(
                "FATAL: JWT_SECRET is using default value! Set JWT_SECRET environment variable to a secure random string."
            );
        }

        if jwt_secret.len() < 32 {
            panic!(
                "FATAL: JWT_SECRET is too short ({}). Must be at least 32 characters for security.",
                jwt_secret.len()
            );
        }

        if self.asset_api_secret.expose_secret() == DEFAULT_ASSET_SECRET {
            panic!(
                "FATAL: ASSET_API_SECRET is using default value! Set ASSET_API_SECRET environment variable."
            );
        }

        if !self.cookie_secure {
            panic!("FATAL: COOKIE_SECURE must be enabled in production.");
        }
    }

    #[cfg(test)]
    pub fn test_config() -> Self {
        Self {
            mongo_conn_string: "mongodb://localhost:27017".to_string(),
            mongo_db_name: "lectern-test".to_string(),
            users_collection: "users".to_string(),
            courses_collection: "courses".to_string(),
            web_server_host: "127.0.0.1".to_string(),
            web_server_port: 8080,
            frontend_url: "http://localhost:3000".to_string(),
            jwt_secret: SecretString::from("test_jwt_secret_key".to_string()),
            jwt_expiration_hours: 1,
            cookie_secure: false,
            asset_cloud_name: "demo".to_string(),
            asset_api_key: "key".to_string(),
            asset_api_secret: SecretString::from("secret".to_string()),
            asset_folder: "lectern".to_string(),
            staging_dir: env::temp_dir().join("lectern-test-uploads"),
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            smtp_username: String::new(),
            smtp_password: SecretString::from(String::new()),
            mail_from: "Lectern <no-reply@lectern.local>".to_string(),
            contact_inbox: "support@lectern.local".to_string(),
            reset_token_ttl_minutes: 15,
        }
    }
}
