use std::env;
use std::path::PathBuf;

use crate::domain::feed_item::FeedTypes;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub bearer_secret: String,
    pub data_dir: PathBuf,
    pub feed_types: FeedTypes,
    pub environment: Environment,
    pub log_format: LogFormat,
    pub log_requests: bool,
    pub sql_echo: bool,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let root_dir = PathBuf::from(env::var("ROOT_DIR").unwrap_or_else(|_| ".".to_string()));

        let database_url = env::var("DATABASE_URL").unwrap_or_else(|_| {
            let db_name =
                env::var("FEED_DB_NAME").unwrap_or_else(|_| "feeddata.sqlite".to_string());
            format!("sqlite://{}", root_dir.join(db_name).display())
        });

        let feed_types_file = env::var("FEEDTYPES_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| root_dir.join("feedtypes.json"));

        let bearer_secret = env::var("BEARER_SECRET").map_err(|_| {
            "BEARER_SECRET environment variable not set. This is required to authenticate the check/recheck endpoints."
        })?;

        let config = Config {
            database_url,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "5100".to_string())
                .parse()?,
            bearer_secret,
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| root_dir.join("data")),
            feed_types: FeedTypes::from_file(&feed_types_file)?,
            environment: match env::var("ENVIRONMENT").as_deref() {
                Ok("production") => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT").as_deref() {
                Ok("json") => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            log_requests: env_flag("LOG_REQUESTS"),
            sql_echo: env_flag("SQL_ECHO"),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|s| s.to_lowercase() == "true")
        .unwrap_or(false)
}
