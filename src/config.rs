use log::error;
use rocket::config::Config;
use rocket::fairing::AdHoc;
use rocket::figment::{
    providers::{Env, Serialized},
    Figment,
};
use serde::Deserialize;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Debug only secret for signing session tokens.
const SECRET: &str = "8Xui8SN4mI+7egV/9dlfYYLGQJeEx4+DwmSQLwDVXJg=";

pub const DATE_FORMAT: &str = "%d %b %Y %H:%M";

pub const POSTS_PER_PAGE: i64 = 10;

/// Lifetime of a login session, in days.
pub const SESSION_DAYS: i64 = 14;

pub const SESSION_COOKIE: &str = "sessionid";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub secret_key: Option<String>,
    pub media_root: PathBuf,
    pub page_cache_ttl: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            secret_key: None,
            media_root: PathBuf::from("media"),
            page_cache_ttl: 20,
        }
    }
}

pub struct AppState {
    pub secret: Vec<u8>,
    pub media_root: PathBuf,
}

impl AppState {
    pub fn manage() -> AdHoc {
        AdHoc::try_on_ignite("Manage config", |rocket| async move {
            let settings: Settings = match rocket.figment().extract() {
                Ok(settings) => settings,
                Err(err) => {
                    error!("Invalid application settings: {}", err);
                    return Err(rocket);
                }
            };

            let secret = match settings.secret_key {
                Some(secret) => secret,
                None if cfg!(debug_assertions) => SECRET.to_string(),
                None => {
                    error!("No SECRET_KEY environment variable found");
                    return Err(rocket);
                }
            };

            Ok(rocket.manage(AppState {
                secret: secret.into_bytes(),
                media_root: settings.media_root,
            }))
        })
    }
}

/// Create rocket config from environment variables
pub fn from_env() -> Figment {
    dotenv::dotenv().ok();

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| "yatube.sqlite3".to_string());

    let template_dir = env::var("TEMPLATE_DIR")
        .unwrap_or_else(|_| concat!(env!("CARGO_MANIFEST_DIR"), "/templates").to_string());

    Config::figment()
        .merge(("port", 8000))
        .merge(("template_dir", template_dir))
        .merge(("limits.file", "5 MiB"))
        .merge(("limits.data-form", "6 MiB"))
        .merge(database(&database_url))
        .merge(
            Env::raw()
                .only(&["PORT", "SECRET_KEY", "MEDIA_ROOT", "PAGE_CACHE_TTL"])
                .lowercase(true),
        )
}

/// Figment fragment pointing the connection pool at `url`.
pub fn database(url: &str) -> Serialized<HashMap<&'static str, HashMap<&'static str, String>>> {
    let mut database_config = HashMap::new();
    let mut databases = HashMap::new();
    database_config.insert("url", url.to_string());
    databases.insert("diesel_sqlite_pool", database_config);
    Serialized::default("databases", databases)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn database_url_lands_under_the_pool_name() {
        let figment = Figment::new().merge(database("blog.sqlite3"));
        let url: String = figment
            .extract_inner("databases.diesel_sqlite_pool.url")
            .unwrap();
        assert_eq!(url, "blog.sqlite3");
    }

    #[test]
    fn malformed_port_is_a_config_error() {
        let figment = from_env().merge(("port", "eighty"));
        assert!(Config::try_from(figment).is_err());
    }

    #[test]
    fn settings_fall_back_to_defaults() {
        let settings: Settings = Figment::new()
            .merge(("page_cache_ttl", 5))
            .extract()
            .unwrap();
        assert_eq!(settings.page_cache_ttl, 5);
        assert_eq!(settings.media_root, PathBuf::from("media"));
        assert!(settings.secret_key.is_none());
    }
}
