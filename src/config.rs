/*!
Runtime configuration from the environment.

Values come from process environment variables, with an optional `.env` file in the
working directory loaded first (existing variables are never overridden):

- BOXING_API_BASE_URL   base URL including the `/api` prefix (default http://localhost:5000/api)
- BOXING_DB_PATH        SQLite database file (default ./db/boxing.db)
- BOXING_INIT_SQL       SQL initialization script (default ./sql/init_db.sql)
- BOXING_SQLITE_BIN     sqlite3 executable name or path (default sqlite3)
- BOXING_SKIP_DB_INIT   1|true|yes|on skips database initialization
- BOXING_HTTP_TIMEOUT   per-request timeout, humantime syntax (default 30s)
- BOXING_SMOKETEST_COLOR auto|always|never
*/

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

use crate::color::{parse_color_mode, ColorMode};
use crate::errors::SmokeError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_DB_PATH: &str = "./db/boxing.db";
pub const DEFAULT_INIT_SQL: &str = "./sql/init_db.sql";
pub const DEFAULT_SQLITE_BIN: &str = "sqlite3";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct Config {
    /// Always ends with `/` so endpoint paths join underneath it.
    pub base_url: Url,
    pub db_path: PathBuf,
    pub init_sql: PathBuf,
    pub sqlite_bin: String,
    pub skip_db_init: bool,
    pub http_timeout: Duration,
    pub color: Option<ColorMode>,
}

/// Load `.env` from the working directory if present. A missing file is not an error.
/// Parent directories are not searched.
pub fn load_dotenv() -> Result<(), SmokeError> {
    match dotenvy::from_path(".env") {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(SmokeError::Config(format!(".env: {e}"))),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, SmokeError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SmokeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let base_url = parse_base_url(
            get("BOXING_API_BASE_URL")
                .as_deref()
                .unwrap_or(DEFAULT_BASE_URL),
        )?;

        let http_timeout = match get("BOXING_HTTP_TIMEOUT") {
            Some(raw) => humantime::parse_duration(&raw).map_err(|e| {
                SmokeError::Config(format!("BOXING_HTTP_TIMEOUT={raw}: {e}"))
            })?,
            None => DEFAULT_HTTP_TIMEOUT,
        };

        let skip_db_init = match get("BOXING_SKIP_DB_INIT") {
            Some(raw) => parse_flag(&raw).ok_or_else(|| {
                SmokeError::Config(format!("BOXING_SKIP_DB_INIT={raw}: expected a boolean"))
            })?,
            None => false,
        };

        let color = match get("BOXING_SMOKETEST_COLOR") {
            Some(raw) => Some(parse_color_mode(&raw).ok_or_else(|| {
                SmokeError::Config(format!(
                    "BOXING_SMOKETEST_COLOR={raw}: must be one of auto, always, never"
                ))
            })?),
            None => None,
        };

        Ok(Config {
            base_url,
            db_path: PathBuf::from(get("BOXING_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.into())),
            init_sql: PathBuf::from(
                get("BOXING_INIT_SQL").unwrap_or_else(|| DEFAULT_INIT_SQL.into()),
            ),
            sqlite_bin: get("BOXING_SQLITE_BIN").unwrap_or_else(|| DEFAULT_SQLITE_BIN.into()),
            skip_db_init,
            http_timeout,
            color,
        })
    }
}

fn parse_base_url(raw: &str) -> Result<Url, SmokeError> {
    let mut url = Url::parse(raw)
        .map_err(|e| SmokeError::Config(format!("BOXING_API_BASE_URL={raw}: {e}")))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(SmokeError::Config(format!(
            "BOXING_API_BASE_URL={raw}: scheme must be http or https"
        )));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
