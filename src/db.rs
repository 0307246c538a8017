//! Database initialization: apply the SQL script to the local SQLite file with the
//! external `sqlite3` binary before any HTTP call is made.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{debug, info};

use crate::config::Config;
use crate::util::{command_preview, ExecRequest, ExecService};

const SQLITE_TIMEOUT: Duration = Duration::from_secs(60);

/// Resolve the sqlite executable: explicit paths are used as-is, bare names are looked up on PATH.
pub fn resolve_sqlite_bin(bin: &str) -> Result<PathBuf> {
    let candidate = PathBuf::from(bin);
    if candidate.components().count() > 1 {
        if candidate.is_file() {
            return Ok(candidate);
        }
        bail!("sqlite executable not found at {}", candidate.display());
    }
    which::which(bin).with_context(|| format!("sqlite executable {bin:?} not found on PATH"))
}

/// Run `sqlite3 <db_path> < <init_sql>`.
pub fn init_database(config: &Config) -> Result<()> {
    let sql = &config.init_sql;
    if !sql.is_file() {
        bail!("SQL initialization file not found: {}", sql.display());
    }
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }

    let sqlite = resolve_sqlite_bin(&config.sqlite_bin)?;
    let req = ExecRequest::new(sqlite.as_os_str())
        .arg(config.db_path.as_os_str())
        .stdin_file(sql)
        .capture_output(true);
    let preview = command_preview(&req, Some(sql));
    debug!(command = %preview, "initializing database");

    let out = ExecService::new(SQLITE_TIMEOUT)
        .run(req)
        .context("failed to initialize database")?;
    if !out.status.success() {
        let stderr = out.stderr.trim();
        bail!(
            "failed to initialize database: `{preview}` exited with {}{}",
            out.status,
            if stderr.is_empty() {
                String::new()
            } else {
                format!(": {stderr}")
            }
        );
    }
    info!(
        db = %config.db_path.display(),
        elapsed_ms = out.duration.as_millis() as u64,
        "database initialized"
    );
    Ok(())
}
