//! Smoketest for the boxing management HTTP API.
//!
//! The run initializes the local SQLite database, then walks a fixed sequence of
//! health, boxer, leaderboard and ring/fight endpoints, stopping at the first
//! response that does not carry the success marker.

pub mod api;
pub mod cli;
pub mod color;
pub mod config;
pub mod db;
pub mod errors;
pub mod smoke;
pub mod telemetry;
pub mod util;

use std::io::Write;

pub use api::{ApiClient, ApiResponse, Boxer, NewBoxer, SortBy};
pub use cli::{parse_args, Cli};
pub use color::{color_enabled_stderr, color_enabled_stdout, paint, set_color_mode, ColorMode};
pub use config::Config;
pub use errors::{display_for_smoke_error, exit_code_for_smoke_error, SmokeError};
pub use smoke::{RunSummary, SmokeRunner, FIXTURES};

/// Initialize the database (unless skipped) and run the full sequence, writing step lines to `out`.
pub fn run<W: Write>(cli: &Cli, config: &Config, mut out: W) -> Result<RunSummary, SmokeError> {
    let use_color = color_enabled_stdout();

    if config.skip_db_init {
        tracing::info!("database initialization skipped");
    } else {
        smoke::write_line(&mut out, "Initializing the database...")?;
        db::init_database(config)?;
        smoke::write_line(
            &mut out,
            &paint(use_color, "\x1b[32m", "Database initialized successfully."),
        )?;
    }

    let client = ApiClient::new(config.base_url.clone(), config.http_timeout)?;
    tracing::debug!(base_url = %client.base_url(), "starting smoketest");
    SmokeRunner::new(&client, out, cli.echo_json, use_color).run_all()
}
