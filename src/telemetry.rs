use once_cell::sync::OnceCell;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

const DEFAULT_FILTER: &str = "warn";

/// Resolve the log filter directive: BOXING_SMOKETEST_LOG, then RUST_LOG, then "warn".
pub fn log_filter_directive() -> String {
    log_filter_directive_from(|key| std::env::var(key).ok())
}

/// Same as [`log_filter_directive`] over an arbitrary lookup. Blank values count as unset.
pub fn log_filter_directive_from<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    ["BOXING_SMOKETEST_LOG", "RUST_LOG"]
        .iter()
        .filter_map(|k| lookup(k))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// Install the global stderr subscriber once. Later calls are no-ops.
pub fn init_logging(use_color: bool) {
    INIT.get_or_init(|| {
        let directive = log_filter_directive();
        let filter = EnvFilter::try_new(&directive).unwrap_or_else(|e| {
            eprintln!("boxing-smoketest: invalid log filter {directive:?}: {e}; using {DEFAULT_FILTER}");
            EnvFilter::new(DEFAULT_FILTER)
        });
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_ansi(use_color);
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(layer)
            .try_init();
    });
}
