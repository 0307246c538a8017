use clap::Parser;

use crate::errors::SmokeError;

/// Command line of the smoketest. `--echo-json` is the only accepted argument;
/// help and version flags are disabled so that anything else is rejected.
#[derive(Parser, Debug, Clone, Default, PartialEq, Eq)]
#[command(
    name = "boxing-smoketest",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Cli {
    /// Pretty-print JSON responses of read-style calls
    #[arg(long = "echo-json")]
    pub echo_json: bool,
}

/// Parse the process arguments (first item is the program name).
pub fn parse_args<I, T>(args: I) -> Result<Cli, SmokeError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let args: Vec<std::ffi::OsString> = args.into_iter().map(Into::into).collect();
    // Checked before clap so that `--` cannot end option parsing and pass silently
    if let Some(bad) = args.iter().skip(1).find(|a| a.as_os_str() != "--echo-json") {
        return Err(SmokeError::Usage(format!(
            "Unknown option: {}",
            bad.to_string_lossy()
        )));
    }
    Cli::try_parse_from(&args)
        .map_err(|_| SmokeError::Usage("Option given more than once: --echo-json".to_string()))
}
