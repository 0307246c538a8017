use std::process::ExitCode;

use boxing_smoketest::color::log_error_stderr;
use boxing_smoketest::{
    color_enabled_stderr, display_for_smoke_error, exit_code_for_smoke_error, parse_args,
    set_color_mode, telemetry, Config, SmokeError,
};

fn fail(e: &SmokeError) -> ExitCode {
    log_error_stderr(color_enabled_stderr(), &display_for_smoke_error(e));
    ExitCode::from(exit_code_for_smoke_error(e))
}

fn main() -> ExitCode {
    let cli = match parse_args(std::env::args_os()) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };

    let config = match boxing_smoketest::config::load_dotenv().and_then(|_| Config::from_env()) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    if let Some(mode) = config.color {
        set_color_mode(mode);
    }
    telemetry::init_logging(color_enabled_stderr());

    let stdout = std::io::stdout();
    match boxing_smoketest::run(&cli, &config, stdout.lock()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(&e),
    }
}
