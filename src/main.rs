use std::io::Write;
use std::process::ExitCode;

use gitweb_release_downloader::cli::Cli;
use log::{error, Level, LevelFilter};

fn init_logger(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder
        .format(|buf, record| match record.level() {
            Level::Info => writeln!(buf, "{}", record.args()),
            Level::Error => writeln!(buf, "error: {}", record.args()),
            level => writeln!(buf, "[{level} {}] {}", record.target(), record.args()),
        })
        .filter_level(level);
    // Quiet and --print-filename output is fixed; RUST_LOG only tunes the rest.
    if level > LevelFilter::Error {
        builder.parse_default_env();
    }
    // Error reports from this binary are never filtered out.
    builder.filter_module(module_path!(), level.min(LevelFilter::Error));
    builder.init();
}

fn main() -> ExitCode {
    let cli = Cli::parse_normalized();
    init_logger(cli.log_level());
    let minimal_errors = cli.minimal_errors();

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!("failed to create the async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(cli.execute()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if minimal_errors {
                error!("{e}");
            } else {
                error!("{}", e.report());
            }
            ExitCode::FAILURE
        }
    }
}
