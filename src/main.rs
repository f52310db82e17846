use anyhow::Result;
use clap::Parser;
use foldersort::cli::{Args, RunOptions, run};
use foldersort::config::Config;
use foldersort::logging::setup_logging;
use foldersort::output::OutputFormatter;
use std::process::ExitCode;

fn main() -> ExitCode {
    let args = Args::parse();

    match execute(&args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            OutputFormatter::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

fn execute(args: &Args) -> Result<u8> {
    let (config, source) = Config::load(args.config.as_deref())?;
    let options = RunOptions::resolve(args, &config)?;
    let _guard = setup_logging(&options.log_file, args.verbose)?;

    match &source {
        Some(path) => tracing::info!("Loaded configuration from {}", path.display()),
        None => tracing::info!("No configuration file found, using defaults"),
    }

    let outcome = run(&options, &config)?;
    Ok(outcome.exit_code(args.strict))
}
