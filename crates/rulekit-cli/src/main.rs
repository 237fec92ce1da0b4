use clap::Parser;

mod args;
mod exit_codes;

use args::Cli;
use rulekit_core::engine::stub::StubEngine;

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // clap renders its own usage/help text; keep the contract's
            // exit codes (help/version are not usage errors).
            let _ = err.print();
            let code = if err.use_stderr() {
                exit_codes::USAGE_ERROR
            } else {
                exit_codes::SUCCESS
            };
            std::process::exit(code);
        }
    };

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            exit_codes::BUILD_FAILED
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let engine = StubEngine::new();
    let outcome = rulekit_core::build_bundle(&engine, &cli.rules_folder, &cli.output_archive)?;
    tracing::debug!(
        sources = outcome.sources,
        bytes = outcome.archive_bytes,
        "build complete"
    );
    println!("bundle written to: {}", cli.output_archive.display());
    Ok(exit_codes::SUCCESS)
}
