//! bb-install binary entry point.
//!
//! Thin wrapper around the library flow: parse arguments, build the run
//! configuration once, execute, and map the outcome to an exit status.

use bb_install::cli::Cli;
use bb_install::config::InstallConfig;
use bb_install::report::Reporter;
use bb_install::{exit_codes, run};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();

    let cli = Cli::parse_args();
    let mut reporter = Reporter::new();

    let config = match InstallConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            fail(&mut reporter, err);
        }
    };

    match run(&config, &mut reporter).await {
        Ok(result) => {
            reporter.success(&format!(
                "✅ bb {} installed at {}",
                result.version,
                result.final_path.display()
            ));
            std::process::exit(exit_codes::SUCCESS);
        }
        Err(err) => fail(&mut reporter, err),
    }
}

/// Render a fatal error with its cause chain and exit non-zero.
fn fail(reporter: &mut Reporter, err: bb_install::error::InstallError) -> ! {
    let err = anyhow::Error::new(err);
    reporter.error(&format!("{err:#}"));
    std::process::exit(exit_codes::ERROR);
}
