//! # Scope Evaluation CLI
//!
//! Loads a stack definition and prints the decision for each scope.
//!
//! ## Usage
//!
//! ```text
//! scope-eval <stack.json> <scope>...
//! ```
//!
//! Output is one `<scope>\t<ALLOW|DENY|NONE>` line per scope. The exit code
//! is 1 when the stack definition is missing or cannot be loaded.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `RUST_LOG` - Log level (default: info)

use scope_authz::{AuthzError, Result, StackConfig, VERSION};
use std::io::Write;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "Usage: scope-eval <stack.json> <scope>...";

fn main() -> ExitCode {
    // Logs go to stderr so stdout only carries decisions
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let stdout = std::io::stdout();
    match run(std::env::args().skip(1), &mut stdout.lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

/// Evaluate every scope argument against the stack named by the first one
fn run(mut args: impl Iterator<Item = String>, out: &mut impl Write) -> Result<()> {
    let Some(config_path) = args.next() else {
        return Err(AuthzError::InvalidConfig(USAGE.to_string()));
    };

    info!("scope-eval v{} loading {}", VERSION, config_path);

    let stack = StackConfig::from_path(&config_path)?.build();
    for scope in args {
        writeln!(out, "{}\t{}", scope, stack.evaluate(scope.as_str()).as_str())?;
    }

    Ok(())
}
