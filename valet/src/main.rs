//! Valet agent entry point: interactive assistant loop and one-shot health check.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]

use std::ffi::OsString;
use std::io;

use clap::Parser;
use ortho_config::OrthoConfig;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use valet::config::StoreSettings;
use valet::domain::{Assistant, run_interactive};
use valet::outbound::relay::BedrockMessageRelay;

/// `valet` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "valet",
    about = "Personal assistant agent with tenant-scoped storage",
    version
)]
struct CliArgs {
    /// Run the connectivity health check and exit.
    #[arg(long = "health-check")]
    health_check: bool,
    /// Tenant identifier applied to every database session.
    #[arg(long = "tenant-id", value_name = "id", default_value = "customer-001")]
    tenant_id: String,
}

fn main() -> io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let args = CliArgs::parse();

    let relay = BedrockMessageRelay::from_env()
        .map_err(|error| io::Error::other(format!("initialise relay: {error}")))?;
    let assistant = Assistant::new(relay, args.tenant_id);

    if args.health_check {
        let store_settings = StoreSettings::load_from_iter([OsString::from("valet")])
            .map_err(|error| io::Error::other(format!("load store settings: {error}")))?;
        let stdout = io::stdout();
        let healthy = assistant.health_check(&store_settings, &mut stdout.lock())?;
        if !healthy {
            std::process::exit(1);
        }
        return Ok(());
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    run_interactive(&assistant, &mut stdin.lock(), &mut stdout.lock())
}
