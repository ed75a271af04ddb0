use anyhow::Context;
use clap::Parser;
use sigo_gateway_lib::settings::{DeploymentMode, Settings};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "sigo-gateway",
    version,
    about = "Same-origin gateway in front of the SIGO backend API"
)]
struct Args {
    /// TOML settings file (defaults to ./sigo-gateway.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. https://localhost:7241/api
    #[arg(long)]
    backend_url: Option<String>,

    /// Port to listen on
    #[arg(long)]
    port: Option<u16>,

    /// development | production
    #[arg(long, value_parser = parse_mode)]
    mode: Option<DeploymentMode>,
}

fn parse_mode(raw: &str) -> Result<DeploymentMode, String> {
    DeploymentMode::parse(raw).ok_or_else(|| format!("unknown mode `{raw}`"))
}

impl Args {
    fn apply(self, mut settings: Settings) -> Settings {
        if let Some(url) = self.backend_url {
            settings.backend_url = sigo_gateway_lib::settings::normalize_backend_url(&url);
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(mode) = self.mode {
            settings.mode = mode;
        }
        settings
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine; settings fall back to defaults.
    let _ = dotenvy::dotenv();

    let args = Args::parse();
    let settings = Settings::load(args.config.as_deref()).context("failed to load settings")?;
    let settings = args.apply(settings);

    sigo_gateway_lib::app::logging::init(&settings);

    sigo_gateway_lib::run(settings).await
}
