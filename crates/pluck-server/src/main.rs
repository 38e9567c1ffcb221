//! # pluck
//!
//! Package file gateway: serves single files and directory listings straight
//! out of npm package tarballs.
//!
//! This is the binary entry point. It parses flags, layers configuration,
//! sets up logging and runs the server until Ctrl-C.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use camino::Utf8PathBuf;
use clap::Parser;
use pluck_config::{ConfigLayering, ConfigLoader, PluckToml};
use pluck_server::{serve, Gateway};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Serve files out of npm package tarballs over HTTP
#[derive(Parser, Debug)]
#[command(name = "pluck", version, about = "Package file gateway")]
pub struct Cli {
    /// Configuration file to use instead of ./pluck.toml
    #[arg(long, value_name = "PATH")]
    pub config: Option<Utf8PathBuf>,

    /// Address to listen on
    #[arg(long, value_name = "ADDR")]
    pub listen: Option<SocketAddr>,

    /// Upstream registry base URL
    #[arg(long, value_name = "URL")]
    pub registry: Option<String>,

    /// Upper bound on each upstream call, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Flags given on the command line, keyed as the config layering expects
    fn overrides(&self) -> HashMap<String, String> {
        let mut overrides = HashMap::new();
        if let Some(listen) = self.listen {
            overrides.insert("listen".to_string(), listen.to_string());
        }
        if let Some(registry) = &self.registry {
            overrides.insert("registry".to_string(), registry.clone());
        }
        if let Some(timeout_secs) = self.timeout_secs {
            overrides.insert("timeout-secs".to_string(), timeout_secs.to_string());
        }
        overrides
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    setup_panic_handler();

    info!("Starting pluck v{}", env!("CARGO_PKG_VERSION"));

    let rt = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;
    rt.block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli).await.context("Failed to load configuration")?;
    info!(
        "Registry {} (timeout {}s)",
        config.registry.url, config.registry.timeout_secs
    );

    let gateway = Arc::new(Gateway::new(&config)?);
    let listener = TcpListener::bind(config.server.listen)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen))?;

    serve(listener, gateway, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {}", e);
        }
    })
    .await?;

    Ok(())
}

async fn load_config(cli: &Cli) -> anyhow::Result<PluckToml> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let cwd = Utf8PathBuf::try_from(cwd).context("Current directory is not valid UTF-8")?;
    let loader = ConfigLoader::new(cwd);

    let mut layering = ConfigLayering::new();
    if let Some((table, source)) = loader.load_global_config().await? {
        layering = layering.with_file(table, source);
    }

    let project = match &cli.config {
        Some(path) => Some(loader.load_explicit_config(path).await?),
        None => loader.load_project_config().await?,
    };
    if let Some((table, source)) = project {
        layering = layering.with_file(table, source);
    }

    let config = layering
        .with_env(ConfigLayering::process_env())
        .with_cli(cli.overrides())
        .resolve()?;
    Ok(config)
}

fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let default_filter = [
        "pluck",
        "pluck_server",
        "pluck_config",
        "pluck_registry",
        "pluck_resolver",
        "pluck_archive",
        "pluck_content",
    ]
    .iter()
    .map(|target| format!("{}={}", target, level))
    .collect::<Vec<_>>()
    .join(",");

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .init();
}

fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!("pluck encountered an unexpected error: {}", panic_info);
        eprintln!("pluck crashed! This is a bug.");
        eprintln!("Please report this at: https://github.com/pluck-cdn/pluck/issues");
        eprintln!("Error: {}", panic_info);
    }));
}
