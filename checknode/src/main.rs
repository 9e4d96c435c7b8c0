use anyhow::{anyhow, Result};
use clap::Parser;
use std::future::Future;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use checknode::config::{ChainSelector, ConfigManager};
use checknode::report;
use checknode::Orchestrator;
use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let env_filter = EnvFilter::from_default_env()
        .add_directive("checknode=info".parse()?)
        .add_directive("hyper=warn".parse()?)
        .add_directive("reqwest=warn".parse()?);

    // Logs go to stderr so stdout carries only the report
    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config_path = match cli.config {
        Some(path) => path,
        None => ConfigManager::default_path()?,
    };

    let config_manager = ConfigManager::new(&config_path).await?;
    let config = config_manager.get_current_config();

    let selector = ChainSelector::from_arg(cli.chain);
    let targets = config.targets(&selector)?;
    let requested: Vec<String> = targets.iter().map(|t| t.chain.clone()).collect();

    let orchestrator = Orchestrator::from_config(&config)?;
    let results = until_interrupted(orchestrator.run_all(targets), shutdown_signal()).await??;

    info!("{} of {} nodes checked", results.len(), requested.len());
    for chain in report::missing_chains(requested.iter().map(String::as_str), &results) {
        warn!("No result for {}; see errors above", chain);
    }

    if cli.json {
        println!("{}", report::render_json(&results)?);
    } else {
        print!("{}", report::TextReport(&results));
    }

    Ok(())
}

/// Resolve with `run`, or fail if `interrupt` fires first. Returning drops
/// the runtime, which drops every check task and with it every open tunnel.
async fn until_interrupted<T>(
    run: impl Future<Output = T>,
    interrupt: impl Future<Output = ()>,
) -> Result<T> {
    tokio::select! {
        value = run => Ok(value),
        _ = interrupt => {
            warn!("Interrupted, closing tunnels");
            Err(anyhow!("Interrupted before all nodes were checked"))
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
