mod config;
mod explorer;
mod models;
mod proxy;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use explorer::{Explorer, ExplorerOptions, HttpExplorerApi};

/// GitHub Explorer — search GitHub users, browse their repositories and
/// recent commits through a small proxy service.
#[derive(Parser, Debug)]
#[command(name = "github-explorer", version, about)]
struct Cli {
    /// Config file (defaults to ./.github-explorer.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the proxy service in front of the GitHub API
    Serve {
        /// Address to listen on (overrides server.listen)
        #[arg(short, long)]
        listen: Option<String>,
    },

    /// Browse users interactively through a running proxy
    Browse {
        /// Proxy base URL (overrides client.proxy_url)
        #[arg(long)]
        proxy_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load(cli.config.as_deref())?;
    debug!(
        api_url = %config.github.api_url,
        token = config.github.token.is_some(),
        "configuration loaded"
    );

    match cli.command {
        Commands::Serve { listen } => {
            let listen = listen.unwrap_or_else(|| config.server.listen.clone());
            let _span = info_span!("serve", listen = %listen).entered();
            proxy::serve(&config, &listen).await?;
        }
        Commands::Browse { proxy_url } => {
            let proxy_url = proxy_url.unwrap_or_else(|| config.client.proxy_url.clone());
            info!(proxy_url = %proxy_url, "starting explorer");
            let api = HttpExplorerApi::new(&proxy_url)?;
            let explorer = Arc::new(Explorer::new(api, ExplorerOptions::from(&config.client)));
            explorer::shell::run(explorer).await?;
        }
    }

    Ok(())
}
