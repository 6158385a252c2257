use anyhow::{bail, Context, Result};
use blink_core::action::resolve_action_url;
use blink_core::config::logging;
use blink_core::{
    ActionClient, ActionsRegistry, Blink, BlinkConfig, BlinkContext, DisconnectedWallet,
    ExecutionStatus, KeypairWallet, TracingEventSink, ViewOptions, WalletAdapter,
};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use solana_client::nonblocking::rpc_client::RpcClient;
use std::{collections::HashMap, path::PathBuf, sync::Arc};
use tracing::{info, subscriber, warn};
use tracing_subscriber::{prelude::*, EnvFilter, Registry};

mod keys;
mod renderer;

/// A command-line host for Solana Actions.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch an action and print its rendered view
    Inspect {
        /// Action URL, absolute or relative to BLINK_HOST_ORIGIN
        url: String,
        /// Print the view as JSON
        #[arg(long)]
        json: bool,
        /// Website to advertise instead of the action host
        #[arg(long)]
        website: Option<String>,
    },
    /// Classify an action URL against the actions registry
    Classify { url: String },
    /// Execute one component of an action with a local keypair
    Execute {
        url: String,
        /// Index of the component, as listed by `inspect`
        #[arg(long, default_value_t = 0)]
        component: usize,
        /// Input value as `name=value`, may be repeated
        #[arg(long = "param", value_parser = parse_param)]
        params: Vec<(String, String)>,
        /// Keypair file paying for and signing the transaction; defaults to
        /// SOLANA_PRIVATE_KEY, then ~/.config/solana/id.json
        #[arg(long)]
        keypair: Option<PathBuf>,
        /// Execute even if the registry flags the action as malicious
        #[arg(long)]
        ignore_warning: bool,
    },
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.trim().to_string(), value.to_string()))
        .filter(|(name, _)| !name.is_empty())
        .ok_or_else(|| format!("expected name=value, got {raw:?}"))
}

/// Installs the tracing subscriber; logs go to stderr so stdout stays clean.
fn init_tracing() -> Result<()> {
    let subscriber = Registry::default()
        .with(EnvFilter::new(logging::rust_log_filter()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    subscriber::set_global_default(subscriber)
        .context("Failed to set global default tracing subscriber")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();
    let config = BlinkConfig::from_env().context("Invalid configuration")?;
    info!(
        network = %config.network,
        rpc_url = %config.rpc_url,
        registry_url = %config.registry_url,
        "Starting blink-runner"
    );

    let client = ActionClient::new(config.http_timeout).context("Failed to build HTTP client")?;
    let registry = Arc::new(ActionsRegistry::from_url(
        client.http().clone(),
        config.registry_url.clone(),
    ));
    let rpc_client = Arc::new(RpcClient::new(config.rpc_url.clone()));

    let context = |wallet: Arc<dyn WalletAdapter>| {
        let ctx = BlinkContext::new(
            client.clone(),
            Arc::clone(&registry),
            wallet,
            rpc_client.clone(),
            Arc::new(TracingEventSink),
        )
        .with_confirm_options(config.confirm);
        match &config.host_origin {
            Some(origin) => ctx.with_host_origin(origin.clone()),
            None => ctx,
        }
    };

    match cli.command {
        Command::Classify { url } => {
            registry.initialize().await;
            let url = resolve_action_url(&url, config.host_origin.as_deref())?;
            println!("{url}: {}", registry.classify(&url));
        }

        Command::Inspect { url, json, website } => {
            let wallet: Arc<dyn WalletAdapter> = Arc::new(DisconnectedWallet);
            let blink = Blink::load(context(wallet), &url)
                .await
                .with_context(|| format!("Failed to load action {url}"))?;
            let view = blink.view(&ViewOptions {
                website_url: website,
                ..Default::default()
            });
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print!("{}", renderer::render_view(blink.url(), &view)?);
            }
        }

        Command::Execute {
            url,
            component,
            params,
            keypair,
            ignore_warning,
        } => {
            let keypair = keys::load_keypair(keypair.as_deref())?;
            let wallet: Arc<dyn WalletAdapter> =
                Arc::new(KeypairWallet::new(keypair, rpc_client.clone()));

            // Long executions keep seeing registry changes
            let refresher = config
                .registry_refresh
                .map(|period| registry.spawn_refresh(period));

            let mut blink = Blink::load(context(wallet), &url)
                .await
                .with_context(|| format!("Failed to load action {url}"))?;
            if blink.state().status == ExecutionStatus::Blocked {
                if !ignore_warning {
                    bail!(
                        "Refusing to execute {}: {} (pass --ignore-warning to proceed)",
                        blink.url(),
                        blink.trust()
                    );
                }
                warn!(url = %blink.url(), trust = %blink.trust(), "Executing blocked action");
                blink.unblock();
            }

            let params: HashMap<String, String> = params.into_iter().collect();
            let state = blink.invoke(component, &params).await?;
            println!("{}", renderer::render_outcome(state));
            let failed = state.status != ExecutionStatus::Success;

            if let Some(handle) = refresher {
                handle.abort();
            }
            if failed {
                bail!("Action did not complete");
            }
        }
    }

    Ok(())
}
