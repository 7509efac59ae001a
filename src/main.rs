mod api;
mod events;
mod gateway;

use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use events::EventBus;
use gateway::{Gateway, GatewaySettings};
use relay_channels::whatsapp::WhatsAppChannel;
use relay_core::{
    config::{self, RelayConfig},
    context::{Context, Turn},
    locale, shellexpand,
    traits::{Channel, ContextSource, Provider},
};
use relay_memory::{ConversationHistory, Store};
use relay_providers::{HttpContextSource, OpenAiProvider};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "relay",
    version,
    about = "WhatsApp to AI relay with transcript storage and a live dashboard feed"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to config file.
    #[arg(short, long, default_value = "config.toml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook and dashboard server.
    Start,
    /// Check configuration and transcript store.
    Status,
    /// Send a one-shot message to the completion provider.
    Ask {
        /// The message to send.
        #[arg(trailing_var_arg = true)]
        message: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is normal in production.
    let _ = dotenvy::dotenv();

    let mut cfg = config::load(&cli.config)?;
    cfg.apply_env(|key| std::env::var(key).ok());

    let _log_guard = init_tracing(&cfg.relay);

    match cli.command {
        Commands::Start => start(cfg).await?,
        Commands::Status => status(&cli.config, &cfg).await,
        Commands::Ask { message } => ask(&cfg, message).await?,
    }

    Ok(())
}

/// Console logging plus a daily-rolling file under `{data_dir}/logs`.
///
/// The returned guard flushes the file writer on drop.
fn init_tracing(relay: &RelayConfig) -> Option<WorkerGuard> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&relay.log_level));

    let log_dir = PathBuf::from(shellexpand(&relay.data_dir)).join("logs");
    let (file_layer, guard) = match std::fs::create_dir_all(&log_dir) {
        Ok(()) => {
            let appender = tracing_appender::rolling::daily(&log_dir, "relay.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        Err(e) => {
            eprintln!("file logging disabled ({}): {e}", log_dir.display());
            (None, None)
        }
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(file_layer)
        .init();

    guard
}

async fn start(cfg: config::Config) -> anyhow::Result<()> {
    cfg.validate()?;
    let settings = GatewaySettings::from_config(&cfg)?;

    let memory = Store::new(&cfg.memory)
        .await
        .context("failed to open conversation store")?;

    let provider = Arc::new(OpenAiProvider::from_config(&cfg.provider));
    if !provider.is_available().await {
        warn!(
            "provider '{}' did not answer the availability check; replies will fall back until it does",
            provider.name()
        );
    }

    let context_source = Arc::new(HttpContextSource::from_config(&cfg.context)?);
    if cfg.context.url.is_empty() {
        info!("no context source configured, prompts carry date and time only");
    }

    let channel = Arc::new(WhatsAppChannel::new(&cfg.whatsapp));
    let events = EventBus::default();

    info!(
        "{} starting | provider: {} ({}) | channel: {} | timezone: {}",
        cfg.relay.name,
        provider.name(),
        cfg.provider.model,
        channel.name(),
        settings.timezone,
    );

    let gateway = Arc::new(Gateway::new(
        provider,
        context_source,
        channel,
        Arc::new(events.clone()),
        memory,
        ConversationHistory::from_config(&cfg.memory),
        settings,
    ));

    let state = api::ApiState::new(gateway.clone(), events, cfg.whatsapp.verify_token.clone());
    let addr = format!("{}:{}", cfg.api.host, cfg.api.port);
    api::serve(&addr, state, shutdown_signal()).await?;

    let busy = gateway.busy_senders().await;
    if busy > 0 {
        warn!("shutting down with {busy} sender(s) still in flight");
    }
    gateway.memory().pool().close().await;

    info!("Shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        return;
    }
    info!("Received shutdown signal");
}

async fn status(config_path: &str, cfg: &config::Config) {
    println!("Relay status\n");
    println!("Config: {config_path}");
    println!("Model: {} @ {}", cfg.provider.model, cfg.provider.base_url);
    println!("WhatsApp endpoint: {}", cfg.whatsapp.messages_url());
    println!(
        "Context source: {}",
        if cfg.context.url.is_empty() {
            "not configured"
        } else {
            cfg.context.url.as_str()
        }
    );
    println!("Listen: {}:{}", cfg.api.host, cfg.api.port);
    println!();

    match cfg.validate() {
        Ok(()) => println!("  settings: complete"),
        Err(e) => println!("  settings: {e}"),
    }

    let db_path = shellexpand(&cfg.memory.db_path);
    if Path::new(&db_path).exists() {
        match Store::new(&cfg.memory).await {
            Ok(store) => match store.count_records().await {
                Ok(n) => println!("  store: {db_path} ({n} records)"),
                Err(e) => println!("  store: {db_path} (unreadable: {e})"),
            },
            Err(e) => println!("  store: {db_path} (failed to open: {e})"),
        }
    } else {
        println!("  store: {db_path} (not created yet)");
    }
}

async fn ask(cfg: &config::Config, message: Vec<String>) -> anyhow::Result<()> {
    if message.is_empty() {
        anyhow::bail!("no message provided. Usage: relay ask <message>");
    }
    if cfg.provider.api_key.is_empty() {
        anyhow::bail!("provider.api_key is not set (OPENAI_API_KEY)");
    }

    let prompt = message.join(" ");
    let tz = locale::parse_timezone(&cfg.locale.timezone)?;
    let provider = OpenAiProvider::from_config(&cfg.provider);
    let source = HttpContextSource::from_config(&cfg.context)?;

    let fetched = match source.fetch().await {
        Ok(ctx) => ctx,
        Err(e) => {
            warn!("context fetch failed, continuing without it: {e}");
            String::new()
        }
    };
    let now = Utc::now().with_timezone(&tz);
    let system = locale::system_context(&fetched, &now, &cfg.locale.location_label);

    let context = Context::new(system, vec![Turn::user(prompt)]);
    let response = provider.complete(&context).await?;
    println!("{response}");
    Ok(())
}
