//! Binary entrypoint: wires the backend client, session store, dispatcher,
//! and the Telegram polling loop together.

use std::sync::Arc;

use {
    clap::Parser,
    secrecy::{ExposeSecret, Secret},
    tokio_util::sync::CancellationToken,
    tracing::{error, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    bookline_api::HttpBookingApi,
    bookline_dispatch::Dispatcher,
    bookline_sessions::{ChatLocks, SessionStore},
    bookline_telegram::{BotHandler, TelegramOutbound, build_bot, run_polling},
};

#[derive(Parser)]
#[command(name = "bookline", about = "Bookline — Telegram booking bot")]
struct Cli {
    /// Telegram Bot API token.
    #[arg(long, env = "TELEGRAM_BOT_TOKEN", hide_env_values = true)]
    telegram_token: String,

    /// Base URL of the booking backend.
    #[arg(long, env = "API_BASE_URL", default_value = "http://localhost:8080")]
    api_base_url: String,

    /// Bearer token for the booking backend.
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    api_token: String,

    /// Number of dispatcher workers.
    #[arg(long, env = "WORKER_COUNT", default_value_t = 4)]
    workers: usize,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "bookline starting");

    let telegram_token = Secret::new(cli.telegram_token);
    let api_token = Secret::new(cli.api_token);

    let api = Arc::new(HttpBookingApi::new(&cli.api_base_url, api_token)?);
    let sessions = Arc::new(SessionStore::new());
    let locks = Arc::new(ChatLocks::new());

    let bot = build_bot(telegram_token.expose_secret())?;
    let outbound = Arc::new(TelegramOutbound::new(bot.clone()));
    let handler = Arc::new(BotHandler::new(outbound, api, Arc::clone(&sessions)));

    let dispatcher = Dispatcher::new(handler, locks, cli.workers);
    let queue = dispatcher.queue();
    let cancel = CancellationToken::new();

    let poller = tokio::spawn(run_polling(bot, queue, cancel.clone()));

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");

    // Stop intake first, then drain the pool so in-flight replies land.
    cancel.cancel();
    match poller.await {
        Ok(Ok(())) => {},
        Ok(Err(e)) => error!(error = %e, "polling loop exited with error"),
        Err(e) => error!(error = %e, "polling task failed"),
    }
    dispatcher.shutdown().await;

    info!("bookline stopped");
    Ok(())
}
