use anyhow::Context;
use relay_engine::{RelayHandle, TelegraphClient, TelegraphEndpoints};
use relay_logging::{parse_level, relay_error, relay_info, relay_warn};
use tokio_util::sync::CancellationToken;

use super::logging::{self, LogDestination};
use super::settings::{Secrets, Settings, LOG_LEVEL_ENV};

fn log_level() -> log::LevelFilter {
    parse_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref())
}

/// Runs the bot until Ctrl-C (or SIGTERM on unix), then waits for in-flight
/// runs to finish.
pub async fn run_bot(settings: Settings) -> anyhow::Result<()> {
    logging::initialize(LogDestination::Both(&settings.log_dir), log_level());

    let secrets = Secrets::from_env()?;
    let relay = RelayHandle::new(settings.engine_config(secrets))
        .context("failed to initialize relay")?;
    relay_info!(
        "telegraph-relay {} starting (work dir {:?})",
        env!("CARGO_PKG_VERSION"),
        settings.work_dir
    );

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        let reason = wait_for_shutdown().await;
        relay_info!("Received {}, shutting down", reason);
        trigger.cancel();
    });

    relay.run(shutdown).await.context("relay stopped")?;
    relay_info!("Shutdown complete");
    Ok(())
}

/// Registers a Telegraph account and prints its access token to stdout.
pub async fn create_token(
    settings: &Settings,
    short_name: &str,
    author_name: &str,
    author_url: Option<&str>,
) -> anyhow::Result<()> {
    logging::initialize(LogDestination::Terminal, log_level());

    let client = settings
        .http()
        .build_client()
        .context("failed to build http client")?;
    let endpoints = TelegraphEndpoints {
        upload_origin: settings.telegraph_upload_origin.clone(),
        api_base: settings.telegraph_api_base.clone(),
    };
    let account =
        TelegraphClient::create_account(&client, &endpoints, short_name, author_name, author_url)
            .await
            .context("createAccount failed")?;

    relay_info!("Created Telegraph account {}", account.short_name);
    println!("TELEGRAPH_ACCESS_TOKEN={}", account.access_token);
    Ok(())
}

#[cfg(unix)]
async fn wait_for_shutdown() -> &'static str {
    use tokio::signal::unix::{signal, SignalKind};

    match signal(SignalKind::terminate()) {
        Ok(mut sigterm) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => "ctrl-c",
                _ = sigterm.recv() => "SIGTERM",
            }
        }
        Err(err) => {
            relay_warn!("Failed to install SIGTERM handler: {}; using Ctrl-C only", err);
            ctrl_c().await
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_shutdown() -> &'static str {
    ctrl_c().await
}

async fn ctrl_c() -> &'static str {
    match tokio::signal::ctrl_c().await {
        Ok(()) => "ctrl-c",
        Err(err) => {
            relay_error!("Failed to install Ctrl-C handler: {}", err);
            // Without a handler the process runs until killed.
            std::future::pending().await
        }
    }
}
