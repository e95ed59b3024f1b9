mod config;

use std::net::SocketAddr;
use std::time::Duration;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use shrimp_api::{AppStateInner, loops};
use shrimp_chat::ChatClient;

use crate::config::Config;

/// Expired rob cooldowns are swept this often.
const COOLDOWN_PRUNE_INTERVAL: Duration = Duration::from_secs(3600);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shrimp=debug,shrimp_api=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init database
    let db = shrimp_db::Database::open(&config.db_path)?;

    let chat = ChatClient::new(config.chat.clone());
    if !chat.is_authenticated() {
        warn!("SHRIMP_IRC_NICK/SHRIMP_IRC_TOKEN unset: reading chat anonymously, raffle results won't be announced");
    }

    let state = AppStateInner::new(db, chat, config.economy.clone());

    // Background tasks
    tokio::spawn(loops::run_reward_loop(
        state.clone(),
        config.channels.clone(),
        config.reward_interval,
    ));
    tokio::spawn(loops::run_cooldown_prune_loop(
        state.clone(),
        COOLDOWN_PRUNE_INTERVAL,
    ));
    if let Some(url) = config.keepalive_url.clone() {
        info!("Keepalive: pinging {} every {:?}", url, config.keepalive_interval);
        tokio::spawn(loops::run_keepalive_loop(url, config.keepalive_interval));
    }

    let app = shrimp_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Shrimp server listening on {}", addr);
    info!(
        "Rewarding {} every {:?}",
        config.channels.join(", "),
        config.reward_interval
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("SIGTERM handler unavailable: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
