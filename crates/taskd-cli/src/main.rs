//! taskd - task service with background auto-completion.

mod auth;
mod config;
mod error;
mod server;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use taskd_core::app::AppBuilder;
use taskd_core::domain::Caller;
use taskd_core::impls::{InMemoryTaskStore, InMemoryUserStore};
use taskd_core::ports::{Clock, IdGenerator, SystemClock, UlidGenerator};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::auth::JwtKeys;
use crate::config::{Cli, Command, ServeArgs, TokenArgs};
use crate::server::{AppState, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (before anything else)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskd=info,taskd_core=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    match Cli::parse().command {
        Command::Serve(args) => serve(args).await,
        Command::Token(args) => issue_token(args),
    }
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let store = InMemoryTaskStore::connect(&args.database_url, Arc::clone(&clock))
        .context("failed to connect to the task store")?;
    tracing::info!(store = store.name(), "connected to task store");

    let users = InMemoryUserStore::connect(&args.database_url, Arc::clone(&clock))
        .context("failed to connect to the user store")?;
    tracing::info!(store = users.name(), "connected to user store");

    let app = AppBuilder::new()
        .store(Arc::new(store))
        .users(Arc::new(users))
        .clock(clock)
        .auto_complete(args.auto_complete())
        .build()
        .context("invalid auto-completion settings")?;

    let completer = Arc::clone(&app.auto_completer).spawn();

    let state = AppState::new(
        app.service,
        app.users,
        JwtKeys::from_secret(&args.jwt_secret),
    );
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", args.host, args.port))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Starting server at http://{}", addr);

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    tracing::info!("HTTP server stopped, waiting for auto-completion to drain");
    completer.shutdown_and_join().await;

    served.context("server error")?;
    tracing::info!("Server exited gracefully");
    Ok(())
}

fn issue_token(args: TokenArgs) -> anyhow::Result<()> {
    let user_id = args
        .user
        .unwrap_or_else(|| UlidGenerator::new(SystemClock).generate_user_id());
    let caller = Caller {
        user_id,
        role: args.role.into(),
    };

    let token = JwtKeys::from_secret(&args.jwt_secret)
        .issue(&caller, Utc::now())
        .context("failed to sign token")?;

    println!("{token}");
    Ok(())
}

/// Resolves on SIGINT (Ctrl-C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl-C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
