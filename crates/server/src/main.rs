//! Marquee server entry point.
//!
//! `marquee` serves the site. Two provisioning commands manage the records
//! the site itself never creates:
//!
//! - `marquee create-user <username>` prints the new user's access token
//! - `marquee add-movie <name> <price> <image> [description]`

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use marquee_common::{Config, config::LogFormat};
use marquee_core::CreateMovieInput;
use marquee_web::{AppState, app};
use tokio::signal;
use tower_http::{
    compression::CompressionLayer, limit::RequestBodyLimitLayer, timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Form posts are small.
const BODY_LIMIT: usize = 64 * 1024;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "marquee=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

async fn serve(config: &Config, state: AppState) -> anyhow::Result<()> {
    let app = app(state, &config.media.root)
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http());

    let addr = config.bind_address();
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn provision(state: &AppState, command: &str, args: &[String]) -> anyhow::Result<()> {
    match (command, args) {
        ("create-user", [username]) => {
            let user = state.user_service.create(username).await?;
            println!("{}", user.token.unwrap_or_default());
        }
        ("add-movie", [name, price, image, rest @ ..]) => {
            let movie = state
                .movie_service
                .create(CreateMovieInput {
                    name: name.clone(),
                    price: price.parse().context("price must be a whole number")?,
                    image: image.clone(),
                    description: rest.join(" "),
                })
                .await?;
            println!("{}", movie.id);
        }
        _ => bail!(
            "usage: marquee [create-user <username> | add-movie <name> <price> <image> [description]]"
        ),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load()?;
    init_tracing(config.logging.format);

    info!("Starting marquee...");

    let db = marquee_db::init(&config).await?;
    info!("Connected to database");

    info!("Running database migrations...");
    marquee_db::migrate(&db).await?;
    info!("Migrations completed");

    let state = AppState::new(Arc::new(db))?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.split_first() {
        Some((command, rest)) => provision(&state, command, rest).await,
        None => serve(&config, state).await,
    }
}
