use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use ticket_guard::config::Args;
use ticket_guard::state::AppState;
use ticket_guard::sweeper::sweeper;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // parse cli arguments
    let args = Args::parse();
    let state = Arc::new(AppState::from_args(&args)?);

    // background sweeper for expired windows
    tokio::spawn(sweeper(Arc::clone(&state.limiter), args.sweep_every()));

    let app = ticket_guard::app(state);

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(port = args.port, "ticket-guard listening");
    tracing::info!(
        default_limit = args.rate_limit,
        default_window_secs = args.rate_window,
        purchase_limit = args.purchase_limit,
        purchase_window_secs = args.purchase_window,
        bot_threshold = args.bot_threshold,
        "rate limit presets loaded"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}
