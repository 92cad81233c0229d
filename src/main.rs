//! BETWATCH — bet detection client
//!
//! Entry point. Loads configuration, initialises structured logging,
//! launches the app against the configured backend, and runs one bet
//! detection session per request from stdin. Ctrl+C cancels a running
//! session; outside a session it quits.

use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use betwatch::backend::http::HttpBackend;
use betwatch::config::AppConfig;
use betwatch::engine::app::BettingApp;
use betwatch::host::ConsoleHost;

const BANNER: &str = r#"
 ___ ___ _______      ___ _____ ___ _  _
| _ ) __|_   _\ \    / /_\_   _/ __| || |
| _ \ _|  | |  \ \/\/ / _ \| || (__| __ |
|___/___| |_|   \_/\_/_/ \_\_| \___|_||_|

  Bet detection client v0.1.0
"#;

const HELP: &str = "Enter: place a bet | s: status | p: profile | h: history | q: quit";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (non-fatal if missing)
    let _ = dotenv::dotenv();

    let cfg = AppConfig::load_or_default("config.toml")?;

    init_logging();

    println!("{BANNER}");
    info!(
        base_url = %cfg.backend.base_url,
        interval_secs = cfg.session.poll_interval_secs,
        max_attempts = cfg.session.max_attempts,
        "BETWATCH starting up"
    );

    let backend = HttpBackend::new(&cfg.backend.base_url, cfg.backend.request_timeout())?;
    let mut app = BettingApp::new(Arc::new(backend), Arc::new(ConsoleHost), cfg.poll_policy());

    app.launch().await;
    app.load_profile().await;
    app.load_history().await;
    print!("{}", app.screen().render());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        println!("{HELP}");

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received.");
                break;
            }
        };

        let Some(line) = line else {
            break;
        };

        match line.trim() {
            "q" | "quit" => break,
            "s" | "status" => app.refresh_status().await,
            "p" | "profile" => app.load_profile().await,
            "h" | "history" => app.load_history().await,
            _ => run_session(&mut app).await,
        }
        print!("{}", app.screen().render());
    }

    info!("BETWATCH shut down cleanly.");
    Ok(())
}

/// Run one detection session; Ctrl+C cancels it.
async fn run_session(app: &mut BettingApp) {
    let cancel = CancellationToken::new();
    let watcher = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        })
    };

    match app.place_bet(&cancel).await {
        Ok(report) => info!(%report, "Bet detection finished"),
        Err(e) => warn!(error = %e, "Could not start bet detection"),
    }

    watcher.abort();
}

/// Initialise the `tracing` subscriber.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("betwatch=info"));

    let json_logging = std::env::var("BETWATCH_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_thread_ids(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    }
}
