mod action;
mod app;
mod app_state;
mod component;
mod components;
mod gallery;
mod refresh;
mod scheduler;
mod session;
mod theme;
mod widgets;

use anyhow::Context;

use sort_proto::client::BackendClient;
use sort_proto::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = sort_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)
        .with_context(|| format!("creating {}", data_dir.display()))?;

    let log_path = data_dir.join("smartsort.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("opening {}", log_path.display()))?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals (hyper_util, reqwest).
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("smartsort log: {}", log_path.display());

    tracing::info!("smartsort starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(
                "config {} unreadable, using defaults: {}",
                Config::config_path().display(),
                e
            );
            Config::default()
        }
    };
    tracing::info!(
        "backend {} (timeout {:?})",
        config.backend.base_url,
        config.backend.request_timeout()
    );

    let client = BackendClient::new(
        config.backend.base_url.clone(),
        config.backend.request_timeout(),
    )?;

    // ── Run TUI ──────────────────────────────────────────────────────────────
    app::App::new(config, client).run().await?;

    Ok(())
}
