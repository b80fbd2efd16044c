pub mod alerts;
pub mod error;
pub mod feed;
pub mod settings;
pub mod sync;

use std::path::PathBuf;
use std::sync::{Arc, Once};

use alerts::{BrowserNavigator, DesktopPlatform};
use feed::http::HttpFeedSource;
use settings::Settings;
use sync::{NotificationSyncEngine, SyncOptions};

/// Install ring as the process-wide rustls CryptoProvider (reqwest is built without one).
pub fn ensure_tls_provider() {
    static INSTALL: Once = Once::new();
    INSTALL.call_once(|| {
        if rustls::crypto::ring::default_provider()
            .install_default()
            .is_err()
        {
            tracing::debug!("A rustls CryptoProvider was already installed");
        }
    });
}

/// Get the app config directory.
fn get_app_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("com.scrumflow.notify")
}

/// Get the settings file path.
pub fn get_settings_path() -> PathBuf {
    get_app_config_dir().join("settings.json")
}

/// Run the notification daemon until Ctrl-C.
pub async fn run() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("scrumflow_notify=info")),
        )
        .init();

    tracing::info!("Starting ScrumFlow Notify v{}", env!("CARGO_PKG_VERSION"));
    ensure_tls_provider();

    let settings_path = get_settings_path();
    let settings = Settings::load(&settings_path);
    if !settings_path.exists() {
        // Write the defaults out so there is a file to edit.
        if let Err(e) = settings.save(&settings_path) {
            tracing::warn!("Failed to write default settings: {}", e);
        }
    }
    tracing::info!(
        "Polling {} every {}s",
        settings.api_base_url,
        settings.poll_interval().as_secs()
    );

    let engine = Arc::new(NotificationSyncEngine::new(
        HttpFeedSource::from_settings(&settings),
        Arc::new(DesktopPlatform::detect(settings.desktop_alerts)),
        Arc::new(BrowserNavigator::from_settings(&settings)),
        SyncOptions::from(&settings),
    ));

    if !engine.is_supported() {
        tracing::warn!("Desktop alerts are not supported here — polling without alerts");
    }
    let authorization = engine.request_authorization();
    tracing::info!("Desktop alerts: {}", authorization);

    let handle = engine.start();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");

    engine.stop();
    if let Some(handle) = handle {
        handle.await?;
    }

    let status = engine.status();
    tracing::info!(
        "Session summary: {} alerts shown, {} notifications seen, last poll {:?}",
        status.alerted_count,
        status.seen_count,
        status.last_poll_at
    );
    Ok(())
}
