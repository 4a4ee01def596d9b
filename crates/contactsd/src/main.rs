// # contactsd - Contact Sync Daemon
//
// This daemon is a THIN integration layer:
// - DO NOT add reconciliation logic here (it lives in contacts-core)
// - DO NOT add HTTP logic here (it lives in contacts-remote-http)
// - Configuration is via environment variables ONLY
//
// The contactsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Opening the local contact store
// 3. Running a sync pass at startup and on every SIGHUP
// 4. Flushing the store on shutdown
//
// ## Configuration
//
// ### Sync (leave any of these empty to disable sync)
// - `CONTACTS_SYNC_SERVER`: Base URL of the contact service
// - `CONTACTS_SYNC_USERNAME`: Basic Auth username
// - `CONTACTS_SYNC_PASSWORD`: Basic Auth password
//
// ### Local Store
// - `CONTACTS_STORE_TYPE`: Type of store (sqlite, memory). Default: sqlite
// - `CONTACTS_STORE_PATH`: Path to the database file. Default: contactBase.db
//
// ### Daemon
// - `CONTACTS_ONESHOT`: Run a single pass and exit (true/false)
// - `CONTACTS_LOG_LEVEL`: trace, debug, info, warn, error. Default: info
//
// ## Example
//
// ```bash
// export CONTACTS_SYNC_SERVER=https://contacts.example.com
// export CONTACTS_SYNC_USERNAME=alice
// export CONTACTS_SYNC_PASSWORD=your_password
// export CONTACTS_STORE_PATH=/var/lib/contacts/contactBase.db
//
// contactsd
// # later: kill -HUP $(pidof contactsd) to sync again
// ```

use anyhow::Result;
use contacts_core::{
    ContactsConfig, EngineConfig, RemoteClientFactory, StoreConfig, SyncConfig, SyncEngine,
    SyncOutcome,
};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Default database file, relative to the working directory
const DEFAULT_STORE_PATH: &str = "contactBase.db";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum ContactsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<ContactsExitCode> for ExitCode {
    fn from(code: ContactsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    sync: SyncConfig,
    store_type: String,
    store_path: String,
    oneshot: bool,
    log_level: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).unwrap_or_default();

        Self {
            sync: SyncConfig::new(
                var("CONTACTS_SYNC_SERVER"),
                var("CONTACTS_SYNC_USERNAME"),
                // Passwords may legitimately carry surrounding spaces
                lookup("CONTACTS_SYNC_PASSWORD").unwrap_or_default(),
            ),
            store_type: lookup("CONTACTS_STORE_TYPE").unwrap_or_else(|| "sqlite".to_string()),
            store_path: lookup("CONTACTS_STORE_PATH")
                .unwrap_or_else(|| DEFAULT_STORE_PATH.to_string()),
            oneshot: matches!(
                var("CONTACTS_ONESHOT").to_lowercase().as_str(),
                "1" | "true" | "yes"
            ),
            log_level: lookup("CONTACTS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        let server = &self.sync.server_base_url;
        if !server.is_empty() && !server.starts_with("https://") && !server.starts_with("http://")
        {
            anyhow::bail!(
                "CONTACTS_SYNC_SERVER must use HTTP or HTTPS scheme. Got: {}",
                server
            );
        }

        if server.starts_with("http://") {
            eprintln!(
                "WARNING: CONTACTS_SYNC_SERVER uses HTTP (not HTTPS). \
                 Credentials will be sent in clear text."
            );
        }

        if let Some(parent) = std::path::Path::new(&self.store_path).parent()
            && self.store_type == "sqlite"
            && !parent.as_os_str().is_empty()
            && parent.is_file()
        {
            anyhow::bail!(
                "CONTACTS_STORE_PATH parent is a file, not a directory: {}",
                parent.display()
            );
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "CONTACTS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.contacts_config()?.validate()?;

        Ok(())
    }

    /// Build the library configuration
    fn contacts_config(&self) -> Result<ContactsConfig> {
        let store = match self.store_type.as_str() {
            "sqlite" => StoreConfig::Sqlite {
                path: self.store_path.clone(),
            },
            "memory" => StoreConfig::Memory,
            _ => anyhow::bail!(
                "CONTACTS_STORE_TYPE '{}' is not supported. \
                Supported types: sqlite, memory",
                self.store_type
            ),
        };

        Ok(ContactsConfig {
            sync: self.sync.clone(),
            store,
            engine: EngineConfig::default(),
        })
    }

    fn log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn main() -> ExitCode {
    let config = Config::from_env();

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {}", e);
        return ContactsExitCode::ConfigError.into();
    }

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return ContactsExitCode::ConfigError.into();
    }

    info!("Starting contactsd daemon");

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return ContactsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run_daemon(config).await {
            error!("Daemon error: {}", e);
            ContactsExitCode::RuntimeError
        } else {
            ContactsExitCode::CleanShutdown
        }
    });

    result.into()
}

#[cfg(feature = "http")]
fn remote_factory() -> Result<Arc<dyn RemoteClientFactory>> {
    Ok(Arc::new(contacts_remote_http::HttpRemoteFactory::new()))
}

#[cfg(not(feature = "http"))]
fn remote_factory() -> Result<Arc<dyn RemoteClientFactory>> {
    anyhow::bail!("contactsd was built without a remote client (enable the `http` feature)")
}

/// Run the daemon
async fn run_daemon(config: Config) -> Result<()> {
    let contacts_config = config.contacts_config()?;

    info!("Store type: {}", contacts_config.store.type_name());
    if !config.sync.is_complete() {
        warn!("Sync is not configured; passes will be skipped");
    }

    let store = contacts_core::store::open(&contacts_config.store)?;
    let (engine, mut events) =
        SyncEngine::new(store.clone(), remote_factory()?, contacts_config.engine)?;

    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Sync event: {:?}", event);
        }
    });

    let startup = engine.run_sync(&config.sync).await;
    log_outcome(&startup);
    if config.oneshot {
        store.flush().await?;
        startup?;
        return Ok(());
    }

    info!("Ready; send SIGHUP to sync again");
    serve(&engine, &config.sync).await?;

    info!("Shutting down daemon");
    store.flush().await?;
    Ok(())
}

/// Trigger passes on SIGHUP until SIGTERM or SIGINT
#[cfg(unix)]
async fn serve(engine: &SyncEngine, sync: &SyncConfig) -> Result<()> {
    let mut sighup = signal(SignalKind::hangup())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGHUP handler: {}", e))?;
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    loop {
        tokio::select! {
            _ = sighup.recv() => {
                info!("Received SIGHUP, starting sync pass");
                let handle = engine.trigger(sync.clone());
                tokio::spawn(async move { log_outcome(&handle.wait().await) });
            }
            _ = sigterm.recv() => {
                info!("Received shutdown signal: SIGTERM");
                return Ok(());
            }
            _ = sigint.recv() => {
                info!("Received shutdown signal: SIGINT");
                return Ok(());
            }
        }
    }
}

/// Wait for CTRL-C
///
/// Fallback implementation for non-Unix platforms: only the startup pass runs.
#[cfg(not(unix))]
async fn serve(_engine: &SyncEngine, _sync: &SyncConfig) -> Result<()> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    info!("Received shutdown signal: SIGINT");
    Ok(())
}

fn log_outcome(outcome: &contacts_core::Result<SyncOutcome>) {
    match outcome {
        Ok(SyncOutcome::Completed(report)) => info!(
            "Sync complete: {} pushed, {} failed, {} pulled",
            report.pushed, report.push_failed, report.pulled
        ),
        Ok(SyncOutcome::NotConfigured) => debug!("Sync skipped: not configured"),
        Ok(SyncOutcome::AlreadyRunning) => info!("Sync skipped: a pass is already running"),
        Ok(SyncOutcome::RemoteUnavailable { error }) => {
            warn!("Sync skipped: remote unavailable: {}", error)
        }
        Err(e) => error!("Sync failed: {}", e),
    }
}
