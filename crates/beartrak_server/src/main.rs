//! BearTrak search service binary.
//!
//! Usage:
//!   beartrak-server --port 8001 --database-url sqlite:///./beartrak_search_dev.db
//!
//! Every flag falls back to the environment variable of the same name.

use anyhow::{anyhow, Context, Result};
use beartrak_api::{build_router, AppState};
use beartrak_core::{
    init_logging, sample_records, seed_database, AppConfig, ConfigOverrides, Database,
    TransportOptions,
};
use clap::Parser;
use log::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "beartrak-server")]
#[command(about = "BearTrak RFP search API")]
struct Args {
    /// Deployment environment (development|production)
    #[arg(long, env = "ENVIRONMENT")]
    environment: Option<String>,

    /// SQLite URL or file path
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "HOST")]
    host: Option<String>,

    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Comma-separated allowed origins, `*` for any
    #[arg(long, env = "CORS_ORIGINS")]
    cors_origins: Option<String>,

    /// Verbose logging and SQL echo
    #[arg(long, env = "DEBUG")]
    debug: Option<String>,

    #[arg(long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for rolling log files
    #[arg(long, env = "LOG_DIR")]
    log_dir: Option<String>,

    #[arg(long, env = "EXPOSE_DESCRIPTION")]
    expose_description: Option<String>,

    #[arg(long, env = "SEED_SAMPLE_DATA")]
    seed_sample_data: Option<String>,

    #[arg(long, env = "REQUEST_TIMEOUT_SECS")]
    request_timeout_secs: Option<u64>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            environment: args.environment,
            database_url: args.database_url,
            host: args.host,
            port: args.port,
            cors_origins: args.cors_origins,
            debug: args.debug,
            log_level: args.log_level,
            log_dir: args.log_dir,
            expose_description: args.expose_description,
            seed_sample_data: args.seed_sample_data,
            request_timeout_secs: args.request_timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::resolve(Args::parse().into())?;
    init_logging(&config.log.level, config.log.log_dir.as_deref())
        .map_err(|err| anyhow!("failed to initialize logging: {err}"))?;

    let db = Database::open(&config.storage)
        .with_context(|| format!("failed to open database at {}", config.storage.location))?;
    let options = TransportOptions {
        expose_description: config.expose_description,
    };
    if config.seed_sample_data {
        let inserted =
            seed_database(&db, &sample_records()).context("failed to seed sample records")?;
        info!("event=seed_sample_data module=server status=ok inserted={inserted}");
    }

    let app = build_router(AppState::new(db, options), &config.server);
    let addr = config.server.socket_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(
        "event=server_start module=server status=ok environment={} addr={} database={}",
        config.environment.as_str(),
        addr,
        config.storage.location
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;
    info!("event=server_stop module=server status=ok");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!("event=signal_listen module=server status=error signal=ctrl_c error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!("event=signal_listen module=server status=error signal=sigterm error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("event=shutdown_signal module=server status=ok");
}
