use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sheets_submission_service::{create_app, AppConfig, AppState, GoogleSheetsClient};

#[tokio::main]
async fn main() {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Missing or invalid configuration: {}. Check your .env file.", e);
            std::process::exit(1);
        }
    };

    #[cfg(feature = "sentry-monitoring")]
    let _sentry_guard = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        info!("Sentry error tracking enabled");
        sentry::init((
            dsn,
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    info!(
        "Appending submissions to range '{}' of spreadsheet {}",
        config.target.range(),
        config.target.spreadsheet_id
    );
    info!(
        "Form columns: {:?}, required: {:?}",
        config.form.columns, config.form.required
    );

    if config.form.required.is_empty() {
        info!("No required fields configured - presence validation disabled");
    }

    if config.cache_credentials {
        info!("Access tokens will be cached until shortly before expiry");
    } else {
        info!("A fresh access token will be requested for every submission");
    }

    // Create shared application state
    let app_state = Arc::new(AppState {
        sheets: Arc::new(GoogleSheetsClient::from_config(&config)),
        form: config.form.clone(),
        success_message: config.success_message.clone(),
    });

    let app = create_app(app_state, config.request_timeout);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Set up signal handler for graceful shutdown
    let shutdown = async {
        let ctrl_c = async {
            tokio::signal::ctrl_c()
                .await
                .expect("Failed to install Ctrl+C handler");
        };

        #[cfg(unix)]
        let terminate = async {
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .expect("Failed to install SIGTERM handler")
                .recv()
                .await;
        };

        #[cfg(not(unix))]
        let terminate = std::future::pending::<()>();

        tokio::select! {
            _ = ctrl_c => {
                info!("Received interrupt signal, starting graceful shutdown");
            },
            _ = terminate => {
                info!("Received terminate signal, starting graceful shutdown");
            },
        }
    };

    info!("Server is ready to accept connections");
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
    {
        error!("Server error: {}", e);
        std::process::exit(1);
    }

    info!("Server has been gracefully shut down");
}
