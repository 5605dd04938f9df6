use std::{process, sync::Arc};

use todo_server::{
    app_state::AppState,
    data_access::{data_context::DataContext, task_repository::TaskRepository, task_store::TaskStore},
    map_routes,
    reporting::error_reporter::{ErrorReporter, FailureReport},
    settings::Settings,
};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // ── Configuration ──────────────────────────────────────────
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(error) => {
            tracing::error!(%error, "configuration error");
            process::exit(1);
        }
    };

    let reporter = match ErrorReporter::from_settings(settings.error_reporting_dsn.as_deref()) {
        Ok(reporter) => reporter,
        Err(error) => {
            tracing::error!(%error, "invalid error reporting DSN");
            process::exit(1);
        }
    };
    if let Some(endpoint) = reporter.store_url() {
        tracing::info!(%endpoint, "error reporting enabled");
    }

    // ── Storage ────────────────────────────────────────────────
    let connected = DataContext::open(&settings.database_uri, &settings.database_name)
        .and_then(|context| context.ping().map(|()| context));
    let data_context = match connected {
        Ok(context) => context,
        Err(error) => {
            // No database, no app.
            tracing::error!(%error, database = %settings.database_uri, "database connection error");
            reporter
                .send(&FailureReport::new(format!("database connection error: {error}")))
                .await;
            process::exit(1);
        }
    };
    tracing::info!(
        database = %settings.database_uri,
        collection = %settings.database_name,
        "connected to database"
    );

    // ── Shared state ───────────────────────────────────────────
    let state = Arc::new(AppState {
        tasks: TaskRepository::new(Arc::new(data_context)),
        reporter,
    });

    let app = map_routes(state, &settings.static_dir);

    // ── Start ──────────────────────────────────────────────────
    let address = settings.listen_address();
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, %address, "cannot bind listener");
            process::exit(1);
        }
    };
    tracing::info!("server running on http://{address}");

    if let Err(error) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "server error");
        process::exit(1);
    }
    tracing::info!("server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::warn!(%error, "cannot listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(error) => {
                tracing::warn!(%error, "cannot listen for SIGTERM");
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
    tracing::info!("shutdown signal received");
}
