//! # HTTP API
//!
//! axum router over the grade store and the fragility calculator.
//!
//! Store calls run on tokio's blocking pool; the fragility endpoints are
//! pure and run inline.

pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod types;

use crate::config::Config;
use axum::Router;
use axum::routing::{get, post, put};
use handlers::{analytics, fragility, students, system};
use raildb_core::GradeStore;
use rate_limit::SharedLimiter;
use std::num::NonZeroU32;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: GradeStore,
    pub limiter: SharedLimiter,
}

impl AppState {
    #[must_use]
    pub fn new(store: GradeStore, requests_per_second: NonZeroU32) -> Self {
        Self {
            store,
            limiter: rate_limit::limiter(requests_per_second),
        }
    }
}

/// Build the full router.
pub fn create_router(state: AppState) -> Router {
    let students = Router::new()
        .route(
            "/grades",
            get(students::list_grades).post(students::upsert_grade),
        )
        .route("/grades/{aem}", get(students::student_grades))
        .route(
            "/grades/{aem}/{test}/{year}",
            put(students::update_grade).delete(students::delete_grade),
        )
        .route("/stats", get(students::student_stats));

    let analytics = Router::new()
        .route("/summary", get(analytics::summary))
        .route("/test-stats", get(analytics::test_stats))
        .route("/yearly-stats", get(analytics::yearly_stats))
        .route("/grade-distribution", get(analytics::grade_distribution))
        .route("/top-students", get(analytics::top_students))
        .route("/perfect-scores", get(analytics::perfect_scores));

    let latex = Router::new()
        .route("/fragility/basic", get(fragility::basic))
        .route("/fragility/parameterized", get(fragility::parameterized))
        .route("/fragility/calculate", post(fragility::calculate_with_params))
        .route("/fragility/examples", get(fragility::examples))
        .route("/equations", get(fragility::equations));

    Router::new()
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .nest("/students", students)
        .nest("/analytics", analytics)
        .nest("/latex", latex)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods(Any)
                        .allow_headers(Any),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    rate_limit::rate_limit,
                )),
        )
        .with_state(state)
}

/// Bind and serve until Ctrl-C or SIGTERM.
pub async fn serve(config: &Config, store: GradeStore) -> std::io::Result<()> {
    let records = startup_record_count(&store);
    let state = AppState::new(store, config.rate_limit);
    let app = create_router(state);

    let listener = TcpListener::bind(config.bind_address()).await?;
    info!(
        address = %listener.local_addr()?,
        db = %config.db_path.display(),
        records = ?records,
        rate_limit = config.rate_limit.get(),
        "RailDB API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("RailDB API shut down");
    Ok(())
}

/// Record count for the startup log; a failing store is reported, not hidden.
fn startup_record_count(store: &GradeStore) -> Option<u64> {
    match store.count() {
        Ok(count) => Some(count),
        Err(e) => {
            warn!(error = %e, "Could not count stored records at startup");
            None
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl-C");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
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
        () = ctrl_c => info!("Received Ctrl-C, shutting down"),
        () = terminate => info!("Received SIGTERM, shutting down"),
    }
}
