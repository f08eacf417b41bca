use crate::forecast::{self, WeatherForecast};
use crate::logger::Logger;
use axum::extract::State;
use axum::http::Request;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{Local, Utc};
use std::future::Future;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{MakeSpan, TraceLayer};
use tracing::Span;

/// Application state injected into handlers.
#[derive(Clone, Debug)]
pub struct AppState {
    pub logger: Logger,
}

/// Build the router: one route plus the request-scope middleware.
///
/// Every request gets an `x-request-id` (generated when the client sent
/// none, echoed on the response) and is served inside a `request` span
/// carrying `request_id`, `method` and `path`, which is the ambient scope
/// for anything logged while handling it.
pub fn router(logger: Logger) -> Router {
    let state = AppState {
        logger: logger.for_source(module_path!()),
    };

    Router::new()
        .route("/weatherforecast", get(get_weather_forecast))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http().make_span_with(RequestSpan))
                .layer(PropagateRequestIdLayer::x_request_id()),
        )
}

/// `request` span factory for [`TraceLayer`].
#[derive(Clone, Copy, Debug, Default)]
pub struct RequestSpan;

impl<B> MakeSpan<B> for RequestSpan {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("unknown");
        tracing::info_span!(
            "request",
            request_id = %request_id,
            method = %request.method(),
            path = %request.uri().path()
        )
    }
}

/// `GET /weatherforecast`
pub async fn get_weather_forecast(State(state): State<AppState>) -> Json<Vec<WeatherForecast>> {
    state
        .logger
        .information("Tester requested weather at {Time}", &[Utc::now().into()]);
    Json(forecast::generate(Local::now(), &mut rand::thread_rng()))
}

/// Serve until `shutdown` resolves, then let in-flight requests finish.
pub async fn serve<F>(listener: TcpListener, logger: Logger, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr()?;
    tracing::info!(address = %addr, "HTTP server starting");
    axum::serve(listener, router(logger))
        .with_graceful_shutdown(shutdown)
        .await
}

/// Resolves on Ctrl-C, or SIGTERM on Unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
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
