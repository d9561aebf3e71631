use std::net::SocketAddr;

use anyhow::Context;
use axum::{
    http::{header, HeaderValue, Method, StatusCode, Uri},
    routing::get,
    Json, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, news};

pub const WELCOME: &str = "Welcome to Iwo Website Api version 1.0";

pub fn build_app(state: AppState) -> anyhow::Result<Router> {
    let origin = state
        .config
        .client_origin
        .parse::<HeaderValue>()
        .with_context(|| format!("invalid CLIENT_DOMAIN {}", state.config.client_origin))?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Ok(Router::new()
        .route("/", get(|| async { WELCOME }))
        .route("/health", get(|| async { "ok" }))
        .merge(auth::router())
        .merge(news::router())
        .fallback(not_an_endpoint)
        .method_not_allowed_fallback(not_an_endpoint)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        ))
}

async fn not_an_endpoint(method: Method, uri: Uri) -> (StatusCode, Json<String>) {
    (
        StatusCode::NOT_FOUND,
        Json(format!("{method} {uri} is not an endpoint on this server.")),
    )
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{host}:{port}").parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
