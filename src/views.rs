use std::sync::Arc;

use axum::{routing::get, Extension, Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use serde::Serialize;
use tower_http::trace::{self, TraceLayer};
use tracing::Level;

use crate::config::Config;

#[derive(Serialize)]
struct Health {
    ok: bool,
    version: &'static str,
    expiry_hours: u64,
}

async fn health(Extension(config): Extension<Arc<Config>>) -> Json<Health> {
    Json(Health {
        ok: true,
        version: env!("CARGO_PKG_VERSION"),
        expiry_hours: config.expiry_hours,
    })
}

pub fn get_router(config: Arc<Config>) -> Router {
    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app_router = Router::new()
        .route("/", get(health))
        .layer(Extension(config))
        .layer(prometheus_layer);

    let metric_router =
        Router::new().route("/metrics", get(|| async move { metric_handle.render() }));

    app_router.merge(metric_router).layer(
        TraceLayer::new_for_http()
            .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
            .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
    )
}
