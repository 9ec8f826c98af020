//! Prometheus metrics collection and exposition endpoint.

use std::sync::OnceLock;

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
    core::Collector,
};
use salvo::{
    Request, Response, handler,
    http::{
        StatusCode,
        header::{CONTENT_TYPE, HeaderValue},
    },
};
use stocksync_app::domain::{movements::MovementKind, stock::StockAlert};
use tracing::error;

#[derive(Debug)]
struct AppMetrics {
    registry: Registry,
    requests_total: IntCounterVec,
    request_duration_seconds: HistogramVec,
    requests_in_flight: IntGauge,
    movements_total: IntCounterVec,
    alerts_total: IntCounterVec,
    ws_connections: IntGauge,
}

static APP_METRICS: OnceLock<Option<AppMetrics>> = OnceLock::new();

/// Tracks one value of an up/down gauge for as long as it lives.
#[derive(Debug)]
pub(crate) struct GaugeGuard {
    gauge: Option<&'static IntGauge>,
}

impl GaugeGuard {
    fn track(gauge: Option<&'static IntGauge>) -> Self {
        if let Some(gauge) = gauge {
            gauge.inc();
        }

        Self { gauge }
    }
}

impl Drop for GaugeGuard {
    fn drop(&mut self) {
        if let Some(gauge) = self.gauge {
            gauge.dec();
        }
    }
}

/// Count an in-flight request until the guard drops.
pub(super) fn track_in_flight_request() -> GaugeGuard {
    GaugeGuard::track(metrics().map(|metrics| &metrics.requests_in_flight))
}

/// Count an open WebSocket connection until the guard drops.
pub(crate) fn track_ws_connection() -> GaugeGuard {
    GaugeGuard::track(metrics().map(|metrics| &metrics.ws_connections))
}

pub(super) fn observe_request(method: &str, route: &str, status_code: u16, duration_seconds: f64) {
    let Some(metrics) = metrics() else {
        return;
    };

    let status_class = status_class(status_code);
    let status_code = status_code.to_string();

    metrics
        .requests_total
        .with_label_values(&[method, route, status_class, status_code.as_str()])
        .inc();

    metrics
        .request_duration_seconds
        .with_label_values(&[method, route])
        .observe(duration_seconds);
}

/// Count a committed stock movement and the alert it raised.
pub(crate) fn observe_movement(kind: MovementKind, alert: Option<StockAlert>) {
    let Some(metrics) = metrics() else {
        return;
    };

    metrics
        .movements_total
        .with_label_values(&[kind.as_str()])
        .inc();

    if let Some(alert) = alert {
        metrics
            .alerts_total
            .with_label_values(&[alert.as_str()])
            .inc();
    }
}

#[handler]
pub(crate) async fn metrics_handler(_req: &mut Request, res: &mut Response) {
    let Some(metrics) = metrics() else {
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);
        return;
    };

    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();

    let mut encoded = Vec::new();

    if let Err(source) = encoder.encode(&metric_families, &mut encoded) {
        error!("failed to encode metrics response: {source}");
        res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

        return;
    }

    let content_type = match HeaderValue::from_str(encoder.format_type()) {
        Ok(value) => value,
        Err(source) => {
            error!("failed to encode metrics content type header: {source}");
            res.status_code(StatusCode::INTERNAL_SERVER_ERROR);

            return;
        }
    };

    res.headers_mut().insert(CONTENT_TYPE, content_type);
    res.render(String::from_utf8_lossy(&encoded).into_owned());
}

fn metrics() -> Option<&'static AppMetrics> {
    APP_METRICS.get_or_init(build_metrics).as_ref()
}

fn register<M>(registry: &Registry, name: &str, metric: prometheus::Result<M>) -> Option<M>
where
    M: Collector + Clone + 'static,
{
    let metric = match metric {
        Ok(metric) => metric,
        Err(source) => {
            error!("failed to create {name} metric: {source}");
            return None;
        }
    };

    if let Err(source) = registry.register(Box::new(metric.clone())) {
        error!("failed to register {name} metric: {source}");
        return None;
    }

    Some(metric)
}

fn build_metrics() -> Option<AppMetrics> {
    let registry = Registry::new();

    let requests_total = register(
        &registry,
        "requests_total",
        IntCounterVec::new(
            Opts::new(
                "stocksync_http_requests_total",
                "Total HTTP requests partitioned by method, route, status class, and status code.",
            ),
            &["method", "route", "status_class", "status_code"],
        ),
    )?;

    let request_duration_seconds = register(
        &registry,
        "request_duration",
        HistogramVec::new(
            HistogramOpts::new(
                "stocksync_http_request_duration_seconds",
                "HTTP request duration in seconds partitioned by method and route.",
            )
            .buckets(vec![
                0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
            ]),
            &["method", "route"],
        ),
    )?;

    let requests_in_flight = register(
        &registry,
        "requests_in_flight",
        IntGauge::with_opts(Opts::new(
            "stocksync_http_requests_in_flight",
            "Current number of in-flight HTTP requests.",
        )),
    )?;

    let movements_total = register(
        &registry,
        "movements_total",
        IntCounterVec::new(
            Opts::new(
                "stocksync_stock_movements_total",
                "Committed stock movements partitioned by kind.",
            ),
            &["kind"],
        ),
    )?;

    let alerts_total = register(
        &registry,
        "alerts_total",
        IntCounterVec::new(
            Opts::new(
                "stocksync_stock_alerts_total",
                "Stock alerts raised by movements, partitioned by alert.",
            ),
            &["alert"],
        ),
    )?;

    let ws_connections = register(
        &registry,
        "ws_connections",
        IntGauge::with_opts(Opts::new(
            "stocksync_ws_connections",
            "Currently open WebSocket connections.",
        )),
    )?;

    Some(AppMetrics {
        registry,
        requests_total,
        request_duration_seconds,
        requests_in_flight,
        movements_total,
        alerts_total,
        ws_connections,
    })
}

fn status_class(status_code: u16) -> &'static str {
    match status_code {
        100..=199 => "1xx",
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}
