//! Prometheus metrics exporter
//!
//! Metrics are emitted where the events happen via the `metrics` macros;
//! this module only installs the exporter. Emitted series:
//!
//! * `router_messages_dispatched_total{kind}` - inbound messages matched to
//!   a pending request
//! * `router_messages_dropped_total{reason}` - inbound messages discarded
//!   (`unknown_caller`, `missing_key`, `unmatched_key`)
//! * `gateway_requests_total{route}` - requests accepted by the HTTP surface
//! * `gateway_requests_in_flight` - requests currently waiting on a reply
//! * `gateway_forward_failures_total{target}` - outbound posts that failed

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Install the Prometheus exporter on `port`; metrics are served at
/// `/metrics`.
///
/// # Errors
///
/// Fails if the address cannot be parsed or the exporter cannot bind.
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()?;

    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}
