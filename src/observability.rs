use std::net::SocketAddr;

// ── Refresh runs ────────────────────────────────────────────────

/// Counter: refresh runs. Labels: command, status.
pub const REFRESH_TOTAL: &str = "hopecal_refresh_total";

/// Histogram: refresh duration in seconds. Labels: command.
pub const REFRESH_DURATION_SECONDS: &str = "hopecal_refresh_duration_seconds";

// ── Pipeline volume ─────────────────────────────────────────────

/// Counter: events parsed from the event list.
pub const EVENTS_LOADED_TOTAL: &str = "hopecal_events_loaded_total";

/// Gauge: schedules held by the most recent index.
pub const SCHEDULES_INDEXED: &str = "hopecal_schedules_indexed";

/// Counter: conflicting schedule pairs found.
pub const CONFLICT_PAIRS_TOTAL: &str = "hopecal_conflict_pairs_total";

/// Counter: calendar cells produced by the renderer.
pub const CELLS_RENDERED_TOTAL: &str = "hopecal_cells_rendered_total";

/// Counter: cells sent to the grid store. Labels: sheet.
pub const CELLS_WRITTEN_TOTAL: &str = "hopecal_cells_written_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    match metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
    {
        Ok(()) => tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics"),
        Err(e) => tracing::warn!("failed to install Prometheus metrics exporter: {e}"),
    }
}

/// Outcome label for [`REFRESH_TOTAL`].
pub fn status_label<T, E>(result: &Result<T, E>) -> &'static str {
    if result.is_ok() { "ok" } else { "error" }
}
