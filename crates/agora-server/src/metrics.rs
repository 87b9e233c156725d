//! Prometheus metrics recorder and metric names.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::info;

/// Install the Prometheus recorder as the global `metrics` recorder.
///
/// Fails if another recorder is already installed.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    info!("prometheus metrics recorder installed");
    Ok(handle)
}

/// Render Prometheus text format from the installed recorder.
pub fn render(handle: &PrometheusHandle) -> String {
    handle.render()
}

/// Viewer connections opened (counter).
pub const WS_VIEWERS_TOTAL: &str = "ws_viewers_total";
/// Viewer disconnections (counter).
pub const WS_DISCONNECTIONS_TOTAL: &str = "ws_disconnections_total";
/// Connected viewers (gauge).
pub const WS_VIEWERS_ACTIVE: &str = "ws_viewers_active";
/// Viewer session length in seconds (histogram).
pub const WS_VIEWER_DURATION_SECONDS: &str = "ws_viewer_duration_seconds";
/// Frames a viewer queue rejected (counter).
pub const WS_BROADCAST_DROPS_TOTAL: &str = "ws_broadcast_drops_total";
/// Events fanned out to a non-empty room (counter, labels: kind).
pub const EVENTS_PUBLISHED_TOTAL: &str = "events_published_total";
/// Subscriptions refused at the viewer limit (counter).
pub const WS_REJECTED_TOTAL: &str = "ws_rejected_total";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_without_global_install() {
        let handle = PrometheusBuilder::new().build_recorder().handle();
        let output = render(&handle);
        assert!(output.is_empty() || output.contains('\n'));
    }

    #[test]
    fn metric_constants_are_snake_case() {
        let names = [
            WS_VIEWERS_TOTAL,
            WS_DISCONNECTIONS_TOTAL,
            WS_VIEWERS_ACTIVE,
            WS_VIEWER_DURATION_SECONDS,
            WS_BROADCAST_DROPS_TOTAL,
            EVENTS_PUBLISHED_TOTAL,
            WS_REJECTED_TOTAL,
        ];
        for name in names {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "metric name '{name}' must be snake_case"
            );
        }
    }
}
