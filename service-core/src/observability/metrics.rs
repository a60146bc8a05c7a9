use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the process-wide Prometheus recorder and return a handle for
/// rendering `/metrics`.
///
/// Safe to call more than once: later calls get the first handle. If another
/// recorder already owns the global slot, a detached recorder is used and
/// its output will stay empty.
pub fn init_metrics() -> PrometheusHandle {
    HANDLE
        .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::warn!(error = %e, "Prometheus recorder not installed");
                PrometheusBuilder::new().build_recorder().handle()
            }
        })
        .clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_shares_one_registry() {
        let first = init_metrics();
        let second = init_metrics();

        metrics::counter!("observability_test_total").increment(3);

        let rendered = first.render();
        assert_eq!(rendered, second.render());
        assert!(rendered.contains("observability_test_total 3"));
    }
}
