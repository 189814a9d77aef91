//! Observability configuration

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ObservabilityConfig {
    pub tracing: TracingConfig,
    pub metrics: MetricsConfig,
}

/// OpenTelemetry export settings; export is off unless `enabled`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    pub enabled: bool,
    /// OTLP gRPC endpoint (e.g., http://localhost:4317)
    pub otlp_endpoint: String,
    pub service_name: String,
    /// Fraction of traces kept, clamped to 0.0..=1.0
    pub sampling_ratio: f64,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            otlp_endpoint: "http://localhost:4317".to_string(),
            service_name: env!("CARGO_PKG_NAME").to_string(),
            sampling_ratio: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
    pub path: String,
}

impl MetricsConfig {
    /// Endpoint path with exactly one leading slash
    ///
    /// Values from the environment often come without it, and axum refuses
    /// to register such a route.
    pub fn route(&self) -> String {
        let trimmed = self.path.trim().trim_start_matches('/');
        if trimmed.is_empty() {
            "/metrics".to_string()
        } else {
            format!("/{}", trimmed)
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/metrics".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ObservabilityConfig::default();

        assert!(!config.tracing.enabled);
        assert_eq!(config.tracing.service_name, "security-admin");
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.route(), "/metrics");
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config: ObservabilityConfig =
            serde_json::from_str(r#"{"tracing": {"enabled": true}, "metrics": {}}"#).unwrap();

        assert!(config.tracing.enabled);
        assert_eq!(config.tracing.sampling_ratio, 1.0);
        assert_eq!(config.metrics.path, "/metrics");
    }

    #[test]
    fn test_metrics_route_normalization() {
        let route = |path: &str| {
            MetricsConfig {
                enabled: true,
                path: path.to_string(),
            }
            .route()
        };

        assert_eq!(route("prometheus"), "/prometheus");
        assert_eq!(route("//internal/metrics"), "/internal/metrics");
        assert_eq!(route("  "), "/metrics");
    }
}
