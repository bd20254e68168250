//! Prometheus counters for the generate endpoint.
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use wonder_core::WonderError;

use crate::orchestrator::GenerationRoute;

pub struct Metrics {
    registry: Registry,
    generate_requests: IntCounterVec,
    generate_failures: IntCounterVec,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let generate_requests = IntCounterVec::new(
            Opts::new("wonder_generate_requests_total", "Successful generate requests by route"),
            &["route"],
        )?;
        let generate_failures = IntCounterVec::new(
            Opts::new("wonder_generate_failures_total", "Failed generate requests by error kind"),
            &["kind"],
        )?;
        registry.register(Box::new(generate_requests.clone()))?;
        registry.register(Box::new(generate_failures.clone()))?;

        Ok(Self {
            registry,
            generate_requests,
            generate_failures,
        })
    }

    pub fn record_route(&self, route: GenerationRoute) {
        self.generate_requests
            .with_label_values(&[route.as_str()])
            .inc();
    }

    pub fn record_failure(&self, err: &WonderError) {
        self.generate_failures
            .with_label_values(&[error_kind(err)])
            .inc();
    }

    pub fn encode(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).to_string())
    }
}

fn error_kind(err: &WonderError) -> &'static str {
    match err {
        WonderError::Configuration(_) => "configuration",
        WonderError::Provider(_) => "provider",
        WonderError::Validation(_) => "validation",
        WonderError::NotFound(_) => "not_found",
        WonderError::Unauthorized(_) => "unauthorized",
        WonderError::Forbidden(_) => "forbidden",
        WonderError::Conflict(_) => "conflict",
        WonderError::Stage(_) => "stage",
        WonderError::Unsafe(_) => "unsafe",
        WonderError::Io(_) => "io",
    }
}
