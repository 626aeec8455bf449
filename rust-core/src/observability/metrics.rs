use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};
use std::sync::Arc;
use std::time::Duration;

const UNKNOWN_FUNCTION_LABEL: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationOutcome {
    Success,
    Error,
    Unknown,
}

impl InvocationOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvocationOutcome::Success => "success",
            InvocationOutcome::Error => "error",
            InvocationOutcome::Unknown => "unknown_function",
        }
    }
}

/// Prometheus metrics for tool dispatch.
#[derive(Clone)]
pub struct MetricsCollector {
    registry: Arc<Registry>,
    invocations: IntCounterVec,
    duration: HistogramVec,
    in_flight: IntGauge,
}

impl MetricsCollector {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let invocations = IntCounterVec::new(
            Opts::new("deck_agent_invocations_total", "Total number of tool invocations")
                .const_label("component", "dispatcher"),
            &["function", "outcome"],
        )?;

        let duration = HistogramVec::new(
            HistogramOpts::new(
                "deck_agent_invocation_duration_seconds",
                "Tool invocation duration in seconds",
            )
            .buckets(vec![0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
            &["function"],
        )?;

        let in_flight = IntGauge::with_opts(Opts::new(
            "deck_agent_invocations_in_flight",
            "Number of tool invocations currently running",
        ))?;

        registry.register(Box::new(invocations.clone()))?;
        registry.register(Box::new(duration.clone()))?;
        registry.register(Box::new(in_flight.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            invocations,
            duration,
            in_flight,
        })
    }

    pub fn record_invocation(&self, function: &str, outcome: InvocationOutcome, elapsed: Duration) {
        self.invocations
            .with_label_values(&[function_label(function, outcome), outcome.as_str()])
            .inc();

        if outcome != InvocationOutcome::Unknown {
            self.duration
                .with_label_values(&[function])
                .observe(elapsed.as_secs_f64());
        }
    }

    pub fn increment_in_flight(&self) {
        self.in_flight.inc();
    }

    pub fn decrement_in_flight(&self) {
        self.in_flight.dec();
    }

    pub fn invocation_count(&self, function: &str, outcome: InvocationOutcome) -> u64 {
        self.invocations
            .with_label_values(&[function_label(function, outcome), outcome.as_str()])
            .get()
    }

    pub fn in_flight(&self) -> i64 {
        self.in_flight.get()
    }

    pub fn export(&self) -> prometheus::Result<String> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}

/// Unrecognized function names come from callers, so they share one label
/// value to keep series cardinality fixed.
fn function_label(function: &str, outcome: InvocationOutcome) -> &str {
    match outcome {
        InvocationOutcome::Unknown => UNKNOWN_FUNCTION_LABEL,
        _ => function,
    }
}
