use std::time::Duration;

use clap::Args;
use common::testkit::Config;

/// Overrides applied on top of the loaded config file
#[derive(Args, Debug, Clone, Default)]
pub struct ScenarioArgs {
    /// Apply a named preset (repeatable, applied in order)
    #[arg(long = "preset", value_name = "NAME")]
    pub presets: Vec<String>,

    /// One-way network latency in milliseconds
    #[arg(long)]
    pub network_latency_ms: Option<f64>,

    /// Routing lookup latency in milliseconds
    #[arg(long)]
    pub routing_latency_ms: Option<f64>,

    /// Per-operation blockstore latency in milliseconds
    #[arg(long)]
    pub blockstore_latency_ms: Option<f64>,
}

#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    #[error("unknown preset '{0}' (known: {})", Config::PRESETS.join(", "))]
    UnknownPreset(String),
    #[error("--{flag} must be a non-negative number, got {value}")]
    BadLatency { flag: &'static str, value: f64 },
}

impl ScenarioArgs {
    /// Presets first, explicit latencies last
    pub fn apply(&self, mut config: Config) -> Result<Config, ScenarioError> {
        for name in &self.presets {
            config = config
                .with_preset(name)
                .ok_or_else(|| ScenarioError::UnknownPreset(name.clone()))?;
        }

        if let Some(ms) = self.network_latency_ms {
            config.network_latency = millis("network-latency-ms", ms)?;
        }
        if let Some(ms) = self.routing_latency_ms {
            config.routing_latency = millis("routing-latency-ms", ms)?;
        }
        if let Some(ms) = self.blockstore_latency_ms {
            config.blockstore_latency = millis("blockstore-latency-ms", ms)?;
        }
        Ok(config)
    }
}

fn millis(flag: &'static str, value: f64) -> Result<Duration, ScenarioError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ScenarioError::BadLatency { flag, value });
    }
    Ok(Duration::from_nanos((value * 1_000_000.0).round() as u64))
}
