use std::time::Duration;

use serde::{Deserialize, Serialize};

const MIB: u64 = 1024 * 1024;

/// Latencies and data volume for one add/cat run.
///
/// Durations are (de)serialized as fractional milliseconds, so
///  `blockstore_latency_ms = 0.15` is 150µs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    #[serde(rename = "network_latency_ms", with = "duration_ms")]
    pub network_latency: Duration,
    #[serde(rename = "routing_latency_ms", with = "duration_ms")]
    pub routing_latency: Duration,
    #[serde(rename = "blockstore_latency_ms", with = "duration_ms")]
    pub blockstore_latency: Duration,
    pub data_amount_bytes: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network_latency: Duration::ZERO,
            routing_latency: Duration::ZERO,
            blockstore_latency: Duration::ZERO,
            data_amount_bytes: MIB,
        }
    }
}

impl Config {
    pub fn with_data_amount(mut self, bytes: u64) -> Self {
        self.data_amount_bytes = bytes;
        self
    }

    pub fn with_megabytes(self, megabytes: u64) -> Self {
        self.with_data_amount(megabytes * MIB)
    }

    /// Cross-country round trip
    pub fn network_ny_to_sf(mut self) -> Self {
        self.network_latency = Duration::from_millis(20);
        self
    }

    pub fn network_intra_datacenter(mut self) -> Self {
        self.network_latency = Duration::from_micros(250);
        self
    }

    pub fn blockstore_fast_ssd(mut self) -> Self {
        self.blockstore_latency = Duration::from_micros(10);
        self
    }

    pub fn blockstore_slow_ssd(mut self) -> Self {
        self.blockstore_latency = Duration::from_micros(150);
        self
    }

    pub fn blockstore_7200rpm(mut self) -> Self {
        self.blockstore_latency = Duration::from_millis(8);
        self
    }

    pub fn routing_slow(mut self) -> Self {
        self.routing_latency = Duration::from_millis(200);
        self
    }

    /// Apply a preset by name, `None` for an unknown name
    pub fn with_preset(self, name: &str) -> Option<Self> {
        let config = match name {
            "network_ny_to_sf" => self.network_ny_to_sf(),
            "network_intra_datacenter" => self.network_intra_datacenter(),
            "blockstore_fast_ssd" => self.blockstore_fast_ssd(),
            "blockstore_slow_ssd" => self.blockstore_slow_ssd(),
            "blockstore_7200rpm" => self.blockstore_7200rpm(),
            "routing_slow" => self.routing_slow(),
            _ => return None,
        };
        Some(config)
    }

    pub const PRESETS: [&'static str; 6] = [
        "network_ny_to_sf",
        "network_intra_datacenter",
        "blockstore_fast_ssd",
        "blockstore_slow_ssd",
        "blockstore_7200rpm",
        "routing_slow",
    ];
}

mod duration_ms {
    use std::time::Duration;

    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const NANOS_PER_MILLI: f64 = 1_000_000.0;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(duration.as_nanos() as f64 / NANOS_PER_MILLI)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = f64::deserialize(deserializer)?;
        if !millis.is_finite() || millis < 0.0 {
            return Err(D::Error::custom(format!(
                "latency must be a non-negative number of milliseconds, got {millis}"
            )));
        }
        Ok(Duration::from_nanos((millis * NANOS_PER_MILLI).round() as u64))
    }
}
