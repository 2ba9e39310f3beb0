//! Harness for multi-peer add/cat scenarios
//!
//! One session adds seeded pseudo-random data, another session resolves
//! the root and reads it back over a virtual network with configurable
//! latencies.
//!
//! # Example
//!
//! ```rust,ignore
//! use common::testkit::{add_cat_bytes, Config};
//!
//! #[tokio::test]
//! async fn test_add_cat_across_the_country() -> anyhow::Result<()> {
//!     let config = Config::default()
//!         .with_megabytes(4)
//!         .network_ny_to_sf()
//!         .blockstore_slow_ssd();
//!
//!     let report = add_cat_bytes(&config).await?;
//!     assert_eq!(report.bytes, 4 * 1024 * 1024);
//!     Ok(())
//! }
//! ```

mod addcat;
mod config;
mod random;

pub use addcat::{
    add, add_cat_bytes, add_cat_powers, add_cat_with, cat, AddCatError, AddCatReport, Phase, SEED,
};
pub use config::Config;
pub use random::{pseudo_random_bytes, PseudoRandomReader};

/// Environment variable that turns on the long-running scenarios
pub const EPIC_TEST_ENV: &str = "WEFT_EPIC_TEST";

/// Whether the long-running scenarios should run
pub fn epic_enabled() -> bool {
    std::env::var_os(EPIC_TEST_ENV).is_some_and(|value| !value.is_empty())
}
