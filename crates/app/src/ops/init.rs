use clap::Args;
use common::testkit::Config;

use super::scenario::{ScenarioArgs, ScenarioError};
use crate::state::AppState;

#[derive(Args, Debug, Clone)]
pub struct Init {
    /// Default amount of data per run, in MiB
    #[arg(long, default_value_t = 1)]
    pub size: u64,

    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] crate::state::StateError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = String;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = self
            .scenario
            .apply(Config::default().with_megabytes(self.size))?;
        let state = AppState::init(ctx.config_path.clone(), Some(config))?;

        Ok(format!(
            "Wrote config to {}\n\
             - network latency: {:?}\n\
             - routing latency: {:?}\n\
             - blockstore latency: {:?}\n\
             - data amount: {} bytes",
            state.config_path.display(),
            state.config.network_latency,
            state.config.routing_latency,
            state.config.blockstore_latency,
            state.config.data_amount_bytes,
        ))
    }
}
