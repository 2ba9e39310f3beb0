use clap::Args;
use common::testkit::{self, AddCatError, AddCatReport, Config};

use super::scenario::{ScenarioArgs, ScenarioError};

#[derive(Args, Debug, Clone)]
pub struct AddCat {
    /// Amount of data to add, in MiB
    #[arg(long, conflicts_with = "bytes")]
    pub size: Option<u64>,

    /// Amount of data to add, in bytes
    #[arg(long)]
    pub bytes: Option<u64>,

    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum AddCatOpError {
    #[error("config error: {0}")]
    State(#[from] crate::state::StateError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("{} phase failed: {0}", .0.phase())]
    Run(#[from] AddCatError),
}

impl AddCat {
    pub fn config(&self, base: Config) -> Result<Config, ScenarioError> {
        let config = self.scenario.apply(base)?;
        Ok(match (self.size, self.bytes) {
            (_, Some(bytes)) => config.with_data_amount(bytes),
            (Some(megabytes), None) => config.with_megabytes(megabytes),
            (None, None) => config,
        })
    }
}

#[async_trait::async_trait]
impl crate::op::Op for AddCat {
    type Error = AddCatOpError;
    type Output = AddCatReport;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = self.config(ctx.load_config()?)?;
        tracing::info!(?config, "addcat: starting");
        Ok(testkit::add_cat_bytes(&config).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_flags() {
        let op = AddCat {
            size: Some(2),
            bytes: None,
            scenario: ScenarioArgs::default(),
        };
        assert_eq!(
            op.config(Config::default()).unwrap().data_amount_bytes,
            2 * 1024 * 1024
        );

        let op = AddCat {
            size: None,
            bytes: Some(1000),
            scenario: ScenarioArgs::default(),
        };
        assert_eq!(op.config(Config::default()).unwrap().data_amount_bytes, 1000);
    }

    #[tokio::test]
    async fn test_execute_small() {
        use crate::op::{Op, OpContext};

        let temp = tempfile::TempDir::new().unwrap();
        let ctx = OpContext::new(Some(temp.path().join("missing.toml")));
        let op = AddCat {
            size: None,
            bytes: Some(10_000),
            scenario: ScenarioArgs::default(),
        };
        let report = op.execute(&ctx).await.unwrap();
        assert_eq!(report.bytes, 10_000);
    }
}
