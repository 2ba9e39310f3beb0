use std::fmt;

use clap::Args;
use common::testkit::{self, AddCatError, AddCatReport};

use super::scenario::{ScenarioArgs, ScenarioError};

/// Run add/cat at 1, 2, 4, ... MiB
#[derive(Args, Debug, Clone)]
pub struct Sweep {
    /// Stop before reaching this many MiB
    #[arg(long, default_value_t = 16)]
    pub max_mb: u64,

    #[command(flatten)]
    pub scenario: ScenarioArgs,
}

#[derive(Debug, thiserror::Error)]
pub enum SweepError {
    #[error("config error: {0}")]
    State(#[from] crate::state::StateError),
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("{} phase failed: {0}", .0.phase())]
    Run(#[from] AddCatError),
}

#[derive(Debug)]
pub struct SweepReport(pub Vec<AddCatReport>);

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "no runs");
        }
        let lines: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", lines.join("\n"))
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Sweep {
    type Error = SweepError;
    type Output = SweepReport;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let config = self.scenario.apply(ctx.load_config()?)?;
        let reports = testkit::add_cat_powers(&config, self.max_mb).await?;
        Ok(SweepReport(reports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::op::{Op, OpContext};

    #[tokio::test]
    async fn test_sweep_bound_is_exclusive() {
        let temp = tempfile::TempDir::new().unwrap();
        let ctx = OpContext::new(Some(temp.path().join("none.toml")));
        let op = Sweep {
            max_mb: 2,
            scenario: ScenarioArgs::default(),
        };
        let report = op.execute(&ctx).await.unwrap();
        assert_eq!(report.0.len(), 1);
        assert_eq!(report.0[0].bytes, 1024 * 1024);
    }

    #[tokio::test]
    async fn test_empty_sweep() {
        let temp = tempfile::TempDir::new().unwrap();
        let ctx = OpContext::new(Some(temp.path().join("none.toml")));
        let op = Sweep {
            max_mb: 1,
            scenario: ScenarioArgs::default(),
        };
        let report = op.execute(&ctx).await.unwrap();
        assert_eq!(report.to_string(), "no runs");
    }
}
