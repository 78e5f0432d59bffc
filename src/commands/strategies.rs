use anyhow::Result;
use serde::Serialize;

use crate::commands::RunArgs;
use crate::strategy::MatchStrategy;
use crate::types::OutputFormat;

/// A strategy as it will actually run
#[derive(Debug, Serialize)]
pub struct StrategyLine {
    #[serde(flatten)]
    pub strategy: MatchStrategy,
    /// Compiled CSS selector; absent for text scans
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,
}

pub fn effective_strategies(args: &RunArgs) -> Result<Vec<StrategyLine>> {
    let config = args.load_config()?;
    Ok(config
        .strategies
        .iter()
        .map(|strategy| StrategyLine {
            selector: strategy.selector(config.scope.as_deref()),
            strategy: strategy.clone(),
        })
        .collect())
}

pub async fn handle_strategies(args: RunArgs) -> Result<()> {
    let lines = effective_strategies(&args)?;

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&lines)?),
        OutputFormat::Simple => {
            for line in &lines {
                println!("{}. {}", line.strategy.rank, line.strategy);
            }
        }
    }
    Ok(())
}
