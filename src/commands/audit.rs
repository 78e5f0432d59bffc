use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::commands::RunArgs;
use crate::commands::output::print_report;
use crate::config::RunConfig;
use crate::memory_page::MemoryPage;
use crate::routine::Routine;
use crate::types::RunReport;

/// Run the routine against an HTML snapshot
///
/// A snapshot never changes, so waiting and settling default to zero unless
/// given on the command line.
pub async fn audit_file(path: &Path, args: &RunArgs) -> Result<RunReport> {
    let mut overrides = args.overrides();
    overrides.timeout_ms.get_or_insert(0);
    overrides.settle_ms.get_or_insert(0);
    let config = RunConfig::load(args.config.as_deref())?.with_overrides(overrides)?;
    debug!("Audit config: {:?}", config);

    let page = MemoryPage::from_file(path)?;
    info!("Auditing {}", path.display());

    Routine::new(&page, &config)
        .run(&path.display().to_string())
        .await
        .context("Audit aborted")
}

pub async fn handle_audit(file: String, args: RunArgs) -> Result<()> {
    let report = audit_file(Path::new(&file), &args).await?;
    print_report(&report, args.format)
}
