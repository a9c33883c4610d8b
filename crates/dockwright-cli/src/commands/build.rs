use dockwright_core::Workspace;

use crate::commands::pipeline::{self, ImageOutcome};

/// Run the batch build.
pub async fn build(image: &str, dry_run: bool, debug: bool) -> anyhow::Result<()> {
    if image != "all" {
        println!("Building a single image is not supported yet — use \"all\".");
        return Ok(());
    }

    let workspace = Workspace::new(".");
    let report = pipeline::run(&workspace, dry_run, debug).await?;

    println!();
    for (key, outcome) in &report.images {
        let label = match outcome {
            ImageOutcome::Built => "built",
            ImageOutcome::DryRun => "dry run",
            ImageOutcome::Skipped => "skipped",
            ImageOutcome::Failed => "FAILED",
        };
        println!("  {key}: {label}");
    }

    let failed = report.failed_images();
    if failed > 0 || report.checkout_failures > 0 {
        anyhow::bail!(
            "{failed} image(s) failed, {} checkout(s) failed",
            report.checkout_failures
        );
    }

    Ok(())
}
