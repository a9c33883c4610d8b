use std::collections::BTreeSet;

use dockwright_build::{Preparer, graph, loader, stage};
use dockwright_core::{BuildDescriptor, CredentialStore, Error, SkipSet, Workspace};
use dockwright_exec::{ImageBuilder, SourceCheckout, archive_name};

/// Outcome of one image in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImageOutcome {
    Built,
    DryRun,
    Skipped,
    Failed,
}

/// Result of a full pipeline run, consumed by the command for its summary
/// and exit status.
pub(crate) struct RunReport {
    pub images: Vec<(String, ImageOutcome)>,
    pub checkout_failures: usize,
}

impl RunReport {
    pub fn failed_images(&self) -> usize {
        self.images
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ImageOutcome::Failed))
            .count()
    }
}

/// Drive the full pipeline: load → order → checkout → per-image
/// stage/prepare/render/build/save → cleanup.
///
/// A missing images root aborts before any other stage. Everything after
/// loading is log-and-continue: a failed checkout or image build is counted
/// in the report and the plan proceeds.
pub(crate) async fn run(
    workspace: &Workspace,
    dry_run: bool,
    debug: bool,
) -> anyhow::Result<RunReport> {
    section("LOADING BUILD FILES");

    if !workspace.images_dir().is_dir() {
        return Err(Error::ImagesRootMissing {
            path: workspace.images_dir().to_path_buf(),
        }
        .into());
    }
    workspace.ensure_layout()?;

    let skip = SkipSet::load(workspace.ignore_file());
    let mut batch = loader::load_batch(workspace, &skip)?;
    let plan = graph::order(&batch)?;
    tracing::debug!(?plan, "build plan");

    if dry_run {
        section("PROCESSING PROJECTS (dry mode)");
    } else {
        section("PROCESSING PROJECT repositories");
    }

    let checkout = SourceCheckout::new();
    let mut checkout_failures = 0usize;
    let mut seen = BTreeSet::new();
    let urls: Vec<String> = plan
        .iter()
        .filter_map(|key| batch.get(key))
        .flat_map(|descriptor| descriptor.projects().iter().cloned())
        .filter(|url| seen.insert(url.clone()))
        .collect();
    for url in &urls {
        let result = if dry_run {
            checkout.list_remote(url).await
        } else {
            checkout.checkout(url, workspace.project_dir()).await
        };
        if let Err(e) = result {
            tracing::error!(url = %url, error = %e, "checkout failed; continuing");
            checkout_failures += 1;
        }
    }

    let credentials = match CredentialStore::load(workspace.auth_file()) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!(error = %e, "credential store unreadable; continuing without token");
            CredentialStore::default()
        }
    };
    let preparer = Preparer {
        token: credentials.token_for("github.com").map(str::to_owned),
        verbose: debug,
        ..Default::default()
    };

    let builder = ImageBuilder::new();
    let mut images = Vec::with_capacity(plan.len());
    for key in &plan {
        // The ignore list is honored here as well; load-time exclusion
        // already covers the usual path.
        if skip.contains(key) {
            println!("Skipping {key}");
            images.push((key.clone(), ImageOutcome::Skipped));
            continue;
        }
        if dry_run {
            section(&format!("BUILDING {key} (dry mode)"));
        } else {
            section(&format!("BUILDING {key}"));
        }

        let Some(descriptor) = batch.get_mut(key) else {
            continue;
        };
        let outcome = match build_image(workspace, descriptor, &preparer, &builder, dry_run).await {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(image = %key, error = %e, "image failed; continuing with the plan");
                ImageOutcome::Failed
            }
        };
        images.push((key.clone(), outcome));
    }

    section("CLEANING UP");
    if let Err(e) = stage::cleanup(workspace) {
        tracing::warn!(error = %e, "cleanup incomplete");
    }

    Ok(RunReport {
        images,
        checkout_failures,
    })
}

/// One image: stage assets, inject instructions, render the manifest, then
/// build, save, and move the archive into the output directory.
async fn build_image(
    workspace: &Workspace,
    descriptor: &mut BuildDescriptor,
    preparer: &Preparer,
    builder: &ImageBuilder,
    dry_run: bool,
) -> anyhow::Result<ImageOutcome> {
    let key = descriptor.key().to_owned();

    println!("Copying assets ...");
    stage::stage_assets(workspace, descriptor)?;

    // Inject exactly once, immediately before rendering.
    preparer.prepare(descriptor);
    stage::write_manifest(workspace, &descriptor.to_manifest())?;

    if dry_run {
        return Ok(ImageOutcome::DryRun);
    }

    builder.build(&key, workspace.build_dir()).await?;

    let archive = workspace.build_dir().join(archive_name(&key));
    builder.save(&key, &archive).await?;

    let target = workspace.builds_dir().join(archive_name(&key));
    std::fs::rename(&archive, &target).map_err(|e| {
        anyhow::anyhow!(
            "failed to move {} to {}: {e}",
            archive.display(),
            target.display()
        )
    })?;
    println!("Saved {}", target.display());

    Ok(ImageOutcome::Built)
}

fn section(message: &str) {
    let bar = "#".repeat(80);
    println!("\n\n{bar}");
    println!("# {message}");
    println!("{bar}\n");
}
