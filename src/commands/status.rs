use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::model::{ScrapeRunManifest, ServiceStatus};
use crate::util::read_json;
use crate::writer::{LATEST_RUN_MANIFEST, ResultWriter};

pub fn run(args: StatusArgs) -> Result<()> {
    let writer = ResultWriter::new(&args.output_dir)?;
    let latest_path = writer.manifest_dir().join(LATEST_RUN_MANIFEST);

    info!(output_dir = %args.output_dir.display(), "status requested");

    if latest_path.exists() {
        let manifest: ScrapeRunManifest = read_json(&latest_path)?;

        info!(
            run_id = %manifest.run_id,
            status = %manifest.status,
            started_at = %manifest.started_at,
            completed_at = %manifest.completed_at,
            index_url = %manifest.index_url,
            services_seen = manifest.counts.services_seen,
            services_written = manifest.counts.services_written,
            services_failed = manifest.counts.services_failed,
            actions_total = manifest.counts.actions_total,
            tables_skipped = manifest.counts.tables_skipped,
            "loaded latest scrape manifest"
        );

        for entry in manifest
            .services
            .iter()
            .filter(|entry| entry.status == ServiceStatus::Failed)
        {
            warn!(
                service = %entry.name,
                error = %entry.error.clone().unwrap_or_default(),
                "service failed in last run"
            );
        }
    } else {
        warn!(path = %latest_path.display(), "scrape run manifest missing");
    }

    if args.output_dir.is_dir() {
        info!(
            path = %args.output_dir.display(),
            artifacts = count_artifacts(&args.output_dir)?,
            "service artifacts on disk"
        );
    } else {
        warn!(path = %args.output_dir.display(), "output directory missing");
    }

    Ok(())
}

fn count_artifacts(dir: &Path) -> Result<usize> {
    let mut count = 0;
    let entries = fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;

    for entry in entries {
        let entry = entry.with_context(|| format!("failed to read entry in {}", dir.display()))?;
        let path = entry.path();

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if is_json && path.is_file() {
            count += 1;
        }
    }

    Ok(count)
}
