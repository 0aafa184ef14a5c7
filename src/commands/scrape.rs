use std::time::Duration;

use anyhow::Result;
use chrono::Utc;
use tracing::{error, info, warn};

use crate::cli::ScrapeArgs;
use crate::commands::index::fetch_service_links;
use crate::extract::{ExtractError, PageParser, ServiceActions, ServiceLink, extract_service};
use crate::model::{
    ActionRecord, ScrapeCounts, ScrapeRunManifest, ServiceDocument, ServiceRunEntry,
    ServiceStatus,
};
use crate::source::{DocumentSource, source_for};
use crate::util::{now_utc_string, utc_compact_string};
use crate::writer::ResultWriter;

pub fn run(args: ScrapeArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    info!(index_url = %args.index_url, run_id = %run_id, "starting scrape");

    let source = source_for(&args.index_url, Duration::from_secs(args.timeout_secs))?;
    let parser = PageParser::new()?;
    let writer = ResultWriter::new(&args.output_dir)?;

    let links = fetch_service_links(source.as_ref(), &parser, &args.index_url)?;
    let links = select_services(links, &args.services, args.limit);
    if !args.services.is_empty() && links.len() < args.services.len() {
        warn!(
            requested = args.services.len(),
            matched = links.len(),
            "some requested services are not in the index"
        );
    }

    let output = if args.dry_run { None } else { Some(&writer) };
    let entries = scrape_services(source.as_ref(), &parser, output, &links)?;
    let counts = summarize(&entries);

    info!(
        services_seen = counts.services_seen,
        services_written = counts.services_written,
        services_failed = counts.services_failed,
        actions_total = counts.actions_total,
        tables_skipped = counts.tables_skipped,
        "scrape completed"
    );

    if args.dry_run {
        info!("dry-run: no artifacts written");
        return Ok(());
    }

    let manifest = ScrapeRunManifest {
        manifest_version: 1,
        run_id,
        status: if counts.services_failed == 0 {
            "completed".to_string()
        } else {
            "completed_with_failures".to_string()
        },
        started_at,
        completed_at: now_utc_string(),
        index_url: args.index_url.clone(),
        output_dir: args.output_dir.display().to_string(),
        counts,
        services: entries,
    };
    writer.write_run_manifest(&manifest)?;

    Ok(())
}

/// Applies the name filter (index order is kept) and then the limit.
pub fn select_services(
    links: Vec<ServiceLink>,
    names: &[String],
    limit: Option<usize>,
) -> Vec<ServiceLink> {
    links
        .into_iter()
        .filter(|link| names.is_empty() || names.contains(&link.name))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

/// Fetches, extracts and (when a writer is given) persists every service.
///
/// A fetch error aborts the run. An extraction error only fails its own
/// service, which is recorded and skipped.
pub fn scrape_services(
    source: &dyn DocumentSource,
    parser: &PageParser,
    writer: Option<&ResultWriter>,
    links: &[ServiceLink],
) -> Result<Vec<ServiceRunEntry>> {
    let mut entries = Vec::with_capacity(links.len());

    for link in links {
        info!(service = %link.name, "processing service");
        let html = source.fetch(&link.url)?;

        let mut entry = ServiceRunEntry {
            name: link.name.clone(),
            url: link.url.clone(),
            prefix: None,
            status: ServiceStatus::Failed,
            action_count: 0,
            tables_skipped: 0,
            artifact_path: None,
            sha256: None,
            error: None,
        };

        let extracted = match extract_page(parser, &html) {
            Ok(extracted) => extracted,
            Err(err) => {
                error!(service = %link.name, error = %err, "service extraction failed");
                entry.error = Some(err.to_string());
                entries.push(entry);
                continue;
            }
        };

        entry.prefix = Some(extracted.prefix.clone());
        entry.action_count = extracted.actions.len();
        entry.tables_skipped = extracted.tables_skipped;
        let document = build_document(&link.name, extracted);

        match writer {
            Some(writer) => match writer.artifact_path(&document.prefix) {
                Ok(_) => {
                    let artifact = writer.write_service(&document)?;
                    info!(
                        service = %link.name,
                        prefix = %document.prefix,
                        actions = document.actions.len(),
                        path = %artifact.path.display(),
                        "wrote service actions"
                    );
                    entry.status = ServiceStatus::Written;
                    entry.artifact_path = Some(artifact.path.display().to_string());
                    entry.sha256 = Some(artifact.sha256);
                }
                Err(err) => {
                    error!(service = %link.name, error = %err, "service artifact rejected");
                    entry.error = Some(err.to_string());
                }
            },
            None => {
                info!(
                    service = %link.name,
                    prefix = %document.prefix,
                    actions = document.actions.len(),
                    "extracted service actions"
                );
                entry.status = ServiceStatus::Extracted;
            }
        }

        entries.push(entry);
    }

    Ok(entries)
}

pub fn extract_page(parser: &PageParser, html: &str) -> Result<ServiceActions, ExtractError> {
    let page = parser.parse_service_page(html)?;
    extract_service(&page)
}

pub fn build_document(service: &str, extracted: ServiceActions) -> ServiceDocument {
    ServiceDocument {
        actions: extracted
            .actions
            .into_iter()
            .map(ActionRecord::from)
            .collect(),
        prefix: extracted.prefix,
        service: service.to_string(),
    }
}

pub fn summarize(entries: &[ServiceRunEntry]) -> ScrapeCounts {
    let mut counts = ScrapeCounts {
        services_seen: entries.len(),
        ..ScrapeCounts::default()
    };
    for entry in entries {
        match entry.status {
            ServiceStatus::Written => counts.services_written += 1,
            ServiceStatus::Failed => counts.services_failed += 1,
            ServiceStatus::Extracted => {}
        }
        counts.actions_total += entry.action_count;
        counts.tables_skipped += entry.tables_skipped;
    }
    counts
}

#[cfg(test)]
mod tests;
