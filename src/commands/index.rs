use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::cli::IndexArgs;
use crate::extract::{PageParser, ServiceLink};
use crate::model::{ServiceIndexEntry, ServiceIndexManifest};
use crate::source::{DocumentSource, base_url, source_for};
use crate::util::{now_utc_string, write_json_pretty};

pub fn run(args: IndexArgs) -> Result<()> {
    let source = source_for(&args.index_url, Duration::from_secs(args.timeout_secs))?;
    let parser = PageParser::new()?;

    let links = fetch_service_links(source.as_ref(), &parser, &args.index_url)?;
    for link in &links {
        info!(service = %link.name, url = %link.url, "service");
    }
    info!(service_count = links.len(), "index completed");

    if let Some(manifest_path) = args.manifest_path {
        let manifest = ServiceIndexManifest {
            manifest_version: 1,
            generated_at: now_utc_string(),
            index_url: args.index_url.clone(),
            service_count: links.len(),
            services: links
                .into_iter()
                .map(|link| ServiceIndexEntry {
                    name: link.name,
                    url: link.url,
                })
                .collect(),
        };
        write_json_pretty(&manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote service index manifest");
    }

    Ok(())
}

pub fn fetch_service_links(
    source: &dyn DocumentSource,
    parser: &PageParser,
    index_location: &str,
) -> Result<Vec<ServiceLink>> {
    let base = base_url(index_location)?;
    let html = source.fetch(&base)?;
    parser.parse_service_index(&html, &base)
}
