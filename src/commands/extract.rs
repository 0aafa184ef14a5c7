use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ExtractArgs;
use crate::commands::scrape::{build_document, extract_page};
use crate::extract::PageParser;
use crate::util::{ARTIFACT_INDENT, to_json_indented};
use crate::writer::ResultWriter;

pub fn run(args: ExtractArgs) -> Result<()> {
    let html = fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let service = args.service_name.clone().unwrap_or_else(|| {
        args.input
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let parser = PageParser::new()?;
    let extracted = extract_page(&parser, &html)
        .with_context(|| format!("failed to extract {}", args.input.display()))?;
    info!(
        service = %service,
        prefix = %extracted.prefix,
        tables_recognized = extracted.tables_recognized,
        tables_skipped = extracted.tables_skipped,
        rows = extracted.rows_processed,
        "extracted service page"
    );
    let document = build_document(&service, extracted);

    if args.stdout {
        let text = to_json_indented(&document, ARTIFACT_INDENT)?;
        let mut stdout = io::stdout().lock();
        stdout
            .write_all(text.as_bytes())
            .context("failed to write to stdout")?;
        return Ok(());
    }

    let writer = ResultWriter::new(&args.output_dir)?;
    let artifact = writer.write_service(&document)?;
    info!(
        path = %artifact.path.display(),
        actions = document.actions.len(),
        sha256 = %artifact.sha256,
        "wrote service actions"
    );

    Ok(())
}
