use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use regex::Regex;
use tracing::info;

use crate::model::{ScrapeRunManifest, ServiceDocument};
use crate::util::{ARTIFACT_INDENT, sha256_file, write_json_indented, write_json_pretty};

pub const LATEST_RUN_MANIFEST: &str = "latest_run.json";

/// Persists one JSON document per service, named by its prefix.
pub struct ResultWriter {
    output_dir: PathBuf,
    stem_pattern: Regex,
}

#[derive(Debug, Clone)]
pub struct WrittenArtifact {
    pub path: PathBuf,
    pub sha256: String,
}

impl ResultWriter {
    pub fn new(output_dir: &Path) -> Result<Self> {
        let stem_pattern = Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*$")
            .context("failed to compile artifact name regex")?;
        Ok(Self {
            output_dir: output_dir.to_path_buf(),
            stem_pattern,
        })
    }

    pub fn manifest_dir(&self) -> PathBuf {
        self.output_dir.join("manifests")
    }

    pub fn artifact_path(&self, prefix: &str) -> Result<PathBuf> {
        if !self.stem_pattern.is_match(prefix) {
            bail!("service prefix is not a safe file name: {prefix:?}");
        }
        Ok(self.output_dir.join(format!("{prefix}.json")))
    }

    pub fn write_service(&self, document: &ServiceDocument) -> Result<WrittenArtifact> {
        let path = self.artifact_path(&document.prefix)?;
        write_json_indented(&path, document, ARTIFACT_INDENT)?;
        let sha256 = sha256_file(&path)?;
        Ok(WrittenArtifact { path, sha256 })
    }

    /// Writes the run manifest under its run id and as the latest run.
    pub fn write_run_manifest(&self, manifest: &ScrapeRunManifest) -> Result<PathBuf> {
        let manifest_dir = self.manifest_dir();
        let run_path = manifest_dir.join(format!("scrape_{}.json", manifest.run_id));
        write_json_pretty(&run_path, manifest)?;
        write_json_pretty(&manifest_dir.join(LATEST_RUN_MANIFEST), manifest)?;
        info!(path = %run_path.display(), "wrote scrape run manifest");
        Ok(run_path)
    }
}
