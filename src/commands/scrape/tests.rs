use std::collections::HashMap;
use std::fs;

use anyhow::{Result, anyhow};

use super::*;
use crate::util::read_json;

const INDEX_URL: &str = "https://docs.example.com/IAM/reference.html";

struct MemorySource {
    pages: HashMap<String, String>,
}

impl MemorySource {
    fn new(pages: &[(&str, String)]) -> Self {
        Self {
            pages: pages
                .iter()
                .map(|(url, html)| (url.to_string(), html.clone()))
                .collect(),
        }
    }
}

impl DocumentSource for MemorySource {
    fn fetch(&self, url: &str) -> Result<String> {
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| anyhow!("not found: {url}"))
    }
}

fn index_page(names: &[(&str, &str)]) -> String {
    let items = names
        .iter()
        .map(|(name, href)| format!(r#"<li><a href="{href}">{name}</a></li>"#))
        .collect::<String>();
    format!(r#"<html><body><div class="highlights"><ul>{items}</ul></div></body></html>"#)
}

fn service_page(prefix: &str, headers: &[&str], rows: &str) -> String {
    let header_cells = headers
        .iter()
        .map(|header| format!("<th>{header}</th>"))
        .collect::<String>();
    format!(
        r#"<html><body><div id="main-col-body"><p>prefix: <code>{prefix}</code></p>
        <table><thead><tr>{header_cells}</tr></thead>{rows}</table>
        <table><thead><tr><th>Condition keys</th><th>Type</th></tr></thead>
        <tr><td>aws:RequestTag/${{TagKey}}</td><td>String</td></tr></table>
        </div></body></html>"#
    )
}

const ACTION_HEADERS: [&str; 6] = [
    "Actions",
    "Description",
    "Access level",
    "Resource types (*required)",
    "Condition keys",
    "Dependent actions",
];

fn kms_page() -> String {
    service_page(
        "kms",
        &ACTION_HEADERS,
        r#"<tr><td rowspan="2">kms:CreateGrant</td><td rowspan="2">Grants   permission
            to add a grant</td><td rowspan="2">Permissions management</td>
            <td>key*</td><td>kms:GrantOperations</td><td></td></tr>
           <tr><td></td><td>kms:ViaService</td><td></td></tr>
           <tr><td>kms:ListKeys [permission only]</td><td>Lists keys</td><td>List</td>
            <td></td><td></td><td></td></tr>"#,
    )
}

fn links(names: &[&str]) -> Vec<ServiceLink> {
    names
        .iter()
        .map(|name| ServiceLink {
            name: name.to_string(),
            url: format!("https://docs.example.com/IAM/{name}.html"),
        })
        .collect()
}

#[test]
fn select_services_filters_by_name_then_limits() {
    let all = links(&["a", "b", "c", "d"]);

    let picked = select_services(all.clone(), &["c".to_string(), "a".to_string()], None);
    assert_eq!(
        picked.iter().map(|link| link.name.as_str()).collect::<Vec<_>>(),
        vec!["a", "c"]
    );

    let limited = select_services(all, &[], Some(2));
    assert_eq!(limited.len(), 2);
    assert_eq!(limited[1].name, "b");
}

#[test]
fn scrape_writes_one_document_per_service_and_records_failures() {
    let dir = tempfile::tempdir().expect("tempdir");
    let broken = service_page(
        "broken",
        &["Actions", "Description"],
        "<tr><td>broken:Do</td><td>Does</td></tr>",
    );
    let source = MemorySource::new(&[
        (
            INDEX_URL,
            index_page(&[("AWS KMS", "kms.html"), ("Broken", "broken.html")]),
        ),
        ("https://docs.example.com/IAM/kms.html", kms_page()),
        ("https://docs.example.com/IAM/broken.html", broken),
    ]);
    let parser = PageParser::new().expect("selectors compile");
    let writer = ResultWriter::new(dir.path()).expect("writer");

    let links = fetch_service_links(&source, &parser, INDEX_URL).expect("index");
    let entries = scrape_services(&source, &parser, Some(&writer), &links).expect("scrape runs");

    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].status, ServiceStatus::Written);
    assert_eq!(entries[0].prefix.as_deref(), Some("kms"));
    assert_eq!(entries[0].action_count, 2);
    assert_eq!(entries[0].tables_skipped, 1);
    assert_eq!(entries[1].status, ServiceStatus::Failed);
    assert_eq!(
        entries[1].error.as_deref(),
        Some("required column missing: Access level")
    );
    assert!(!dir.path().join("broken.json").exists());

    let written: serde_json::Value =
        read_json(&dir.path().join("kms.json")).expect("kms document");
    assert_eq!(written["service"], "AWS KMS");
    assert_eq!(written["prefix"], "kms");

    let grant = &written["actions"][0];
    assert_eq!(grant["action"], "kms:CreateGrant");
    assert_eq!(grant["description"], "Grants permission to add a grant");
    assert_eq!(grant["access_level"], "Permissions management");
    assert_eq!(grant["permission_only"], false);
    assert_eq!(
        grant["resources"],
        serde_json::json!([{ "name": "key", "required": true }])
    );
    assert_eq!(
        grant["condition_keys"],
        serde_json::json!(["kms:GrantOperations", "kms:ViaService"])
    );
    assert_eq!(grant["dependent_actions"], serde_json::json!([]));

    let list = &written["actions"][1];
    assert_eq!(list["action"], "kms:ListKeys");
    assert_eq!(list["permission_only"], true);
    assert_eq!(list["resources"], serde_json::json!([]));

    let counts = summarize(&entries);
    assert_eq!(counts.services_written, 1);
    assert_eq!(counts.services_failed, 1);
    assert_eq!(counts.actions_total, 2);
}

#[test]
fn written_document_keys_are_alphabetical() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = MemorySource::new(&[("https://docs.example.com/IAM/kms.html", kms_page())]);
    let parser = PageParser::new().expect("selectors compile");
    let writer = ResultWriter::new(dir.path()).expect("writer");

    scrape_services(&source, &parser, Some(&writer), &links(&["kms"])).expect("scrape runs");

    let text = fs::read_to_string(dir.path().join("kms.json")).expect("kms document");
    let position = |key: &str| text.find(&format!("\"{key}\"")).expect(key);
    assert!(position("actions") < position("prefix"));
    assert!(position("prefix") < position("service"));
    assert!(position("access_level") < position("action"));
    assert!(position("dependent_actions") < position("description"));
    assert!(position("permission_only") < position("resources"));
    assert!(text.starts_with("{\n    \"actions\": [\n        {\n            \"access_level\""));
    assert!(text.ends_with("}\n"));
}

#[test]
fn fetch_failure_aborts_the_run() {
    let source = MemorySource::new(&[("https://docs.example.com/IAM/kms.html", kms_page())]);
    let parser = PageParser::new().expect("selectors compile");

    let err = scrape_services(&source, &parser, None, &links(&["kms", "missing"]))
        .expect_err("missing page");

    assert!(err.to_string().contains("missing.html"));
}

#[test]
fn dry_run_extracts_without_writing() {
    let source = MemorySource::new(&[("https://docs.example.com/IAM/kms.html", kms_page())]);
    let parser = PageParser::new().expect("selectors compile");

    let entries = scrape_services(&source, &parser, None, &links(&["kms"])).expect("scrape runs");

    assert_eq!(entries[0].status, ServiceStatus::Extracted);
    assert_eq!(entries[0].action_count, 2);
    assert!(entries[0].artifact_path.is_none());
}

#[test]
fn unsafe_prefix_is_rejected_without_writing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let source = MemorySource::new(&[(
        "https://docs.example.com/IAM/evil.html",
        service_page("../evil", &ACTION_HEADERS, ""),
    )]);
    let parser = PageParser::new().expect("selectors compile");
    let writer = ResultWriter::new(dir.path()).expect("writer");

    let entries =
        scrape_services(&source, &parser, Some(&writer), &links(&["evil"])).expect("scrape runs");

    assert_eq!(entries[0].status, ServiceStatus::Failed);
    assert!(entries[0].error.as_deref().unwrap_or_default().contains("safe file name"));
    assert_eq!(fs::read_dir(dir.path()).expect("read dir").count(), 0);
}

#[test]
fn run_manifest_is_written_twice_and_reloads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let writer = ResultWriter::new(dir.path()).expect("writer");
    let manifest = ScrapeRunManifest {
        manifest_version: 1,
        run_id: "run-20260101T000000Z".to_string(),
        status: "completed".to_string(),
        started_at: "2026-01-01T00:00:00Z".to_string(),
        completed_at: "2026-01-01T00:01:00Z".to_string(),
        index_url: INDEX_URL.to_string(),
        output_dir: dir.path().display().to_string(),
        counts: ScrapeCounts::default(),
        services: Vec::new(),
    };

    let run_path = writer.write_run_manifest(&manifest).expect("manifest written");

    assert!(run_path.ends_with("manifests/scrape_run-20260101T000000Z.json"));
    let latest: ScrapeRunManifest =
        read_json(&writer.manifest_dir().join(crate::writer::LATEST_RUN_MANIFEST))
            .expect("latest manifest");
    assert_eq!(latest.run_id, manifest.run_id);
    assert_eq!(latest.status, "completed");
}
