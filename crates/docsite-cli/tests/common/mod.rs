#![allow(clippy::expect_used, clippy::unwrap_used)]

use assert_cmd::Command;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;
use tempfile::TempDir;

#[allow(dead_code)]
pub const CMD_TIMEOUT: Duration = Duration::from_secs(15);

fn config_home() -> &'static Path {
    static CONFIG_HOME: OnceLock<TempDir> = OnceLock::new();
    CONFIG_HOME
        .get_or_init(|| tempfile::tempdir().expect("failed to create config dir for tests"))
        .path()
}

/// Create a `docsite` command isolated from the user's config and environment.
#[allow(dead_code)]
pub fn docsite_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("docsite"));
    cmd.timeout(CMD_TIMEOUT);
    let home = config_home();
    cmd.env("HOME", home);
    cmd.env("XDG_CONFIG_HOME", home);
    for key in [
        "DOCSITE_CORPUS",
        "DOCSITE_ENDPOINT",
        "DOCSITE_DATASET",
        "DOCSITE_TOKEN",
        "DOCSITE_SEARCH_LIMIT",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

/// Write a small corpus export into `dir` and return its path.
#[allow(dead_code)]
pub fn write_corpus(dir: &Path) -> PathBuf {
    let corpus = json!([
        {
            "_id": "page-radar",
            "title": "Coherent OFDM Radar Backscatter",
            "slug": { "current": "coherent-ofdm-radar" },
            "pageType": "dataset",
            "content": [
                { "_type": "block", "style": "h2", "children": [{ "_type": "span", "text": "Overview" }] },
                { "_type": "block", "style": "normal", "children": [{ "_type": "span", "text": "Raw captures from a software defined radar." }] },
                { "_type": "block", "style": "h3", "children": [{ "_type": "span", "text": "Sensors" }] },
                { "_type": "imageBlock", "caption": "Antenna array" },
                { "_type": "block", "style": "h2", "children": [{ "_type": "span", "text": "Overview" }] }
            ]
        },
        {
            "_id": "page-start",
            "title": "Getting Started",
            "slug": { "current": "getting-started" },
            "pageType": "general",
            "content": [
                { "_type": "block", "style": "normal", "children": [{ "_type": "span", "text": "Download a dataset and read the license." }] }
            ]
        },
        {
            "_id": "page-about",
            "title": "About Us",
            "slug": { "current": "about-us" },
            "pageType": "introduction",
            "content": [
                { "_type": "tableBlock", "headers": ["Team"], "rows": [] }
            ]
        }
    ]);

    let path = dir.join("corpus.json");
    std::fs::write(&path, serde_json::to_string_pretty(&corpus).unwrap()).unwrap();
    path
}
