use std::path::PathBuf;
use std::process::Command;

use log::{debug, trace};
use serde::Deserialize;

use crate::error::ProviderError;

/// One entry of a flat search listing, as yt-dlp prints it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawEntry {
    pub id: Option<String>,
    pub title: Option<String>,
    pub url: Option<String>,
    pub webpage_url: Option<String>,
    pub duration: Option<f64>,
    pub view_count: Option<u64>,
    pub uploader: Option<String>,
    pub channel: Option<String>,
    pub upload_date: Option<String>,
    pub description: Option<String>,
}

/// Anything that can answer a text search with at most `limit` entries.
pub trait SearchProvider {
    fn search(&mut self, query: &str, limit: usize) -> Result<Vec<RawEntry>, ProviderError>;
}

/// Searches YouTube through the `yt-dlp` binary.
pub struct YtDlp {
    binary: PathBuf,
}

impl YtDlp {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        YtDlp {
            binary: binary.into(),
        }
    }
}

impl Default for YtDlp {
    fn default() -> Self {
        YtDlp::new("yt-dlp")
    }
}

impl SearchProvider for YtDlp {
    fn search(&mut self, query: &str, limit: usize) -> Result<Vec<RawEntry>, ProviderError> {
        let target = format!("ytsearch{}:{}", limit, query);
        debug!("Running {:?} {}", self.binary, target);

        let output = Command::new(&self.binary)
            .args([
                "--flat-playlist",
                "--skip-download",
                "--quiet",
                "--no-warnings",
                "--ignore-errors",
                "-j",
            ])
            .arg(&target)
            .output()
            .map_err(ProviderError::Spawn)?;

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| ProviderError::Output(e.to_string()))?;
        let entries = parse_search_output(&stdout);

        // --ignore-errors can exit non-zero while still listing results
        if !output.status.success() && entries.is_empty() {
            return Err(ProviderError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(entries)
    }
}

/// Parses yt-dlp's JSON-lines output, skipping lines that are not entries.
pub fn parse_search_output(stdout: &str) -> Vec<RawEntry> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| match serde_json::from_str::<RawEntry>(line) {
            Ok(entry) => Some(entry),
            Err(e) => {
                trace!("Skipping unparsable search line ({}): {}", e, line);
                None
            }
        })
        .collect()
}
