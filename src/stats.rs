use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Local, TimeDelta};
use log::info;
use serde::Serialize;

use crate::profile::ArtistProfile;

/// Counters for one download run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadStats {
    pub total_attempted: u32,
    pub successful: u32,
    pub failed: u32,
    pub skipped: u32,
    pub by_album: BTreeMap<String, u32>,
    pub start_time: Option<DateTime<Local>>,
    pub end_time: Option<DateTime<Local>>,
}

impl DownloadStats {
    pub fn start(&mut self) {
        self.start_time = Some(Local::now());
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Local::now());
    }

    pub fn record_success(&mut self, album: Option<&str>) {
        self.successful += 1;
        *self
            .by_album
            .entry(album.unwrap_or("Unknown").to_string())
            .or_default() += 1;
    }

    /// Percentage of attempted items that downloaded.
    pub fn success_rate(&self) -> f64 {
        f64::from(self.successful) / f64::from(self.total_attempted.max(1)) * 100.0
    }

    pub fn duration(&self) -> Option<TimeDelta> {
        Some(self.end_time? - self.start_time?)
    }
}

/// Settings echoed into the statistics file.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub artist: String,
    pub max_songs: usize,
    pub quality: String,
    pub format: String,
    pub bitrate: u32,
    pub organize_by_album: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiscographyInfo {
    pub albums: usize,
    pub viral_hits: usize,
    pub popular_singles: usize,
    pub collaborations: usize,
    pub theme_queries: usize,
    pub allow_keywords: usize,
}

impl From<&ArtistProfile> for DiscographyInfo {
    fn from(profile: &ArtistProfile) -> Self {
        DiscographyInfo {
            albums: profile.releases.len(),
            viral_hits: profile.viral_hits.len(),
            popular_singles: profile.popular_singles.len(),
            collaborations: profile.collaborations.len(),
            theme_queries: profile.theme_queries.len(),
            allow_keywords: profile.allow_keywords.len(),
        }
    }
}

/// The JSON summary written next to the downloads.
#[derive(Debug, Serialize)]
pub struct StatsReport<'a> {
    #[serde(flatten)]
    pub stats: &'a DownloadStats,
    pub config: RunConfig,
    pub discography_info: DiscographyInfo,
    pub success_rate: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl<'a> StatsReport<'a> {
    pub fn new(stats: &'a DownloadStats, profile: &ArtistProfile, config: RunConfig) -> Self {
        StatsReport {
            stats,
            config,
            discography_info: DiscographyInfo::from(profile),
            success_rate: stats.success_rate(),
            duration: stats.duration().map(format_duration),
        }
    }

    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        info!("Saved statistics to {:?}", path);
        Ok(())
    }
}

/// `H:MM:SS`.
pub fn format_duration(delta: TimeDelta) -> String {
    let secs = delta.num_seconds().max(0);
    format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

pub fn log_summary(stats: &DownloadStats, profile: &ArtistProfile, base: &Path) {
    info!("{}", "=".repeat(60));
    info!("{} DOWNLOAD COMPLETE", profile.name.to_uppercase());
    info!("{}", "=".repeat(60));
    info!("Artist: {}", profile.name);
    info!("Total Attempted: {}", stats.total_attempted);
    info!("Successful: {}", stats.successful);
    info!("Failed: {}", stats.failed);
    info!("Skipped: {}", stats.skipped);

    if stats.total_attempted > 0 {
        info!("Success Rate: {:.1}%", stats.success_rate());
    }

    if !stats.by_album.is_empty() {
        info!("Downloads by Album:");
        for (album, count) in &stats.by_album {
            info!("   {}: {} tracks", album, count);
        }
    }

    if let Some(duration) = stats.duration() {
        info!("Duration: {}", format_duration(duration));
    }
    info!("Download Directory: {:?}", base);
    info!("{}", "=".repeat(60));
}
