use std::path::PathBuf;
use std::process::Command;
use std::thread;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::candidate::Candidate;
use crate::collector::CancelToken;
use crate::error::DownloadError;
use crate::fs::Layout;
use crate::profile::ArtistProfile;
use crate::stats::DownloadStats;

/// Exponential backoff between download attempts.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts per item, first one included.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    /// Upper bound for any single wait.
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay after the failed attempt number `attempt` (zero based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let base = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = base.min(self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(capped).unwrap_or(self.max_delay)
    }
}

#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub quality: String,
    pub format: String,
    pub bitrate: u32,
    pub sample_rate: u32,
    pub embed_thumbnail: bool,
    pub embed_metadata: bool,
    pub skip_existing: bool,
    pub delay_between_downloads: Duration,
    pub retry: RetryConfig,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        DownloadSettings {
            quality: "bestaudio/best".into(),
            format: "mp3".into(),
            bitrate: 320,
            sample_rate: 44100,
            embed_thumbnail: true,
            embed_metadata: true,
            skip_existing: true,
            delay_between_downloads: Duration::from_secs(2),
            retry: RetryConfig::default(),
        }
    }
}

/// Everything a downloader needs for one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub output_template: PathBuf,
    /// Ordered metadata fields; empty when metadata embedding is off.
    pub tags: Vec<(&'static str, String)>,
}

/// Fetches and transcodes one item. The heavy lifting stays in external tools.
pub trait Downloader {
    fn download(&mut self, request: &DownloadRequest) -> Result<(), DownloadError>;
}

/// Metadata fields to embed for a candidate.
pub fn tags_for(profile: &ArtistProfile, candidate: &Candidate) -> Vec<(&'static str, String)> {
    let mut tags = vec![
        ("title", candidate.title.clone()),
        ("artist", profile.name.clone()),
        ("genre", profile.genre.clone()),
    ];
    if !candidate.description.is_empty() {
        tags.push(("description", candidate.description.clone()));
    }

    let release = candidate.album.as_deref().and_then(|a| profile.release(a));
    if let Some(release) = release {
        tags.push(("album", release.name.clone()));
        tags.push(("album_artist", profile.name.clone()));
        tags.push(("date", release.year.to_string()));
    } else if let Some(album) = &candidate.album {
        tags.push(("album", album.clone()));
    }
    if release.is_none()
        && let Some(year) = candidate.upload_year()
    {
        tags.push(("date", year.to_string()));
    }

    if let Some(location) = &profile.location {
        tags.push(("location", location.clone()));
    }
    if profile.is_viral_hit(&candidate.title) {
        tags.push(("comment", "Viral Hit".to_string()));
    }
    tags
}

/// Downloads through the `yt-dlp` binary, which drives ffmpeg for the
/// audio extraction, thumbnail and metadata.
pub struct YtDlpDownloader {
    binary: PathBuf,
    settings: DownloadSettings,
}

impl YtDlpDownloader {
    pub fn new(binary: impl Into<PathBuf>, settings: DownloadSettings) -> Self {
        YtDlpDownloader {
            binary: binary.into(),
            settings,
        }
    }

    pub fn args(&self, request: &DownloadRequest) -> Vec<String> {
        let s = &self.settings;
        let mut args = vec![
            "--quiet".to_string(),
            "--no-warnings".to_string(),
            "--no-playlist".to_string(),
            "-f".to_string(),
            s.quality.clone(),
            "-x".to_string(),
            "--audio-format".to_string(),
            s.format.clone(),
            "--audio-quality".to_string(),
            format!("{}K", s.bitrate),
            "--postprocessor-args".to_string(),
            format!("ExtractAudio:-ar {}", s.sample_rate),
            "-o".to_string(),
            request.output_template.to_string_lossy().into_owned(),
        ];

        if s.embed_thumbnail {
            args.push("--embed-thumbnail".to_string());
        }
        if s.embed_metadata {
            args.push("--embed-metadata".to_string());
            if !request.tags.is_empty() {
                let fields: Vec<String> = request
                    .tags
                    .iter()
                    .map(|(key, value)| format!("-metadata {}", shell_quote(&format!("{}={}", key, value))))
                    .collect();
                args.push("--postprocessor-args".to_string());
                args.push(format!("Metadata:{}", fields.join(" ")));
            }
        }

        args.push("--".to_string());
        args.push(request.url.clone());
        args
    }
}

impl Downloader for YtDlpDownloader {
    fn download(&mut self, request: &DownloadRequest) -> Result<(), DownloadError> {
        let args = self.args(request);
        debug!("Running {:?} {:?}", self.binary, args);

        let output = Command::new(&self.binary)
            .args(&args)
            .output()
            .map_err(DownloadError::Spawn)?;

        if !output.status.success() {
            return Err(DownloadError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}

/// yt-dlp splits postprocessor arguments shell style.
fn shell_quote(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemOutcome {
    Downloaded,
    Skipped,
    Failed,
}

/// Walks a ranked list and downloads each entry in turn.
pub struct DownloadSession<'a, D> {
    downloader: D,
    profile: &'a ArtistProfile,
    layout: &'a Layout,
    settings: DownloadSettings,
    cancel: CancelToken,
    stats: DownloadStats,
}

impl<'a, D: Downloader> DownloadSession<'a, D> {
    pub fn new(
        downloader: D,
        profile: &'a ArtistProfile,
        layout: &'a Layout,
        settings: DownloadSettings,
        cancel: CancelToken,
    ) -> Self {
        DownloadSession {
            downloader,
            profile,
            layout,
            settings,
            cancel,
            stats: DownloadStats::default(),
        }
    }

    /// Carries counters started earlier, e.g. before the search ran.
    #[must_use]
    pub fn with_stats(mut self, stats: DownloadStats) -> Self {
        self.stats = stats;
        self
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    pub fn stats(&self) -> &DownloadStats {
        &self.stats
    }

    pub fn into_stats(self) -> DownloadStats {
        self.stats
    }

    /// Processes candidates in order until done or interrupted.
    pub fn run(&mut self, candidates: &[Candidate]) -> &DownloadStats {
        if self.stats.start_time.is_none() {
            self.stats.start();
        }
        info!("Found {} {} tracks to download", candidates.len(), self.profile.name);

        for (i, candidate) in candidates.iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!("Download interrupted by user");
                break;
            }

            self.stats.total_attempted += 1;
            info!("Processing {}/{}: {}", i + 1, candidates.len(), candidate.title);

            let outcome = self.fetch(candidate);
            if outcome == ItemOutcome::Downloaded
                && i + 1 < candidates.len()
                && !self.settings.delay_between_downloads.is_zero()
            {
                thread::sleep(self.settings.delay_between_downloads);
            }
        }

        self.stats.finish();
        &self.stats
    }

    /// Downloads one candidate with retries, updating the counters.
    pub fn fetch(&mut self, candidate: &Candidate) -> ItemOutcome {
        if self.settings.skip_existing && self.layout.path_for(self.profile, candidate).exists() {
            info!("Skipping existing: {}", candidate.title);
            self.stats.skipped += 1;
            return ItemOutcome::Skipped;
        }

        let request = DownloadRequest {
            url: candidate.url.clone(),
            output_template: self.layout.output_template(self.profile, candidate),
            tags: if self.settings.embed_metadata {
                tags_for(self.profile, candidate)
            } else {
                Vec::new()
            },
        };

        let retry = &self.settings.retry;
        let max_attempts = retry.max_attempts.max(1);
        for attempt in 0..max_attempts {
            debug!("Downloading (attempt {}): {}", attempt + 1, candidate.title);
            match self.downloader.download(&request) {
                Ok(()) => {
                    self.stats.record_success(candidate.album.as_deref());
                    return ItemOutcome::Downloaded;
                }
                Err(e) if e.is_retryable() && attempt + 1 < max_attempts => {
                    let delay = retry.delay_for_attempt(attempt);
                    if self.cancel.is_cancelled() {
                        warn!("Download failed, not retrying after interrupt: {}", e);
                        break;
                    }
                    warn!(
                        "Download failed (attempt {}/{}, retrying in {:?}): {}",
                        attempt + 1,
                        max_attempts,
                        delay,
                        e
                    );
                    thread::sleep(delay);
                    if self.cancel.is_cancelled() {
                        info!("Retry of {} abandoned after interrupt", candidate.title);
                        break;
                    }
                }
                Err(e) => {
                    error!("Failed to download {}: {}", candidate.title, e);
                    break;
                }
            }
        }

        self.stats.failed += 1;
        ItemOutcome::Failed
    }
}
