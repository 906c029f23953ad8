// Clap definitions in derive style

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::collector::{DEFAULT_PER_QUERY_CAP, DEFAULT_QUERY_DELAY};
use crate::download::{DownloadSettings, RetryConfig};

#[derive(Parser)]
#[command(name = "muscout", version, about)]
pub struct Cli {
    /// Increase verbosity (-v = info, -vv = debug, -vvv = trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbosity: u8,

    /// Artist profile (JSON)
    #[arg(short = 'p', long = "profile", value_name = "PROFILE")]
    pub profile: PathBuf,

    #[command(flatten)]
    pub search: SearchArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Maximum number of tracks to keep
    #[arg(short = 'm', long = "max", default_value_t = 75, global = true)]
    pub max_results: usize,

    /// Results requested per search query
    #[arg(long = "per-query", default_value_t = DEFAULT_PER_QUERY_CAP, global = true)]
    pub per_query: usize,

    /// Seconds to wait between two search queries
    #[arg(long = "delay", value_parser = parse_seconds, default_value = "1.5", global = true)]
    pub delay: Duration,

    /// Path to the yt-dlp binary
    #[arg(long = "yt-dlp", default_value = "yt-dlp", global = true)]
    pub yt_dlp: PathBuf,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search and print the ranked track list
    Search {
        /// Print JSON instead of a table
        #[arg(long = "json", default_value_t = false)]
        json: bool,

        /// Also write the list to a CSV file
        #[arg(long = "csv", value_name = "FILE")]
        csv: Option<PathBuf>,
    },

    /// Search, then download the audio of every ranked track
    Download(DownloadArgs),
}

#[derive(Args)]
pub struct DownloadArgs {
    /// Output directory (defaults to <artist>_Music)
    #[arg(short = 'o', long = "output")]
    pub output_dir: Option<PathBuf>,

    /// yt-dlp format selector
    #[arg(long = "quality", default_value = "bestaudio/best")]
    pub quality: String,

    /// Audio format to transcode to
    #[arg(short = 'f', long = "format", default_value = "mp3")]
    pub format: String,

    /// Audio bitrate in kbps
    #[arg(long = "bitrate", default_value_t = 320)]
    pub bitrate: u32,

    /// Output sample rate in Hz
    #[arg(long = "sample-rate", default_value_t = 44100)]
    pub sample_rate: u32,

    /// Attempts per track
    #[arg(long = "retries", default_value_t = 3)]
    pub retries: u32,

    /// Seconds to wait between two downloads
    #[arg(long = "download-delay", value_parser = parse_seconds, default_value = "2.0")]
    pub download_delay: Duration,

    /// Put every track in the output directory instead of album folders
    #[arg(long = "flat", default_value_t = false)]
    pub flat: bool,

    /// Do not embed the thumbnail as cover art
    #[arg(long = "no-thumbnail", default_value_t = false)]
    pub no_thumbnail: bool,

    /// Do not embed metadata
    #[arg(long = "no-metadata", default_value_t = false)]
    pub no_metadata: bool,

    /// Download again even if the file exists
    #[arg(long = "no-skip-existing", default_value_t = false)]
    pub no_skip_existing: bool,
}

impl DownloadArgs {
    pub fn settings(&self) -> DownloadSettings {
        DownloadSettings {
            quality: self.quality.clone(),
            format: self.format.clone(),
            bitrate: self.bitrate,
            sample_rate: self.sample_rate,
            embed_thumbnail: !self.no_thumbnail,
            embed_metadata: !self.no_metadata,
            skip_existing: !self.no_skip_existing,
            delay_between_downloads: self.download_delay,
            retry: RetryConfig {
                max_attempts: self.retries.max(1),
                ..Default::default()
            },
        }
    }
}

fn parse_seconds(value: &str) -> Result<Duration, String> {
    let secs: f64 = value
        .parse()
        .map_err(|_| format!("'{}' is not a number of seconds", value))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("'{}' is not a valid delay", value));
    }
    Ok(Duration::from_secs_f64(secs))
}
