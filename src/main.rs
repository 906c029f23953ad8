#![allow(clippy::uninlined_format_args)]

use std::io::Write;
use std::path::{Path, PathBuf};

use clap::Parser;
use log::{error, info, warn};

use muscout::cli::{Cli, Commands, DownloadArgs};
use muscout::download::{DownloadSession, YtDlpDownloader};
use muscout::fs::Layout;
use muscout::stats::{DownloadStats, RunConfig, StatsReport, log_summary};
use muscout::{ArtistProfile, CancelToken, Collector, RankedCandidateList, YtDlp};
use muscout::{export, logging, pipeline, playlists};

fn main() {
    let cli = Cli::parse();

    let profile = match ArtistProfile::load(&cli.profile) {
        Ok(profile) => profile,
        Err(e) => {
            logging::init(cli.verbosity, "MUSCOUT");
            error!("{}", e);
            std::process::exit(1);
        }
    };
    logging::init(cli.verbosity, &profile.log_label());

    if let Err(e) = run(cli, &profile) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli, profile: &ArtistProfile) -> muscout::Result<()> {
    // the reported duration covers the search as well as the downloads
    let mut stats = DownloadStats::default();
    stats.start();

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        ctrlc::set_handler(move || {
            warn!("Interrupt received, stopping after the current step");
            cancel.cancel();
        })?;
    }

    let mut collector = Collector::new(YtDlp::new(&cli.search.yt_dlp))
        .per_query_cap(cli.search.per_query)
        .query_delay(cli.search.delay)
        .cancel_token(cancel.clone());

    let outcome = pipeline::run(profile, &mut collector, cli.search.max_results);
    if outcome.interrupted {
        warn!(
            "Search interrupted, {} tracks collected before the interrupt",
            outcome.list.len()
        );
    }

    match cli.command {
        Commands::Search { json, csv } => {
            print_list(&outcome.list, json)?;
            if let Some(path) = csv {
                export::write_csv(std::fs::File::create(&path)?, &outcome.list)?;
                info!("Wrote {:?}", path);
            }
        }
        Commands::Download(args) => {
            if outcome.list.is_empty() {
                error!("No {} tracks found!", profile.name);
                return Ok(());
            }
            if outcome.interrupted {
                print_list(&outcome.list, false)?;
                return Ok(());
            }
            download(
                profile,
                &outcome.list,
                &args,
                cli.search.max_results,
                &cli.search.yt_dlp,
                cancel,
                stats,
            )?;
        }
    }

    Ok(())
}

fn print_list(list: &RankedCandidateList, json: bool) -> muscout::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if json {
        export::write_json(&mut out, list)?;
    } else {
        export::write_table(&mut out, list)?;
    }
    out.flush()?;
    Ok(())
}

fn download(
    profile: &ArtistProfile,
    list: &RankedCandidateList,
    args: &DownloadArgs,
    max_results: usize,
    yt_dlp: &Path,
    cancel: CancelToken,
    stats: DownloadStats,
) -> muscout::Result<()> {
    let output_dir = args
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{}_Music", profile.slug())));
    let settings = args.settings();
    let layout = Layout::new(output_dir, &settings.format, !args.flat);
    layout.prepare(profile)?;

    let downloader = YtDlpDownloader::new(yt_dlp, settings.clone());
    let mut session = DownloadSession::new(downloader, profile, &layout, settings.clone(), cancel)
        .with_stats(stats);
    session.run(list);
    let stats = session.into_stats();

    playlists::write_all(&layout, profile, list)?;

    let config = RunConfig {
        artist: profile.name.clone(),
        max_songs: max_results,
        quality: settings.quality.clone(),
        format: settings.format.clone(),
        bitrate: settings.bitrate,
        organize_by_album: layout.organize_by_album(),
    };
    let stats_path = layout.base().join(profile.stats_file_name());
    StatsReport::new(&stats, profile, config).save(&stats_path)?;

    log_summary(&stats, profile, layout.base());
    Ok(())
}
