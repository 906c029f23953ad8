use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use log::{debug, info};

use crate::candidate::Candidate;
use crate::fs::Layout;
use crate::profile::ArtistProfile;

/// An extended M3U playlist in memory.
pub struct Playlist {
    pub name: String,
    header: Vec<String>,
    entries: Vec<(String, String)>,
}

impl Playlist {
    pub fn new(name: &str) -> Self {
        Playlist {
            name: name.to_string(),
            header: vec![
                format!("#PLAYLIST: {}", name),
                format!("#GENERATED: {}", Local::now().format("%Y-%m-%d %H:%M:%S")),
            ],
            entries: Vec::new(),
        }
    }

    pub fn header_line(mut self, line: String) -> Self {
        self.header.push(line);
        self
    }

    pub fn push(&mut self, candidate: &Candidate, location: String) {
        let duration = candidate
            .duration
            .map_or_else(|| "-1".to_string(), |d| d.to_string());
        self.entries
            .push((format!("#EXTINF:{},{}", duration, candidate.title), location));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn save_to_m3u(&self, path: &Path) -> std::io::Result<()> {
        let mut m3u_file = BufWriter::new(File::create(path)?);

        writeln!(m3u_file, "#EXTM3U")?;
        for line in &self.header {
            writeln!(m3u_file, "{}", line)?;
        }
        writeln!(m3u_file)?;

        for (extinf, location) in &self.entries {
            writeln!(m3u_file, "{}", extinf)?;
            writeln!(m3u_file, "{}", location)?;
        }
        m3u_file.flush()?;

        debug!("Wrote {} entries to {:?}", self.entries.len(), path);
        Ok(())
    }
}

/// Playlist paths are written with forward slashes whatever the platform.
fn relative(path: &Path, from: &Path) -> Option<String> {
    let rel = path.strip_prefix(from).ok()?;
    Some(
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
    )
}

/// Writes the complete playlist and, when organizing by album, one playlist
/// per album plus the profile's themed playlists. Only files present on disk
/// are listed; playlists without entries are not written.
pub fn write_all(
    layout: &Layout,
    profile: &ArtistProfile,
    candidates: &[Candidate],
) -> std::io::Result<Vec<PathBuf>> {
    let base = layout.base();
    let on_disk: Vec<(&Candidate, PathBuf)> = candidates
        .iter()
        .map(|c| (c, layout.path_for(profile, c)))
        .filter(|(_, path)| path.exists())
        .collect();
    let mut written = Vec::new();

    let mut complete = Playlist::new(&format!("{} Complete Discography", profile.name))
        .header_line(format!("#GENRE: {}", profile.genre));
    for (candidate, path) in &on_disk {
        if let Some(location) = relative(path, base) {
            complete.push(candidate, location);
        }
    }
    if !complete.is_empty() {
        let path = base.join(format!("{}_Complete.m3u", profile.slug()));
        complete.save_to_m3u(&path)?;
        written.push(path);
    }

    if !layout.organize_by_album() {
        return Ok(written);
    }

    for release in &profile.releases {
        let album_dir = layout.album_dir(&release.name);
        let mut playlist = Playlist::new(&format!("{} by {}", release.name, profile.name));

        for (candidate, path) in &on_disk {
            if candidate.album.as_deref() != Some(release.name.as_str()) {
                continue;
            }
            // tracks routed elsewhere (hits, collaborations) are reached from the album folder
            let location = relative(path, &album_dir)
                .or_else(|| relative(path, base).map(|r| format!("../{}", r)));
            if let Some(location) = location {
                playlist.push(candidate, location);
            }
        }

        if !playlist.is_empty() && album_dir.is_dir() {
            let path = album_dir.join(format!("{}.m3u", crate::fs::clean_filename(&release.name)));
            playlist.save_to_m3u(&path)?;
            written.push(path);
        }
    }

    for themed in &profile.playlists {
        let mut playlist = Playlist::new(&format!("{} {}", profile.name, themed.title));
        for (candidate, path) in &on_disk {
            if themed.rule.matches(profile, &candidate.title)
                && let Some(location) = relative(path, base)
            {
                playlist.push(candidate, location);
            }
        }
        if !playlist.is_empty() {
            let path = base.join(format!("{}.m3u", crate::fs::clean_filename(&themed.name)));
            playlist.save_to_m3u(&path)?;
            written.push(path);
        }
    }

    info!("Created {} playlists", written.len());
    Ok(written)
}
