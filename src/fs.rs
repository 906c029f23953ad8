use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::debug;
use regex::Regex;

use crate::candidate::Candidate;
use crate::profile::ArtistProfile;

pub const SINGLES_DIR: &str = "Singles";

const MAX_FILENAME_LEN: usize = 150;

static INVALID_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"[<>:"/\\|?*]"#).unwrap());
static BRACKETS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[.*?\]").unwrap());
static NOISE_PARENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\((?:[^)]*?official[^)]*?|[^)]*?music[^)]*?video[^)]*?|[^)]*?audio[^)]*?|[^)]*?remix[^)]*?)\)")
        .unwrap()
});
static SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Makes a video title usable as a file name: strips reserved characters,
/// bracketed tags and "(Official …)" style suffixes.
pub fn clean_filename(name: &str) -> String {
    let name = INVALID_CHARS.replace_all(name, "");
    let name = BRACKETS.replace_all(&name, "");
    let name = NOISE_PARENS.replace_all(&name, "");
    let name = SPACES.replace_all(&name, " ");
    let name = name.trim();

    match name.char_indices().nth(MAX_FILENAME_LEN) {
        Some((cut, _)) => name[..cut].trim_end().to_string(),
        None => name.to_string(),
    }
}

/// Where downloads land on disk.
#[derive(Debug, Clone)]
pub struct Layout {
    base: PathBuf,
    format: String,
    organize_by_album: bool,
}

impl Layout {
    pub fn new(base: impl Into<PathBuf>, format: &str, organize_by_album: bool) -> Self {
        Layout {
            base: base.into(),
            format: format.to_string(),
            organize_by_album,
        }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn organize_by_album(&self) -> bool {
        self.organize_by_album
    }

    /// Creates the root and, when organizing, one folder per release, the
    /// singles folder and the profile's special folders.
    pub fn prepare(&self, profile: &ArtistProfile) -> std::io::Result<()> {
        fs::create_dir_all(&self.base)?;
        if !self.organize_by_album {
            return Ok(());
        }

        let releases = profile.releases.iter().map(|r| clean_filename(&r.name));
        let special = profile.folders.iter().map(|f| clean_filename(&f.name));
        for dir in releases
            .chain(std::iter::once(SINGLES_DIR.to_string()))
            .chain(special)
        {
            let path = self.base.join(dir);
            debug!("Preparing {:?}", path);
            fs::create_dir_all(path)?;
        }
        Ok(())
    }

    /// Folder for a candidate: the profile's special folders in order, known
    /// album, single, then the root. First match wins.
    pub fn dir_for(&self, profile: &ArtistProfile, candidate: &Candidate) -> PathBuf {
        if !self.organize_by_album {
            return self.base.clone();
        }

        if let Some(folder) = profile.folder_for(&candidate.title) {
            return self.base.join(clean_filename(&folder.name));
        }
        if let Some(album) = &candidate.album
            && profile.release(album).is_some()
        {
            return self.album_dir(album);
        }
        if profile.is_popular_single(&candidate.title) {
            return self.base.join(SINGLES_DIR);
        }
        self.base.clone()
    }

    pub fn album_dir(&self, album: &str) -> PathBuf {
        self.base.join(clean_filename(album))
    }

    pub fn file_name(&self, candidate: &Candidate) -> String {
        format!("{}.{}", clean_filename(&candidate.title), self.format)
    }

    /// Final audio file path once transcoded.
    pub fn path_for(&self, profile: &ArtistProfile, candidate: &Candidate) -> PathBuf {
        self.dir_for(profile, candidate).join(self.file_name(candidate))
    }

    /// yt-dlp output template, extension left to yt-dlp.
    pub fn output_template(&self, profile: &ArtistProfile, candidate: &Candidate) -> PathBuf {
        self.dir_for(profile, candidate)
            .join(format!("{}.%(ext)s", clean_filename(&candidate.title)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::sample;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn candidate(title: &str, album: Option<&str>) -> Candidate {
        Candidate {
            title: title.to_string(),
            url: "https://y/1".into(),
            id: "1".into(),
            duration: None,
            view_count: None,
            uploader: String::new(),
            upload_date: String::new(),
            description: String::new(),
            album: album.map(String::from),
            search_query: String::new(),
        }
    }

    #[rstest]
    #[case("Blueface - Thotiana (Official Music Video)", "Blueface - Thotiana")]
    #[case("Blueface - Bleed It [HD] (Audio)", "Blueface - Bleed It")]
    #[case("AC/DC: Back in Black?", "ACDC Back in Black")]
    #[case("Song (Remix) (feat. Offset)", "Song (feat. Offset)")]
    #[case("   spaced    out   ", "spaced out")]
    fn cleans_filenames(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(clean_filename(input), expected);
    }

    #[test]
    fn caps_filename_length() {
        let long = "x".repeat(400);
        assert_eq!(clean_filename(&long).chars().count(), 150);
    }

    #[rstest]
    #[case("Blueface x Lil Pump - Bust Down", None, "Collaborations")]
    #[case("Blueface - Bleed It", Some("Find the Beat"), "Viral_Hits")]
    #[case("Blueface - Obama", Some("Find the Beat"), "Find the Beat")]
    #[case("Blueface - Holy Moly", None, "Singles")]
    #[case("Blueface - Unknown", Some("Not A Release"), "")]
    fn routes_by_priority(#[case] title: &str, #[case] album: Option<&str>, #[case] dir: &str) {
        let layout = Layout::new("/music", "mp3", true);
        let expected = if dir.is_empty() {
            PathBuf::from("/music")
        } else {
            Path::new("/music").join(dir)
        };
        assert_eq!(layout.dir_for(&sample(), &candidate(title, album)), expected);
    }

    #[test]
    fn flat_layout_ignores_albums() {
        let layout = Layout::new("/music", "mp3", false);
        let song = candidate("Blueface - Obama (Official Audio)", Some("Find the Beat"));
        assert_eq!(
            layout.path_for(&sample(), &song),
            PathBuf::from("/music/Blueface - Obama.mp3")
        );
        assert_eq!(
            layout.output_template(&sample(), &song),
            PathBuf::from("/music/Blueface - Obama.%(ext)s")
        );
    }

    #[test]
    fn prepare_creates_release_and_special_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = Layout::new(tmp.path().join("Blueface_Music"), "mp3", true);
        layout.prepare(&sample()).unwrap();

        for dir in ["Find the Beat", "Famous Cryp", "Singles", "Collaborations", "Viral_Hits"] {
            assert!(layout.base().join(dir).is_dir(), "missing {}", dir);
        }
    }

    fn drill_profile() -> ArtistProfile {
        ArtistProfile::from_json(
            r#"{
                "name": "Juice WRLD",
                "signature_term": "lucid dreams",
                "releases": [{ "name": "Death Race for Love", "type": "Album", "year": 2019 }],
                "popular_singles": ["Lucid Dreams"],
                "folders": [
                    { "name": "Collaborations", "patterns": [" feat", " ft."] },
                    { "name": "Tributes", "patterns": ["tribute", "rip"] }
                ]
            }"#,
        )
        .unwrap()
    }

    #[rstest]
    #[case("Juice WRLD - Lucid Dreams (feat. Someone)", None, "Collaborations")]
    #[case("Juice WRLD tribute mix", Some("Death Race for Love"), "Tributes")]
    #[case("Juice WRLD - Robbery", Some("Death Race for Love"), "Death Race for Love")]
    #[case("Juice WRLD - Lucid Dreams", None, "Singles")]
    fn routes_by_profile_folders(
        #[case] title: &str,
        #[case] album: Option<&str>,
        #[case] dir: &str,
    ) {
        let layout = Layout::new("/music", "mp3", true);
        assert_eq!(
            layout.dir_for(&drill_profile(), &candidate(title, album)),
            Path::new("/music").join(dir)
        );
    }

    #[test]
    fn prepare_creates_profile_folders_only() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = Layout::new(tmp.path(), "mp3", true);
        layout.prepare(&drill_profile()).unwrap();

        for dir in ["Death Race for Love", "Singles", "Collaborations", "Tributes"] {
            assert!(layout.base().join(dir).is_dir(), "missing {}", dir);
        }
        assert!(!layout.base().join("Viral_Hits").exists());
    }
}
