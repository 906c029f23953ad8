use std::fmt;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::ProfileError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseType {
    Album,
    #[serde(rename = "EP")]
    Ep,
    Mixtape,
    Single,
    Posthumous,
    #[serde(rename = "Viral Hit")]
    ViralHit,
}

impl fmt::Display for ReleaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReleaseType::Album => "Album",
            ReleaseType::Ep => "EP",
            ReleaseType::Mixtape => "Mixtape",
            ReleaseType::Single => "Single",
            ReleaseType::Posthumous => "Posthumous",
            ReleaseType::ViralHit => "Viral Hit",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Release {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ReleaseType,
    pub year: u16,
    #[serde(default)]
    pub tracks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaboration {
    pub artist: String,
    pub track: String,
}

/// How many entries of each table feed the query generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryLimits {
    pub top_hits: usize,
    pub hit_variants: Vec<String>,
    pub singles: usize,
    pub collaborators: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        QueryLimits {
            top_hits: 5,
            hit_variants: vec!["official".into(), "remix".into(), "lyrics".into()],
            singles: 8,
            collaborators: 5,
        }
    }
}

/// Title test shared by special folders and themed playlists. Any one rule
/// matching is enough.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitleMatch {
    /// Lower-case substrings looked for in the title.
    pub patterns: Vec<String>,
    /// Matches titles naming a known collaboration.
    pub known_collaborations: bool,
    /// Matches titles containing a viral hit.
    pub viral_hits: bool,
}

impl TitleMatch {
    pub fn matches(&self, profile: &ArtistProfile, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.patterns
            .iter()
            .any(|p| !p.is_empty() && lower.contains(&p.to_lowercase()))
            || (self.known_collaborations && profile.collaboration_in(title).is_some())
            || (self.viral_hits && profile.is_viral_hit(title))
    }
}

/// A folder under the output root that claims matching titles ahead of the
/// album folders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecialFolder {
    pub name: String,
    #[serde(flatten)]
    pub rule: TitleMatch,
}

/// An extra playlist written at the output root, e.g. `Viral_Hits.m3u`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemedPlaylist {
    /// File stem of the playlist.
    pub name: String,
    /// Shown after the artist name in the `#PLAYLIST` header.
    pub title: String,
    #[serde(flatten)]
    pub rule: TitleMatch,
}

fn default_genre() -> String {
    "Hip-Hop".to_string()
}

fn default_folders() -> Vec<SpecialFolder> {
    vec![
        SpecialFolder {
            name: "Collaborations".into(),
            rule: TitleMatch {
                known_collaborations: true,
                ..Default::default()
            },
        },
        SpecialFolder {
            name: "Viral_Hits".into(),
            rule: TitleMatch {
                viral_hits: true,
                ..Default::default()
            },
        },
    ]
}

fn default_playlists() -> Vec<ThemedPlaylist> {
    vec![ThemedPlaylist {
        name: "Viral_Hits".into(),
        title: "Viral Hits".into(),
        rule: TitleMatch {
            viral_hits: true,
            ..Default::default()
        },
    }]
}

/// Static knowledge about one artist. Read-only once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub name: String,
    #[serde(default)]
    slug: Option<String>,
    #[serde(default)]
    log_label: Option<String>,
    #[serde(default = "default_genre")]
    pub genre: String,
    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub releases: Vec<Release>,
    #[serde(default)]
    pub viral_hits: Vec<String>,
    #[serde(default)]
    pub popular_singles: Vec<String>,
    #[serde(default)]
    pub collaborations: Vec<Collaboration>,

    /// Suffixes for the genre/theme queries, e.g. "west coast".
    #[serde(default)]
    pub theme_queries: Vec<String>,
    /// Title keywords that let themed content through the filter.
    #[serde(default)]
    pub allow_keywords: Vec<String>,
    /// The one hit term that wins ranking ties.
    pub signature_term: String,

    #[serde(default)]
    pub query_limits: QueryLimits,

    /// Checked in order when organizing by album; the first match wins.
    #[serde(default = "default_folders")]
    pub folders: Vec<SpecialFolder>,
    #[serde(default = "default_playlists")]
    pub playlists: Vec<ThemedPlaylist>,
}

impl ArtistProfile {
    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let content = std::fs::read_to_string(path).map_err(|source| ProfileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let profile: ArtistProfile =
            serde_json::from_str(&content).map_err(|source| ProfileError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        profile.validate()?;

        debug!(
            "Loaded profile '{}': {} releases, {} viral hits, {} singles, {} collaborations",
            profile.name,
            profile.releases.len(),
            profile.viral_hits.len(),
            profile.popular_singles.len(),
            profile.collaborations.len()
        );
        Ok(profile)
    }

    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let profile: ArtistProfile =
            serde_json::from_str(json).map_err(|source| ProfileError::Parse {
                path: "<inline>".into(),
                source,
            })?;
        profile.validate()?;
        Ok(profile)
    }

    fn validate(&self) -> Result<(), ProfileError> {
        if self.name.trim().is_empty() {
            return Err(ProfileError::Invalid("artist name is empty".into()));
        }
        if self.signature_term.trim().is_empty() {
            return Err(ProfileError::Invalid(format!(
                "signature_term is empty for '{}'",
                self.name
            )));
        }
        Ok(())
    }

    /// File-name stem used for the playlist and statistics outputs.
    pub fn slug(&self) -> String {
        if let Some(slug) = &self.slug {
            return slug.clone();
        }
        self.name
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect()
    }

    pub fn stats_file_name(&self) -> String {
        format!("{}_download_stats.json", self.slug().to_lowercase())
    }

    pub fn log_label(&self) -> String {
        self.log_label
            .clone()
            .unwrap_or_else(|| self.name.to_uppercase())
    }

    pub fn release(&self, name: &str) -> Option<&Release> {
        self.releases.iter().find(|r| r.name == name)
    }

    /// First release whose name shows up in the title or description.
    pub fn infer_album(&self, title: &str, description: &str) -> Option<String> {
        let text = format!("{} {}", title, description).to_lowercase();
        self.releases
            .iter()
            .find(|r| text.contains(&r.name.to_lowercase()))
            .map(|r| r.name.clone())
    }

    /// Every single, hit and release track title, lower-cased and without repeats.
    pub fn known_titles(&self) -> Vec<String> {
        let mut titles: Vec<String> = Vec::new();
        let all = self
            .popular_singles
            .iter()
            .chain(self.viral_hits.iter())
            .chain(self.releases.iter().flat_map(|r| r.tracks.iter()));

        for title in all {
            let lower = title.to_lowercase();
            if !lower.is_empty() && !titles.contains(&lower) {
                titles.push(lower);
            }
        }
        titles
    }

    pub fn is_viral_hit(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.viral_hits
            .iter()
            .any(|hit| lower.contains(&hit.to_lowercase()))
    }

    pub fn is_popular_single(&self, title: &str) -> bool {
        let lower = title.to_lowercase();
        self.popular_singles
            .iter()
            .any(|single| lower.contains(&single.to_lowercase()))
    }

    /// A collaboration whose partner and track both appear in the title.
    pub fn collaboration_in(&self, title: &str) -> Option<&Collaboration> {
        let lower = title.to_lowercase();
        self.collaborations.iter().find(|c| {
            lower.contains(&c.artist.to_lowercase()) && lower.contains(&c.track.to_lowercase())
        })
    }

    pub fn folder_for(&self, title: &str) -> Option<&SpecialFolder> {
        self.folders.iter().find(|f| f.rule.matches(self, title))
    }
}
