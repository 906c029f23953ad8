use serde::{Deserialize, Serialize};

use crate::provider::RawEntry;

/// One search result considered for download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub title: String,
    pub url: String,
    pub id: String,
    /// Seconds.
    pub duration: Option<u64>,
    pub view_count: Option<u64>,
    pub uploader: String,
    pub upload_date: String,
    pub description: String,
    pub album: Option<String>,
    pub search_query: String,
}

impl Candidate {
    /// Builds a candidate from a provider entry. Entries without a title or
    /// without any way to address the video are dropped.
    pub fn from_entry(entry: RawEntry, query: &str) -> Option<Self> {
        let title = entry.title.filter(|t| !t.trim().is_empty())?;
        let id = entry.id.unwrap_or_default();
        let url = entry
            .webpage_url
            .or(entry.url)
            .filter(|u| !u.is_empty())
            .or_else(|| (!id.is_empty()).then(|| format!("https://www.youtube.com/watch?v={}", id)))?;

        Some(Candidate {
            title,
            url,
            id,
            duration: entry.duration.map(|d| d.max(0.0).round() as u64),
            view_count: entry.view_count,
            uploader: entry.uploader.or(entry.channel).unwrap_or_default(),
            upload_date: entry.upload_date.unwrap_or_default(),
            description: entry.description.unwrap_or_default(),
            album: None,
            search_query: query.to_string(),
        })
    }

    pub fn views(&self) -> u64 {
        self.view_count.unwrap_or(0)
    }

    /// Upload year, from the `YYYYMMDD` date yt-dlp reports.
    pub fn upload_year(&self) -> Option<&str> {
        self.upload_date
            .get(..4)
            .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
    }
}
