use serde::Serialize;

use crate::profile::ArtistProfile;

const CANONICAL_SUFFIXES: [&str; 5] = [
    "official music video",
    "official audio",
    "clean version",
    "explicit version",
    "lyrics video",
];

const RELEASE_SUFFIXES: [&str; 3] = ["full album", "official", "playlist"];

/// What part of the profile produced a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum QueryIntent {
    Canonical,
    Album,
    ViralHit,
    Single,
    Thematic,
    Collaboration,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchQuery {
    pub text: String,
    pub intent: QueryIntent,
}

impl SearchQuery {
    fn new(artist: &str, subject: &str, intent: QueryIntent) -> Self {
        SearchQuery {
            text: format!("{} {}", artist, subject),
            intent,
        }
    }
}

/// Builds the ordered query list for a profile, official material first.
///
/// `_max_results` does not bound the list; the collector decides how many of
/// these queries are actually sent.
pub fn generate_queries(profile: &ArtistProfile, _max_results: usize) -> Vec<SearchQuery> {
    let artist = profile.name.as_str();
    let limits = &profile.query_limits;
    let mut queries = Vec::new();

    for suffix in CANONICAL_SUFFIXES {
        queries.push(SearchQuery::new(artist, suffix, QueryIntent::Canonical));
    }

    for release in &profile.releases {
        for suffix in RELEASE_SUFFIXES {
            let subject = format!("{} {}", release.name, suffix);
            queries.push(SearchQuery::new(artist, &subject, QueryIntent::Album));
        }
    }

    for hit in profile.viral_hits.iter().take(limits.top_hits) {
        for variant in &limits.hit_variants {
            let subject = format!("{} {}", hit, variant);
            queries.push(SearchQuery::new(artist, &subject, QueryIntent::ViralHit));
        }
    }

    for single in profile.popular_singles.iter().take(limits.singles) {
        let subject = format!("{} official", single);
        queries.push(SearchQuery::new(artist, &subject, QueryIntent::Single));
    }

    for theme in &profile.theme_queries {
        queries.push(SearchQuery::new(artist, theme, QueryIntent::Thematic));
    }

    for collab in profile.collaborations.iter().take(limits.collaborators) {
        queries.push(SearchQuery::new(
            artist,
            &collab.artist,
            QueryIntent::Collaboration,
        ));
    }

    queries
}
