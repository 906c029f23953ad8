use crate::profile::ArtistProfile;

/// Markers of talk, reaction and cover content. Checked before anything else.
const DENY_PATTERNS: [&str; 15] = [
    "interview",
    "reaction",
    "review",
    "analysis",
    "behind the scenes",
    "making of",
    "documentary",
    "news",
    "explaining",
    "breakdown",
    "meaning",
    "commentary",
    "cover song",
    "karaoke",
    "acoustic cover",
];

const MUSIC_INDICATORS: [&str; 13] = [
    "official music video",
    "official audio",
    "lyrics",
    "visualizer",
    "remix",
    "clean version",
    "explicit",
    "radio edit",
    "instrumental",
    "bass boosted",
    "slowed",
    "reverb",
    "sped up",
];

/// Decides whether a search result is music: deny, then themed allow, then
/// generic allow.
#[derive(Debug, Clone)]
pub struct ContentFilter {
    allow_keywords: Vec<String>,
    known_titles: Vec<String>,
}

impl ContentFilter {
    pub fn new(profile: &ArtistProfile) -> Self {
        ContentFilter {
            allow_keywords: profile
                .allow_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            known_titles: profile.known_titles(),
        }
    }

    pub fn is_music(&self, title: &str, description: &str) -> bool {
        let title = title.to_lowercase();
        let description = description.to_lowercase();

        if DENY_PATTERNS
            .iter()
            .any(|p| title.contains(p) || description.contains(p))
        {
            return false;
        }

        if self.allow_keywords.iter().any(|k| title.contains(k.as_str())) {
            return true;
        }

        MUSIC_INDICATORS.iter().any(|i| title.contains(i))
            || self.known_titles.iter().any(|t| title.contains(t.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::sample;
    use rstest::rstest;

    fn juice_filter() -> ContentFilter {
        let profile = ArtistProfile::from_json(
            r#"{
                "name": "Juice WRLD",
                "popular_singles": ["Lucid Dreams"],
                "allow_keywords": ["tribute", "rip", "emo"],
                "signature_term": "lucid dreams"
            }"#,
        )
        .unwrap();
        ContentFilter::new(&profile)
    }

    #[rstest]
    #[case("Artist Tribute Reaction", "", false)]
    #[case("Artist - Song (Official Music Video)", "", true)]
    #[case("Juice WRLD Tribute Mix", "", true)]
    #[case("Juice WRLD - Lucid Dreams", "", true)]
    #[case("Juice WRLD - Robbery", "", false)]
    #[case("Juice WRLD - Robbery (Lyrics)", "full interview inside", false)]
    #[case("Juice WRLD Documentary", "", false)]
    #[case("JUICE WRLD - WISHING WELL (SLOWED)", "", true)]
    fn classifies_titles(#[case] title: &str, #[case] description: &str, #[case] expected: bool) {
        assert_eq!(juice_filter().is_music(title, description), expected);
    }

    #[test]
    fn deny_beats_allow_keyword() {
        let filter = ContentFilter::new(&sample());
        assert!(filter.is_music("Blueface TikTok Dance", ""));
        assert!(!filter.is_music("Blueface TikTok Dance Reaction", ""));
    }

    #[test]
    fn allow_keywords_only_read_the_title() {
        let filter = ContentFilter::new(&sample());
        assert!(!filter.is_music("Blueface live in LA", "viral tiktok dance"));
    }

    #[test]
    fn album_tracks_count_as_known_titles() {
        let filter = ContentFilter::new(&sample());
        assert!(filter.is_music("Blueface - Dead Locs", ""));
    }
}
