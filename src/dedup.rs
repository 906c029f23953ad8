use std::collections::HashSet;

use log::trace;

use crate::candidate::Candidate;

/// Normalizes a title for fuzzy comparison: lowercase, alphanumerics and
/// single spaces only.
pub fn normalize_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remembers every title key and URL it has let through.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen_titles: HashSet<String>,
    seen_urls: HashSet<String>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` and records the candidate's keys if neither was seen.
    pub fn admit(&mut self, candidate: &Candidate) -> bool {
        let title_key = normalize_title(&candidate.title);

        if self.seen_titles.contains(&title_key) || self.seen_urls.contains(&candidate.url) {
            trace!("Duplicate dropped: {:?} ({})", candidate.title, candidate.url);
            return false;
        }

        self.seen_titles.insert(title_key);
        self.seen_urls.insert(candidate.url.clone());
        true
    }
}

/// Drops repeated titles or URLs in one pass, keeping first occurrences in order.
pub fn dedupe(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = Deduplicator::new();
    candidates.into_iter().filter(|c| seen.admit(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn candidate(title: &str, url: &str, views: u64) -> Candidate {
        Candidate {
            title: title.to_string(),
            url: url.to_string(),
            id: String::new(),
            duration: None,
            view_count: Some(views),
            uploader: String::new(),
            upload_date: String::new(),
            description: String::new(),
            album: None,
            search_query: String::new(),
        }
    }

    #[rstest]
    #[case("Blueface - Thotiana (Official Video)", "blueface  thotiana official video")]
    #[case("  Stop   Cappin'  ", "stop cappin")]
    #[case("A ", "a")]
    #[case("¡Ñandú! 999", "ñandú 999")]
    fn normalizes_titles(#[case] input: &str, #[case] expected: &str) {
        let expected = expected.split_whitespace().collect::<Vec<_>>().join(" ");
        assert_eq!(normalize_title(input), expected);
    }

    #[test]
    fn keeps_first_of_same_normalized_title() {
        let kept = dedupe(vec![
            candidate("A", "https://y/1", 100),
            candidate("A ", "https://y/2", 50),
        ]);
        assert_eq!(kept, vec![candidate("A", "https://y/1", 100)]);
    }

    #[test]
    fn drops_repeated_url_with_new_title() {
        let kept = dedupe(vec![
            candidate("Thotiana", "https://y/1", 10),
            candidate("Thotiana Remix", "https://y/1", 20),
            candidate("Bleed It", "https://y/3", 30),
        ]);
        let titles: Vec<&str> = kept.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Thotiana", "Bleed It"]);
    }

    #[test]
    fn output_has_unique_keys_and_urls() {
        let input = vec![
            candidate("Song (Lyrics)", "u1", 1),
            candidate("song lyrics", "u2", 2),
            candidate("Song - Lyrics!", "u3", 3),
            candidate("Other", "u2", 4),
            candidate("Third", "u4", 5),
        ];
        let kept = dedupe(input);

        let keys: HashSet<String> = kept.iter().map(|c| normalize_title(&c.title)).collect();
        let urls: HashSet<&str> = kept.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(keys.len(), kept.len());
        assert_eq!(urls.len(), kept.len());
        // "Other" reuses u2, but u2 was never admitted
        assert_eq!(kept.len(), 3);
    }

    #[test]
    fn rejected_candidates_leave_no_trace() {
        let mut dedup = Deduplicator::new();
        assert!(dedup.admit(&candidate("One", "u1", 0)));
        assert!(!dedup.admit(&candidate("one", "u9", 0)));
        // u9 was not recorded by the rejection
        assert!(dedup.admit(&candidate("Two", "u9", 0)));
        assert!(!dedup.admit(&candidate("Three", "u1", 0)));
    }
}
