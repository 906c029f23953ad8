use std::cmp::Reverse;

use crate::candidate::Candidate;

/// Sort key of one candidate. Larger is better in every field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    views: u64,
    signature: bool,
    official: bool,
    music_video: bool,
}

impl RankKey {
    fn of(candidate: &Candidate, signature_term: &str) -> Self {
        let title = candidate.title.to_lowercase();
        RankKey {
            views: candidate.views(),
            signature: !signature_term.is_empty() && title.contains(signature_term),
            official: title.contains("official"),
            music_video: title.contains("music video"),
        }
    }
}

/// Orders candidates by views, then signature hit, "official" and
/// "music video" in the title. Full ties keep their input order.
pub fn rank(candidates: Vec<Candidate>, signature_term: &str) -> Vec<Candidate> {
    let signature_term = signature_term.to_lowercase();
    let mut keyed: Vec<(Reverse<RankKey>, Candidate)> = candidates
        .into_iter()
        .map(|c| (Reverse(RankKey::of(&c, &signature_term)), c))
        .collect();

    // sort_by is stable
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    keyed.into_iter().map(|(_, c)| c).collect()
}
