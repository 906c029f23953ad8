use std::ops::Deref;

use log::info;

use crate::candidate::Candidate;
use crate::collector::Collector;
use crate::dedup::Deduplicator;
use crate::filter::ContentFilter;
use crate::profile::ArtistProfile;
use crate::provider::SearchProvider;
use crate::query::generate_queries;
use crate::rank::rank;

/// Filtered, de-duplicated candidates in rank order, never longer than the
/// requested maximum.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedCandidateList(Vec<Candidate>);

impl RankedCandidateList {
    fn new(mut candidates: Vec<Candidate>, max_results: usize) -> Self {
        candidates.truncate(max_results);
        RankedCandidateList(candidates)
    }

    pub fn into_inner(self) -> Vec<Candidate> {
        self.0
    }
}

impl Deref for RankedCandidateList {
    type Target = [Candidate];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutcome {
    pub list: RankedCandidateList,
    /// The search loop was stopped early; `list` holds what came before.
    pub interrupted: bool,
}

/// Runs query generation, collection, filtering, de-duplication and ranking
/// for one profile.
pub fn run<P: SearchProvider>(
    profile: &ArtistProfile,
    collector: &mut Collector<P>,
    max_results: usize,
) -> PipelineOutcome {
    info!("Starting search for {} tracks...", profile.name);

    let queries = generate_queries(profile, max_results);
    let filter = ContentFilter::new(profile);
    let mut seen = Deduplicator::new();

    let collection = collector.collect_admitting(&queries, max_results, |candidate| {
        filter.is_music(&candidate.title, &candidate.description) && seen.admit(candidate)
    });
    let interrupted = collection.is_interrupted();

    let candidates: Vec<Candidate> = collection
        .into_candidates()
        .into_iter()
        .map(|mut candidate| {
            candidate.album = profile.infer_album(&candidate.title, &candidate.description);
            candidate
        })
        .collect();

    let list = RankedCandidateList::new(rank(candidates, &profile.signature_term), max_results);
    info!("Total unique tracks found: {}", list.len());

    PipelineOutcome { list, interrupted }
}
