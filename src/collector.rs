use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use log::{debug, info, warn};

use crate::candidate::Candidate;
use crate::provider::SearchProvider;
use crate::query::SearchQuery;

pub const DEFAULT_PER_QUERY_CAP: usize = 20;
pub const DEFAULT_QUERY_DELAY: Duration = Duration::from_millis(1500);

/// Shared interrupt flag. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Result of a collection run. An interrupted run still carries everything
/// gathered before the interrupt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collection {
    Complete(Vec<Candidate>),
    Interrupted(Vec<Candidate>),
}

impl Collection {
    pub fn candidates(&self) -> &[Candidate] {
        match self {
            Collection::Complete(c) | Collection::Interrupted(c) => c,
        }
    }

    pub fn into_candidates(self) -> Vec<Candidate> {
        match self {
            Collection::Complete(c) | Collection::Interrupted(c) => c,
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, Collection::Interrupted(_))
    }
}

/// Sends queries one by one until enough candidates are admitted.
pub struct Collector<P> {
    provider: P,
    per_query_cap: usize,
    query_delay: Duration,
    cancel: CancelToken,
}

impl<P: SearchProvider> Collector<P> {
    pub fn new(provider: P) -> Self {
        Collector {
            provider,
            per_query_cap: DEFAULT_PER_QUERY_CAP,
            query_delay: DEFAULT_QUERY_DELAY,
            cancel: CancelToken::new(),
        }
    }

    #[must_use]
    pub fn per_query_cap(mut self, cap: usize) -> Self {
        self.per_query_cap = cap.max(1);
        self
    }

    /// Pause between two provider calls. Keeps the provider from rate limiting us.
    #[must_use]
    pub fn query_delay(mut self, delay: Duration) -> Self {
        self.query_delay = delay;
        self
    }

    #[must_use]
    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn collect(&mut self, queries: &[SearchQuery], max_results: usize) -> Collection {
        self.collect_admitting(queries, max_results, |_| true)
    }

    /// Like [`Collector::collect`], but only candidates accepted by `admit`
    /// count toward `max_results`.
    pub fn collect_admitting<F>(
        &mut self,
        queries: &[SearchQuery],
        max_results: usize,
        mut admit: F,
    ) -> Collection
    where
        F: FnMut(&Candidate) -> bool,
    {
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut succeeded = 0usize;

        for (i, query) in queries.iter().enumerate() {
            if candidates.len() >= max_results {
                break;
            }

            if i > 0 && !self.query_delay.is_zero() {
                if self.cancel.is_cancelled() {
                    return self.interrupted(candidates);
                }
                thread::sleep(self.query_delay);
            }
            if self.cancel.is_cancelled() {
                return self.interrupted(candidates);
            }

            let limit = self.per_query_cap.min(max_results - candidates.len());
            info!(
                "Searching with query {}/{}: {}",
                i + 1,
                queries.len(),
                query.text
            );

            let result = self.provider.search(&query.text, limit);
            // results of the call that was in flight are dropped
            if self.cancel.is_cancelled() {
                return self.interrupted(candidates);
            }
            let entries = match result {
                Ok(entries) => entries,
                Err(e) => {
                    warn!("Query '{}' failed: {}", query.text, e);
                    continue;
                }
            };
            succeeded += 1;

            for entry in entries {
                if candidates.len() >= max_results {
                    break;
                }
                let Some(candidate) = Candidate::from_entry(entry, &query.text) else {
                    continue;
                };
                if admit(&candidate) {
                    candidates.push(candidate);
                }
            }

            debug!("{} candidates so far", candidates.len());
        }

        if succeeded == 0 && !queries.is_empty() {
            warn!("All {} queries failed", queries.len());
        }
        Collection::Complete(candidates)
    }

    fn interrupted(&self, candidates: Vec<Candidate>) -> Collection {
        info!(
            "Search interrupted, keeping {} candidates",
            candidates.len()
        );
        Collection::Interrupted(candidates)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::provider::RawEntry;
    use crate::query::QueryIntent;
    use pretty_assertions::assert_eq;

    /// Answers every query with `limit` fresh entries, or fails scripted queries.
    #[derive(Default)]
    pub(crate) struct FakeProvider {
        pub calls: Vec<(String, usize)>,
        pub failing: Vec<String>,
        pub cancel_after: Option<(usize, CancelToken)>,
        counter: usize,
    }

    impl SearchProvider for FakeProvider {
        fn search(&mut self, query: &str, limit: usize) -> Result<Vec<RawEntry>, ProviderError> {
            self.calls.push((query.to_string(), limit));
            if let Some((n, token)) = &self.cancel_after
                && self.calls.len() == *n
            {
                token.cancel();
            }
            if self.failing.iter().any(|q| q == query) {
                return Err(ProviderError::Output("scripted failure".into()));
            }
            Ok((0..limit)
                .map(|_| {
                    self.counter += 1;
                    RawEntry {
                        id: Some(format!("v{}", self.counter)),
                        title: Some(format!("{} #{}", query, self.counter)),
                        view_count: Some(self.counter as u64),
                        ..Default::default()
                    }
                })
                .collect())
        }
    }

    fn queries(n: usize) -> Vec<SearchQuery> {
        (0..n)
            .map(|i| SearchQuery {
                text: format!("q{}", i),
                intent: QueryIntent::Thematic,
            })
            .collect()
    }

    fn collector(provider: FakeProvider) -> Collector<FakeProvider> {
        Collector::new(provider)
            .per_query_cap(20)
            .query_delay(Duration::ZERO)
    }

    #[test]
    fn stops_once_cap_is_reached() {
        let mut collector = collector(FakeProvider::default());
        let collection = collector.collect(&queries(20), 5);

        assert_eq!(collection.candidates().len(), 5);
        assert!(!collection.is_interrupted());
        assert_eq!(collector.provider().calls, vec![("q0".to_string(), 5)]);
    }

    #[test]
    fn asks_for_the_remaining_count_only() {
        let mut collector = collector(FakeProvider::default()).per_query_cap(3);
        let collection = collector.collect(&queries(20), 7);

        assert_eq!(collection.candidates().len(), 7);
        let limits: Vec<usize> = collector.provider().calls.iter().map(|c| c.1).collect();
        assert_eq!(limits, vec![3, 3, 1]);
    }

    #[test]
    fn failed_queries_are_skipped() {
        let provider = FakeProvider {
            failing: vec!["q0".into(), "q1".into()],
            ..Default::default()
        };
        let mut collector = collector(provider).per_query_cap(2);
        let collection = collector.collect(&queries(4), 3);

        let sources: Vec<&str> = collection
            .candidates()
            .iter()
            .map(|c| c.search_query.as_str())
            .collect();
        assert_eq!(sources, vec!["q2", "q2", "q3"]);
    }

    #[test]
    fn total_failure_is_an_empty_collection() {
        let provider = FakeProvider {
            failing: queries(3).into_iter().map(|q| q.text).collect(),
            ..Default::default()
        };
        let mut collector = collector(provider);
        let collection = collector.collect(&queries(3), 10);

        assert_eq!(collection, Collection::Complete(Vec::new()));
        assert_eq!(collector.provider().calls.len(), 3);
    }

    #[test]
    fn rejected_entries_do_not_count() {
        let mut collector = collector(FakeProvider::default()).per_query_cap(4);
        let collection =
            collector.collect_admitting(&queries(10), 4, |c| c.views() % 2 == 0);

        assert!(collection.candidates().iter().all(|c| c.views() % 2 == 0));
        assert_eq!(collection.candidates().len(), 4);
        let limits: Vec<usize> = collector.provider().calls.iter().map(|c| c.1).collect();
        assert_eq!(limits, vec![4, 2, 1, 1]);
    }

    #[test]
    fn interrupt_keeps_only_earlier_results() {
        let token = CancelToken::new();
        let provider = FakeProvider {
            cancel_after: Some((2, token.clone())),
            ..Default::default()
        };
        let mut collector = collector(provider).per_query_cap(2).cancel_token(token);
        let collection = collector.collect(&queries(10), 100);

        assert!(collection.is_interrupted());
        // q1 was running when the interrupt arrived; its entries are not admitted
        assert_eq!(collector.provider().calls.len(), 2);
        let sources: Vec<&str> = collection
            .candidates()
            .iter()
            .map(|c| c.search_query.as_str())
            .collect();
        assert_eq!(sources, vec!["q0", "q0"]);
    }

    #[test]
    fn unbounded_maximum_does_not_preallocate() {
        let mut collector = collector(FakeProvider::default()).per_query_cap(2);
        let collection = collector.collect(&queries(2), usize::MAX);

        assert!(!collection.is_interrupted());
        assert_eq!(collection.candidates().len(), 4);
    }

    #[test]
    fn cancelled_before_start_sends_nothing() {
        let token = CancelToken::new();
        token.cancel();
        let mut collector = collector(FakeProvider::default()).cancel_token(token);
        let collection = collector.collect(&queries(3), 10);

        assert_eq!(collection, Collection::Interrupted(Vec::new()));
        assert!(collector.provider().calls.is_empty());
    }

    #[test]
    fn waits_between_calls() {
        let mut collector = Collector::new(FakeProvider::default())
            .per_query_cap(1)
            .query_delay(Duration::from_millis(20));
        let started = std::time::Instant::now();
        collector.collect(&queries(3), 3);

        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}
