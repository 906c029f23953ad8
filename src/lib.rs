pub mod candidate;
pub mod cli;
pub mod collector;
pub mod dedup;
pub mod download;
pub mod error;
pub mod export;
pub mod filter;
pub mod fs;
pub mod logging;
pub mod pipeline;
pub mod playlists;
pub mod profile;
pub mod provider;
pub mod query;
pub mod rank;
pub mod stats;

pub use candidate::Candidate;
pub use collector::{CancelToken, Collection, Collector};
pub use error::{Error, Result};
pub use pipeline::{PipelineOutcome, RankedCandidateList};
pub use profile::ArtistProfile;
pub use provider::{RawEntry, SearchProvider, YtDlp};
