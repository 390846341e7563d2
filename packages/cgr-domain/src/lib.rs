//! Pure search logic: fingerprints, scoring, parent-level deduplication and the inline/deferred
//! policy. Nothing in this crate performs I/O.

pub mod dedup;
pub mod fingerprint;
pub mod gate;
pub mod model;
pub mod operator;
pub mod similarity;

pub use dedup::reduce;
pub use fingerprint::{Fingerprint, FingerprintError};
pub use gate::GateDecision;
pub use model::{CachedResultSet, IndexedEntry, ScoredCandidate, SearchHit, SearchResult};
pub use operator::{Collection, Operator, ParseOperatorError};
pub use similarity::tanimoto;
