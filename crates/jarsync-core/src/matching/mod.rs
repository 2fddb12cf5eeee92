//! Heuristics for finding an artifact in a catalog without a known id.
//!
//! - [`candidates`] derives search strings from a descriptor
//! - [`scorer`] rates how well a catalog entry's name matches

mod candidates;
mod scorer;

pub use candidates::{query_candidates, strip_version_suffix};
pub use scorer::{normalize, score};
