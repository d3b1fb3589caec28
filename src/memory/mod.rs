//! Records and the fuzzy recall engine.
//!
//! - [`normalize`]: punctuation stripping, case folding, shell-style tokens
//! - [`matcher`]: similarity scoring and bounded top-N ranking
//! - [`record`]: the persisted note and its editable draft

pub mod matcher;
pub mod normalize;
pub mod record;

pub use matcher::{score, ExclusionSet, MatchCandidate, Matcher, RankedList};
pub use normalize::{normalize, unique_everseen};
pub use record::{Record, RecordChanges, RecordDraft, RecordId};
