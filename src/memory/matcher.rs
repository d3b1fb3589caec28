//! Fuzzy keyword matching and top-N ranking.
//!
//! Scoring averages two token-based similarity ratios on a 0-100 scale:
//!
//! - **token sort**: both strings' tokens are sorted and the joined results
//!   compared with a normalized Levenshtein ratio.
//! - **token set**: the shared tokens are compared against "shared + only in
//!   A" and "shared + only in B"; the best of the three pairings wins.
//!
//! Both ratios are symmetric, so `score(a, b) == score(b, a)`, and identical
//! non-empty token sets score 100.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use tracing::debug;

use super::normalize::{normalize, unique_everseen};
use super::record::Record;
use crate::error::Result;

/// Lowercase words removed from record text before scoring.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    words: HashSet<String>,
}

impl ExclusionSet {
    /// Build a set from arbitrary words; blanks are ignored and case is folded.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        Self { words }
    }

    /// Load a word list with one word per line. A missing file is an empty set.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let set = Self::from_words(content.lines());
        debug!(path = %path.display(), words = set.len(), "Loaded exclusion words");
        Ok(set)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Normalized Levenshtein similarity on a 0-100 scale. Empty input scores 0.
pub fn ratio(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    strsim::normalized_levenshtein(a, b) * 100.0
}

fn sorted_tokens(text: &str) -> String {
    let mut tokens: Vec<&str> = text.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Ratio of the two strings after sorting their tokens alphabetically.
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

/// Best ratio between the shared tokens and each side's full token set.
pub fn token_set_ratio(a: &str, b: &str) -> f64 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();

    let join = |tokens: Vec<&str>| tokens.join(" ");
    let shared = join(tokens_a.intersection(&tokens_b).copied().collect());
    let only_a = join(tokens_a.difference(&tokens_b).copied().collect());
    let only_b = join(tokens_b.difference(&tokens_a).copied().collect());

    let combined = |rest: &str| format!("{} {}", shared, rest).trim().to_string();
    let with_a = combined(&only_a);
    let with_b = combined(&only_b);

    [
        ratio(&shared, &with_a),
        ratio(&shared, &with_b),
        ratio(&with_a, &with_b),
    ]
    .into_iter()
    .fold(0.0, f64::max)
}

/// Similarity of two token strings: the mean of the sort and set ratios,
/// rounded to a whole percentage.
pub fn score(a: &str, b: &str) -> u8 {
    let mean = (token_sort_ratio(a, b) + token_set_ratio(a, b)) / 2.0;
    mean.round().clamp(0.0, 100.0) as u8
}

/// Normalized query text: deduplicated tokens in first-seen order.
pub fn query_text(query: &str) -> String {
    unique_everseen(normalize(query)).collect::<Vec<_>>().join(" ")
}

/// A record paired with the score it earned for one query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate<'a> {
    pub record: &'a Record,
    pub score: u8,
}

/// Candidates in ascending score order: index 0 is the weakest kept match,
/// the last index the strongest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankedList<'a> {
    candidates: Vec<MatchCandidate<'a>>,
}

impl<'a> RankedList<'a> {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&MatchCandidate<'a>> {
        self.candidates.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MatchCandidate<'a>> {
        self.candidates.iter()
    }

    pub fn as_slice(&self) -> &[MatchCandidate<'a>] {
        &self.candidates
    }
}

/// Scores a working set against keyword queries.
#[derive(Debug, Clone)]
pub struct Matcher {
    exclusions: ExclusionSet,
    top_n: usize,
}

impl Matcher {
    /// `top_n` has already been validated as non-negative by the config layer.
    pub fn new(exclusions: ExclusionSet, top_n: usize) -> Self {
        Self { exclusions, top_n }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    pub fn exclusions(&self) -> &ExclusionSet {
        &self.exclusions
    }

    /// Title and keywords (never the body), normalized, with excluded words
    /// removed. Recomputed on every call since records can be edited mid-run.
    pub fn searchable_text(&self, record: &Record) -> String {
        let combined = format!("{} {}", record.title, record.keywords);
        let kept = normalize(&combined)
            .into_iter()
            .filter(|token| !self.exclusions.contains(token));
        unique_everseen(kept).collect::<Vec<_>>().join(" ")
    }

    /// Score every record and keep the `top_n` best, ascending by score.
    ///
    /// Ties keep the order of `records`.
    pub fn rank<'a>(&self, records: &'a [Record], query: &str) -> RankedList<'a> {
        let query = query_text(query);

        let mut candidates: Vec<MatchCandidate<'a>> = records
            .iter()
            .map(|record| MatchCandidate {
                record,
                score: score(&self.searchable_text(record), &query),
            })
            .collect();

        candidates.sort_by_key(|c| c.score);
        let cut = candidates.len().saturating_sub(self.top_n);
        candidates.drain(..cut);

        debug!(
            query = %query,
            scored = records.len(),
            kept = candidates.len(),
            "Ranked records"
        );

        RankedList { candidates }
    }
}
