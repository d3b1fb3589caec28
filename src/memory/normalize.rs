//! Text normalization for fuzzy matching.
//!
//! Turns free text into lowercase tokens with ASCII punctuation removed.
//! Apostrophes and double quotes survive because they carry meaning inside
//! words (`don't`) and group quoted phrases into a single token.

use std::collections::HashSet;
use std::hash::Hash;

/// Punctuation kept by [`strip_punctuation`].
const KEPT_PUNCTUATION: [char; 2] = ['\'', '"'];

/// Remove ASCII punctuation except apostrophes and double quotes.
pub fn strip_punctuation(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_ascii_punctuation() || KEPT_PUNCTUATION.contains(c))
        .collect()
}

/// Normalize `text` into a sequence of comparable tokens.
///
/// Tokens are split with POSIX shell rules, so `"oil change"` stays one
/// token. When the quoting is unbalanced (a lone apostrophe as in `it's`)
/// the text is split on whitespace instead. Duplicates are kept; pass the
/// result through [`unique_everseen`] for a stable set.
pub fn normalize(text: &str) -> Vec<String> {
    let stripped = strip_punctuation(text).to_lowercase();

    match shlex::split(&stripped) {
        Some(tokens) => tokens.into_iter().filter(|t| !t.is_empty()).collect(),
        None => stripped.split_whitespace().map(str::to_string).collect(),
    }
}

/// Iterator adapter yielding each element the first time it is seen.
#[derive(Debug, Clone)]
pub struct UniqueEverseen<I: Iterator> {
    iter: I,
    seen: HashSet<I::Item>,
}

impl<I> Iterator for UniqueEverseen<I>
where
    I: Iterator,
    I::Item: Eq + Hash + Clone,
{
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        for item in self.iter.by_ref() {
            if self.seen.insert(item.clone()) {
                return Some(item);
            }
        }
        None
    }
}

/// Lazily deduplicate `items`, preserving first-seen order.
pub fn unique_everseen<I>(items: I) -> UniqueEverseen<I::IntoIter>
where
    I: IntoIterator,
    I::Item: Eq + Hash + Clone,
{
    UniqueEverseen {
        iter: items.into_iter(),
        seen: HashSet::new(),
    }
}
