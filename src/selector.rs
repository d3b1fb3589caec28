//! Numbered-menu selection over a ranked shortlist.

use std::fmt;
use std::io;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::memory::{RankedList, Record};
use crate::terminal::Terminal;

/// Order in which a ranked list is printed as a menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayOrder {
    /// Strongest match is menu entry 0.
    #[default]
    StrongestFirst,
    /// Menu entry `i` is `ranked[i]`, so the weakest kept match comes first.
    Ascending,
}

impl FromStr for DisplayOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "strongest_first" | "strongest-first" => Ok(Self::StrongestFirst),
            "ascending" => Ok(Self::Ascending),
            other => Err(format!(
                "unknown display order '{}' (expected strongest_first or ascending)",
                other
            )),
        }
    }
}

impl fmt::Display for DisplayOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StrongestFirst => write!(f, "strongest_first"),
            Self::Ascending => write!(f, "ascending"),
        }
    }
}

/// Parse a menu entry: one or more ASCII digits and nothing else.
///
/// Returns `Err(())` for anything that is not a digit string (including
/// `-1`), `Ok(None)` for a digit string too large for `usize`.
fn parse_entry(entry: &str) -> Result<Option<usize>, ()> {
    if entry.is_empty() || !entry.bytes().all(|b| b.is_ascii_digit()) {
        return Err(());
    }
    Ok(entry.parse().ok())
}

/// Presents a [`RankedList`] and resolves the user's choice.
#[derive(Debug, Clone, Copy, Default)]
pub struct Selector {
    order: DisplayOrder,
}

impl Selector {
    pub fn new(order: DisplayOrder) -> Self {
        Self { order }
    }

    pub fn order(&self) -> DisplayOrder {
        self.order
    }

    /// Position in `ranked` of menu entry `entry`; `entry < len`.
    fn ranked_index(&self, entry: usize, len: usize) -> usize {
        match self.order {
            DisplayOrder::StrongestFirst => len - 1 - entry,
            DisplayOrder::Ascending => entry,
        }
    }

    /// Print `ranked` as a numbered menu and read one choice.
    ///
    /// `working_set_len` is the size of the full working set: when it is
    /// zero nothing is prompted. Cancellation, an empty line, a non-digit
    /// entry, or an entry outside the printed menu all yield `None`. The
    /// function never re-prompts.
    pub fn select<'a>(
        &self,
        ranked: &RankedList<'a>,
        working_set_len: usize,
        action: &str,
        term: &mut dyn Terminal,
    ) -> io::Result<Option<&'a Record>> {
        if working_set_len == 0 {
            term.print_line("No records exist")?;
            return Ok(None);
        }

        term.print_line(&format!("{} which record?", action))?;
        let len = ranked.len();
        for entry in 0..len {
            let candidate = ranked.as_slice()[self.ranked_index(entry, len)];
            term.print_line(&format!(
                "{}) [{}%] {}",
                entry, candidate.score, candidate.record.title
            ))?;
        }

        let Some(input) = term.prompt_line("> ")? else {
            return Ok(None);
        };
        let input = input.trim();
        if input.is_empty() {
            return Ok(None);
        }

        match parse_entry(input) {
            Err(()) => {
                term.print_line(&format!("Invalid entry '{}'", input))?;
                Ok(None)
            }
            Ok(Some(entry)) if entry < len => {
                let candidate = ranked.as_slice()[self.ranked_index(entry, len)];
                Ok(Some(candidate.record))
            }
            Ok(_) => {
                term.print_line(&format!("Invalid record selection '{}'", input))?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{ExclusionSet, Matcher, RecordDraft, RecordId};
    use crate::terminal::testing::ScriptedTerminal;

    fn records() -> Vec<Record> {
        vec![
            Record::from_draft(RecordId(1), RecordDraft::new("Grocery List", "food shopping", "")),
            Record::from_draft(RecordId(2), RecordDraft::new("Car Repair", "mechanic brakes", "")),
            Record::from_draft(RecordId(3), RecordDraft::new("Tax Return", "paperwork", "")),
        ]
    }

    fn ranked(records: &[Record], top_n: usize) -> RankedList<'_> {
        Matcher::new(ExclusionSet::default(), top_n).rank(records, "food")
    }

    #[test]
    fn test_empty_working_set_never_prompts() {
        let mut term = ScriptedTerminal::new(&["0"]);
        let chosen = Selector::default()
            .select(&RankedList::default(), 0, "Display", &mut term)
            .unwrap();

        assert!(chosen.is_none());
        assert!(term.prompts.is_empty());
        assert_eq!(term.printed, vec!["No records exist"]);
    }

    #[test]
    fn test_empty_shortlist_with_records_still_prompts() {
        let recs = records();
        let shortlist = ranked(&recs, 0);
        let mut term = ScriptedTerminal::new(&["0"]);

        let chosen = Selector::default()
            .select(&shortlist, recs.len(), "Display", &mut term)
            .unwrap();

        assert!(chosen.is_none());
        assert_eq!(term.prompts.len(), 1);
        assert!(term.printed_any("Invalid record selection '0'"));
    }

    #[test]
    fn test_ascending_menu_index_maps_into_ranked() {
        let recs = records();
        let shortlist = ranked(&recs, 10);
        let last = shortlist.len() - 1;
        let mut term = ScriptedTerminal::new(&[&last.to_string()]);

        let chosen = Selector::new(DisplayOrder::Ascending)
            .select(&shortlist, recs.len(), "Display", &mut term)
            .unwrap()
            .unwrap();

        assert_eq!(chosen.title, "Grocery List");
        assert!(term.printed[1].starts_with("0) ["));
    }

    #[test]
    fn test_strongest_first_menu() {
        let recs = records();
        let shortlist = ranked(&recs, 10);
        let mut term = ScriptedTerminal::new(&["0"]);

        let chosen = Selector::new(DisplayOrder::StrongestFirst)
            .select(&shortlist, recs.len(), "Remove", &mut term)
            .unwrap()
            .unwrap();

        assert_eq!(chosen.title, "Grocery List");
        assert_eq!(term.printed[0], "Remove which record?");
        assert!(term.printed[1].starts_with("0) ["));
        assert!(term.printed[1].ends_with("] Grocery List"));
    }

    #[test]
    fn test_non_digit_entry_is_invalid() {
        let recs = records();
        let shortlist = ranked(&recs, 10);
        let mut term = ScriptedTerminal::new(&["abc"]);

        let chosen = Selector::default()
            .select(&shortlist, recs.len(), "Display", &mut term)
            .unwrap();

        assert!(chosen.is_none());
        assert!(term.printed_any("Invalid entry 'abc'"));
    }

    #[test]
    fn test_negative_entry_rejected_at_parse() {
        let recs = records();
        let shortlist = ranked(&recs, 10);
        let mut term = ScriptedTerminal::new(&["-1"]);

        let chosen = Selector::default()
            .select(&shortlist, recs.len(), "Display", &mut term)
            .unwrap();

        assert!(chosen.is_none());
        assert!(term.printed_any("Invalid entry '-1'"));
    }

    #[test]
    fn test_bound_is_shortlist_not_working_set() {
        // Three records, two shown: entry 2 is valid for the working set
        // but was never printed, so it must be rejected.
        let recs = records();
        let shortlist = ranked(&recs, 2);
        assert_eq!(shortlist.len(), 2);
        let mut term = ScriptedTerminal::new(&["2"]);

        let chosen = Selector::default()
            .select(&shortlist, recs.len(), "Display", &mut term)
            .unwrap();

        assert!(chosen.is_none());
        assert!(term.printed_any("Invalid record selection '2'"));
    }

    #[test]
    fn test_huge_number_is_out_of_range() {
        let recs = records();
        let shortlist = ranked(&recs, 10);
        let mut term = ScriptedTerminal::new(&["99999999999999999999999999"]);

        let chosen = Selector::default()
            .select(&shortlist, recs.len(), "Display", &mut term)
            .unwrap();

        assert!(chosen.is_none());
        assert!(term.printed_any("Invalid record selection"));
    }

    #[test]
    fn test_empty_line_cancels_quietly() {
        let recs = records();
        let shortlist = ranked(&recs, 10);
        let mut term = ScriptedTerminal::new(&[""]);

        let chosen = Selector::default()
            .select(&shortlist, recs.len(), "Display", &mut term)
            .unwrap();

        assert!(chosen.is_none());
        assert!(!term.printed_any("Invalid"));
    }

    #[test]
    fn test_interrupt_cancels() {
        let recs = records();
        let shortlist = ranked(&recs, 10);
        let mut term = ScriptedTerminal::default().then_interrupt();

        let chosen = Selector::default()
            .select(&shortlist, recs.len(), "Display", &mut term)
            .unwrap();

        assert!(chosen.is_none());
        assert!(!term.printed_any("Invalid"));
    }

    #[test]
    fn test_display_order_from_str() {
        assert_eq!(
            "ascending".parse::<DisplayOrder>().unwrap(),
            DisplayOrder::Ascending
        );
        assert_eq!(
            "Strongest-First".parse::<DisplayOrder>().unwrap(),
            DisplayOrder::StrongestFirst
        );
        assert!("sideways".parse::<DisplayOrder>().is_err());
    }
}
