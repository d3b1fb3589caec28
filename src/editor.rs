//! Record editing through the user's text editor.
//!
//! A draft is written to a scratch file in this layout, opened in the
//! configured editor, and parsed back when the editor exits:
//!
//! ```text
//! Title: Car Repair
//! Keywords: mechanic brakes
//! ---
//! Free-form body text...
//! ```

use std::io::Write;
use std::process::Command;

use tracing::debug;

use crate::error::{MemfogError, Result};
use crate::memory::RecordDraft;

const TITLE_PREFIX: &str = "Title:";
const KEYWORDS_PREFIX: &str = "Keywords:";
const BODY_SEPARATOR: &str = "---";

/// Anything that can turn a draft into an edited draft.
#[cfg_attr(test, mockall::automock)]
pub trait RecordEditor {
    /// Let the user edit `draft`.
    ///
    /// Returns `None` when nothing changed or the result has no title
    /// (which discards it).
    fn edit(&self, draft: &RecordDraft) -> Result<Option<RecordDraft>>;
}

/// Render a draft in the scratch-file layout.
pub fn render_draft(draft: &RecordDraft) -> String {
    format!(
        "{} {}\n{} {}\n{}\n{}",
        TITLE_PREFIX, draft.title, KEYWORDS_PREFIX, draft.keywords, BODY_SEPARATOR, draft.body
    )
}

/// Parse the scratch-file layout. Returns `None` when the title is empty.
pub fn parse_draft(text: &str) -> Option<RecordDraft> {
    let mut draft = RecordDraft::default();
    let mut lines = text.lines();

    for line in lines.by_ref() {
        if line.trim_end() == BODY_SEPARATOR {
            break;
        }
        if let Some(title) = line.strip_prefix(TITLE_PREFIX) {
            draft.title = title.trim().to_string();
        } else if let Some(keywords) = line.strip_prefix(KEYWORDS_PREFIX) {
            draft.keywords = keywords.trim().to_string();
        }
    }

    draft.body = lines.collect::<Vec<_>>().join("\n").trim_end().to_string();

    if draft.title.is_empty() {
        None
    } else {
        Some(draft)
    }
}

/// Interpret the edited scratch file for `original`.
///
/// A field whose text matches what `original` looks like after a render and
/// parse round trip was left alone, so it keeps its exact stored value
/// (trailing newlines included). Returns `None` when nothing changed or the
/// title was cleared.
pub fn edited_draft(original: &RecordDraft, text: &str) -> Option<RecordDraft> {
    let mut edited = parse_draft(text)?;

    if let Some(baseline) = parse_draft(&render_draft(original)) {
        if edited.title == baseline.title {
            edited.title.clone_from(&original.title);
        }
        if edited.keywords == baseline.keywords {
            edited.keywords.clone_from(&original.keywords);
        }
        if edited.body == baseline.body {
            edited.body.clone_from(&original.body);
        }
    }

    (edited != *original).then_some(edited)
}

/// Opens drafts in an external program such as `vi` or `code --wait`.
#[derive(Debug, Clone)]
pub struct ExternalEditor {
    command: String,
}

impl ExternalEditor {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl RecordEditor for ExternalEditor {
    fn edit(&self, draft: &RecordDraft) -> Result<Option<RecordDraft>> {
        let argv = shlex::split(&self.command)
            .filter(|argv| !argv.is_empty())
            .ok_or_else(|| {
                MemfogError::Editor(format!("Invalid editor command '{}'", self.command))
            })?;

        let mut file = tempfile::Builder::new()
            .prefix("memfog-")
            .suffix(".txt")
            .tempfile()?;
        file.write_all(render_draft(draft).as_bytes())?;
        file.flush()?;

        debug!(editor = %self.command, path = %file.path().display(), "Launching editor");
        let status = Command::new(&argv[0])
            .args(&argv[1..])
            .arg(file.path())
            .status()
            .map_err(|e| {
                MemfogError::Editor(format!("Failed to launch '{}': {}", self.command, e))
            })?;

        if !status.success() {
            return Err(MemfogError::Editor(format!(
                "'{}' exited with {}",
                self.command, status
            )));
        }

        let edited = std::fs::read_to_string(file.path())?;
        Ok(edited_draft(draft, &edited))
    }
}
