//! Interactive recall session.
//!
//! One [`Memfog`] value lives for a single CLI invocation. It owns the
//! working set (every record loaded at startup) and keeps it in step with
//! the store: each mutation is persisted first and mirrored in memory only
//! once the store confirms it.
//!
//! Display and remove run the same cycle until the user declines:
//!
//! ```text
//! AWAITING_QUERY -> MATCHED -> SELECTED -> action -> AWAITING_QUERY
//!                          \-> CANCELLED (interrupt, empty or invalid entry)
//! ```
//!
//! The ranked list borrows the working set, so it is rebuilt on every pass
//! and can never outlive a mutation.

use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::{info, warn};

use crate::config::{Config, DuplicatePolicy};
use crate::editor::{ExternalEditor, RecordEditor};
use crate::error::{MemfogError, Result};
use crate::memory::{ExclusionSet, Matcher, Record, RecordChanges, RecordDraft, RecordId};
use crate::selector::Selector;
use crate::store::{RecordStore, SqliteStore, StoreOp, StoreOutcome};
use crate::terminal::Terminal;
use crate::transfer::{self, SkipReason};

/// Counts reported after an import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub inserted: usize,
    pub overwritten: usize,
    pub skipped: usize,
}

impl ImportReport {
    pub fn imported(&self) -> usize {
        self.inserted + self.overwritten
    }
}

/// The recall session: working set plus its collaborators.
pub struct Memfog {
    store: Box<dyn RecordStore>,
    editor: Box<dyn RecordEditor>,
    matcher: Matcher,
    selector: Selector,
    on_duplicate: DuplicatePolicy,
    data_home: PathBuf,
    records: Vec<Record>,
}

impl Memfog {
    /// Wire up a session from configuration: SQLite store, exclusion list,
    /// and the configured external editor.
    pub fn open(config: &Config) -> Result<Self> {
        Config::ensure_dirs()?;

        let exclusions_path = Config::exclusions_path();
        let exclusions = ExclusionSet::load(&exclusions_path).unwrap_or_else(|e| {
            warn!(
                path = %exclusions_path.display(),
                error = %e,
                "Could not read exclusion list; matching without it"
            );
            ExclusionSet::default()
        });

        let store = SqliteStore::open(&Config::db_path())?;
        let editor = ExternalEditor::new(config.editor_command());

        Self::new(
            Box::new(store),
            Box::new(editor),
            Matcher::new(exclusions, config.search.top_n),
            Selector::new(config.search.display_order),
            config.import.on_duplicate,
            Config::dir(),
        )
    }

    /// Build a session over explicit collaborators and load the working set.
    pub fn new(
        store: Box<dyn RecordStore>,
        editor: Box<dyn RecordEditor>,
        matcher: Matcher,
        selector: Selector,
        on_duplicate: DuplicatePolicy,
        data_home: PathBuf,
    ) -> Result<Self> {
        let records = store.load_all()?;
        info!(count = records.len(), "Loaded working set");
        Ok(Self {
            store,
            editor,
            matcher,
            selector,
            on_duplicate,
            data_home,
            records,
        })
    }

    /// The working set, in load order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    fn title_taken(&self, title: &str, except: Option<RecordId>) -> bool {
        self.records
            .iter()
            .any(|r| r.title == title && Some(r.id) != except)
    }

    fn position(&self, id: RecordId) -> Result<usize> {
        self.records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| MemfogError::NotFound(format!("record {}", id)))
    }

    /// Create a record from an empty draft in the editor.
    pub fn add(&mut self, term: &mut dyn Terminal) -> Result<Option<RecordId>> {
        let Some(draft) = self.editor.edit(&RecordDraft::default())? else {
            term.print_line("Discarded new record")?;
            return Ok(None);
        };

        if self.title_taken(&draft.title, None) {
            term.print_line(&format!(
                "A record titled '{}' already exists; not saved",
                draft.title
            ))?;
            return Ok(None);
        }

        let id = match self.store.apply(StoreOp::Insert(draft.clone()))? {
            StoreOutcome::Inserted(ids) => ids.into_iter().next(),
            _ => None,
        }
        .ok_or_else(|| {
            MemfogError::NotFound(format!(
                "store returned no id for new record '{}'",
                draft.title
            ))
        })?;

        term.print_line(&format!("Saved '{}'", draft.title))?;
        self.records.push(Record::from_draft(id, draft));
        Ok(Some(id))
    }

    /// Match, select, show, and optionally edit records until the user stops.
    pub fn search(&mut self, query: &str, term: &mut dyn Terminal) -> Result<()> {
        loop {
            let ranked = self.matcher.rank(&self.records, query);
            let chosen = self
                .selector
                .select(&ranked, self.records.len(), "Display", term)?
                .cloned();
            let Some(record) = chosen else {
                return Ok(());
            };

            print_record(&record, term)?;
            if term.confirm(&format!("Edit {}", record.title))? {
                self.edit(&record, term)?;
            }
        }
    }

    /// Open `record` in the editor and persist whatever changed.
    pub fn edit(&mut self, record: &Record, term: &mut dyn Terminal) -> Result<bool> {
        let Some(edited) = self.editor.edit(&record.draft())? else {
            return Ok(false);
        };

        let changes = RecordChanges::between(record, &edited);
        if changes.is_empty() {
            return Ok(false);
        }
        if let Some(title) = &changes.title {
            if self.title_taken(title, Some(record.id)) {
                term.print_line(&format!(
                    "A record titled '{}' already exists; changes not saved",
                    title
                ))?;
                return Ok(false);
            }
        }

        let index = self.position(record.id)?;
        self.store.apply(StoreOp::Update {
            id: record.id,
            changes: changes.clone(),
        })?;
        changes.apply_to(&mut self.records[index]);
        term.print_line(&format!("Updated {}", changes.field_names().join(", ")))?;
        Ok(true)
    }

    /// Match, select, confirm, and delete records until the user stops.
    pub fn remove(&mut self, query: &str, term: &mut dyn Terminal) -> Result<usize> {
        let mut removed = 0;
        loop {
            let ranked = self.matcher.rank(&self.records, query);
            let chosen = self
                .selector
                .select(&ranked, self.records.len(), "Remove", term)?
                .map(|r| (r.id, r.title.clone()));
            let Some((id, title)) = chosen else {
                return Ok(removed);
            };

            if !term.confirm(&format!("Delete {}", title))? {
                return Ok(removed);
            }

            let index = self.position(id)?;
            self.store.apply(StoreOp::Delete(id))?;
            self.records.remove(index);
            removed += 1;
            term.print_line(&format!("Deleted {}", title))?;
        }
    }

    /// Import records from a JSON file.
    pub fn import(
        &mut self,
        path: &Path,
        force: bool,
        term: &mut dyn Terminal,
    ) -> Result<ImportReport> {
        let path = transfer::resolve_import_path(path, &self.data_home);
        let incoming = transfer::read_import(&path)?;
        let plan = transfer::plan_import(&self.records, incoming, force, self.on_duplicate);

        for (title, reason) in &plan.skipped {
            match reason {
                SkipReason::Duplicate => term.print_line(&format!("Skipping duplicate - {}", title))?,
                SkipReason::EmptyTitle => term.print_line("Skipping record without a title")?,
                SkipReason::Superseded => term.print_line(&format!(
                    "Skipping earlier entry replaced later in file - {}",
                    title
                ))?,
            }
        }

        let report = ImportReport {
            inserted: plan.inserts.len(),
            overwritten: plan.overwrites.len(),
            skipped: plan.skipped.len(),
        };

        if !plan.inserts.is_empty() {
            let drafts = plan.inserts.clone();
            if let StoreOutcome::Inserted(ids) = self.store.apply(StoreOp::BulkInsert(drafts))? {
                self.records.extend(
                    ids.into_iter()
                        .zip(plan.inserts)
                        .map(|(id, draft)| Record::from_draft(id, draft)),
                );
            }
        }

        for (id, draft) in plan.overwrites {
            let index = self.position(id)?;
            let changes = RecordChanges::between(&self.records[index], &draft);
            if changes.is_empty() {
                continue;
            }
            self.store.apply(StoreOp::Update {
                id,
                changes: changes.clone(),
            })?;
            changes.apply_to(&mut self.records[index]);
        }

        if report.skipped > 0 {
            term.print_line(&format!(
                "Imported {}, Skipped {}",
                report.imported(),
                report.skipped
            ))?;
        } else {
            term.print_line(&format!("Imported {}", report.imported()))?;
        }
        info!(
            inserted = report.inserted,
            overwritten = report.overwritten,
            skipped = report.skipped,
            "Import finished"
        );
        Ok(report)
    }

    /// Export the working set. Returns the written path, or `None` when the
    /// user declined to overwrite an existing file.
    pub fn export(
        &self,
        target: Option<&str>,
        term: &mut dyn Terminal,
    ) -> Result<Option<PathBuf>> {
        let today = Local::now().date_naive();
        let path = transfer::resolve_export_path(target, &self.data_home, today);

        if path.exists() && !term.confirm(&format!("Overwrite existing file {}", path.display()))? {
            return Ok(None);
        }

        transfer::write_export(&path, &self.records)?;
        term.print_line(&format!("Exported to {}", path.display()))?;
        Ok(Some(path))
    }
}

fn print_record(record: &Record, term: &mut dyn Terminal) -> Result<()> {
    term.print_line(&format!("# {}", record.title))?;
    if !record.keywords.is_empty() {
        term.print_line(&format!("Keywords: {}", record.keywords))?;
    }
    term.print_line("---")?;
    for line in record.body.lines() {
        term.print_line(line)?;
    }
    Ok(())
}
