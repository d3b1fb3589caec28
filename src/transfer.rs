//! JSON import and export of records.
//!
//! The file format is a JSON array of `{ "title", "keywords", "body" }`
//! objects. Ids are never exported; the store assigns fresh ones on import.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};
use tracing::{debug, info};

use crate::config::DuplicatePolicy;
use crate::error::{MemfogError, Result};
use crate::memory::{Record, RecordDraft, RecordId};

/// Why an imported draft was not applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Title already present and the import was not forced.
    Duplicate,
    EmptyTitle,
    /// Forced overwrite where a later draft in the same file has the same
    /// title; the later one is applied.
    Superseded,
}

/// Classification of every draft in an import file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportPlan {
    /// New records, in file order.
    pub inserts: Vec<RecordDraft>,
    /// Existing records replaced by a forced import.
    pub overwrites: Vec<(RecordId, RecordDraft)>,
    pub skipped: Vec<(String, SkipReason)>,
}

/// Decide what happens to each incoming draft.
///
/// Without `force`, a draft whose title already exists (in the store or
/// earlier in the same file) is skipped. With `force`, `policy` decides
/// between replacing the existing record and inserting a second one.
pub fn plan_import(
    existing: &[Record],
    incoming: Vec<RecordDraft>,
    force: bool,
    policy: DuplicatePolicy,
) -> ImportPlan {
    // Title -> stored id, or None when the title arrives earlier in this file.
    let mut titles: HashMap<String, Option<RecordId>> = HashMap::new();
    for record in existing {
        titles.entry(record.title.clone()).or_insert(Some(record.id));
    }

    let mut plan = ImportPlan::default();
    for mut draft in incoming {
        draft.title = draft.title.trim().to_string();
        if draft.title.is_empty() {
            plan.skipped.push((draft.title, SkipReason::EmptyTitle));
            continue;
        }

        match titles.get(&draft.title).copied() {
            None => {
                titles.insert(draft.title.clone(), None);
                plan.inserts.push(draft);
            }
            Some(_) if !force => {
                plan.skipped.push((draft.title, SkipReason::Duplicate));
            }
            Some(_) if policy == DuplicatePolicy::Duplicate => {
                plan.inserts.push(draft);
            }
            Some(Some(id)) => {
                if let Some(pending) = plan.overwrites.iter_mut().find(|(e, _)| *e == id) {
                    plan.skipped.push((draft.title.clone(), SkipReason::Superseded));
                    pending.1 = draft;
                } else {
                    plan.overwrites.push((id, draft));
                }
            }
            Some(None) => {
                if let Some(pending) = plan.inserts.iter_mut().find(|d| d.title == draft.title) {
                    plan.skipped.push((draft.title.clone(), SkipReason::Superseded));
                    *pending = draft;
                }
            }
        }
    }

    debug!(
        inserts = plan.inserts.len(),
        overwrites = plan.overwrites.len(),
        skipped = plan.skipped.len(),
        "Planned import"
    );
    plan
}

/// Resolve an import path. A bare file name that does not exist in the
/// working directory is looked up in `data_home`.
pub fn resolve_import_path(path: &Path, data_home: &Path) -> PathBuf {
    if path.exists() || path.components().count() != 1 {
        return path.to_path_buf();
    }
    data_home.join(path)
}

/// Read an import file.
pub fn read_import(path: &Path) -> Result<Vec<RecordDraft>> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        MemfogError::Import(format!("Failed to read {}: {}", path.display(), e))
    })?;
    let drafts: Vec<RecordDraft> = serde_json::from_str(&content).map_err(|e| {
        MemfogError::Import(format!(
            "{} is not a JSON array of records: {}",
            path.display(),
            e
        ))
    })?;
    info!(path = %path.display(), count = drafts.len(), "Read import file");
    Ok(drafts)
}

/// Default export file name for `date`, e.g. `memfog_3-7-2026.json`.
pub fn export_file_name(date: NaiveDate) -> String {
    format!("memfog_{}-{}-{}.json", date.month(), date.day(), date.year())
}

fn expand_home(target: &str) -> PathBuf {
    match target.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
            Some(home) => home.join(rest.trim_start_matches('/')),
            None => PathBuf::from(target),
        },
        _ => PathBuf::from(target),
    }
}

/// Where an export goes.
///
/// No target means `default_dir` plus the dated file name; an existing
/// directory gets the dated file name appended; anything else is used as
/// the file path.
pub fn resolve_export_path(target: Option<&str>, default_dir: &Path, today: NaiveDate) -> PathBuf {
    let file_name = export_file_name(today);
    match target {
        None => default_dir.join(file_name),
        Some(target) => {
            let path = expand_home(target);
            if path.is_dir() {
                path.join(file_name)
            } else {
                path
            }
        }
    }
}

/// Write `records` as a pretty-printed JSON array of drafts.
pub fn write_export(path: &Path, records: &[Record]) -> Result<()> {
    let drafts: Vec<RecordDraft> = records.iter().map(Record::draft).collect();
    let json = serde_json::to_string_pretty(&drafts)?;
    std::fs::write(path, json).map_err(|e| {
        MemfogError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to write {}: {}", path.display(), e),
        ))
    })?;
    info!(path = %path.display(), count = drafts.len(), "Exported records");
    Ok(())
}
