//! Record types: the persisted note, its editable draft, and field diffs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identifier assigned by the store when a record is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted note.
///
/// Carries durable fields only. Match scores live on
/// [`MatchCandidate`](super::MatchCandidate), never here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub id: RecordId,
    pub title: String,
    pub keywords: String,
    pub body: String,
}

impl Record {
    /// Build a record from a draft once the store has assigned an id.
    pub fn from_draft(id: RecordId, draft: RecordDraft) -> Self {
        Self {
            id,
            title: draft.title,
            keywords: draft.keywords,
            body: draft.body,
        }
    }

    /// Copy of the editable fields, as used by the editor and export.
    pub fn draft(&self) -> RecordDraft {
        RecordDraft {
            title: self.title.clone(),
            keywords: self.keywords.clone(),
            body: self.body.clone(),
        }
    }
}

/// The editable, id-less part of a record.
///
/// This is also the element type of the JSON import/export array.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordDraft {
    pub title: String,
    #[serde(default)]
    pub keywords: String,
    #[serde(default)]
    pub body: String,
}

impl RecordDraft {
    pub fn new(title: &str, keywords: &str, body: &str) -> Self {
        Self {
            title: title.to_string(),
            keywords: keywords.to_string(),
            body: body.to_string(),
        }
    }
}

/// Fields that differ between a stored record and an edited draft.
///
/// `None` means "unchanged"; only `Some` fields are written by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordChanges {
    pub title: Option<String>,
    pub keywords: Option<String>,
    pub body: Option<String>,
}

impl RecordChanges {
    /// Collect the fields of `edited` whose values differ from `current`.
    pub fn between(current: &Record, edited: &RecordDraft) -> Self {
        fn changed(old: &str, new: &str) -> Option<String> {
            (old != new).then(|| new.to_string())
        }

        Self {
            title: changed(&current.title, &edited.title),
            keywords: changed(&current.keywords, &edited.keywords),
            body: changed(&current.body, &edited.body),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.keywords.is_none() && self.body.is_none()
    }

    /// Names of the changed columns, in table order.
    pub fn field_names(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.title.is_some() {
            names.push("title");
        }
        if self.keywords.is_some() {
            names.push("keywords");
        }
        if self.body.is_some() {
            names.push("body");
        }
        names
    }

    pub fn apply_to(&self, record: &mut Record) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(keywords) = &self.keywords {
            record.keywords = keywords.clone();
        }
        if let Some(body) = &self.body {
            record.body = body.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Record {
        Record::from_draft(
            RecordId(7),
            RecordDraft::new("Car Repair", "mechanic brakes", "Call Joe on Friday"),
        )
    }

    #[test]
    fn test_draft_roundtrips_fields() {
        let record = sample();
        let draft = record.draft();
        assert_eq!(draft.title, "Car Repair");
        assert_eq!(draft.keywords, "mechanic brakes");
        assert_eq!(draft.body, "Call Joe on Friday");
    }

    #[test]
    fn test_changes_between_only_differing_fields() {
        let record = sample();
        let mut edited = record.draft();
        edited.keywords = "mechanic brakes tires".to_string();

        let changes = RecordChanges::between(&record, &edited);
        assert_eq!(changes.title, None);
        assert_eq!(changes.keywords.as_deref(), Some("mechanic brakes tires"));
        assert_eq!(changes.body, None);
        assert_eq!(changes.field_names(), vec!["keywords"]);
    }

    #[test]
    fn test_changes_between_identical_is_empty() {
        let record = sample();
        let changes = RecordChanges::between(&record, &record.draft());
        assert!(changes.is_empty());
        assert!(changes.field_names().is_empty());
    }

    #[test]
    fn test_apply_to_updates_record() {
        let mut record = sample();
        let changes = RecordChanges {
            title: Some("Truck Repair".to_string()),
            keywords: None,
            body: Some(String::new()),
        };
        changes.apply_to(&mut record);

        assert_eq!(record.title, "Truck Repair");
        assert_eq!(record.keywords, "mechanic brakes");
        assert_eq!(record.body, "");
        assert_eq!(record.id, RecordId(7));
    }

    #[test]
    fn test_draft_deserialize_defaults() {
        let draft: RecordDraft = serde_json::from_str(r#"{"title": "Only a title"}"#).unwrap();
        assert_eq!(draft.title, "Only a title");
        assert!(draft.keywords.is_empty());
        assert!(draft.body.is_empty());
    }

    #[test]
    fn test_draft_missing_title_is_rejected() {
        let result = serde_json::from_str::<RecordDraft>(r#"{"keywords": "x"}"#);
        assert!(result.is_err());
    }
}
