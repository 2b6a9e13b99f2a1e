//! Snapshot of the whole school dataset.
//!
//! A snapshot is the in-memory form of the single JSON document the
//! application persists. Collections are ordered sequences: the reconciler
//! relies on storage order for its "first class" tie-break, so nothing here
//! sorts or re-keys records.

use crate::{
    error::Result, Admin, Classe, Collection, Cours, Eleve, Error, Fields, Parent, Record,
    RecordId,
};
use serde::{Deserialize, Serialize};

/// The full dataset at a point in time.
///
/// Known collections that are absent from the document deserialize as empty
/// sequences. Top-level keys the engine does not know are kept in `other`
/// and written back unchanged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SchoolSnapshot {
    #[serde(default)]
    pub cours: Vec<Cours>,
    #[serde(default)]
    pub eleves: Vec<Eleve>,
    #[serde(default)]
    pub parents: Vec<Parent>,
    #[serde(default)]
    pub classes: Vec<Classe>,
    #[serde(default)]
    pub notes: Vec<Record>,
    #[serde(default)]
    pub exercices: Vec<Record>,
    #[serde(default)]
    pub soumissions: Vec<Record>,
    #[serde(default)]
    pub admins: Vec<Admin>,
    #[serde(flatten)]
    pub other: Fields,
}

impl SchoolSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot from the JSON document text.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Build a snapshot from an already-parsed JSON document.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        if !value.is_object() {
            return Err(Error::InvalidSnapshot(format!(
                "expected a mapping of collections, got {}",
                json_kind(&value)
            )));
        }
        serde_json::from_value(value).map_err(|e| Error::InvalidSnapshot(e.to_string()))
    }

    /// Serialize to compact JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Serialize to pretty JSON (two-space indent), the on-disk format.
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    pub fn eleve(&self, id: &RecordId) -> Option<&Eleve> {
        self.eleves.iter().find(|e| &e.id == id)
    }

    pub fn parent(&self, id: &RecordId) -> Option<&Parent> {
        self.parents.iter().find(|p| &p.id == id)
    }

    pub fn classe(&self, id: &RecordId) -> Option<&Classe> {
        self.classes.iter().find(|c| &c.id == id)
    }

    pub fn admin(&self, id: &RecordId) -> Option<&Admin> {
        self.admins.iter().find(|a| &a.id == id)
    }

    /// First class in storage order.
    pub fn first_classe(&self) -> Option<&Classe> {
        self.classes.first()
    }

    /// The admin flagged as primary, first in storage order.
    pub fn primary_admin(&self) -> Option<&Admin> {
        self.admins.iter().find(|a| a.is_primary())
    }

    /// Number of records in a collection.
    pub fn len_of(&self, collection: Collection) -> usize {
        match collection {
            Collection::Cours => self.cours.len(),
            Collection::Eleves => self.eleves.len(),
            Collection::Parents => self.parents.len(),
            Collection::Classes => self.classes.len(),
            Collection::Notes => self.notes.len(),
            Collection::Exercices => self.exercices.len(),
            Collection::Soumissions => self.soumissions.len(),
            Collection::Admins => self.admins.len(),
        }
    }

    /// Count total records across all known collections.
    pub fn record_count(&self) -> usize {
        Collection::ALL.iter().map(|c| self.len_of(*c)).sum()
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a sequence",
        serde_json::Value::Object(_) => "a mapping",
    }
}

/// Record counts of a snapshot (without the data).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSummary {
    pub cours: usize,
    pub eleves: usize,
    pub parents: usize,
    pub classes: usize,
    pub notes: usize,
    pub exercices: usize,
    pub soumissions: usize,
    pub admins: usize,
}

impl SnapshotSummary {
    pub fn total(&self) -> usize {
        self.cours
            + self.eleves
            + self.parents
            + self.classes
            + self.notes
            + self.exercices
            + self.soumissions
            + self.admins
    }
}

impl From<&SchoolSnapshot> for SnapshotSummary {
    fn from(snapshot: &SchoolSnapshot) -> Self {
        Self {
            cours: snapshot.cours.len(),
            eleves: snapshot.eleves.len(),
            parents: snapshot.parents.len(),
            classes: snapshot.classes.len(),
            notes: snapshot.notes.len(),
            exercices: snapshot.exercices.len(),
            soumissions: snapshot.soumissions.len(),
            admins: snapshot.admins.len(),
        }
    }
}
