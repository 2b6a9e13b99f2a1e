//! Referential-integrity reconciliation of a school snapshot.
//!
//! Given a snapshot that may hold dangling references and missing default
//! fields, the reconciler produces a consistent snapshot and a list of every
//! repair it performed.
//!
//! # Algorithm
//!
//! Passes run in a fixed order and each one sees the effects of the
//! previous ones:
//!
//! 1. Parent -> student: drop claims on missing students, point claimed
//!    students back at their parent
//! 2. Student -> parent: clear links to missing parents, append missing
//!    back-references
//! 3. Student -> class: move students off missing classes
//! 4. Course -> class: attach unassigned or dangling courses, or clear
//!    dangling links when no class exists
//! 5. Class defaults: `matieres`
//! 6. Admin schema (see [`crate::admin`])
//!
//! "First class" always means first in storage order. Records are matched
//! by id equality only.

use crate::{admin, Collection, RecordId, SchoolSnapshot};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// What a repair did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RepairKind {
    /// A parent listed a student that does not exist
    DanglingEleveRemoved,
    /// A parent listed a student owned by another parent
    ContestedClaimRemoved,
    /// A claimed student now points back at its parent
    ParentLinked,
    /// A student pointed at a parent that does not exist
    DanglingParentCleared,
    /// A student was appended to its parent's list
    BackReferenceAppended,
    /// A student pointed at a missing class and was moved to the first one
    ClasseReassigned,
    /// A student pointed at a missing class and no class exists
    DanglingClasseCleared,
    /// A course without a valid class was attached to the first one
    CoursClasseAssigned,
    /// A course pointed at a missing class and no class exists
    CoursClasseCleared,
    /// A missing field received its default value
    DefaultApplied,
    /// An extra primary admin lost the flag
    PrimaryDemoted,
    /// The admin with the conventional primary id regained the flag
    PrimaryPromoted,
    /// No primary admin existed, a default one was appended
    PrimaryAdminCreated,
}

/// One change made by the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repair {
    pub collection: Collection,
    pub record_id: RecordId,
    pub field: String,
    pub kind: RepairKind,
    /// Value before the repair, absent when the field did not exist
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old: Option<Value>,
    /// Value after the repair, absent when the field was removed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new: Option<Value>,
}

impl Repair {
    pub fn new(
        collection: Collection,
        record_id: &RecordId,
        field: impl Into<String>,
        kind: RepairKind,
        old: Option<Value>,
        new: Option<Value>,
    ) -> Self {
        Self {
            collection,
            record_id: record_id.clone(),
            field: field.into(),
            kind,
            old,
            new,
        }
    }
}

/// Result of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub repairs: Vec<Repair>,
}

impl ReconcileReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when at least one field was changed.
    pub fn modified(&self) -> bool {
        !self.repairs.is_empty()
    }

    pub fn len(&self) -> usize {
        self.repairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repairs.is_empty()
    }

    pub(crate) fn push(&mut self, repair: Repair) {
        self.repairs.push(repair);
    }

    /// Repairs touching one record.
    pub fn for_record(
        &self,
        collection: Collection,
        record_id: RecordId,
    ) -> impl Iterator<Item = &Repair> + '_ {
        self.repairs
            .iter()
            .filter(move |r| r.collection == collection && r.record_id == record_id)
    }

    /// Number of repairs of a given kind.
    pub fn count(&self, kind: RepairKind) -> usize {
        self.repairs.iter().filter(|r| r.kind == kind).count()
    }
}

/// Applies the repair passes to a snapshot.
#[derive(Debug, Clone)]
pub struct Reconciler {
    now: DateTime<Utc>,
}

impl Reconciler {
    /// Create a reconciler; `now` stamps every synthesized `dateCreation`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// The reconciliation instant as written into records.
    pub fn timestamp(&self) -> String {
        self.now.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    /// Repair the snapshot in place.
    pub fn reconcile(&self, snapshot: &mut SchoolSnapshot) -> ReconcileReport {
        let mut report = ReconcileReport::new();

        link_parents_to_eleves(snapshot, &mut report);
        link_eleves_to_parents(snapshot, &mut report);
        attach_eleves_to_classes(snapshot, &mut report);
        attach_cours_to_classes(snapshot, &mut report);
        default_classe_fields(snapshot, &mut report);
        admin::reconcile_admins(&mut snapshot.admins, &self.timestamp(), &mut report);

        report
    }

    /// Repair an owned snapshot and hand it back with the report.
    pub fn reconcile_owned(
        &self,
        mut snapshot: SchoolSnapshot,
    ) -> (SchoolSnapshot, ReconcileReport) {
        let report = self.reconcile(&mut snapshot);
        (snapshot, report)
    }
}

/// Decide which parent owns each claimed student.
///
/// Claims are applied in storage order and each one overwrites the student's
/// link, so the last parent listing a student owns it.
fn claim_owners(snapshot: &SchoolSnapshot) -> HashMap<RecordId, RecordId> {
    let mut owners = HashMap::new();

    for parent in &snapshot.parents {
        for eleve_id in parent.eleves_ids.iter().flatten() {
            owners.insert(eleve_id.clone(), parent.id.clone());
        }
    }

    owners
}

/// Remove every occurrence of `id` from a list, reporting whether any was found.
fn remove_id(ids: &mut Vec<RecordId>, id: &RecordId) -> bool {
    let before = ids.len();
    ids.retain(|e| e != id);
    ids.len() != before
}

fn link_parents_to_eleves(snapshot: &mut SchoolSnapshot, report: &mut ReconcileReport) {
    let owners = claim_owners(snapshot);

    for parent in snapshot.parents.iter_mut() {
        // Iterate over a copy: the list shrinks while we walk it.
        let Some(claimed) = parent.eleves_ids.clone() else {
            continue;
        };

        for eleve_id in &claimed {
            let ids = parent.eleves_ids.get_or_insert_with(Vec::new);

            let Some(eleve) = snapshot.eleves.iter_mut().find(|e| &e.id == eleve_id) else {
                if remove_id(ids, eleve_id) {
                    report.push(Repair::new(
                        Collection::Parents,
                        &parent.id,
                        "elevesIds",
                        RepairKind::DanglingEleveRemoved,
                        Some(eleve_id.to_value()),
                        None,
                    ));
                }
                continue;
            };

            if owners.get(eleve_id) != Some(&parent.id) {
                if remove_id(ids, eleve_id) {
                    report.push(Repair::new(
                        Collection::Parents,
                        &parent.id,
                        "elevesIds",
                        RepairKind::ContestedClaimRemoved,
                        Some(eleve_id.to_value()),
                        None,
                    ));
                }
                continue;
            }

            if eleve.parent_id.as_ref() != Some(&parent.id) {
                let old = eleve.parent_id.replace(parent.id.clone());
                report.push(Repair::new(
                    Collection::Eleves,
                    &eleve.id,
                    "parentId",
                    RepairKind::ParentLinked,
                    old.map(|id| id.to_value()),
                    Some(parent.id.to_value()),
                ));
            }
        }
    }
}

fn link_eleves_to_parents(snapshot: &mut SchoolSnapshot, report: &mut ReconcileReport) {
    for eleve in snapshot.eleves.iter_mut() {
        let Some(parent_id) = eleve.parent_id.clone() else {
            continue;
        };

        match snapshot.parents.iter_mut().find(|p| p.id == parent_id) {
            None => {
                eleve.parent_id = None;
                report.push(Repair::new(
                    Collection::Eleves,
                    &eleve.id,
                    "parentId",
                    RepairKind::DanglingParentCleared,
                    Some(parent_id.to_value()),
                    None,
                ));
            }
            Some(parent) if !parent.claims(&eleve.id) => {
                parent
                    .eleves_ids
                    .get_or_insert_with(Vec::new)
                    .push(eleve.id.clone());
                report.push(Repair::new(
                    Collection::Parents,
                    &parent.id,
                    "elevesIds",
                    RepairKind::BackReferenceAppended,
                    None,
                    Some(eleve.id.to_value()),
                ));
            }
            Some(_) => {}
        }
    }
}

fn attach_eleves_to_classes(snapshot: &mut SchoolSnapshot, report: &mut ReconcileReport) {
    let first_classe = snapshot.first_classe().map(|c| c.id.clone());

    for eleve in snapshot.eleves.iter_mut() {
        let Some(classe_id) = &eleve.classe_id else {
            continue;
        };
        if snapshot.classes.iter().any(|c| &c.id == classe_id) {
            continue;
        }

        let old = Some(classe_id.to_value());
        match &first_classe {
            Some(first) => {
                eleve.classe_id = Some(first.clone());
                report.push(Repair::new(
                    Collection::Eleves,
                    &eleve.id,
                    "classeId",
                    RepairKind::ClasseReassigned,
                    old,
                    Some(first.to_value()),
                ));
            }
            None => {
                eleve.classe_id = None;
                report.push(Repair::new(
                    Collection::Eleves,
                    &eleve.id,
                    "classeId",
                    RepairKind::DanglingClasseCleared,
                    old,
                    None,
                ));
            }
        }
    }
}

fn attach_cours_to_classes(snapshot: &mut SchoolSnapshot, report: &mut ReconcileReport) {
    let first_classe = snapshot.first_classe().map(|c| c.id.clone());

    for cours in snapshot.cours.iter_mut() {
        let resolves = cours
            .classe_id
            .as_ref()
            .is_some_and(|id| snapshot.classes.iter().any(|c| &c.id == id));
        if resolves {
            continue;
        }

        match &first_classe {
            Some(first) => {
                let old = cours.classe_id.replace(first.clone());
                report.push(Repair::new(
                    Collection::Cours,
                    &cours.id,
                    "classeId",
                    RepairKind::CoursClasseAssigned,
                    old.map(|id| id.to_value()),
                    Some(first.to_value()),
                ));
            }
            // Without classes an unassigned course stays unassigned.
            None => {
                if let Some(old) = cours.classe_id.take() {
                    report.push(Repair::new(
                        Collection::Cours,
                        &cours.id,
                        "classeId",
                        RepairKind::CoursClasseCleared,
                        Some(old.to_value()),
                        None,
                    ));
                }
            }
        }
    }
}

fn default_classe_fields(snapshot: &mut SchoolSnapshot, report: &mut ReconcileReport) {
    for classe in snapshot.classes.iter_mut() {
        if classe.matieres.is_none() {
            classe.matieres = Some(Vec::new());
            report.push(Repair::new(
                Collection::Classes,
                &classe.id,
                "matieres",
                RepairKind::DefaultApplied,
                None,
                Some(Value::Array(Vec::new())),
            ));
        }
    }
}
