//! Read-only integrity audit of a snapshot.
//!
//! The audit checks the invariants the reconciler establishes without
//! touching the data. A reconciled snapshot always audits clean.

use crate::{RecordId, SchoolSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One failed invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum Violation {
    /// A parent lists a student that does not exist
    MissingEleve { parent: RecordId, eleve: RecordId },
    /// A parent lists a student whose `parentId` points elsewhere
    ParentMismatch {
        parent: RecordId,
        eleve: RecordId,
        actual: Option<RecordId>,
    },
    /// A student points at a parent that does not exist
    MissingParent { eleve: RecordId, parent: RecordId },
    /// A student's parent does not list it
    MissingBackReference { eleve: RecordId, parent: RecordId },
    /// A student points at a class that does not exist
    StudentClasseMissing { eleve: RecordId, classe: RecordId },
    /// A course has no class although classes exist
    CoursUnassigned { cours: RecordId },
    /// A course points at a class that does not exist
    CoursClasseMissing { cours: RecordId, classe: RecordId },
    /// A class has no `matieres`
    MatieresMissing { classe: RecordId },
    /// Zero or several admins are primary
    PrimaryAdminCount { count: usize },
    /// An admin has no `isPrimary` flag
    IsPrimaryMissing { admin: RecordId },
    /// An admin has no `dateCreation`
    DateCreationMissing { admin: RecordId },
    /// A secondary admin has no `createdBy`
    CreatedByMissing { admin: RecordId },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingEleve { parent, eleve } => {
                write!(f, "parent {parent} lists missing eleve {eleve}")
            }
            Violation::ParentMismatch {
                parent,
                eleve,
                actual,
            } => match actual {
                Some(actual) => write!(
                    f,
                    "parent {parent} lists eleve {eleve} whose parentId is {actual}"
                ),
                None => write!(f, "parent {parent} lists eleve {eleve} without parentId"),
            },
            Violation::MissingParent { eleve, parent } => {
                write!(f, "eleve {eleve} points at missing parent {parent}")
            }
            Violation::MissingBackReference { eleve, parent } => {
                write!(f, "parent {parent} does not list its eleve {eleve}")
            }
            Violation::StudentClasseMissing { eleve, classe } => {
                write!(f, "eleve {eleve} points at missing classe {classe}")
            }
            Violation::CoursUnassigned { cours } => write!(f, "cours {cours} has no classe"),
            Violation::CoursClasseMissing { cours, classe } => {
                write!(f, "cours {cours} points at missing classe {classe}")
            }
            Violation::MatieresMissing { classe } => {
                write!(f, "classe {classe} has no matieres")
            }
            Violation::PrimaryAdminCount { count } => {
                write!(f, "expected exactly one primary admin, found {count}")
            }
            Violation::IsPrimaryMissing { admin } => write!(f, "admin {admin} has no isPrimary"),
            Violation::DateCreationMissing { admin } => {
                write!(f, "admin {admin} has no dateCreation")
            }
            Violation::CreatedByMissing { admin } => {
                write!(f, "secondary admin {admin} has no createdBy")
            }
        }
    }
}

impl SchoolSnapshot {
    /// Check every integrity invariant, returning the failures.
    ///
    /// An empty result means the snapshot is consistent.
    pub fn audit(&self) -> Vec<Violation> {
        let mut violations = Vec::new();
        self.audit_family(&mut violations);
        self.audit_classes(&mut violations);
        self.audit_admins(&mut violations);
        violations
    }

    fn audit_family(&self, violations: &mut Vec<Violation>) {
        for parent in &self.parents {
            for eleve_id in parent.eleves_ids.iter().flatten() {
                match self.eleve(eleve_id) {
                    None => violations.push(Violation::MissingEleve {
                        parent: parent.id.clone(),
                        eleve: eleve_id.clone(),
                    }),
                    Some(eleve) if eleve.parent_id.as_ref() != Some(&parent.id) => {
                        violations.push(Violation::ParentMismatch {
                            parent: parent.id.clone(),
                            eleve: eleve_id.clone(),
                            actual: eleve.parent_id.clone(),
                        })
                    }
                    Some(_) => {}
                }
            }
        }

        for eleve in &self.eleves {
            let Some(parent_id) = &eleve.parent_id else {
                continue;
            };
            match self.parent(parent_id) {
                None => violations.push(Violation::MissingParent {
                    eleve: eleve.id.clone(),
                    parent: parent_id.clone(),
                }),
                Some(parent) if !parent.claims(&eleve.id) => {
                    violations.push(Violation::MissingBackReference {
                        eleve: eleve.id.clone(),
                        parent: parent_id.clone(),
                    })
                }
                Some(_) => {}
            }
        }
    }

    fn audit_classes(&self, violations: &mut Vec<Violation>) {
        for eleve in &self.eleves {
            if let Some(classe_id) = &eleve.classe_id {
                if self.classe(classe_id).is_none() {
                    violations.push(Violation::StudentClasseMissing {
                        eleve: eleve.id.clone(),
                        classe: classe_id.clone(),
                    });
                }
            }
        }

        for cours in &self.cours {
            match &cours.classe_id {
                None if !self.classes.is_empty() => {
                    violations.push(Violation::CoursUnassigned {
                        cours: cours.id.clone(),
                    })
                }
                Some(classe_id) if self.classe(classe_id).is_none() => {
                    violations.push(Violation::CoursClasseMissing {
                        cours: cours.id.clone(),
                        classe: classe_id.clone(),
                    })
                }
                _ => {}
            }
        }

        for classe in &self.classes {
            if classe.matieres.is_none() {
                violations.push(Violation::MatieresMissing {
                    classe: classe.id.clone(),
                });
            }
        }
    }

    fn audit_admins(&self, violations: &mut Vec<Violation>) {
        let count = self.admins.iter().filter(|a| a.is_primary()).count();
        if count != 1 {
            violations.push(Violation::PrimaryAdminCount { count });
        }

        for admin in &self.admins {
            if admin.is_primary.is_none() {
                violations.push(Violation::IsPrimaryMissing {
                    admin: admin.id.clone(),
                });
            }
            if admin.date_creation.is_none() {
                violations.push(Violation::DateCreationMissing {
                    admin: admin.id.clone(),
                });
            }
            if !admin.is_primary() && admin.created_by.is_none() {
                violations.push(Violation::CreatedByMissing {
                    admin: admin.id.clone(),
                });
            }
        }
    }
}
