//! # Ecole Engine
//!
//! Referential-integrity reconciliation for the school dataset.
//!
//! The school application keeps every collection (students, parents,
//! classes, courses, grades, exercises, submissions, admins) in one JSON
//! document, edited by hand and by a REST layer with no transactional
//! guarantees. References drift: parents list students that were deleted,
//! students point at classes that no longer exist, admins written by older
//! versions lack fields. This crate repairs such a document.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine never touches files, the network, or the clock
//! - **Deterministic**: same snapshot and same `now` give the same result
//! - **Idempotent**: reconciling a reconciled snapshot changes nothing
//! - **Lossless**: fields the engine does not know are carried through
//!
//! ## Core Concepts
//!
//! ### Snapshot
//!
//! [`SchoolSnapshot`] holds every collection as an ordered sequence.
//! Storage order matters: "the first class" is the first one stored.
//!
//! ### Reconciliation
//!
//! The [`Reconciler`] runs its repair passes in a fixed order and returns a
//! [`ReconcileReport`] listing every [`Repair`]: which record, which field,
//! old and new values. An empty report means nothing changed.
//!
//! ### Audit
//!
//! [`SchoolSnapshot::audit`] checks the same invariants read-only and
//! returns a [`Violation`] per failure.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::{TimeZone, Utc};
//! use ecole_engine::{Reconciler, SchoolSnapshot};
//!
//! let mut snapshot = SchoolSnapshot::from_json(
//!     r#"{
//!         "parents": [{"id": "P1", "elevesIds": ["S1", "S9"]}],
//!         "eleves": [{"id": "S1", "nom": "Diallo"}]
//!     }"#,
//! )
//! .unwrap();
//!
//! let now = Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap();
//! let report = Reconciler::new(now).reconcile(&mut snapshot);
//!
//! assert!(report.modified());
//! assert_eq!(snapshot.eleves[0].parent_id, Some("P1".into()));
//! assert!(snapshot.audit().is_empty());
//! ```

pub mod admin;
pub mod error;
pub mod integrity;
pub mod reconcile;
pub mod record;
pub mod snapshot;

// Re-export main types at crate root
pub use admin::{default_primary_admin, PRIMARY_ADMIN_ID};
pub use error::Error;
pub use integrity::Violation;
pub use reconcile::{ReconcileReport, Reconciler, Repair, RepairKind};
pub use record::{Admin, Classe, Collection, Cours, Eleve, Fields, Parent, Record, RecordId};
pub use snapshot::{SchoolSnapshot, SnapshotSummary};
