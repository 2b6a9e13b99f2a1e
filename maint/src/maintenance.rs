//! One maintenance run: load, reconcile, audit, save when modified.

use crate::db::DatasetStore;
use crate::error::Result;
use chrono::{DateTime, Utc};
use ecole_engine::{ReconcileReport, Reconciler, Repair, SnapshotSummary, Violation};

/// Options of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub dry_run: bool,
    pub backup: bool,
}

/// What a run did.
#[derive(Debug, Clone)]
pub struct Outcome {
    pub summary: SnapshotSummary,
    pub report: ReconcileReport,
    /// Invariants still failing after reconciliation (expected empty)
    pub violations: Vec<Violation>,
    /// Whether the store was rewritten
    pub written: bool,
}

/// Reconcile the stored dataset, writing it back only if a repair was made.
pub fn run<S: DatasetStore>(
    store: &S,
    options: RunOptions,
    now: DateTime<Utc>,
) -> Result<Outcome> {
    let mut snapshot = store.load()?;
    let summary = SnapshotSummary::from(&snapshot);
    tracing::info!(
        eleves = summary.eleves,
        parents = summary.parents,
        classes = summary.classes,
        cours = summary.cours,
        admins = summary.admins,
        "Loaded dataset with {} records",
        summary.total()
    );

    let report = Reconciler::new(now).reconcile(&mut snapshot);
    for repair in &report.repairs {
        log_repair(repair);
    }

    let violations = snapshot.audit();
    for violation in &violations {
        tracing::warn!("Integrity check failed after repair: {}", violation);
    }

    let written = if !report.modified() {
        tracing::info!("No repairs needed, store left untouched");
        false
    } else if options.dry_run {
        tracing::info!("Dry run: {} repairs not written", report.len());
        false
    } else {
        if options.backup {
            store.backup()?;
        }
        store.save(&snapshot)?;
        tracing::info!("Applied {} repairs, store rewritten", report.len());
        true
    };

    Ok(Outcome {
        summary,
        report,
        violations,
        written,
    })
}

fn log_repair(repair: &Repair) {
    tracing::info!(
        collection = %repair.collection,
        record = %repair.record_id,
        field = %repair.field,
        kind = ?repair.kind,
        old = %render(&repair.old),
        new = %render(&repair.new),
        "Repaired"
    );
}

fn render(value: &Option<serde_json::Value>) -> String {
    match value {
        Some(value) => value.to_string(),
        None => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::JsonFileStore;
    use crate::error::AppError;
    use chrono::TimeZone;
    use ecole_engine::{RepairKind, SchoolSnapshot};
    use std::cell::RefCell;
    use std::fs;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 2, 8, 0, 0).unwrap()
    }

    const WRITE: RunOptions = RunOptions {
        dry_run: false,
        backup: true,
    };

    /// In-memory store counting saves.
    struct MemoryStore {
        snapshot: RefCell<SchoolSnapshot>,
        saves: RefCell<usize>,
    }

    impl MemoryStore {
        fn new(json: &str) -> Self {
            Self {
                snapshot: RefCell::new(SchoolSnapshot::from_json(json).unwrap()),
                saves: RefCell::new(0),
            }
        }
    }

    impl DatasetStore for MemoryStore {
        fn load(&self) -> Result<SchoolSnapshot> {
            Ok(self.snapshot.borrow().clone())
        }

        fn save(&self, snapshot: &SchoolSnapshot) -> Result<()> {
            *self.snapshot.borrow_mut() = snapshot.clone();
            *self.saves.borrow_mut() += 1;
            Ok(())
        }
    }

    const MESSY: &str = r#"{
        "parents": [{"id": "P1", "elevesIds": ["S1", "S9"]}],
        "eleves": [{"id": "S1"}, {"id": "S2", "parentId": "P404"}],
        "admins": [{"id": "2"}]
    }"#;

    #[test]
    fn repairs_are_saved_once() {
        let store = MemoryStore::new(MESSY);

        let outcome = run(&store, WRITE, now()).unwrap();

        assert!(outcome.written);
        assert!(outcome.violations.is_empty());
        assert_eq!(outcome.summary.eleves, 2);
        assert_eq!(*store.saves.borrow(), 1);
        assert_eq!(outcome.report.count(RepairKind::PrimaryAdminCreated), 1);

        let saved = store.snapshot.borrow();
        assert_eq!(saved.eleves[0].parent_id, Some("P1".into()));
        assert_eq!(saved.eleves[1].parent_id, None);
    }

    #[test]
    fn second_run_does_not_save() {
        let store = MemoryStore::new(MESSY);
        run(&store, WRITE, now()).unwrap();

        let outcome = run(&store, WRITE, now()).unwrap();

        assert!(!outcome.written);
        assert!(!outcome.report.modified());
        assert_eq!(*store.saves.borrow(), 1);
    }

    #[test]
    fn dry_run_never_saves() {
        let store = MemoryStore::new(MESSY);
        let options = RunOptions {
            dry_run: true,
            backup: true,
        };

        let outcome = run(&store, options, now()).unwrap();

        assert!(outcome.report.modified());
        assert!(!outcome.written);
        assert_eq!(*store.saves.borrow(), 0);
    }

    #[test]
    fn file_store_keeps_backup_of_original() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, MESSY).unwrap();
        let store = JsonFileStore::new(&path);

        let outcome = run(&store, WRITE, now()).unwrap();

        assert!(outcome.written);
        assert_eq!(fs::read_to_string(store.backup_path()).unwrap(), MESSY);
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["parents"][0]["elevesIds"], serde_json::json!(["S1"]));
    }

    #[test]
    fn clean_file_is_left_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        // Compact, unsorted: any rewrite would change the bytes.
        let clean = r#"{"admins":[{"role":"admin","id":"1","isPrimary":true,"dateCreation":"2024-01-01T00:00:00.000Z"}],"eleves":[]}"#;
        fs::write(&path, clean).unwrap();
        let store = JsonFileStore::new(&path);

        let outcome = run(&store, WRITE, now()).unwrap();

        assert!(!outcome.written);
        assert_eq!(fs::read_to_string(&path).unwrap(), clean);
        assert!(!store.backup_path().exists());
    }

    #[test]
    fn malformed_file_fails_without_writing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, r#"{"parents": [{"elevesIds": []}]}"#).unwrap();

        let result = run(&JsonFileStore::new(&path), WRITE, now());

        assert!(matches!(result, Err(AppError::Engine(_))));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            r#"{"parents": [{"elevesIds": []}]}"#
        );
    }

    #[test]
    fn render_values() {
        assert_eq!(render(&None), "-");
        assert_eq!(render(&Some(serde_json::json!("P1"))), "\"P1\"");
        assert_eq!(render(&Some(serde_json::json!([]))), "[]");
    }
}
