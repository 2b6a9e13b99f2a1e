//! Admin schema pass.
//!
//! Runs on the `admins` collection alone. Older documents were written
//! before admins carried `isPrimary`, `dateCreation` and `createdBy`; this
//! pass backfills those fields and guarantees exactly one primary account.

use crate::{Admin, Collection, RecordId, ReconcileReport, Repair, RepairKind};
use serde_json::{json, Value};

/// Id conventionally held by the primary admin.
pub const PRIMARY_ADMIN_ID: &str = "1";

/// Build the account appended when no primary admin exists.
///
/// Credentials are placeholders that must be changed from the application.
pub fn default_primary_admin(date_creation: impl Into<String>) -> Admin {
    let mut admin = Admin::new(PRIMARY_ADMIN_ID);
    admin.is_primary = Some(true);
    admin.date_creation = Some(date_creation.into());

    for (key, value) in [
        ("nom", "Administrateur"),
        ("prenom", "Principal"),
        ("email", "admin@ecole.local"),
        ("password", "changeme"),
        ("role", "admin"),
        ("status", "actif"),
    ] {
        admin.extra.insert(key.to_string(), Value::from(value));
    }

    admin
}

fn is_conventional_primary(id: &RecordId) -> bool {
    id.as_str() == Some(PRIMARY_ADMIN_ID)
}

pub(crate) fn reconcile_admins(
    admins: &mut Vec<Admin>,
    now: &str,
    report: &mut ReconcileReport,
) {
    for admin in admins.iter_mut() {
        if admin.is_primary.is_none() {
            let is_primary = is_conventional_primary(&admin.id);
            admin.is_primary = Some(is_primary);
            report.push(default_applied(&admin.id, "isPrimary", json!(is_primary)));
        }
    }

    // Keep the first primary in storage order.
    let mut seen_primary = false;
    for admin in admins.iter_mut() {
        if !admin.is_primary() {
            continue;
        }
        if seen_primary {
            admin.is_primary = Some(false);
            report.push(Repair::new(
                Collection::Admins,
                &admin.id,
                "isPrimary",
                RepairKind::PrimaryDemoted,
                Some(json!(true)),
                Some(json!(false)),
            ));
        }
        seen_primary = true;
    }

    // An explicit `isPrimary: false` on the conventional id still counts as
    // evidence of primacy; flip it instead of appending a second "1".
    if !seen_primary {
        if let Some(admin) = admins.iter_mut().find(|a| is_conventional_primary(&a.id)) {
            admin.is_primary = Some(true);
            report.push(Repair::new(
                Collection::Admins,
                &admin.id,
                "isPrimary",
                RepairKind::PrimaryPromoted,
                Some(json!(false)),
                Some(json!(true)),
            ));
            seen_primary = true;
        }
    }

    for admin in admins.iter_mut() {
        if admin.date_creation.is_none() {
            admin.date_creation = Some(now.to_string());
            report.push(default_applied(&admin.id, "dateCreation", json!(now)));
        }
    }

    let primary_id = admins
        .iter()
        .find(|a| a.is_primary())
        .map(|a| a.id.clone())
        .unwrap_or_else(|| RecordId::from(PRIMARY_ADMIN_ID));

    for admin in admins.iter_mut() {
        if !admin.is_primary() && admin.created_by.is_none() {
            admin.created_by = Some(primary_id.clone());
            report.push(default_applied(&admin.id, "createdBy", primary_id.to_value()));
        }
    }

    if !seen_primary {
        let admin = default_primary_admin(now);
        report.push(Repair::new(
            Collection::Admins,
            &admin.id,
            "id",
            RepairKind::PrimaryAdminCreated,
            None,
            Some(admin.id.to_value()),
        ));
        admins.push(admin);
    }
}

fn default_applied(id: &RecordId, field: &str, value: Value) -> Repair {
    Repair::new(
        Collection::Admins,
        id,
        field,
        RepairKind::DefaultApplied,
        None,
        Some(value),
    )
}
