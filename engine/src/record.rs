//! Entity records stored in the school dataset.
//!
//! Every entity keeps the fields the reconciler cares about as typed,
//! absent-capable values and carries everything else in `extra`, so a
//! load/save round trip never drops data the engine does not know about.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Fields of a record that the engine does not interpret.
pub type Fields = Map<String, Value>;

/// Identifier of a record.
///
/// The application writes ids both as strings and as numbers. Two ids are
/// equal only when both the kind and the value match, so `"1"` and `1` are
/// different records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    Text(String),
    Number(serde_json::Number),
}

impl RecordId {
    /// The id text, if this is a string id.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            RecordId::Text(s) => Some(s),
            RecordId::Number(_) => None,
        }
    }

    /// JSON form of the id, as it appears in the document.
    pub fn to_value(&self) -> Value {
        match self {
            RecordId::Text(s) => Value::String(s.clone()),
            RecordId::Number(n) => Value::Number(n.clone()),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Text(s) => f.write_str(s),
            RecordId::Number(n) => write!(f, "{n}"),
        }
    }
}

impl From<&str> for RecordId {
    fn from(s: &str) -> Self {
        RecordId::Text(s.to_string())
    }
}

impl From<String> for RecordId {
    fn from(s: String) -> Self {
        RecordId::Text(s)
    }
}

impl From<u64> for RecordId {
    fn from(n: u64) -> Self {
        RecordId::Number(n.into())
    }
}

/// Named collections of the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Cours,
    Eleves,
    Parents,
    Classes,
    Notes,
    Exercices,
    Soumissions,
    Admins,
}

impl Collection {
    pub const ALL: [Collection; 8] = [
        Collection::Cours,
        Collection::Eleves,
        Collection::Parents,
        Collection::Classes,
        Collection::Notes,
        Collection::Exercices,
        Collection::Soumissions,
        Collection::Admins,
    ];

    /// Key of the collection in the JSON document.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Cours => "cours",
            Collection::Eleves => "eleves",
            Collection::Parents => "parents",
            Collection::Classes => "classes",
            Collection::Notes => "notes",
            Collection::Exercices => "exercices",
            Collection::Soumissions => "soumissions",
            Collection::Admins => "admins",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parent (guardian) and the students it claims.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parent {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eleves_ids: Option<Vec<RecordId>>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Parent {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            eleves_ids: None,
            extra: Fields::new(),
        }
    }

    pub fn with_eleves<I, T>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<RecordId>,
    {
        self.eleves_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Check whether this parent lists the given student.
    pub fn claims(&self, eleve_id: &RecordId) -> bool {
        self.eleves_ids
            .as_ref()
            .is_some_and(|ids| ids.contains(eleve_id))
    }
}

/// A student.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Eleve {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<RecordId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classe_id: Option<RecordId>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Eleve {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            classe_id: None,
            extra: Fields::new(),
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<RecordId>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_classe(mut self, classe_id: impl Into<RecordId>) -> Self {
        self.classe_id = Some(classe_id.into());
        self
    }
}

/// A class and the subjects taught in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classe {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matieres: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Classe {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            matieres: None,
            extra: Fields::new(),
        }
    }
}

/// A course, attached to a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cours {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classe_id: Option<RecordId>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Cours {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            classe_id: None,
            extra: Fields::new(),
        }
    }

    pub fn with_classe(mut self, classe_id: impl Into<RecordId>) -> Self {
        self.classe_id = Some(classe_id.into());
        self
    }
}

/// An administrator account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    pub id: RecordId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_primary: Option<bool>,
    /// ISO-8601 UTC creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_creation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<RecordId>,
    #[serde(flatten)]
    pub extra: Fields,
}

impl Admin {
    pub fn new(id: impl Into<RecordId>) -> Self {
        Self {
            id: id.into(),
            is_primary: None,
            date_creation: None,
            created_by: None,
            extra: Fields::new(),
        }
    }

    /// Whether the account is flagged as the primary admin.
    pub fn is_primary(&self) -> bool {
        self.is_primary == Some(true)
    }
}

/// A record of a collection the reconciler does not inspect
/// (`notes`, `exercices`, `soumissions`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    #[serde(flatten)]
    pub extra: Fields,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn string_and_number_ids_differ() {
        let text: RecordId = serde_json::from_value(json!("1")).unwrap();
        let number: RecordId = serde_json::from_value(json!(1)).unwrap();

        assert_eq!(text, RecordId::from("1"));
        assert_eq!(number, RecordId::from(1u64));
        assert_ne!(text, number);
        assert_eq!(text.as_str(), Some("1"));
        assert_eq!(number.as_str(), None);
        assert_eq!(number.to_string(), "1");
    }

    #[test]
    fn unknown_fields_survive_roundtrip() {
        let raw = json!({
            "id": "S1",
            "nom": "Diallo",
            "prenom": "Awa",
            "classeId": "C1",
            "dateNaissance": "2012-04-03"
        });

        let eleve: Eleve = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(eleve.classe_id, Some("C1".into()));
        assert_eq!(eleve.parent_id, None);
        assert_eq!(eleve.extra["nom"], "Diallo");

        assert_eq!(serde_json::to_value(&eleve).unwrap(), raw);
    }

    #[test]
    fn null_reference_is_absent() {
        let eleve: Eleve =
            serde_json::from_value(json!({"id": "S1", "parentId": null})).unwrap();
        assert_eq!(eleve.parent_id, None);
    }

    #[test]
    fn empty_string_reference_is_present() {
        let eleve: Eleve = serde_json::from_value(json!({"id": "S1", "parentId": ""})).unwrap();
        assert_eq!(eleve.parent_id, Some("".into()));
    }

    #[test]
    fn record_without_id_is_rejected() {
        let result = serde_json::from_value::<Classe>(json!({"nom": "6eme A"}));
        assert!(result.is_err());
    }

    #[test]
    fn admin_fields_use_camel_case() {
        let mut admin = Admin::new("2");
        admin.is_primary = Some(false);
        admin.date_creation = Some("2024-01-31T08:00:00.000Z".into());
        admin.created_by = Some("1".into());

        let value = serde_json::to_value(&admin).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "2",
                "isPrimary": false,
                "dateCreation": "2024-01-31T08:00:00.000Z",
                "createdBy": "1"
            })
        );
        assert!(!admin.is_primary());
    }

    #[test]
    fn parent_claims() {
        let parent = Parent::new("P1").with_eleves(["S1", "S2"]);
        assert!(parent.claims(&"S2".into()));
        assert!(!parent.claims(&"S3".into()));
        assert!(!Parent::new("P2").claims(&"S1".into()));
    }

    #[test]
    fn collection_keys() {
        let keys: Vec<_> = Collection::ALL.iter().map(Collection::as_str).collect();
        assert_eq!(
            keys,
            vec![
                "cours",
                "eleves",
                "parents",
                "classes",
                "notes",
                "exercices",
                "soumissions",
                "admins"
            ]
        );
    }
}
