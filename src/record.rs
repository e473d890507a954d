use std::collections::HashMap;

use serde_json::{Map, Value};

pub const IDENTITY_FIELD: &str = "molecule_chembl_id";

/// One hit from the similarity service, kept as the raw JSON object.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRecord(Map<String, Value>);

impl MatchRecord {
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn identity(&self) -> Option<&str> {
        self.0
            .get(IDENTITY_FIELD)
            .and_then(|value| value.as_str())
            .filter(|value| !value.is_empty())
    }

    /// Similarity score; the service sends it as a decimal string.
    pub fn similarity(&self) -> Option<f64> {
        match self.0.get("similarity")? {
            Value::String(raw) => raw.parse().ok(),
            other => other.as_f64(),
        }
    }

    pub fn structure(&self, key: &str) -> Option<&str> {
        self.0
            .get("molecule_structures")
            .and_then(|value| value.get(key))
            .and_then(|value| value.as_str())
    }

    pub fn canonical_smiles(&self) -> Option<&str> {
        self.structure("canonical_smiles")
    }

    pub fn molfile(&self) -> Option<&str> {
        self.structure("molfile")
    }

    pub fn standard_inchi(&self) -> Option<&str> {
        self.structure("standard_inchi")
    }

    pub fn standard_inchi_key(&self) -> Option<&str> {
        self.structure("standard_inchi_key")
    }
}

/// Records unique by molecule identity. Consumers must not rely on ordering.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    records: Vec<MatchRecord>,
    index: HashMap<String, usize>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert-or-overwrite keyed by identity: last write wins, attributes are
    /// not merged. Returns false when the record has no identity and was dropped.
    pub fn insert(&mut self, record: MatchRecord) -> bool {
        let Some(identity) = record.identity().map(str::to_string) else {
            return false;
        };
        match self.index.get(&identity) {
            Some(&slot) => self.records[slot] = record,
            None => {
                self.index.insert(identity, self.records.len());
                self.records.push(record);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a MatchRecord;
    type IntoIter = std::slice::Iter<'a, MatchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Collapses a pooled sequence of records into a [`ResultSet`].
pub fn dedupe<I>(records: I) -> ResultSet
where
    I: IntoIterator<Item = MatchRecord>,
{
    let mut set = ResultSet::new();
    for record in records {
        if !set.insert(record) {
            tracing::warn!("dropping similarity record without {IDENTITY_FIELD}");
        }
    }
    set
}
