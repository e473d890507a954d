#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::{Value, json};

use chembl_sim::convert::StructureConverter;
use chembl_sim::domain::Threshold;
use chembl_sim::error::SimError;
use chembl_sim::identifier::Identifier;
use chembl_sim::record::MatchRecord;
use chembl_sim::similarity::{SimilarityPage, SimilaritySearch};

/// Serves canned hits keyed by identifier and records every request.
#[derive(Default)]
pub struct MockSearch {
    hits: HashMap<String, Vec<Value>>,
    failing: Vec<String>,
    pub calls: RefCell<Vec<(String, &'static str, u8)>>,
}

impl MockSearch {
    pub fn with(mut self, identifier: &str, hits: Vec<Value>) -> Self {
        self.hits.insert(identifier.to_string(), hits);
        self
    }

    pub fn failing_on(mut self, identifier: &str) -> Self {
        self.failing.push(identifier.to_string());
        self
    }

    pub fn queried(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .map(|(id, _, _)| id.clone())
            .collect()
    }
}

impl SimilaritySearch for MockSearch {
    fn fetch_page(
        &self,
        identifier: &Identifier,
        threshold: Threshold,
        _offset: usize,
    ) -> Result<SimilarityPage, SimError> {
        self.calls.borrow_mut().push((
            identifier.as_str().to_string(),
            identifier.query_param(),
            threshold.value(),
        ));
        if self.failing.iter().any(|id| id == identifier.as_str()) {
            return Err(SimError::ChemblHttp("connection refused".to_string()));
        }
        let records = self
            .hits
            .get(identifier.as_str())
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter_map(MatchRecord::from_value)
            .collect();
        Ok(SimilarityPage {
            records,
            next_offset: None,
        })
    }
}

pub struct MockConverter {
    pub lines: Vec<String>,
    pub received: RefCell<Option<String>>,
}

impl MockConverter {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|line| line.to_string()).collect(),
            received: RefCell::new(None),
        }
    }
}

impl StructureConverter for MockConverter {
    fn ctab_to_smiles(&self, sdf: &str) -> Result<Vec<String>, SimError> {
        *self.received.borrow_mut() = Some(sdf.to_string());
        Ok(self.lines.clone())
    }
}

pub fn hit(chembl_id: &str, smiles: &str) -> Value {
    json!({
        "molecule_chembl_id": chembl_id,
        "similarity": "97.5",
        "molecule_structures": {
            "canonical_smiles": smiles,
            "standard_inchi_key": format!("{chembl_id}-KEY"),
        }
    })
}
