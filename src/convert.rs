use reqwest::header::CONTENT_TYPE;

use crate::error::SimError;
use crate::similarity::ChemblHttpClient;

/// Converts structure files into SMILES text, one structure per line.
pub trait StructureConverter {
    fn ctab_to_smiles(&self, sdf: &str) -> Result<Vec<String>, SimError>;
}

impl<C: StructureConverter + ?Sized> StructureConverter for &C {
    fn ctab_to_smiles(&self, sdf: &str) -> Result<Vec<String>, SimError> {
        (**self).ctab_to_smiles(sdf)
    }
}

impl StructureConverter for ChemblHttpClient {
    fn ctab_to_smiles(&self, sdf: &str) -> Result<Vec<String>, SimError> {
        if sdf.trim().is_empty() {
            return Ok(Vec::new());
        }
        let url = format!("{}/utils/ctab2smiles", self.base_url());
        let response = self.send_with_retries(|| {
            self.client()
                .post(&url)
                .header(CONTENT_TYPE, "chemical/x-mdl-sdfile")
                .body(sdf.to_string())
        })?;
        let response = Self::handle_status(response)?;
        let text = response
            .text()
            .map_err(|err| SimError::Conversion(err.to_string()))?;
        Ok(split_smiles_output(&text))
    }
}

/// Splits converter output into lines. A leading `SMILES Name` header is kept;
/// the pipeline skips it like any other header row.
pub fn split_smiles_output(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim_end_matches('\r').to_string())
        .filter(|line| !line.trim().is_empty())
        .collect()
}
