use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SimError {
    #[error("Threshold should be an integer in range [70-100], got: {0}")]
    InvalidThreshold(String),

    #[error("unsupported source format: {0} (expected one of: chembl_id, sdf, smi)")]
    UnsupportedSourceFormat(String),

    #[error(
        "unsupported destination format: {0} (expected one of: chembl_id, smi, sdf, inchi, inchi_key)"
    )]
    UnsupportedDestinationFormat(String),

    #[error("invalid molecule identifier: {0}")]
    InvalidIdentifier(String),

    #[error("failed to open input {0}")]
    MissingInput(PathBuf),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("ChEMBL request failed: {0}")]
    ChemblHttp(String),

    #[error("ChEMBL returned status {status}: {message}")]
    ChemblStatus { status: u16, message: String },

    #[error("unexpected ChEMBL response: {0}")]
    ChemblResponse(String),

    #[error("structure conversion failed: {0}")]
    Conversion(String),

    #[error("i/o error: {0}")]
    Io(String),
}

impl SimError {
    /// True for errors detected while validating the run, before any line is read.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            SimError::InvalidThreshold(_)
                | SimError::UnsupportedSourceFormat(_)
                | SimError::UnsupportedDestinationFormat(_)
                | SimError::MissingInput(_)
                | SimError::ConfigRead(_)
                | SimError::ConfigParse(_)
        )
    }

    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SimError::ChemblHttp(_)
                | SimError::ChemblStatus { .. }
                | SimError::ChemblResponse(_)
                | SimError::Conversion(_)
        )
    }
}

impl From<std::io::Error> for SimError {
    fn from(err: std::io::Error) -> Self {
        SimError::Io(err.to_string())
    }
}
