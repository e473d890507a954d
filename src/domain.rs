use std::fmt;
use std::str::FromStr;

use crate::error::SimError;

pub const MIN_THRESHOLD: u8 = 70;
pub const MAX_THRESHOLD: u8 = 100;

/// Minimum similarity percentage, always within `[70, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold(u8);

impl Threshold {
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self(95)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Threshold {
    type Err = SimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let parsed = value
            .trim()
            .parse::<i64>()
            .map_err(|_| SimError::InvalidThreshold(value.to_string()))?;
        if parsed < i64::from(MIN_THRESHOLD) || parsed > i64::from(MAX_THRESHOLD) {
            return Err(SimError::InvalidThreshold(value.to_string()));
        }
        Ok(Self(parsed as u8))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// Plain text, one comma-separated identifier group per line.
    Csv,
    ChemblId,
    Smi,
    Sdf,
}

impl SourceFormat {
    pub fn needs_conversion(&self) -> bool {
        matches!(self, SourceFormat::Sdf)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Csv => write!(f, "csv"),
            SourceFormat::ChemblId => write!(f, "chembl_id"),
            SourceFormat::Smi => write!(f, "smi"),
            SourceFormat::Sdf => write!(f, "sdf"),
        }
    }
}

impl FromStr for SourceFormat {
    type Err = SimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "chembl_id" => Ok(SourceFormat::ChemblId),
            "smi" => Ok(SourceFormat::Smi),
            "sdf" => Ok(SourceFormat::Sdf),
            _ => Err(SimError::UnsupportedSourceFormat(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationFormat {
    ChemblId,
    Smi,
    Sdf,
    Inchi,
    InchiKey,
}

impl fmt::Display for DestinationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DestinationFormat::ChemblId => write!(f, "chembl_id"),
            DestinationFormat::Smi => write!(f, "smi"),
            DestinationFormat::Sdf => write!(f, "sdf"),
            DestinationFormat::Inchi => write!(f, "inchi"),
            DestinationFormat::InchiKey => write!(f, "inchi_key"),
        }
    }
}

impl FromStr for DestinationFormat {
    type Err = SimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "chembl_id" => Ok(DestinationFormat::ChemblId),
            "smi" => Ok(DestinationFormat::Smi),
            "sdf" => Ok(DestinationFormat::Sdf),
            "inchi" => Ok(DestinationFormat::Inchi),
            "inchi_key" => Ok(DestinationFormat::InchiKey),
            _ => Err(SimError::UnsupportedDestinationFormat(value.to_string())),
        }
    }
}
