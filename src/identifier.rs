use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::SimError;

static CHEMBL_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i)CHEMBL\d+$").expect("valid ChEMBL ID pattern"));

// Organic subset atoms outside brackets, anything inside brackets, plus bond,
// branch, ring-closure, charge and chirality symbols.
static SMILES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:Cl|Br|[BCNOSPFIbcnops]|\[[^\[\]]+\]|[0-9%()=#$:/\\.+\-@*~])+$")
        .expect("valid SMILES pattern")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentifierKind {
    ChemblId,
    Smiles,
    Invalid,
}

/// Tags a raw token. The accession grammar is checked before the looser
/// structure grammar; never fails, unknown input is `Invalid`.
pub fn classify(token: &str) -> IdentifierKind {
    let token = token.trim();
    if token.is_empty() {
        return IdentifierKind::Invalid;
    }
    if CHEMBL_ID_RE.is_match(token) {
        return IdentifierKind::ChemblId;
    }
    if SMILES_RE.is_match(token) && token.chars().any(|ch| ch.is_ascii_alphabetic()) {
        return IdentifierKind::Smiles;
    }
    IdentifierKind::Invalid
}

/// A token that classified as something queryable. ChEMBL accessions are
/// stored upper-cased; that form is both queried and used as the output label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identifier {
    ChemblId(String),
    Smiles(String),
}

impl Identifier {
    pub fn as_str(&self) -> &str {
        match self {
            Identifier::ChemblId(value) | Identifier::Smiles(value) => value,
        }
    }

    /// Name of the similarity query parameter this identifier is sent under.
    pub fn query_param(&self) -> &'static str {
        match self {
            Identifier::ChemblId(_) => "chembl_id",
            Identifier::Smiles(_) => "smiles",
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Identifier {
    type Err = SimError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        match classify(trimmed) {
            IdentifierKind::ChemblId => Ok(Identifier::ChemblId(trimmed.to_uppercase())),
            IdentifierKind::Smiles => Ok(Identifier::Smiles(trimmed.to_string())),
            IdentifierKind::Invalid => Err(SimError::InvalidIdentifier(value.to_string())),
        }
    }
}

/// Splits the first whitespace-delimited chunk of a line into identifiers,
/// dropping tokens that do not classify. Returns the valid identifiers and the
/// number of dropped tokens.
pub fn parse_identifier_group(line: &str) -> (Vec<Identifier>, usize) {
    let Some(chunk) = line.split_whitespace().next() else {
        return (Vec::new(), 0);
    };
    let mut valid = Vec::new();
    let mut dropped = 0usize;
    for token in chunk.split(',') {
        match token.parse::<Identifier>() {
            Ok(identifier) => valid.push(identifier),
            Err(_) => dropped += 1,
        }
    }
    (valid, dropped)
}
