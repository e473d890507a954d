use std::io::{self, Write};

use crate::domain::DestinationFormat;
use crate::record::{MatchRecord, ResultSet};

/// Renders one deduplicated result set per input line.
pub trait RecordSerializer {
    /// Column header written once at stream start in human mode.
    fn write_header(&self, out: &mut dyn Write) -> io::Result<()>;

    /// Renders `results` as one newline-terminated entry. In human mode the
    /// entry is labelled with `name`, the identifiers that produced it.
    fn serialize_line(&self, results: &ResultSet, human: bool, name: &str) -> String;
}

/// Single-line formats: one field per record joined by a delimiter.
pub struct LineSerializer {
    column: &'static str,
    delimiter: &'static str,
    field: fn(&MatchRecord) -> Option<&str>,
}

pub static CHEMBL_ID: LineSerializer = LineSerializer {
    column: "chembl_id",
    delimiter: ",",
    field: MatchRecord::identity,
};

pub static SMILES: LineSerializer = LineSerializer {
    column: "smiles",
    delimiter: ",",
    field: MatchRecord::canonical_smiles,
};

// InChI strings contain commas.
pub static INCHI: LineSerializer = LineSerializer {
    column: "inchi",
    delimiter: "\t",
    field: MatchRecord::standard_inchi,
};

pub static INCHI_KEY: LineSerializer = LineSerializer {
    column: "inchi_key",
    delimiter: ",",
    field: MatchRecord::standard_inchi_key,
};

pub static SDF: SdfSerializer = SdfSerializer;

impl RecordSerializer for LineSerializer {
    fn write_header(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out, "query{}{}", self.delimiter, self.column)
    }

    fn serialize_line(&self, results: &ResultSet, human: bool, name: &str) -> String {
        let values = results
            .iter()
            .filter_map(|record| (self.field)(record))
            .collect::<Vec<_>>();
        let mut line = String::new();
        if human {
            line.push_str(name);
            line.push_str(self.delimiter);
        }
        line.push_str(&values.join(self.delimiter));
        line.push('\n');
        line
    }
}

/// MDL structure-data file. Each hit becomes one record titled with its
/// ChEMBL ID. A line without renderable hits still yields one content-empty
/// record, titled and tagged with `name` in human mode.
pub struct SdfSerializer;

impl RecordSerializer for SdfSerializer {
    fn write_header(&self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }

    fn serialize_line(&self, results: &ResultSet, human: bool, name: &str) -> String {
        let mut out = String::new();
        for record in results {
            let (Some(identity), Some(molfile)) = (record.identity(), record.molfile()) else {
                continue;
            };
            let body = match molfile.split_once('\n') {
                Some((_title, rest)) => rest,
                None => molfile,
            };
            out.push_str(identity);
            out.push('\n');
            out.push_str(body.trim_end_matches('\n'));
            out.push('\n');
            push_data_item(&mut out, "chembl_id", identity);
            if let Some(similarity) = record.similarity() {
                push_data_item(&mut out, "similarity", &similarity.to_string());
            }
            if human {
                push_data_item(&mut out, "query", name);
            }
            out.push_str("$$$$\n");
        }
        if out.is_empty() {
            if human {
                out.push_str(name);
                out.push('\n');
                push_data_item(&mut out, "query", name);
            }
            out.push_str("$$$$\n");
        }
        out
    }
}

fn push_data_item(out: &mut String, tag: &str, value: &str) {
    out.push_str(&format!("> <{tag}>\n{value}\n\n"));
}

/// Resolves the serializer for a destination format once, at startup.
pub fn serializer_for(format: DestinationFormat) -> &'static dyn RecordSerializer {
    match format {
        DestinationFormat::ChemblId => &CHEMBL_ID,
        DestinationFormat::Smi => &SMILES,
        DestinationFormat::Sdf => &SDF,
        DestinationFormat::Inchi => &INCHI,
        DestinationFormat::InchiKey => &INCHI_KEY,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;
    use crate::record::dedupe;

    fn results(values: Vec<Value>) -> ResultSet {
        dedupe(values.into_iter().filter_map(MatchRecord::from_value))
    }

    fn aspirin() -> Value {
        json!({
            "molecule_chembl_id": "CHEMBL25",
            "similarity": "100",
            "molecule_structures": {
                "canonical_smiles": "CC(=O)Oc1ccccc1C(=O)O",
                "molfile": "\n     RDKit          2D\n\n  1  0  0  0  0  0  0  0  0  0999 V2000\nM  END",
                "standard_inchi": "InChI=1S/C9H8O4/c1-6(10)13-8-5-3-2-4-7(8)9(11)12/h2-5H,1H3,(H,11,12)",
                "standard_inchi_key": "BSYNRYMUTXBXSQ-UHFFFAOYSA-N"
            }
        })
    }

    #[test]
    fn chembl_id_lines() {
        let set = results(vec![aspirin(), json!({"molecule_chembl_id": "CHEMBL2"})]);
        assert_eq!(CHEMBL_ID.serialize_line(&set, false, "CHEMBL25"), "CHEMBL25,CHEMBL2\n");
        assert_eq!(
            CHEMBL_ID.serialize_line(&set, true, "CHEMBL25"),
            "CHEMBL25,CHEMBL25,CHEMBL2\n"
        );
    }

    #[test]
    fn empty_set_is_well_formed() {
        let set = ResultSet::new();
        assert_eq!(SMILES.serialize_line(&set, false, "CCO"), "\n");
        assert_eq!(SMILES.serialize_line(&set, true, "CCO"), "CCO,\n");
        assert_eq!(SDF.serialize_line(&set, false, "CCO"), "$$$$\n");
        assert_eq!(
            SDF.serialize_line(&set, true, "CCO"),
            "CCO\n> <query>\nCCO\n\n$$$$\n"
        );
    }

    #[test]
    fn records_without_field_are_skipped() {
        let set = results(vec![aspirin(), json!({"molecule_chembl_id": "CHEMBL2"})]);
        assert_eq!(
            INCHI_KEY.serialize_line(&set, false, ""),
            "BSYNRYMUTXBXSQ-UHFFFAOYSA-N\n"
        );
    }

    #[test]
    fn inchi_uses_tabs() {
        let set = results(vec![aspirin()]);
        let line = INCHI.serialize_line(&set, true, "CHEMBL25");
        assert!(line.starts_with("CHEMBL25\tInChI=1S/C9H8O4/"));
        let mut header = Vec::new();
        INCHI.write_header(&mut header).unwrap();
        assert_eq!(header, b"query\tinchi\n");
    }

    #[test]
    fn sdf_records() {
        let set = results(vec![aspirin()]);
        let text = SDF.serialize_line(&set, true, "CHEMBL25,CCO");
        assert!(text.starts_with("CHEMBL25\n     RDKit"));
        assert!(text.contains("M  END\n> <chembl_id>\nCHEMBL25\n\n"));
        assert!(text.contains("> <similarity>\n100\n\n"));
        assert!(text.contains("> <query>\nCHEMBL25,CCO\n\n"));
        assert!(text.ends_with("$$$$\n"));

        let mut header = Vec::new();
        SDF.write_header(&mut header).unwrap();
        assert!(header.is_empty());
    }

    #[test]
    fn serializer_dispatch() {
        let set = results(vec![aspirin()]);
        let smi = serializer_for(DestinationFormat::Smi);
        assert_eq!(smi.serialize_line(&set, false, ""), "CC(=O)Oc1ccccc1C(=O)O\n");
    }
}
