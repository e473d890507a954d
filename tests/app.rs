mod common;

use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use chembl_sim::app::App;
use chembl_sim::config::RunOptions;
use chembl_sim::error::SimError;

use common::{MockConverter, MockSearch, hit};

fn utf8(path: std::path::PathBuf) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(path).unwrap()
}

#[test]
fn file_to_file_run() {
    let temp = tempfile::tempdir().unwrap();
    let input = utf8(temp.path().join("queries.txt"));
    let output = utf8(temp.path().join("hits.txt"));
    fs::write(&input, "CHEMBL25\tfirst\nCHEMBL25,CHEMBL2\n").unwrap();

    let search = MockSearch::default()
        .with("CHEMBL25", vec![hit("CHEMBL25", "A")])
        .with("CHEMBL2", vec![hit("CHEMBL2", "B")]);
    let app = App::new(&search, MockConverter::new(&[]));
    let config = RunOptions {
        input: Some(input),
        output: Some(output.clone()),
        human: true,
        ..RunOptions::default()
    }
    .resolve()
    .unwrap();

    let summary = app.run(&config).unwrap();
    assert_eq!(summary.lines_written, 2);
    assert_eq!(summary.queries, 3);
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "query,chembl_id\nCHEMBL25,CHEMBL25\nCHEMBL25,CHEMBL2,CHEMBL25,CHEMBL2\n"
    );
}

#[test]
fn sdf_input_is_converted_first() {
    let search = MockSearch::default().with("CCO", vec![hit("CHEMBL545", "CCO")]);
    let converter = MockConverter::new(&["SMILES Name", "CCO ethanol"]);
    let app = App::new(&search, &converter);
    let config = RunOptions {
        source_format: "sdf".to_string(),
        destination_format: "smi".to_string(),
        ..RunOptions::default()
    }
    .resolve()
    .unwrap();

    let sdf = "ethanol\n  RDKit\n\n  3  2  0  0  0  0  0  0  0  0999 V2000\nM  END\n$$$$\n";
    let mut out = Vec::new();
    let summary = app.run_streams(&config, sdf.as_bytes(), &mut out).unwrap();

    assert_eq!(converter.received.borrow().as_deref(), Some(sdf));
    assert_eq!(String::from_utf8(out).unwrap(), "CCO\n");
    assert_eq!(summary.lines_skipped, 1);
    assert_eq!(search.queried(), vec!["CCO"]);
}

#[test]
fn plain_input_skips_conversion() {
    let search = MockSearch::default();
    let converter = MockConverter::new(&["CCO"]);
    let app = App::new(&search, &converter);
    let config = RunOptions {
        source_format: "smi".to_string(),
        ..RunOptions::default()
    }
    .resolve()
    .unwrap();

    let mut out = Vec::new();
    app.run_streams(&config, "c1ccccc1\n".as_bytes(), &mut out)
        .unwrap();
    assert!(converter.received.borrow().is_none());
    assert_eq!(search.queried(), vec!["c1ccccc1"]);
}

#[test]
fn missing_input_file() {
    let temp = tempfile::tempdir().unwrap();
    let output = utf8(temp.path().join("hits.txt"));
    let search = MockSearch::default();
    let app = App::new(&search, MockConverter::new(&[]));
    let config = RunOptions {
        input: Some(utf8(temp.path().join("absent.txt"))),
        output: Some(output.clone()),
        ..RunOptions::default()
    }
    .resolve()
    .unwrap();

    assert_matches!(app.run(&config), Err(SimError::MissingInput(_)));
    assert!(!output.exists());
}

#[test]
fn invalid_options_fail_before_any_stream() {
    for threshold in ["69", "101", "0", "ninety", "95.0"] {
        let options = RunOptions {
            threshold: threshold.to_string(),
            ..RunOptions::default()
        };
        let err = options.resolve().unwrap_err();
        assert_matches!(err, SimError::InvalidThreshold(_));
        assert!(err.is_configuration());
    }

    let err = RunOptions {
        destination_format: "xyz".to_string(),
        ..RunOptions::default()
    }
    .resolve()
    .unwrap_err();
    assert_matches!(err, SimError::UnsupportedDestinationFormat(_));

    let err = RunOptions {
        source_format: "mol2".to_string(),
        ..RunOptions::default()
    }
    .resolve()
    .unwrap_err();
    assert_matches!(err, SimError::UnsupportedSourceFormat(_));
}
