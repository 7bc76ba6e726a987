#![cfg(feature = "archive")]

mod common;

use common::read_fixture;
use ffieckit::{ArchiveConfig, ArchiveExtractor, FfiecError, XbrlConfig, XbrlParser, to_json_pretty};
use std::io::{Cursor, Write};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const CALL_FIXTURE: &str = "xbrl/call_rssd_123456.xml";
const UBPR_FIXTURE: &str = "xbrl/ubpr_rssd_555001.xml";

/// Assembles a bulk-download-shaped archive in memory.
fn build_archive(members: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in members {
        writer
            .start_file(name.to_string(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(content.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

#[test]
fn extract_bulk_archive() {
    let call = read_fixture(CALL_FIXTURE);
    let ubpr = read_fixture(UBPR_FIXTURE);
    let bytes = build_archive(&[
        ("FFIEC CDR Call Schedule RC 06302009 RSSD 123456.xml", &call),
        ("Readme.txt", "See www.ffiec.gov for details."),
        ("FFIEC UBPR 12312011 RSSD 555001.xml", &ubpr),
        ("index.xml", "<index/>"),
    ]);

    let extractor = ArchiveExtractor::new(ArchiveConfig::default());
    let mut out = Vec::new();
    let summary = extractor.extract(Cursor::new(&bytes), &mut out).unwrap();

    assert_eq!(summary.selected, 2);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.records, 10);

    let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    let entries = parsed.as_array().unwrap();
    assert_eq!(entries.len(), 10);
    assert_eq!(entries[0]["mdrm"], "RCFD2170");
    assert_eq!(entries[0]["rssd"], "123456");
    assert_eq!(entries[0]["int_data"], 5000);
}

#[test]
fn extract_output_matches_whole_list_serialization() {
    let call = read_fixture(CALL_FIXTURE);
    let ubpr = read_fixture(UBPR_FIXTURE);
    let bytes = build_archive(&[
        ("Call 06302009 RSSD 123456.xml", &call),
        ("UBPR 12312011 RSSD 555001.xml", &ubpr),
    ]);

    let extractor = ArchiveExtractor::new(ArchiveConfig::default());
    let json = extractor.extract_to_string(&bytes).unwrap();

    let parser = XbrlParser::new(XbrlConfig::default());
    let mut records = parser.parse(&call).unwrap();
    records.extend(parser.parse(&ubpr).unwrap());

    assert_eq!(json, to_json_pretty(&records).unwrap());
}

#[test]
fn extract_isolates_malformed_entries() {
    let call = read_fixture(CALL_FIXTURE);
    let bytes = build_archive(&[
        ("Call 06302009 RSSD 111111.xml", "<xbrl xmlns:cc=\"x\"><cc:A"),
        ("Call 06302009 RSSD 123456.xml", &call),
        ("Call 06302009 RSSD 222222.xml", "<submission/>"),
    ]);

    let extractor = ArchiveExtractor::new(ArchiveConfig::default());
    let mut out = Vec::new();
    let summary = extractor.extract(Cursor::new(&bytes), &mut out).unwrap();

    assert_eq!(summary.selected, 3);
    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.records, 7);

    let parsed: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 7);
}

#[test]
fn extract_is_deterministic() {
    let call = read_fixture(CALL_FIXTURE);
    let ubpr = read_fixture(UBPR_FIXTURE);
    let bytes = build_archive(&[
        ("Call 06302009 RSSD 123456.xml", &call),
        ("UBPR 12312011 RSSD 555001.xml", &ubpr),
    ]);

    let extractor = ArchiveExtractor::new(ArchiveConfig::default());
    let first = extractor.extract_to_string(&bytes).unwrap();
    let second = extractor.extract_to_string(&bytes).unwrap();
    assert_eq!(first, second);
}

#[test]
fn extract_from_disk() {
    let call = read_fixture(CALL_FIXTURE);
    let bytes = build_archive(&[("Call 06302009 RSSD 123456.xml", &call)]);

    let dir = std::env::temp_dir().join("ffieckit-archive-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("bulk.zip");
    std::fs::write(&path, &bytes).unwrap();

    let extractor = ArchiveExtractor::new(ArchiveConfig::default());
    let mut out = Vec::new();
    let summary = extractor.extract_path(&path, &mut out).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.records, 7);
}

#[test]
fn extract_rejects_non_zip_input() {
    let extractor = ArchiveExtractor::new(ArchiveConfig::default());
    let err = extractor.extract_to_string(b"<xbrl/>").unwrap_err();
    assert!(matches!(err, FfiecError::Archive(_)));
}
