use std::fs;
use std::path::Path;

use roster_ingest::{IngestError, IngestOptions, SourceFormat, ingest_file};
use tempfile::TempDir;

fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn ingests_roster_with_banner_and_optional_columns() {
    let dir = TempDir::new().expect("temp dir");
    let contents = "\u{feff}كشف المقررات المتبقية;;;\n\
                    ;;;\n\
                    اسم المتدرب;رقم المتدرب;رمز المقرر;اسم المقرر\n\
                    سارة;441-20;MTH101;رياضيات\n\
                    ;44120;ENG102;\n\
                    عمر;55501;MTH101;\n\
                    المجموع;;;\n";
    let path = write_file(&dir, "roster.csv", contents.as_bytes());

    let sheet = ingest_file(&path, &IngestOptions::default()).expect("ingest");
    assert_eq!(sheet.format, SourceFormat::Text);
    assert_eq!(sheet.header.row_index, 2);
    assert_eq!(sheet.header.columns.trainee_name, Some(0));
    assert_eq!(sheet.header.columns.identity, 1);

    let extraction = &sheet.extraction;
    assert_eq!(extraction.trainee_count(), 2);
    let sara = &extraction.trainees["44120"];
    assert_eq!(sara.full_name, "سارة");
    assert_eq!(sara.outstanding_codes.len(), 2);
    assert_eq!(extraction.trainees["55501"].full_name, "عمر");
    assert_eq!(extraction.subjects["MTH101"].name, "رياضيات");
    assert_eq!(sheet.stats.skipped_rows(), 1);
}

#[test]
fn workbook_with_offset_range_and_numeric_ids() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/banner_roster.xlsx");

    let sheet = ingest_file(&path, &IngestOptions::default()).expect("ingest");
    assert_eq!(sheet.format, SourceFormat::Workbook);
    assert_eq!(sheet.encoding, None);
    assert_eq!(sheet.header.row_index, 2);
    assert_eq!(sheet.header.columns.trainee_name, Some(1));
    assert_eq!(sheet.header.columns.identity, 2);
    assert_eq!(sheet.header.columns.course_code, 3);
    assert_eq!(sheet.header.columns.course_name, Some(4));

    let extraction = &sheet.extraction;
    let identities: Vec<&str> = extraction.trainees.keys().map(String::as_str).collect();
    assert_eq!(identities, vec!["441200123", "441200456"]);
    let sara = &extraction.trainees["441200123"];
    assert_eq!(sara.full_name, "سارة");
    let codes: Vec<&str> = sara.outstanding_codes.iter().map(String::as_str).collect();
    assert_eq!(codes, vec!["ENG102", "MTH101"]);
    assert_eq!(extraction.subjects["ENG102"].name, "لغة إنجليزية");
    assert_eq!(sheet.stats.data_rows, 3);
    assert_eq!(sheet.stats.accepted_rows, 3);
}

#[test]
fn missing_file_is_reported() {
    let dir = TempDir::new().expect("temp dir");
    let err = ingest_file(&dir.path().join("absent.xlsx"), &IngestOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::FileNotFound { .. }));
}

#[test]
fn oversized_file_is_rejected_before_reading() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "big.csv", b"id,code\n12345,MTH101\n");
    let options = IngestOptions {
        max_file_size: 4,
        ..IngestOptions::default()
    };
    let err = ingest_file(&path, &options).unwrap_err();
    assert!(matches!(err, IngestError::FileTooLarge { max_size: 4, .. }));
}

#[test]
fn unrecognised_sheet_explains_expected_headers() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_file(&dir, "grades.csv", b"a,b\n1,2\n");
    let err = ingest_file(&path, &IngestOptions::default()).unwrap_err();
    assert!(matches!(err, IngestError::SchemaNotDetected { scanned_rows: 2 }));
    assert!(err.to_string().contains("رقم المتدرب"));
}

#[test]
fn legacy_encoded_file_is_decoded() {
    let dir = TempDir::new().expect("temp dir");
    let (bytes, _, _) =
        encoding_rs::WINDOWS_1256.encode("اسم المتدرب,رقم المتدرب,رمز المقرر\nخالد,77712,CS101\n");
    let path = write_file(&dir, "legacy.csv", &bytes);

    let sheet = ingest_file(&path, &IngestOptions::default()).expect("ingest");
    assert_eq!(sheet.encoding, Some("windows-1256"));
    assert_eq!(sheet.extraction.trainees["77712"].full_name, "خالد");
}
