//! Tests for CollectionService: files to ingestion items

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

use pmcollect::application::services::CollectionService;
use pmcollect::application::ApplicationError;
use pmcollect::config::Settings;
use pmcollect::domain::IngestionItem;
use pmcollect::infrastructure::sink::JsonLinesSink;
use pmcollect::infrastructure::traits::RealFileSystem;
use pmcollect::infrastructure::xml::XmlTreeProvider;
use pmcollect::util::testing::record_xml_with_pmid;

const ABSTRACT: &str = "<Abstract><AbstractText>Body.</AbstractText></Abstract>";

fn service() -> CollectionService {
    service_with(Settings::default())
}

fn service_with(settings: Settings) -> CollectionService {
    CollectionService::new(
        Arc::new(RealFileSystem),
        Arc::new(XmlTreeProvider::new()),
        Arc::new(settings),
    )
}

const TRUNCATED: &str = "<PubmedArticleSet><PubmedArticle>";

fn document_xml(records: &[(u64, &str)]) -> String {
    let body: String = records
        .iter()
        .map(|(pmid, abstract_xml)| record_xml_with_pmid(*pmid, abstract_xml))
        .collect();
    format!("<PubmedArticleSet>{body}</PubmedArticleSet>")
}

fn write_plain(dir: &Path, name: &str, xml: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, xml).expect("write document");
    path
}

fn write_gzip(dir: &Path, name: &str, xml: &str) -> PathBuf {
    let path = dir.join(name);
    let mut encoder = GzEncoder::new(File::create(&path).expect("create"), Compression::default());
    encoder.write_all(xml.as_bytes()).expect("compress");
    encoder.finish().expect("finish");
    path
}

// ============================================================
// Input collection
// ============================================================

#[test]
fn given_directory_when_collecting_inputs_then_only_documents_sorted() {
    // Arrange
    let temp = TempDir::new().unwrap();
    std::fs::create_dir_all(temp.path().join("nested")).unwrap();
    let b = write_plain(temp.path(), "b.xml", "<PubmedArticleSet/>");
    let a = write_gzip(&temp.path().join("nested"), "a.xml.gz", "<PubmedArticleSet/>");
    write_plain(temp.path(), "notes.txt", "ignored");

    // Act
    let files = service()
        .collect_inputs(&[temp.path().to_path_buf(), b.clone()])
        .unwrap();

    // Assert
    let mut expected = vec![b, a];
    expected.sort();
    assert_eq!(files, expected);
}

#[test]
fn given_missing_input_when_collecting_then_operation_failed() {
    let temp = TempDir::new().unwrap();

    let result = service().collect_inputs(&[temp.path().join("absent.xml")]);

    assert!(matches!(result, Err(ApplicationError::OperationFailed { .. })));
}

// ============================================================
// Parsing and ingestion
// ============================================================

#[test]
fn given_gzip_document_when_parsing_then_records_mapped() {
    let temp = TempDir::new().unwrap();
    let path = write_gzip(
        temp.path(),
        "pubmed24n0001.xml.gz",
        &document_xml(&[(1, ABSTRACT), (2, "")]),
    );

    let report = service().parse_file(&path).unwrap();

    assert_eq!(report.records.len(), 2);
    assert!(report.failures.is_empty());
}

#[test]
fn given_truncated_document_when_parsing_then_operation_failed() {
    let temp = TempDir::new().unwrap();
    let path = write_plain(temp.path(), "broken.xml", TRUNCATED);

    let result = service().parse_file(&path);

    assert!(matches!(result, Err(ApplicationError::OperationFailed { .. })));
}

#[test]
fn given_good_and_truncated_documents_when_parsing_all_then_good_records_kept() {
    // Arrange
    let temp = TempDir::new().unwrap();
    write_plain(temp.path(), "a.xml", &document_xml(&[(1, ABSTRACT)]));
    let broken = write_plain(temp.path(), "b.xml", TRUNCATED);

    // Act
    let summary = service().parse_all(&[temp.path().to_path_buf()]).unwrap();

    // Assert
    assert_eq!(summary.reports.len(), 1);
    assert_eq!(summary.reports[0].report.records[0].pmid(), 1);
    assert_eq!(summary.file_failures.len(), 1);
    let (path, error) = &summary.file_failures[0];
    assert_eq!(path, &broken);
    assert!(matches!(error, ApplicationError::OperationFailed { .. }));
}

#[test]
fn given_fail_fast_when_parsing_all_with_truncated_document_then_run_aborts() {
    let temp = TempDir::new().unwrap();
    write_plain(temp.path(), "a.xml", &document_xml(&[(1, ABSTRACT)]));
    write_plain(temp.path(), "b.xml", TRUNCATED);
    let settings = Settings {
        fail_fast: true,
        ..Settings::default()
    };

    let result = service_with(settings).parse_all(&[temp.path().to_path_buf()]);

    assert!(matches!(result, Err(ApplicationError::OperationFailed { .. })));
}

#[test]
fn given_documents_when_ingesting_then_only_records_with_abstract_written() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    std::fs::create_dir_all(&input).unwrap();
    write_plain(&input, "one.xml", &document_xml(&[(11, ABSTRACT), (12, "")]));
    write_gzip(&input, "two.xml.gz", &document_xml(&[(21, ABSTRACT)]));
    let out = temp.path().join("items.jsonl");
    let sink = JsonLinesSink::open(&out).unwrap();

    // Act
    let summary = service().ingest_all(&[input], &sink).unwrap();

    // Assert
    assert_eq!(summary.files, 2);
    assert_eq!(summary.written, 2);
    assert_eq!(summary.excluded, 1);
    assert!(summary.failures.is_empty());

    let items: Vec<IngestionItem> = std::fs::read_to_string(&out)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    let ids: Vec<u64> = items.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![11, 21]);
    assert_eq!(items[0].text, "Formate assay in body fluids. Body.");
    assert_eq!(items[0].metadata["publication_status"], "ppublish");
}

#[test]
fn given_truncated_document_among_inputs_when_ingesting_then_other_files_written() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let input = temp.path().join("in");
    std::fs::create_dir_all(&input).unwrap();
    write_plain(&input, "a.xml", &document_xml(&[(31, ABSTRACT)]));
    write_plain(&input, "b.xml", TRUNCATED);
    write_gzip(&input, "c.xml.gz", &document_xml(&[(41, ABSTRACT)]));
    let out = temp.path().join("items.jsonl");
    let sink = JsonLinesSink::open(&out).unwrap();

    // Act
    let summary = service().ingest_all(&[input.clone()], &sink).unwrap();

    // Assert
    assert_eq!(summary.files, 2);
    assert_eq!(summary.written, 2);
    assert_eq!(summary.file_failures.len(), 1);
    assert_eq!(summary.file_failures[0].0, input.join("b.xml"));
    assert_eq!(std::fs::read_to_string(&out).unwrap().lines().count(), 2);
}

#[test]
fn given_index_past_end_when_reading_record_then_operation_failed() {
    let temp = TempDir::new().unwrap();
    let path = write_plain(temp.path(), "one.xml", &document_xml(&[(5, "")]));

    assert_eq!(service().record_at(&path, 0).unwrap().pmid(), 5);
    assert!(matches!(
        service().record_at(&path, 1),
        Err(ApplicationError::OperationFailed { .. })
    ));
}
