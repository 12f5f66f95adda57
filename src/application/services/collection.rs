//! Collection service: files to records to ingestion items
//!
//! Loads citation documents through the tree provider, maps them with the
//! batch service and hands projected items to an ingestion sink.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::application::services::batch::{BatchReport, BatchService, RecordFailure};
use crate::application::{ApplicationError, ApplicationResult, ResultExt};
use crate::config::Settings;
use crate::domain::{assemble_with, project, Document, PubmedRecord};
use crate::infrastructure::retrieval::decompress_if_gzip;
use crate::infrastructure::traits::{FileSystem, IngestionSink, TreeProvider};
use crate::util::path::PathExt;

/// Mapping result for one input file.
#[derive(Debug)]
pub struct FileReport {
    pub path: PathBuf,
    pub report: BatchReport,
}

/// Mapping results of a multi-file run.
#[derive(Debug, Default)]
pub struct ParseSummary {
    pub reports: Vec<FileReport>,
    /// Files that could not be read, decompressed or parsed
    pub file_failures: Vec<(PathBuf, ApplicationError)>,
}

/// Counts from one ingestion run.
#[derive(Debug, Default)]
pub struct IngestSummary {
    /// Files whose records were mapped
    pub files: usize,
    /// Items handed to the sink
    pub written: usize,
    /// Records without abstract text
    pub excluded: usize,
    pub failures: Vec<(PathBuf, RecordFailure)>,
    pub file_failures: Vec<(PathBuf, ApplicationError)>,
}

pub struct CollectionService {
    fs: Arc<dyn FileSystem>,
    provider: Arc<dyn TreeProvider>,
    batch: BatchService,
    settings: Arc<Settings>,
}

impl CollectionService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        provider: Arc<dyn TreeProvider>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            fs,
            provider,
            batch: BatchService::new(Arc::clone(&settings)),
            settings,
        }
    }

    pub fn batch(&self) -> &BatchService {
        &self.batch
    }

    /// Expand inputs into document files.
    ///
    /// Files are taken as given; directories are walked recursively for
    /// `*.xml` and `*.xml.gz`. The result is sorted and free of duplicates.
    pub fn collect_inputs(&self, inputs: &[PathBuf]) -> ApplicationResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for input in inputs {
            if self.fs.is_file(input) {
                files.push(input.clone());
            } else if self.fs.is_dir(input) {
                for entry in WalkDir::new(input)
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                {
                    if entry.path().is_document_file() {
                        files.push(entry.path().to_path_buf());
                    }
                }
            } else {
                return Err(ApplicationError::OperationFailed {
                    context: format!("input not found: {}", input.display()),
                    source: "no such file or directory".into(),
                });
            }
        }
        files.sort();
        files.dedup();
        debug!("collect_inputs: found {} files", files.len());
        Ok(files)
    }

    /// Read and parse one document file.
    #[instrument(level = "debug", skip(self))]
    pub fn load_document(&self, path: &Path) -> ApplicationResult<Document> {
        let raw = self.fs.read(path).with_path_context("read document", path)?;
        let bytes = decompress_if_gzip(path, raw).with_path_context("decompress document", path)?;
        self.provider
            .parse(&bytes, &self.settings.root_tag)
            .with_path_context("parse document", path)
    }

    pub fn parse_file(&self, path: &Path) -> ApplicationResult<BatchReport> {
        let doc = self.load_document(path)?;
        self.batch.map_document(&doc)
    }

    /// Map one input as part of a multi-file run.
    ///
    /// Without `fail_fast` a file that cannot be loaded is logged and handed
    /// back as `Ok(Err(_))` so the run continues with the next input.
    fn parse_input(&self, path: &Path) -> ApplicationResult<ApplicationResult<BatchReport>> {
        match self.parse_file(path) {
            Ok(report) => {
                info!(
                    "{}: {} records, {} failed",
                    path.display(),
                    report.records.len(),
                    report.failures.len()
                );
                Ok(Ok(report))
            }
            Err(e) if self.settings.fail_fast => Err(e),
            Err(e) => {
                warn!("skipping {}: {}", path.display(), e);
                Ok(Err(e))
            }
        }
    }

    /// Map every record of every input.
    pub fn parse_all(&self, inputs: &[PathBuf]) -> ApplicationResult<ParseSummary> {
        let mut summary = ParseSummary::default();
        for path in self.collect_inputs(inputs)? {
            match self.parse_input(&path)? {
                Ok(report) => summary.reports.push(FileReport { path, report }),
                Err(e) => summary.file_failures.push((path, e)),
            }
        }
        Ok(summary)
    }

    /// The record at `index` of one document.
    pub fn record_at(&self, path: &Path, index: usize) -> ApplicationResult<PubmedRecord> {
        let doc = self.load_document(path)?;
        let nodes = self.batch.record_nodes(&doc);
        let node = nodes.get(index).ok_or_else(|| ApplicationError::OperationFailed {
            context: format!("record {} of {}", index, path.display()),
            source: format!("document holds {} records", nodes.len()).into(),
        })?;
        let revision = self.settings.schema.resolve(*node);
        Ok(assemble_with(*node, revision)?)
    }

    /// Map, project and ingest every record of every input.
    ///
    /// Inputs are processed one file at a time; a file's records are
    /// released before the next file is loaded.
    #[instrument(level = "debug", skip(self, sink))]
    pub fn ingest_all(
        &self,
        inputs: &[PathBuf],
        sink: &dyn IngestionSink,
    ) -> ApplicationResult<IngestSummary> {
        let mut summary = IngestSummary::default();

        for path in self.collect_inputs(inputs)? {
            let report = match self.parse_input(&path)? {
                Ok(report) => report,
                Err(e) => {
                    summary.file_failures.push((path, e));
                    continue;
                }
            };
            summary.files += 1;
            for record in &report.records {
                match project(record) {
                    Some(item) => {
                        sink.ingest(&item).with_path_context("ingest record from", &path)?;
                        summary.written += 1;
                    }
                    None => summary.excluded += 1,
                }
            }
            summary
                .failures
                .extend(report.failures.into_iter().map(|f| (path.clone(), f)));
        }
        sink.flush().with_context("flush ingestion sink")?;

        info!(
            "ingest_all: {} written, {} excluded, {} failed, {} files skipped",
            summary.written,
            summary.excluded,
            summary.failures.len(),
            summary.file_failures.len()
        );
        Ok(summary)
    }
}
