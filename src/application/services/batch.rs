//! Batch mapping of all records in one document
//!
//! Records are independent, so they are mapped in parallel with rayon. A
//! failing record is reported and skipped; siblings are unaffected.

use std::sync::Arc;

use rayon::prelude::*;
use tracing::{debug, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult};
use crate::config::Settings;
use crate::domain::{assemble_with, Document, DomainError, NodeRef, PubmedRecord};

/// Diagnostic for one record that could not be mapped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordFailure {
    /// Position among the document's records
    pub index: usize,
    /// Raw identifier text, when one could be read
    pub pmid: Option<String>,
    pub error: DomainError,
}

/// Outcome of mapping one document.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Successfully mapped records, in document order
    pub records: Vec<PubmedRecord>,
    pub failures: Vec<RecordFailure>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.records.len() + self.failures.len()
    }
}

/// Maps record nodes to typed records.
pub struct BatchService {
    settings: Arc<Settings>,
}

impl BatchService {
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Record nodes directly below the document root.
    pub fn record_nodes<'a>(&self, doc: &'a Document) -> Vec<NodeRef<'a>> {
        doc.root()
            .map(|root| {
                root.children()
                    .filter(|c| c.tag() == self.settings.record_tag)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Map every record of `doc`.
    ///
    /// With `fail_fast` set, the first failure in document order is returned
    /// as an error instead of a report.
    #[instrument(level = "debug", skip(self, doc))]
    pub fn map_document(&self, doc: &Document) -> ApplicationResult<BatchReport> {
        let nodes = self.record_nodes(doc);
        self.map_records(&nodes)
    }

    pub fn map_records(&self, nodes: &[NodeRef<'_>]) -> ApplicationResult<BatchReport> {
        let results: Vec<Result<PubmedRecord, RecordFailure>> = nodes
            .par_iter()
            .enumerate()
            .map(|(index, node)| self.map_one(index, *node))
            .collect();

        let mut report = BatchReport::default();
        for result in results {
            match result {
                Ok(record) => report.records.push(record),
                Err(failure) => {
                    warn!(
                        index = failure.index,
                        pmid = failure.pmid.as_deref().unwrap_or("?"),
                        "skipping record: {}",
                        failure.error
                    );
                    if self.settings.fail_fast {
                        return Err(ApplicationError::RecordFailed {
                            index: failure.index,
                            pmid: failure.pmid,
                            source: failure.error,
                        });
                    }
                    report.failures.push(failure);
                }
            }
        }

        debug!(
            "map_records: {} mapped, {} failed",
            report.records.len(),
            report.failures.len()
        );
        Ok(report)
    }

    fn map_one(&self, index: usize, node: NodeRef<'_>) -> Result<PubmedRecord, RecordFailure> {
        let revision = self.settings.schema.resolve(node);
        assemble_with(node, revision).map_err(|error| RecordFailure {
            index,
            pmid: node
                .select_first(&["MedlineCitation", "PMID"])
                .and_then(|n| n.text())
                .map(str::to_string),
            error,
        })
    }
}
