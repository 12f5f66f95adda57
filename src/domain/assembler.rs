//! Record assembly: citation subtree + publication-data subtree.

use tracing::{debug, instrument};

use super::document::NodeRef;
use super::entities::{ArticleId, MedlineCitation, PubMedPubDate, PubmedData, PubmedRecord, Reference};
use super::error::{DomainError, DomainResult};
use super::mapper::{list_of, map_all, require_text, FromNode};
use super::tags::{SchemaRevision, TagTable};

pub const CITATION_TAG: &str = "MedlineCitation";
pub const PUBLICATION_DATA_TAG: &str = "PubmedData";

/// Assemble a record, detecting the schema revision from the record itself.
pub fn assemble(record: NodeRef<'_>) -> DomainResult<PubmedRecord> {
    assemble_with(record, SchemaRevision::detect(record))
}

/// Assemble a record with a known schema revision.
///
/// Both subtrees are located by tag, so sibling order does not matter.
#[instrument(level = "debug", skip(record), fields(tag = record.tag()))]
pub fn assemble_with(record: NodeRef<'_>, revision: SchemaRevision) -> DomainResult<PubmedRecord> {
    let tags = revision.table();

    let citation_node = record
        .find(CITATION_TAG)
        .ok_or_else(|| DomainError::SchemaShapeMismatch {
            expected: CITATION_TAG.to_string(),
        })?;
    let data_node = record
        .find(PUBLICATION_DATA_TAG)
        .ok_or_else(|| DomainError::SchemaShapeMismatch {
            expected: PUBLICATION_DATA_TAG.to_string(),
        })?;

    let citation = MedlineCitation::from_node(citation_node, tags)?;
    let data = PubmedData::from_node(data_node, tags)?;
    debug!(
        pmid = citation.pmid,
        references = data.references.len(),
        "assembled record"
    );

    Ok(PubmedRecord { citation, data })
}

/// Every reference below any reference container, at any nesting depth.
///
/// Each reference node is visited once, in document order. Structurally
/// identical entries are kept.
pub fn flatten_references(data: NodeRef<'_>, tags: &TagTable) -> DomainResult<Vec<Reference>> {
    map_all(data.select(&[tags.reference_list, "Reference"]), tags)
}

impl FromNode for PubmedData {
    fn from_node(node: NodeRef<'_>, tags: &TagTable) -> DomainResult<Self> {
        // Only the record's own identifier list; references carry their own.
        let article_ids = match node.children().find(|c| c.tag() == tags.article_id_list) {
            Some(list) => map_all(list.children().filter(|c| c.tag() == "ArticleId"), tags)?,
            None => Vec::<ArticleId>::new(),
        };

        Ok(Self {
            article_ids,
            publication_status: require_text(node, "PublicationStatus", "PubmedData")?,
            history: list_of::<PubMedPubDate>(node, "History", "PubMedPubDate", tags)?,
            references: flatten_references(node, tags)?,
        })
    }
}
