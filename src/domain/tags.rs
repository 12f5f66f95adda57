//! Container tag names per schema revision.
//!
//! Revisions of the dialect spell several list containers differently. All
//! such spellings live here; mappers receive one [`TagTable`] and never branch
//! on the revision themselves.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::document::NodeRef;

/// Container tag names for one schema revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagTable {
    pub author_list: &'static str,
    pub grant_list: &'static str,
    pub publication_type_list: &'static str,
    pub data_bank_list: &'static str,
    pub accession_number_list: &'static str,
    pub chemical_list: &'static str,
    pub mesh_heading_list: &'static str,
    pub keyword_list: &'static str,
    pub personal_name_subject_list: &'static str,
    pub comments_corrections_list: &'static str,
    pub gene_symbol_list: &'static str,
    pub suppl_mesh_list: &'static str,
    pub investigator_list: &'static str,
    pub article_id_list: &'static str,
    pub reference_list: &'static str,
}

impl TagTable {
    pub const CURRENT: TagTable = TagTable {
        author_list: "AuthorList",
        grant_list: "GrantList",
        publication_type_list: "PublicationTypeList",
        data_bank_list: "DataBankList",
        accession_number_list: "AccessionNumberList",
        chemical_list: "ChemicalList",
        mesh_heading_list: "MeshHeadingList",
        keyword_list: "KeywordList",
        personal_name_subject_list: "PersonalNameSubjectList",
        comments_corrections_list: "CommentsCorrectionsList",
        gene_symbol_list: "GeneSymbolList",
        suppl_mesh_list: "SupplMeshList",
        investigator_list: "InvestigatorList",
        article_id_list: "ArticleIdList",
        reference_list: "ReferenceList",
    };

    pub const LEGACY: TagTable = TagTable {
        author_list: "Authorlist",
        grant_list: "Grantlist",
        publication_type_list: "PublicationTypelist",
        data_bank_list: "DataBanklist",
        accession_number_list: "AccessionNumberlist",
        chemical_list: "Chemicallist",
        mesh_heading_list: "MeshHeadinglist",
        keyword_list: "Keywordlist",
        personal_name_subject_list: "PersonalNameSubjectlist",
        comments_corrections_list: "CommentsCorrectionslist",
        gene_symbol_list: "GeneSymbollist",
        suppl_mesh_list: "SupplMeshList",
        investigator_list: "InvestigatorList",
        article_id_list: "ArticleIdlist",
        reference_list: "Referencelist",
    };

    pub fn containers(&self) -> [&'static str; 15] {
        [
            self.author_list,
            self.grant_list,
            self.publication_type_list,
            self.data_bank_list,
            self.accession_number_list,
            self.chemical_list,
            self.mesh_heading_list,
            self.keyword_list,
            self.personal_name_subject_list,
            self.comments_corrections_list,
            self.gene_symbol_list,
            self.suppl_mesh_list,
            self.investigator_list,
            self.article_id_list,
            self.reference_list,
        ]
    }
}

/// Known revisions of the citation dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaRevision {
    Current,
    Legacy,
}

impl SchemaRevision {
    pub fn table(self) -> &'static TagTable {
        match self {
            SchemaRevision::Current => &TagTable::CURRENT,
            SchemaRevision::Legacy => &TagTable::LEGACY,
        }
    }

    /// Legacy iff a legacy-only container spelling occurs under `record`.
    pub fn detect(record: NodeRef<'_>) -> Self {
        let current = TagTable::CURRENT.containers();
        let legacy_only: Vec<&str> = TagTable::LEGACY
            .containers()
            .into_iter()
            .filter(|tag| !current.contains(tag))
            .collect();

        let revision = if record
            .descendants()
            .any(|n| legacy_only.contains(&n.tag()))
        {
            SchemaRevision::Legacy
        } else {
            SchemaRevision::Current
        };
        debug!("detected schema revision: {:?}", revision);
        revision
    }
}

/// Revision choice from configuration: detect per record, or pin one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaSelection {
    #[default]
    Auto,
    Current,
    Legacy,
}

impl SchemaSelection {
    pub fn resolve(self, record: NodeRef<'_>) -> SchemaRevision {
        match self {
            SchemaSelection::Auto => SchemaRevision::detect(record),
            SchemaSelection::Current => SchemaRevision::Current,
            SchemaSelection::Legacy => SchemaRevision::Legacy,
        }
    }
}

impl std::str::FromStr for SchemaSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(SchemaSelection::Auto),
            "current" => Ok(SchemaSelection::Current),
            "legacy" => Ok(SchemaSelection::Legacy),
            other => Err(format!("unknown schema selection: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{Document, ElementData};

    fn record_with(container: &str) -> Document {
        let mut doc = Document::new();
        let root = doc.insert_node(ElementData::new("PubmedArticle"), None);
        let citation = doc.insert_node(ElementData::new("MedlineCitation"), Some(root));
        doc.insert_node(ElementData::new(container), Some(citation));
        doc
    }

    #[test]
    fn given_lowercase_list_spelling_when_detecting_then_legacy() {
        let doc = record_with("Authorlist");
        assert_eq!(
            SchemaRevision::detect(doc.root().unwrap()),
            SchemaRevision::Legacy
        );
    }

    #[test]
    fn given_shared_spelling_when_detecting_then_current() {
        let doc = record_with("InvestigatorList");
        assert_eq!(
            SchemaRevision::detect(doc.root().unwrap()),
            SchemaRevision::Current
        );
    }

    #[test]
    fn given_pinned_selection_when_resolving_then_ignores_document() {
        let doc = record_with("Authorlist");
        assert_eq!(
            SchemaSelection::Current.resolve(doc.root().unwrap()),
            SchemaRevision::Current
        );
        assert_eq!("LEGACY".parse::<SchemaSelection>(), Ok(SchemaSelection::Legacy));
        assert!("v2".parse::<SchemaSelection>().is_err());
    }
}
