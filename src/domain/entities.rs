//! Domain entities: typed citation records
//!
//! Every record is built once from one document node and never mutated
//! afterwards. Optional lists distinguish "container absent" (`None`) from
//! "container present but empty" (`Some(vec![])`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One complete citation record: bibliographic metadata plus publication data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubmedRecord {
    pub citation: MedlineCitation,
    pub data: PubmedData,
}

impl PubmedRecord {
    pub fn pmid(&self) -> u64 {
        self.citation.pmid
    }

    pub fn title(&self) -> &str {
        &self.citation.article.title
    }

    pub fn abstract_text(&self) -> Option<&str> {
        self.citation.article.abstract_text.as_deref()
    }
}

/// Bibliographic portion of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedlineCitation {
    /// Positive numeric identifier
    pub pmid: u64,
    /// Identifier version, 1 unless stated otherwise
    pub pmid_version: u32,
    pub completed: Option<NaiveDate>,
    pub revised: NaiveDate,
    pub article: Article,
    pub journal_info: MedlineJournalInfo,
    pub chemicals: Vec<Chemical>,
    pub subset: Option<String>,
    pub mesh_headings: Vec<MeshHeading>,
    pub keywords: Option<Vec<Keyword>>,
    pub personal_name_subjects: Option<Vec<Author>>,
    pub comments_corrections: Option<Vec<CommentCorrection>>,
    pub other_ids: Option<Vec<Identifier>>,
    pub other_abstracts: Option<Vec<OtherAbstract>>,
    pub general_note: Option<GeneralNote>,
    pub space_flight_missions: Option<Vec<String>>,
    pub gene_symbols: Option<Vec<String>>,
    pub supplemental_meshes: Option<Vec<SupplementalMesh>>,
    pub investigators: Option<Vec<Investigator>>,
    pub coi_statement: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub publication_model: Option<String>,
    pub journal: Journal,
    pub title: String,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub pagination: Option<String>,
    pub authors: Vec<Author>,
    pub language: String,
    pub date: Option<NaiveDate>,
    pub grants: Option<Vec<Grant>>,
    pub publication_types: Vec<PublicationType>,
    pub elocation_id: Option<ELocationId>,
    pub vernacular_title: Option<String>,
    pub data_banks: Option<Vec<DataBank>>,
    pub copyright_information: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Journal {
    pub issn: Option<Issn>,
    pub issue: JournalIssue,
    pub title: String,
    pub iso_abbreviation: Option<String>,
}

/// Volume/issue block of a journal. Season and MedlineDate stay raw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalIssue {
    pub medium: Option<String>,
    pub volume: Option<String>,
    pub issue: Option<String>,
    pub date: Option<NaiveDate>,
    pub season: Option<String>,
    pub medline_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issn {
    #[serde(rename = "type")]
    pub issn_type: Option<String>,
    pub value: String,
}

/// Author or personal-name subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub valid: bool,
    pub last_name: Option<String>,
    pub fore_name: Option<String>,
    pub initials: Option<String>,
    pub collective_name: Option<String>,
    pub affiliation: Option<String>,
    pub identifier: Option<Identifier>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Investigator {
    pub last_name: String,
    pub fore_name: Option<String>,
    pub initials: Option<String>,
    pub suffix: Option<String>,
    pub affiliation: Option<String>,
    pub identifier: Option<Identifier>,
    pub valid: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chemical {
    pub registry_number: String,
    pub unique_identifier: Option<String>,
    pub name_of_substance: String,
}

/// Subject heading: one descriptor, at most one qualifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeshHeading {
    pub descriptor: Topic,
    pub qualifier: Option<Topic>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub major_topic: bool,
    pub unique_identifier: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keyword {
    pub major_topic: bool,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub id: Option<String>,
    pub acronym: Option<String>,
    pub agency: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataBank {
    pub name: Option<String>,
    pub accession_numbers: Vec<String>,
    pub complete: bool,
}

/// Publisher-assigned location identifier, e.g. a DOI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ELocationId {
    pub id_type: Option<String>,
    pub valid: bool,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationType {
    pub unique_identifier: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentCorrection {
    pub pmid: Option<u64>,
    pub pmid_version: Option<u32>,
    pub ref_source: Option<String>,
    pub ref_type: Option<String>,
}

/// External identifier with its issuing source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identifier {
    pub id: String,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OtherAbstract {
    pub text: String,
    pub source: Option<String>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneralNote {
    pub owner: Option<String>,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplementalMesh {
    #[serde(rename = "type")]
    pub mesh_type: Option<String>,
    pub ui: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedlineJournalInfo {
    pub country: Option<String>,
    pub title_abbreviation: Option<String>,
    pub nlm_unique_id: String,
    pub issn_linking: Option<String>,
}

/// Status, history and cross-reference portion of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubmedData {
    pub article_ids: Vec<ArticleId>,
    pub publication_status: String,
    pub history: Vec<PubMedPubDate>,
    /// Every reference below any reference container, in document order
    pub references: Vec<Reference>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleId {
    pub id: Option<String>,
    pub id_type: Option<String>,
}

/// Status-dated event from the publication history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PubMedPubDate {
    pub publication_status: Option<String>,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub citation: String,
    pub article_ids: Vec<ArticleId>,
}
