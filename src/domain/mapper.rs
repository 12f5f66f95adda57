//! Per-entity construction rules.
//!
//! Each entity is built by a pure function of one node plus the tag table of
//! the record's schema revision. Container tag names come from the table;
//! leaf tag names are the same in every revision and are written inline.

use std::str::FromStr;

use super::date::{date_from_node, optional_date, required_date};
use super::document::NodeRef;
use super::entities::*;
use super::error::{DomainError, DomainResult};
use super::resolve::{
    resolve_attr, resolve_bool_attr, resolve_path_text, resolve_rich_text, resolve_text,
};
use super::tags::TagTable;

/// Construction of a typed entity from one document node.
pub trait FromNode: Sized {
    fn from_node(node: NodeRef<'_>, tags: &TagTable) -> DomainResult<Self>;
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn require_node<'a>(
    node: NodeRef<'a>,
    tag: &'static str,
    entity: &'static str,
) -> DomainResult<NodeRef<'a>> {
    node.find(tag).ok_or_else(|| DomainError::missing(entity, tag))
}

pub(crate) fn require_text(
    node: NodeRef<'_>,
    tag: &'static str,
    entity: &'static str,
) -> DomainResult<String> {
    resolve_text(node, tag).ok_or_else(|| DomainError::missing(entity, tag))
}

fn require_rich_text(
    node: NodeRef<'_>,
    tag: &'static str,
    entity: &'static str,
) -> DomainResult<String> {
    resolve_rich_text(node, tag).ok_or_else(|| DomainError::missing(entity, tag))
}

/// The node's own leading text.
fn require_own_text(
    node: NodeRef<'_>,
    entity: &'static str,
    field: &'static str,
) -> DomainResult<String> {
    node.text()
        .map(str::to_string)
        .ok_or_else(|| DomainError::missing(entity, field))
}

pub(crate) fn parse_number<T: FromStr>(raw: &str, field: &'static str) -> DomainResult<T> {
    raw.trim().parse().map_err(|_| DomainError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

fn pmid_version(pmid: NodeRef<'_>, entity: &'static str) -> DomainResult<u32> {
    let raw = pmid
        .attr("Version")
        .ok_or_else(|| DomainError::missing(entity, "PMID.Version"))?;
    parse_number(raw, "PMID.Version")
}

pub(crate) fn map_all<'a, T: FromNode>(
    nodes: impl IntoIterator<Item = NodeRef<'a>>,
    tags: &TagTable,
) -> DomainResult<Vec<T>> {
    nodes.into_iter().map(|n| T::from_node(n, tags)).collect()
}

/// Every `item` below a `container` below `node`; empty when there is none.
pub(crate) fn list_of<T: FromNode>(
    node: NodeRef<'_>,
    container: &str,
    item: &str,
    tags: &TagTable,
) -> DomainResult<Vec<T>> {
    map_all(node.select(&[container, item]), tags)
}

/// Like [`list_of`], but `None` when the container itself is absent.
pub(crate) fn optional_list<T: FromNode>(
    node: NodeRef<'_>,
    container: &str,
    item: &str,
    tags: &TagTable,
) -> DomainResult<Option<Vec<T>>> {
    if node.find(container).is_none() {
        return Ok(None);
    }
    list_of(node, container, item, tags).map(Some)
}

/// All `tag` descendants, `None` when there is not a single one.
fn optional_all<T: FromNode>(
    node: NodeRef<'_>,
    tag: &str,
    tags: &TagTable,
) -> DomainResult<Option<Vec<T>>> {
    let found = node.find_all(tag);
    if found.is_empty() {
        return Ok(None);
    }
    map_all(found, tags).map(Some)
}

fn optional_entity<T: FromNode>(
    node: NodeRef<'_>,
    tag: &str,
    tags: &TagTable,
) -> DomainResult<Option<T>> {
    node.find(tag).map(|n| T::from_node(n, tags)).transpose()
}

fn texts<'a>(nodes: impl IntoIterator<Item = NodeRef<'a>>) -> Vec<String> {
    nodes
        .into_iter()
        .filter_map(|n| n.text().map(str::to_string))
        .collect()
}

// ---------------------------------------------------------------------------
// Citation
// ---------------------------------------------------------------------------

impl FromNode for MedlineCitation {
    fn from_node(node: NodeRef<'_>, tags: &TagTable) -> DomainResult<Self> {
        const ENTITY: &str = "MedlineCitation";

        let pmid_node = require_node(node, "PMID", ENTITY)?;
        let pmid_raw = pmid_node
            .text()
            .ok_or_else(|| DomainError::missing(ENTITY, "PMID"))?;
        let pmid: u64 = parse_number(pmid_raw, "PMID")?;
        if pmid == 0 {
            return Err(DomainError::InvalidNumber {
                field: "PMID",
                value: pmid_raw.to_string(),
            });
        }

        let gene_symbols = node
            .find(tags.gene_symbol_list)
            .map(|_| texts(node.select(&[tags.gene_symbol_list, "GeneSymbol"])));
        let space_flight_missions = Some(texts(node.find_all("SpaceFlightMission")))
            .filter(|missions: &Vec<String>| !missions.is_empty());

        Ok(Self {
            pmid,
            pmid_version: pmid_version(pmid_node, ENTITY)?,
            completed: optional_date(node, "DateCompleted")?,
            revised: required_date(node, "DateRevised", ENTITY)?,
            article: Article::from_node(require_node(node, "Article", ENTITY)?, tags)?,
            journal_info: MedlineJournalInfo::from_node(
                require_node(node, "MedlineJournalInfo", ENTITY)?,
                tags,
            )?,
            chemicals: list_of(node, tags.chemical_list, "Chemical", tags)?,
            subset: resolve_text(node, "CitationSubset"),
            mesh_headings: list_of(node, tags.mesh_heading_list, "MeshHeading", tags)?,
            keywords: optional_list(node, tags.keyword_list, "Keyword", tags)?,
            personal_name_subjects: optional_list(
                node,
                tags.personal_name_subject_list,
                "PersonalNameSubject",
                tags,
            )?,
            comments_corrections: optional_list(
                node,
                tags.comments_corrections_list,
                "CommentsCorrections",
                tags,
            )?,
            other_ids: optional_all(node, "OtherID", tags)?,
            other_abstracts: optional_all(node, "OtherAbstract", tags)?,
            general_note: optional_entity(node, "GeneralNote", tags)?,
            space_flight_missions,
            gene_symbols,
            supplemental_meshes: optional_list(node, tags.suppl_mesh_list, "SupplMeshName", tags)?,
            investigators: optional_list(node, tags.investigator_list, "Investigator", tags)?,
            coi_statement: resolve_rich_text(node, "CoiStatement"),
        })
    }
}

impl FromNode for Article {
    fn from_node(node: NodeRef<'_>, tags: &TagTable) -> DomainResult<Self> {
        const ENTITY: &str = "Article";

        Ok(Self {
            publication_model: resolve_attr(node, "PubModel"),
            journal: Journal::from_node(require_node(node, "Journal", ENTITY)?, tags)?,
            title: require_rich_text(node, "ArticleTitle", ENTITY)?,
            abstract_text: node
                .select_first(&["Abstract", "AbstractText"])
                .map(|n| n.rich_text()),
            pagination: resolve_path_text(node, &["Pagination", "MedlinePgn"]),
            authors: list_of(node, tags.author_list, "Author", tags)?,
            language: require_text(node, "Language", ENTITY)?,
            date: optional_date(node, "ArticleDate")?,
            grants: optional_list(node, tags.grant_list, "Grant", tags)?,
            publication_types: list_of(node, tags.publication_type_list, "PublicationType", tags)?,
            elocation_id: optional_entity(node, "ELocationID", tags)?,
            vernacular_title: resolve_rich_text(node, "VernacularTitle"),
            data_banks: optional_list(node, tags.data_bank_list, "DataBank", tags)?,
            copyright_information: resolve_path_text(node, &["Abstract", "CopyrightInformation"]),
        })
    }
}

impl FromNode for Journal {
    fn from_node(node: NodeRef<'_>, tags: &TagTable) -> DomainResult<Self> {
        const ENTITY: &str = "Journal";

        Ok(Self {
            issn: optional_entity(node, "ISSN", tags)?,
            issue: JournalIssue::from_node(require_node(node, "JournalIssue", ENTITY)?, tags)?,
            title: require_text(node, "Title", ENTITY)?,
            iso_abbreviation: resolve_text(node, "ISOAbbreviation"),
        })
    }
}

impl FromNode for JournalIssue {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            medium: resolve_attr(node, "CitedMedium"),
            volume: resolve_text(node, "Volume"),
            issue: resolve_text(node, "Issue"),
            date: optional_date(node, "PubDate")?,
            season: resolve_path_text(node, &["PubDate", "Season"]),
            medline_date: resolve_path_text(node, &["PubDate", "MedlineDate"]),
        })
    }
}

impl FromNode for Issn {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            issn_type: resolve_attr(node, "IssnType"),
            value: require_own_text(node, "Issn", "ISSN")?,
        })
    }
}

// ---------------------------------------------------------------------------
// People
// ---------------------------------------------------------------------------

impl FromNode for Author {
    fn from_node(node: NodeRef<'_>, tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            valid: resolve_bool_attr(node, "ValidYN"),
            last_name: resolve_text(node, "LastName"),
            fore_name: resolve_text(node, "ForeName"),
            initials: resolve_text(node, "Initials"),
            collective_name: resolve_text(node, "CollectiveName"),
            affiliation: resolve_path_text(node, &["AffiliationInfo", "Affiliation"]),
            identifier: optional_entity(node, "Identifier", tags)?,
        })
    }
}

impl FromNode for Investigator {
    fn from_node(node: NodeRef<'_>, tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            last_name: require_text(node, "LastName", "Investigator")?,
            fore_name: resolve_text(node, "ForeName"),
            initials: resolve_text(node, "Initials"),
            suffix: resolve_text(node, "Suffix"),
            affiliation: node
                .select_first(&["AffiliationInfo", "Affiliation"])
                .map(|n| n.rich_text()),
            identifier: optional_entity(node, "Identifier", tags)?,
            valid: resolve_bool_attr(node, "ValidYN"),
        })
    }
}

impl FromNode for Identifier {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            id: require_own_text(node, "Identifier", "id")?,
            source: resolve_attr(node, "Source"),
        })
    }
}

// ---------------------------------------------------------------------------
// Subjects and substances
// ---------------------------------------------------------------------------

impl FromNode for Chemical {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        const ENTITY: &str = "Chemical";

        let substance = require_node(node, "NameOfSubstance", ENTITY)?;
        Ok(Self {
            registry_number: require_text(node, "RegistryNumber", ENTITY)?,
            unique_identifier: resolve_attr(substance, "UI").or_else(|| resolve_attr(node, "UI")),
            name_of_substance: require_own_text(substance, ENTITY, "NameOfSubstance")?,
        })
    }
}

impl FromNode for MeshHeading {
    fn from_node(node: NodeRef<'_>, tags: &TagTable) -> DomainResult<Self> {
        let descriptor = require_node(node, "DescriptorName", "MeshHeading")?;
        Ok(Self {
            descriptor: Topic::from_node(descriptor, tags)?,
            qualifier: optional_entity(node, "QualifierName", tags)?,
        })
    }
}

impl FromNode for Topic {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            major_topic: resolve_bool_attr(node, "MajorTopicYN"),
            unique_identifier: resolve_attr(node, "UI"),
            name: require_own_text(node, "Topic", "name")?,
        })
    }
}

impl FromNode for Keyword {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            major_topic: resolve_bool_attr(node, "MajorTopicYN"),
            text: node.rich_text(),
        })
    }
}

impl FromNode for SupplementalMesh {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            mesh_type: resolve_attr(node, "Type"),
            ui: resolve_attr(node, "UI"),
            name: require_own_text(node, "SupplementalMesh", "name")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Funding, data and cross references
// ---------------------------------------------------------------------------

impl FromNode for Grant {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            id: resolve_text(node, "GrantID"),
            acronym: resolve_text(node, "Acronym"),
            agency: resolve_text(node, "Agency"),
            country: resolve_text(node, "Country"),
        })
    }
}

impl FromNode for DataBank {
    fn from_node(node: NodeRef<'_>, tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            name: resolve_text(node, "DataBankName"),
            accession_numbers: texts(node.select(&[tags.accession_number_list, "AccessionNumber"])),
            complete: resolve_bool_attr(node, "CompleteYN"),
        })
    }
}

impl FromNode for ELocationId {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            id_type: resolve_attr(node, "EIdType"),
            valid: resolve_bool_attr(node, "ValidYN"),
            value: require_own_text(node, "ELocationId", "value")?,
        })
    }
}

impl FromNode for PublicationType {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            unique_identifier: resolve_attr(node, "UI"),
            name: require_own_text(node, "PublicationType", "name")?,
        })
    }
}

impl FromNode for CommentCorrection {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        let (pmid, pmid_version) = match node.find("PMID") {
            Some(pmid_node) => {
                let pmid = pmid_node
                    .text()
                    .map(|raw| parse_number::<u64>(raw, "CommentsCorrections.PMID"))
                    .transpose()?;
                (pmid, Some(pmid_version(pmid_node, "CommentsCorrections")?))
            }
            None => (None, None),
        };

        Ok(Self {
            pmid,
            pmid_version,
            ref_source: resolve_text(node, "RefSource"),
            ref_type: resolve_attr(node, "RefType"),
        })
    }
}

impl FromNode for OtherAbstract {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            text: require_rich_text(node, "AbstractText", "OtherAbstract")?,
            source: resolve_attr(node, "Source"),
            language: resolve_attr(node, "Language"),
        })
    }
}

impl FromNode for GeneralNote {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            owner: resolve_attr(node, "Owner"),
            note: require_own_text(node, "GeneralNote", "note")?,
        })
    }
}

impl FromNode for MedlineJournalInfo {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            country: resolve_text(node, "Country"),
            title_abbreviation: resolve_text(node, "MedlineTA"),
            nlm_unique_id: require_text(node, "NlmUniqueID", "MedlineJournalInfo")?,
            issn_linking: resolve_text(node, "ISSNLinking"),
        })
    }
}

// ---------------------------------------------------------------------------
// Publication data
// ---------------------------------------------------------------------------

impl FromNode for ArticleId {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            id: node.text().map(str::to_string),
            id_type: resolve_attr(node, "IdType"),
        })
    }
}

impl FromNode for PubMedPubDate {
    fn from_node(node: NodeRef<'_>, _tags: &TagTable) -> DomainResult<Self> {
        let date =
            date_from_node(node)?.ok_or_else(|| DomainError::missing("PubMedPubDate", "date"))?;
        Ok(Self {
            publication_status: resolve_attr(node, "PubStatus"),
            date,
        })
    }
}

impl FromNode for Reference {
    fn from_node(node: NodeRef<'_>, tags: &TagTable) -> DomainResult<Self> {
        Ok(Self {
            citation: require_rich_text(node, "Citation", "Reference")?,
            article_ids: list_of(node, tags.article_id_list, "ArticleId", tags)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::Document;
    use crate::util::testing::parse_fixture;
    use chrono::NaiveDate;

    fn map<T: FromNode>(xml: &str, root: &str) -> DomainResult<T> {
        let doc: Document = parse_fixture(xml, root);
        let node = doc.root().unwrap();
        T::from_node(node, &TagTable::CURRENT)
    }

    #[test]
    fn given_article_without_grant_container_when_mapping_then_grants_absent() {
        let article: Article = map(
            r#"<Article PubModel="Print">
                 <Journal><JournalIssue CitedMedium="Print"/><Title>J</Title></Journal>
                 <ArticleTitle>T</ArticleTitle>
                 <Language>eng</Language>
                 <DataBankList CompleteYN="Y"/>
               </Article>"#,
            "Article",
        )
        .unwrap();

        assert_eq!(article.grants, None);
        assert_eq!(article.data_banks, Some(vec![]));
        assert!(article.authors.is_empty());
        assert_eq!(article.publication_model.as_deref(), Some("Print"));
        assert_eq!(article.abstract_text, None);
    }

    #[test]
    fn given_marked_up_title_when_mapping_then_concatenates_inline_text() {
        let article: Article = map(
            r#"<Article>
                 <Journal><JournalIssue/><Title>J</Title></Journal>
                 <ArticleTitle>Effects of <i>E. coli</i> on mice</ArticleTitle>
                 <Abstract><AbstractText>Dose <sup>2</sup> was used.</AbstractText></Abstract>
                 <Language>eng</Language>
               </Article>"#,
            "Article",
        )
        .unwrap();

        assert_eq!(article.title, "Effects of E. coli on mice");
        assert_eq!(article.abstract_text.as_deref(), Some("Dose 2 was used."));
    }

    #[test]
    fn given_article_without_language_when_mapping_then_missing_required_field() {
        let result: DomainResult<Article> = map(
            r#"<Article>
                 <Journal><JournalIssue/><Title>J</Title></Journal>
                 <ArticleTitle>T</ArticleTitle>
               </Article>"#,
            "Article",
        );
        assert_eq!(
            result.unwrap_err(),
            DomainError::missing("Article", "Language")
        );
    }

    #[test]
    fn given_mesh_heading_with_two_qualifiers_when_mapping_then_takes_first_of_each() {
        let heading: MeshHeading = map(
            r#"<MeshHeading>
                 <DescriptorName UI="D1" MajorTopicYN="N">Mice</DescriptorName>
                 <QualifierName UI="Q1" MajorTopicYN="Y">genetics</QualifierName>
                 <QualifierName UI="Q2" MajorTopicYN="N">metabolism</QualifierName>
               </MeshHeading>"#,
            "MeshHeading",
        )
        .unwrap();

        assert_eq!(heading.descriptor.name, "Mice");
        assert!(!heading.descriptor.major_topic);
        let qualifier = heading.qualifier.unwrap();
        assert_eq!(qualifier.unique_identifier.as_deref(), Some("Q1"));
        assert!(qualifier.major_topic);
    }

    #[test]
    fn given_chemical_when_mapping_then_reads_ui_from_substance() {
        let chemical: Chemical = map(
            r#"<Chemical>
                 <RegistryNumber>0</RegistryNumber>
                 <NameOfSubstance UI="D008670">Metals</NameOfSubstance>
               </Chemical>"#,
            "Chemical",
        )
        .unwrap();

        assert_eq!(chemical.unique_identifier.as_deref(), Some("D008670"));
        assert_eq!(chemical.name_of_substance, "Metals");
    }

    #[test]
    fn given_comment_correction_when_mapping_then_pmid_and_version_read() {
        let correction: CommentCorrection = map(
            r#"<CommentsCorrections RefType="ErratumIn">
                 <RefSource>J 2020</RefSource>
                 <PMID Version="2">12345</PMID>
               </CommentsCorrections>"#,
            "CommentsCorrections",
        )
        .unwrap();

        assert_eq!(correction.pmid, Some(12345));
        assert_eq!(correction.pmid_version, Some(2));
        assert_eq!(correction.ref_type.as_deref(), Some("ErratumIn"));
    }

    #[test]
    fn given_comment_correction_pmid_without_version_when_mapping_then_missing_field() {
        let result: DomainResult<CommentCorrection> = map(
            r#"<CommentsCorrections RefType="ErratumIn"><PMID>12345</PMID></CommentsCorrections>"#,
            "CommentsCorrections",
        );

        assert_eq!(
            result.unwrap_err(),
            DomainError::missing("CommentsCorrections", "PMID.Version")
        );
    }

    #[test]
    fn given_history_date_on_day_31_of_april_when_mapping_then_corrected() {
        let date: PubMedPubDate = map(
            r#"<PubMedPubDate PubStatus="pubmed">
                 <Year>2021</Year><Month>4</Month><Day>31</Day>
               </PubMedPubDate>"#,
            "PubMedPubDate",
        )
        .unwrap();

        assert_eq!(date.date, NaiveDate::from_ymd_opt(2021, 4, 30).unwrap());
        assert_eq!(date.publication_status.as_deref(), Some("pubmed"));
    }

    #[test]
    fn given_history_date_without_month_when_mapping_then_missing_required_field() {
        let result: DomainResult<PubMedPubDate> = map(
            r#"<PubMedPubDate PubStatus="pubmed"><Year>2021</Year></PubMedPubDate>"#,
            "PubMedPubDate",
        );
        assert_eq!(
            result.unwrap_err(),
            DomainError::missing("PubMedPubDate", "date")
        );
    }

    #[test]
    fn given_issue_with_abbreviated_month_when_mapping_then_uses_first_day() {
        let issue: JournalIssue = map(
            r#"<JournalIssue CitedMedium="Internet">
                 <Volume>12</Volume>
                 <PubDate><Year>2019</Year><Month>Mar</Month></PubDate>
               </JournalIssue>"#,
            "JournalIssue",
        )
        .unwrap();

        assert_eq!(issue.date, NaiveDate::from_ymd_opt(2019, 3, 1));
        assert_eq!(issue.volume.as_deref(), Some("12"));
        assert_eq!(issue.medline_date, None);
    }

    #[test]
    fn given_issue_with_medline_date_when_mapping_then_date_absent_and_raw_kept() {
        let issue: JournalIssue = map(
            r#"<JournalIssue><PubDate><MedlineDate>1998 Dec-1999 Jan</MedlineDate></PubDate></JournalIssue>"#,
            "JournalIssue",
        )
        .unwrap();

        assert_eq!(issue.date, None);
        assert_eq!(issue.medline_date.as_deref(), Some("1998 Dec-1999 Jan"));
    }
}
