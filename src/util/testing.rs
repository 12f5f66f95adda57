//! Test support: logging setup and citation fixtures

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    filter::filter_fn,
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::domain::Document;
use crate::infrastructure::traits::TreeProvider;
use crate::infrastructure::xml::XmlTreeProvider;

static TEST_SETUP: Once = Once::new();

pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        if env::var("RUST_LOG").is_err() {
            env::set_var("RUST_LOG", "trace");
        }
        // global logging subscriber, used by all tracing log macros
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    debug!("INIT: Attempting logger init from testing.rs");
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "trace");
    }

    // Create a filter for noisy modules
    let noisy_modules = ["quick_xml", "rayon"];
    let module_filter = filter_fn(move |metadata| {
        !noisy_modules
            .iter()
            .any(|name| metadata.target().starts_with(name))
    });

    // Set up the subscriber with environment filter
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("pmcollect=debug"));

    // Build and set the subscriber
    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::ENTER)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(module_filter)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Parse `xml` into a document rooted at the first `root` element.
pub fn parse_fixture(xml: &str, root: &str) -> Document {
    XmlTreeProvider::new()
        .parse(xml.as_bytes(), root)
        .expect("fixture must parse")
}

/// A complete current-schema record; `abstract_xml` is placed inside `Article`.
pub fn record_xml(abstract_xml: &str) -> String {
    record_xml_with_pmid(12345, abstract_xml)
}

pub fn record_xml_with_pmid(pmid: u64, abstract_xml: &str) -> String {
    format!(
        r#"<PubmedArticle>
  <MedlineCitation Status="MEDLINE" Owner="NLM">
    <PMID Version="1">{pmid}</PMID>
    <DateRevised><Year>2023</Year><Month>11</Month><Day>08</Day></DateRevised>
    <Article PubModel="Print">
      <Journal>
        <ISSN IssnType="Print">0006-2944</ISSN>
        <JournalIssue CitedMedium="Print">
          <Volume>13</Volume><Issue>2</Issue>
          <PubDate><Year>1975</Year><Month>Jun</Month></PubDate>
        </JournalIssue>
        <Title>Biochemical medicine</Title>
        <ISOAbbreviation>Biochem Med</ISOAbbreviation>
      </Journal>
      <ArticleTitle>Formate assay in body fluids.</ArticleTitle>
      {abstract_xml}
      <AuthorList CompleteYN="Y">
        <Author ValidYN="Y"><LastName>Makar</LastName><ForeName>A B</ForeName><Initials>AB</Initials></Author>
      </AuthorList>
      <Language>eng</Language>
      <PublicationTypeList>
        <PublicationType UI="D016428">Journal Article</PublicationType>
      </PublicationTypeList>
    </Article>
    <MedlineJournalInfo>
      <Country>United States</Country>
      <MedlineTA>Biochem Med</MedlineTA>
      <NlmUniqueID>0151424</NlmUniqueID>
    </MedlineJournalInfo>
    <MeshHeadingList>
      <MeshHeading><DescriptorName UI="D005561" MajorTopicYN="Y">Formates</DescriptorName></MeshHeading>
    </MeshHeadingList>
  </MedlineCitation>
  <PubmedData>
    <History>
      <PubMedPubDate PubStatus="pubmed"><Year>1975</Year><Month>6</Month><Day>1</Day></PubMedPubDate>
    </History>
    <PublicationStatus>ppublish</PublicationStatus>
    <ArticleIdList>
      <ArticleId IdType="pubmed">{pmid}</ArticleId>
    </ArticleIdList>
  </PubmedData>
</PubmedArticle>"#
    )
}
