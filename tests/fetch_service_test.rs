//! Tests for FetchService wiring through the service container

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use pmcollect::config::Settings;
use pmcollect::infrastructure::di::ServiceContainer;
use pmcollect::infrastructure::traits::{FetchError, FetchOutcome, RealFileSystem, Retriever};
use pmcollect::infrastructure::xml::XmlTreeProvider;

/// Records each call; fails every source containing "bad".
#[derive(Default)]
struct RecordingRetriever {
    calls: Mutex<Vec<(Vec<String>, PathBuf, usize)>>,
}

impl Retriever for RecordingRetriever {
    fn fetch_all(
        &self,
        sources: &[String],
        dest_dir: &Path,
        concurrency_limit: usize,
    ) -> Vec<FetchOutcome> {
        self.calls
            .lock()
            .unwrap()
            .push((sources.to_vec(), dest_dir.to_path_buf(), concurrency_limit));
        sources
            .iter()
            .map(|source| FetchOutcome {
                source: source.clone(),
                result: if source.contains("bad") {
                    Err(FetchError::Unsupported(source.clone()))
                } else {
                    Ok(dest_dir.join(source))
                },
            })
            .collect()
    }
}

fn container(settings: Settings, retriever: Arc<RecordingRetriever>) -> ServiceContainer {
    ServiceContainer::with_deps(
        settings,
        Arc::new(RealFileSystem),
        Arc::new(XmlTreeProvider::new()),
        retriever,
    )
}

#[test]
fn given_no_overrides_when_fetching_then_configured_dest_and_limit_used() {
    // Arrange
    let retriever = Arc::new(RecordingRetriever::default());
    let mut settings = Settings::default();
    settings.fetch.cache_dir = PathBuf::from("/tmp/pm-cache");
    settings.fetch.concurrency_limit = 3;
    let container = container(settings, Arc::clone(&retriever));

    // Act
    let outcomes = container
        .fetch()
        .fetch(&["a.xml.gz".into(), "bad.xml.gz".into()], None, None);

    // Assert
    assert_eq!(outcomes.len(), 2);
    assert!(outcomes[0].is_ok());
    assert!(!outcomes[1].is_ok());
    let calls = retriever.calls.lock().unwrap();
    assert_eq!(calls[0].1, PathBuf::from("/tmp/pm-cache"));
    assert_eq!(calls[0].2, 3);
}

#[test]
fn given_zero_concurrency_override_when_fetching_then_clamped_to_one() {
    let retriever = Arc::new(RecordingRetriever::default());
    let container = container(Settings::default(), Arc::clone(&retriever));

    container
        .fetch()
        .fetch(&["a.xml".into()], Some(Path::new("/tmp/elsewhere")), Some(0));

    let calls = retriever.calls.lock().unwrap();
    assert_eq!(calls[0].1, PathBuf::from("/tmp/elsewhere"));
    assert_eq!(calls[0].2, 1);
}

#[test]
fn given_custom_template_when_expanding_then_year_and_index_substituted() {
    let mut settings = Settings::default();
    settings.fetch.baseline_url = "file:///mirror/pubmed{year}n{index}.xml.gz".into();
    settings.fetch.baseline_year = 25;
    let container = container(settings, Arc::new(RecordingRetriever::default()));

    let urls = container.fetch().baseline_urls(1218, 1219).unwrap();

    assert_eq!(
        urls,
        vec![
            "file:///mirror/pubmed25n1218.xml.gz",
            "file:///mirror/pubmed25n1219.xml.gz"
        ]
    );
}
