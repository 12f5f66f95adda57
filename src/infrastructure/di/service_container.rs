//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::{CollectionService, FetchService};
use crate::config::Settings;
use crate::infrastructure::retrieval::LocalRetriever;
use crate::infrastructure::traits::{FileSystem, RealFileSystem, Retriever, TreeProvider};
use crate::infrastructure::xml::XmlTreeProvider;

/// Container holding the boundary implementations shared by all services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Document parser
    pub provider: Arc<dyn TreeProvider>,

    /// Archive retrieval
    pub retriever: Arc<dyn Retriever>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(XmlTreeProvider::new()),
            Arc::new(LocalRetriever::new()),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        provider: Arc<dyn TreeProvider>,
        retriever: Arc<dyn Retriever>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            provider,
            retriever,
        }
    }

    pub fn collection(&self) -> CollectionService {
        CollectionService::new(
            Arc::clone(&self.fs),
            Arc::clone(&self.provider),
            Arc::clone(&self.settings),
        )
    }

    pub fn fetch(&self) -> FetchService {
        FetchService::new(Arc::clone(&self.retriever), Arc::clone(&self.settings))
    }
}
