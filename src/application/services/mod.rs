//! Application services
//!
//! Concrete service implementations that orchestrate domain logic.
//! Services depend on I/O boundary traits (FileSystem, TreeProvider,
//! Retriever, IngestionSink) but are themselves concrete structs, not traits.

mod batch;
mod collection;
mod fetch;

pub use batch::{BatchReport, BatchService, RecordFailure};
pub use collection::{CollectionService, FileReport, IngestSummary, ParseSummary};
pub use fetch::FetchService;
