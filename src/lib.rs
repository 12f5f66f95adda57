//! Mapping of PubMed/MEDLINE citation documents into typed records and
//! flat ingestion items.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
