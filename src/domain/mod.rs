//! Domain layer: document model, mapping rules and records
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod assembler;
pub mod date;
pub mod document;
pub mod entities;
pub mod error;
pub mod mapper;
pub mod projection;
pub mod query;
pub mod resolve;
pub mod tags;

pub use assembler::{assemble, assemble_with, flatten_references};
pub use date::{normalize_date, MONTHS};
pub use document::{Document, ElementData, NodeRef};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use mapper::FromNode;
pub use projection::{project, IngestionItem};
pub use tags::{SchemaRevision, SchemaSelection, TagTable};
