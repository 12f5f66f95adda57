//! Projection of an assembled record into an indexable item.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::entities::PubmedRecord;

/// Flat item handed to an ingestion sink.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestionItem {
    /// `"{title} {abstract}"`
    pub text: String,
    /// Citation fields merged with publication-data fields; nested values
    /// are JSON-encoded strings.
    pub metadata: BTreeMap<String, Value>,
    pub id: u64,
}

/// Project a record for ingestion.
///
/// Records without abstract text yield `None` and are left out of ingestion.
pub fn project(record: &PubmedRecord) -> Option<IngestionItem> {
    let abstract_text = record.abstract_text().filter(|a| !a.is_empty())?;

    let mut metadata = BTreeMap::new();
    for part in [
        serde_json::to_value(&record.citation),
        serde_json::to_value(&record.data),
    ] {
        match part {
            Ok(Value::Object(fields)) => {
                for (key, value) in fields {
                    metadata.insert(key, flatten_value(value));
                }
            }
            Ok(other) => warn!(pmid = record.pmid(), "unexpected metadata shape: {}", other),
            Err(e) => {
                warn!(pmid = record.pmid(), "cannot serialize metadata: {}", e);
                return None;
            }
        }
    }

    Some(IngestionItem {
        text: format!("{} {}", record.title(), abstract_text),
        metadata,
        id: record.pmid(),
    })
}

/// Scalars pass through, objects and arrays become their JSON text.
fn flatten_value(value: Value) -> Value {
    match value {
        Value::Object(_) | Value::Array(_) => Value::String(value.to_string()),
        scalar => scalar,
    }
}
