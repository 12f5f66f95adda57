//! Context helpers for lower-level errors
//!
//! Wraps I/O, parse and sink errors into `OperationFailed` with a short
//! description of what was being attempted.

use std::error::Error;
use std::path::Path;

use crate::application::{ApplicationError, ApplicationResult};

pub trait ResultExt<T> {
    /// Add `action: path` context.
    ///
    /// ```ignore
    /// fs.read(path).with_path_context("read document", path)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T>;

    fn with_context(self, action: &str) -> ApplicationResult<T>;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: Error + Send + Sync + 'static,
{
    fn with_path_context(self, action: &str, path: &Path) -> ApplicationResult<T> {
        self.with_context(&format!("{}: {}", action, path.display()))
    }

    fn with_context(self, action: &str) -> ApplicationResult<T> {
        self.map_err(|e| ApplicationError::OperationFailed {
            context: action.to_string(),
            source: Box::new(e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn given_io_error_when_adding_path_context_then_operation_failed_keeps_source() {
        let result: io::Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "gone"));

        let err = result
            .with_path_context("read document", Path::new("/data/a.xml"))
            .unwrap_err();

        assert_eq!(err.to_string(), "operation failed: read document: /data/a.xml");
        assert_eq!(Error::source(&err).map(|s| s.to_string()).as_deref(), Some("gone"));
    }
}
