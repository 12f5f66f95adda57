use std::ffi::OsStr;
use std::path::Path;

pub trait PathExt {
    /// `*.xml` or `*.xml.gz`
    fn is_document_file(&self) -> bool;
    fn is_gzip(&self) -> bool;
}

impl PathExt for Path {
    fn is_document_file(&self) -> bool {
        let name = self
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or_default();
        name.ends_with(".xml") || name.ends_with(".xml.gz")
    }

    fn is_gzip(&self) -> bool {
        self.extension() == Some(OsStr::new("gz"))
    }
}
