//! Local retriever: copies and decompresses archive sources
//!
//! Sources are plain paths or `file://` URLs. Network transport is not
//! provided; any other scheme fails for that source only.

use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::infrastructure::traits::{FetchError, FetchOutcome, Retriever};
use crate::util::path::PathExt;

#[derive(Debug, Default, Clone, Copy)]
pub struct LocalRetriever;

impl LocalRetriever {
    pub fn new() -> Self {
        Self
    }

    fn fetch_one(&self, source: &str, dest_dir: &Path) -> Result<PathBuf, FetchError> {
        let path = source_path(source)?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| FetchError::Unsupported(source.to_string()))?;

        let (target_name, compressed) = match file_name.strip_suffix(".gz") {
            Some(stem) => (stem, true),
            None => (file_name, false),
        };
        let target = dest_dir.join(target_name);

        let io_err = |context: &str, e: io::Error| FetchError::Io {
            context: format!("{}: {}", context, path.display()),
            source: e,
        };

        let mut input = File::open(&path).map_err(|e| io_err("open source", e))?;
        // Moved to `target` only after a complete copy.
        let partial = dest_dir.join(format!("{}.part", target_name));
        let copied = File::create(&partial).and_then(|mut output| {
            if compressed {
                io::copy(&mut GzDecoder::new(input), &mut output)
            } else {
                io::copy(&mut input, &mut output)
            }
        });
        let written = match copied.and_then(|n| std::fs::rename(&partial, &target).map(|()| n)) {
            Ok(n) => n,
            Err(e) => {
                if let Err(cleanup) = std::fs::remove_file(&partial) {
                    debug!("cannot remove {}: {}", partial.display(), cleanup);
                }
                return Err(io_err("copy source", e));
            }
        };

        debug!("fetched {} ({} bytes) -> {}", source, written, target.display());
        Ok(target)
    }
}

impl Retriever for LocalRetriever {
    #[instrument(level = "debug", skip(self, sources), fields(count = sources.len()))]
    fn fetch_all(
        &self,
        sources: &[String],
        dest_dir: &Path,
        concurrency_limit: usize,
    ) -> Vec<FetchOutcome> {
        if let Err(e) = std::fs::create_dir_all(dest_dir) {
            warn!("cannot create {}: {}", dest_dir.display(), e);
            return sources
                .iter()
                .map(|source| FetchOutcome {
                    source: source.clone(),
                    result: Err(FetchError::Io {
                        context: format!("create destination: {}", dest_dir.display()),
                        source: io::Error::new(e.kind(), e.to_string()),
                    }),
                })
                .collect();
        }

        let run = || -> Vec<FetchOutcome> {
            sources
                .par_iter()
                .map(|source| FetchOutcome {
                    source: source.clone(),
                    result: self.fetch_one(source, dest_dir),
                })
                .collect()
        };

        // Dedicated pool bounds the number of sources in flight.
        let outcomes = match rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency_limit.max(1))
            .build()
        {
            Ok(pool) => pool.install(run),
            Err(e) => {
                warn!("falling back to global pool: {}", e);
                run()
            }
        };

        let ok = outcomes.iter().filter(|o| o.is_ok()).count();
        info!("fetched {}/{} sources", ok, outcomes.len());
        outcomes
    }
}

fn source_path(source: &str) -> Result<PathBuf, FetchError> {
    if let Some(rest) = source.strip_prefix("file://") {
        return Ok(PathBuf::from(rest));
    }
    if source.contains("://") {
        return Err(FetchError::Unsupported(source.to_string()));
    }
    Ok(PathBuf::from(source))
}

/// Decompress `bytes` read from `path` when the path names a `.gz` archive.
pub fn decompress_if_gzip(path: &Path, bytes: Vec<u8>) -> io::Result<Vec<u8>> {
    if !path.is_gzip() {
        return Ok(bytes);
    }
    let mut out = Vec::new();
    GzDecoder::new(bytes.as_slice()).read_to_end(&mut out)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn given_mixed_sources_when_fetching_then_each_completes_or_fails_alone() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let plain = src.path().join("a.xml");
        std::fs::write(&plain, "<a/>").unwrap();

        let corrupt = src.path().join("pubmed24n0009.xml.gz");
        std::fs::write(&corrupt, "not gzip at all").unwrap();

        let sources = vec![
            plain.to_string_lossy().to_string(),
            "https://example.org/b.xml.gz".to_string(),
            src.path().join("missing.xml").to_string_lossy().to_string(),
            corrupt.to_string_lossy().to_string(),
        ];
        let outcomes = LocalRetriever::new().fetch_all(&sources, dest.path(), 2);

        assert_eq!(outcomes.len(), 4);
        assert!(outcomes[0].is_ok());
        assert!(matches!(outcomes[1].result, Err(FetchError::Unsupported(_))));
        assert!(matches!(outcomes[2].result, Err(FetchError::Io { .. })));
        assert!(matches!(outcomes[3].result, Err(FetchError::Io { .. })));
        assert_eq!(std::fs::read_to_string(dest.path().join("a.xml")).unwrap(), "<a/>");

        let mut left: Vec<_> = std::fs::read_dir(dest.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        left.sort();
        assert_eq!(left, vec!["a.xml".to_string()]);
    }

    #[test]
    fn given_gzip_source_url_when_fetching_then_stored_decompressed() {
        let src = TempDir::new().unwrap();
        let dest = TempDir::new().unwrap();
        let archive = src.path().join("pubmed24n0001.xml.gz");
        let mut encoder = GzEncoder::new(File::create(&archive).unwrap(), Compression::default());
        encoder.write_all(b"<PubmedArticleSet/>").unwrap();
        encoder.finish().unwrap();

        let url = format!("file://{}", archive.display());
        let outcomes = LocalRetriever::new().fetch_all(&[url], dest.path(), 1);

        let stored = outcomes[0].result.as_ref().unwrap();
        assert_eq!(stored, &dest.path().join("pubmed24n0001.xml"));
        assert_eq!(std::fs::read_to_string(stored).unwrap(), "<PubmedArticleSet/>");
    }
}
