//! Asset persistence boundary (`spec.md` §6).
//!
//! The original system writes PNGs under a web server's static directory
//! and returns a `/static/images/<name>.png` URL. Only that contract is
//! specified, so it is expressed here as a trait with one production
//! implementation (`FsAssetStore`) and one in-memory implementation used by
//! tests.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

/// Saves PNG bytes under a caller-chosen stem and returns the URL the
/// browser will load them from.
pub trait AssetStore {
    fn save_png(&mut self, png_bytes: &[u8], stem: &str) -> Result<String, AssetError>;
}

#[derive(Debug)]
pub struct AssetError(pub String);

impl fmt::Display for AssetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for AssetError {}

/// Writes to a directory on disk, serving filenames distinguished by a
/// process-wide monotonic counter rather than a random suffix — `uuid` is
/// not part of the teacher's dependency stack and a counter is equally
/// collision-free within one run while staying deterministic for tests
/// (Design Note, DESIGN.md).
pub struct FsAssetStore {
    dir: PathBuf,
    url_prefix: String,
    counter: AtomicU64,
}

impl FsAssetStore {
    pub fn new(dir: impl Into<PathBuf>, url_prefix: impl Into<String>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            url_prefix: url_prefix.into(),
            counter: AtomicU64::new(0),
        })
    }

    fn next_seq(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }
}

impl AssetStore for FsAssetStore {
    fn save_png(&mut self, png_bytes: &[u8], stem: &str) -> Result<String, AssetError> {
        let seq = self.next_seq();
        let fname = format!("{stem}_{seq}.png");
        let out_path: &Path = &self.dir.join(&fname);
        fs::write(out_path, png_bytes).map_err(|e| AssetError(e.to_string()))?;
        Ok(format!("{}/{}", self.url_prefix.trim_end_matches('/'), fname))
    }
}

#[derive(Default)]
pub struct InMemoryAssetStore {
    pub saved: Vec<(String, Vec<u8>)>,
    counter: u64,
}

impl AssetStore for InMemoryAssetStore {
    fn save_png(&mut self, png_bytes: &[u8], stem: &str) -> Result<String, AssetError> {
        let seq = self.counter;
        self.counter += 1;
        let name = format!("{stem}_{seq}.png");
        let url = format!("/static/images/{name}");
        self.saved.push((url.clone(), png_bytes.to_vec()));
        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_store_names_are_unique() {
        let mut store = InMemoryAssetStore::default();
        let a = store.save_png(&[1], "page1_img0").unwrap();
        let b = store.save_png(&[2], "page1_img0").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn fs_store_writes_file_and_returns_url() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = FsAssetStore::new(tmp.path(), "/static/images").unwrap();
        let url = store.save_png(&[0x89, b'P', b'N', b'G'], "qshot1").unwrap();
        assert!(url.starts_with("/static/images/qshot1_"));
        assert!(url.ends_with(".png"));
    }
}
