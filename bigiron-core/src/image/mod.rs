//! Base image repository.
//!
//! Images are stored content-addressed in a flat directory as
//! `<sha256>.qcow2`. Imports stream the source file through a hasher so a
//! corrupt or mislabeled image never lands in the repo under a valid name.

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{info, instrument};
use url::Url;

use crate::error::{Result, VirtError};
use crate::state::DirectoryStore;

/// Identifier of a repo image: its SHA-256 digest, hex-encoded.
pub type ImageId = String;

/// Image repository backed by a local directory.
pub struct Repository {
    store: DirectoryStore,
}

impl Repository {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self { store: DirectoryStore::new(path)? })
    }

    /// List image ids present in the repo.
    pub fn images(&self) -> Result<Vec<ImageId>> {
        Ok(self
            .store
            .list_entries()?
            .into_iter()
            .filter_map(|f| f.strip_suffix(".qcow2").map(str::to_string))
            .collect())
    }

    /// Import an image into the repo, verifying its digest on the way in.
    ///
    /// Only `file://` URLs are supported. Importing an image that is
    /// already present is a no-op.
    #[instrument(skip(self))]
    pub fn add_image(&mut self, url: &Url, hash: &str) -> Result<ImageId> {
        match url.scheme() {
            "file" => {}
            other => {
                return Err(VirtError::UnsupportedUrlScheme { scheme: other.to_string() });
            }
        }

        let to_path = self.store.path().join(format!("{}.qcow2", hash));
        if to_path.exists() {
            return Ok(hash.to_string());
        }

        let from_path = url
            .to_file_path()
            .map_err(|_| VirtError::InvalidImageUrl { url: url.to_string() })?;

        let mut image_stream =
            std::fs::File::open(&from_path).map_err(|e| VirtError::io(&from_path, e))?;

        let mut out_stream = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&to_path)
            .map_err(|e| VirtError::io(&to_path, e))?;

        let mut h = Sha256::new();

        info!("Copying new image into image repo at {:?}", to_path);

        // copy image to repo, while hashing
        let mut buf = [0; 128 * 1024];
        loop {
            let n = image_stream.read(&mut buf).map_err(|e| VirtError::io(&from_path, e))?;
            if n == 0 {
                break;
            }
            h.update(&buf[..n]);
            out_stream.write_all(&buf[..n]).map_err(|e| VirtError::io(&to_path, e))?;
        }

        let hx = hex::encode(h.finalize());

        if hx != hash {
            // remove the non-matching file before reporting
            std::fs::remove_file(&to_path).map_err(|e| VirtError::io(&to_path, e))?;
            return Err(VirtError::ImageHashMismatch {
                expected: hash.to_string(),
                computed: hx,
            });
        }

        info!("New image hash='{}' matches given hash", hx);

        Ok(hash.to_string())
    }

    /// Path of an image in the repo.
    pub fn get_image(&self, id: &ImageId) -> Result<PathBuf> {
        let path = self.store.path().join(format!("{}.qcow2", id));

        if !path.is_file() {
            return Err(VirtError::ImageNotFound { id: id.clone() });
        }

        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sha256_hex(data: &[u8]) -> String {
        let mut h = Sha256::new();
        h.update(data);
        hex::encode(h.finalize())
    }

    #[test]
    fn add_image_verifies_digest() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("base.qcow2");
        std::fs::write(&src, b"fake image data").unwrap();

        let mut repo = Repository::new(tmp.path().join("repo")).unwrap();
        let url = Url::from_file_path(&src).unwrap();

        let good = sha256_hex(b"fake image data");
        let id = repo.add_image(&url, &good).unwrap();
        assert_eq!(id, good);
        assert!(repo.get_image(&id).unwrap().is_file());
        assert_eq!(repo.images().unwrap(), vec![good.clone()]);

        // importing again is a no-op
        repo.add_image(&url, &good).unwrap();
    }

    #[test]
    fn add_image_rejects_bad_digest() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("base.qcow2");
        std::fs::write(&src, b"fake image data").unwrap();

        let mut repo = Repository::new(tmp.path().join("repo")).unwrap();
        let url = Url::from_file_path(&src).unwrap();

        let err = repo.add_image(&url, "deadbeef").unwrap_err();
        assert!(matches!(err, VirtError::ImageHashMismatch { .. }));

        // the partial copy must not linger in the repo
        assert!(repo.images().unwrap().is_empty());
    }

    #[test]
    fn add_image_rejects_remote_urls() {
        let tmp = TempDir::new().unwrap();
        let mut repo = Repository::new(tmp.path().join("repo")).unwrap();

        let url = Url::parse("https://example.com/base.qcow2").unwrap();
        let err = repo.add_image(&url, "abc123").unwrap_err();
        assert!(matches!(err, VirtError::UnsupportedUrlScheme { .. }));
    }

    #[test]
    fn get_image_missing() {
        let tmp = TempDir::new().unwrap();
        let repo = Repository::new(tmp.path().join("repo")).unwrap();

        assert!(matches!(
            repo.get_image(&"nope".to_string()),
            Err(VirtError::ImageNotFound { .. })
        ));
    }
}
