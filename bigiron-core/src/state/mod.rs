//! Filesystem-backed instance state.
//!
//! Machine state is the directory tree itself: one directory per instance
//! under the instances dir, holding the overlay disk and config drive ISO.
//! There is no database to fall out of sync with the artifacts on disk.

use std::path::{Path, PathBuf};

use tracing::{debug, instrument};

use crate::error::{Result, VirtError};

pub mod imgutil;

/// A flat directory of entries, created on first use.
pub struct DirectoryStore {
    path: PathBuf,
}

impl DirectoryStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if !path.as_ref().is_dir() {
            std::fs::create_dir_all(path.as_ref())
                .map_err(|e| VirtError::io(path.as_ref(), e))?;
        }

        Ok(Self { path: path.as_ref().to_path_buf() })
    }

    /// List entry names, skipping anything that is not valid UTF-8.
    pub fn list_entries(&self) -> Result<Vec<String>> {
        let entries = std::fs::read_dir(&self.path)
            .map_err(|e| VirtError::io(&self.path, e))?
            .map(|res| res.map(|e| e.file_name()))
            .collect::<std::result::Result<Vec<_>, std::io::Error>>()
            .map_err(|e| VirtError::io(&self.path, e))?;

        Ok(entries.into_iter().filter_map(|e| e.into_string().ok()).collect())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Per-machine instance directories and their overlay disks.
pub struct InstanceStore {
    store: DirectoryStore,
    qemu_img: String,
}

impl InstanceStore {
    pub fn new<P: AsRef<Path>>(path: P, qemu_img: &str) -> Result<Self> {
        Ok(Self { store: DirectoryStore::new(path)?, qemu_img: qemu_img.to_string() })
    }

    pub fn path_for_instance(&self, name: &str) -> PathBuf {
        self.store.path().join(name)
    }

    pub fn list_instances(&self) -> Result<Vec<String>> {
        self.store.list_entries()
    }

    /// Create the directory for a new instance. Fails if the instance
    /// already exists.
    #[instrument(skip(self))]
    pub fn new_instance(&mut self, name: &str) -> Result<PathBuf> {
        let path = self.path_for_instance(name);

        if path.exists() {
            return Err(VirtError::MachineAlreadyExists { name: name.to_string() });
        }

        std::fs::create_dir(&path).map_err(|e| VirtError::io(&path, e))?;
        debug!("Created instance directory at {:?}", path);

        Ok(path)
    }

    /// Create the instance overlay disk backed by a repo image, optionally
    /// grown to `resize` bytes.
    #[instrument(skip(self, image_path))]
    pub fn create_instance_image<P: AsRef<Path>>(
        &mut self,
        name: &str,
        image_path: P,
        resize: Option<u64>,
    ) -> Result<PathBuf> {
        let imgpath = self.path_for_instance(name).join("instance.qcow2");

        imgutil::create(&self.qemu_img, &imgpath, resize, Some(image_path))?;

        Ok(imgpath)
    }

    /// Remove an instance and everything in its directory.
    #[instrument(skip(self))]
    pub fn remove_instance(&mut self, name: &str) -> Result<()> {
        let path = self.path_for_instance(name);

        if !path.is_dir() {
            return Err(VirtError::MachineNotFound { name: name.to_string() });
        }

        for entry in std::fs::read_dir(&path).map_err(|e| VirtError::io(&path, e))? {
            let entry = entry.map_err(|e| VirtError::io(&path, e))?;
            std::fs::remove_file(entry.path()).map_err(|e| VirtError::io(entry.path(), e))?;
        }

        std::fs::remove_dir(&path).map_err(|e| VirtError::io(&path, e))?;

        Ok(())
    }
}
