//! Centralized path configuration for bigiron-virt.
//!
//! All data paths go through this module so the library and CLI agree on
//! where instances and images live, whether running as root or a user.

use std::path::{Path, PathBuf};

/// Get the bigiron-virt data directory.
///
/// Resolution order:
/// 1. `BIGIRON_DATA_DIR` environment variable
/// 2. `/var/lib/bigiron-virt` if it exists (system install)
/// 3. `~/.bigiron-virt` for user-only installs
pub fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("BIGIRON_DATA_DIR") {
        return PathBuf::from(dir);
    }

    let system_dir = PathBuf::from("/var/lib/bigiron-virt");
    if system_dir.exists() {
        return system_dir;
    }

    dirs::home_dir().map(|h| h.join(".bigiron-virt")).unwrap_or(system_dir)
}

/// Get the per-instance state directory under `base`.
pub fn instances_dir(base: &Path) -> PathBuf {
    base.join("instances")
}

/// Get the base image repository directory under `base`.
pub fn images_dir(base: &Path) -> PathBuf {
    base.join("images")
}

/// Get the config file path. The config file always lives in the ambient
/// data directory; it has to be found before any config is loaded.
pub fn config_path() -> PathBuf {
    data_dir().join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test mutates BIGIRON_DATA_DIR, so everything touching it stays
    // in a single #[test] to keep the harness from interleaving readers.
    #[test]
    fn test_data_dir_resolution() {
        std::env::set_var("BIGIRON_DATA_DIR", "/tmp/bigiron-test");
        let base = data_dir();
        assert_eq!(base, PathBuf::from("/tmp/bigiron-test"));
        assert_eq!(instances_dir(&base), PathBuf::from("/tmp/bigiron-test/instances"));
        assert_eq!(images_dir(&base), PathBuf::from("/tmp/bigiron-test/images"));
        assert_eq!(config_path(), PathBuf::from("/tmp/bigiron-test/config.json"));
        std::env::remove_var("BIGIRON_DATA_DIR");
    }
}
