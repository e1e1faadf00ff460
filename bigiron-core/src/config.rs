//! Configuration management.

use crate::error::{Result, VirtError};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Persistent configuration for bigiron-virt.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Libvirt connection URI. Empty string lets libvirt pick its default
    /// (`qemu:///system` for root, `qemu:///session` otherwise).
    pub libvirt_uri: String,
    pub mkisofs_path: String,
    pub qemu_img_path: String,
    /// Where instance and image state lives. Empty string resolves to the
    /// ambient data directory at use time.
    pub data_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            libvirt_uri: String::new(),
            mkisofs_path: "/usr/bin/mkisofs".to_string(),
            qemu_img_path: "/usr/bin/qemu-img".to_string(),
            data_dir: String::new(),
        }
    }
}

impl Config {
    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        paths::config_path()
    }

    /// Resolve the data directory.
    pub fn data_dir(&self) -> PathBuf {
        if self.data_dir.is_empty() {
            paths::data_dir()
        } else {
            PathBuf::from(&self.data_dir)
        }
    }

    /// Per-instance state directory under [`Self::data_dir`].
    pub fn instances_dir(&self) -> PathBuf {
        paths::instances_dir(&self.data_dir())
    }

    /// Base image repository directory under [`Self::data_dir`].
    pub fn images_dir(&self) -> PathBuf {
        paths::images_dir(&self.data_dir())
    }

    /// Load configuration from disk. When no config file exists yet, write
    /// one with the defaults so operators have a file to edit.
    pub fn load() -> Result<Self> {
        let path = Self::config_path();
        if !path.exists() {
            let conf = Self::default();
            conf.save()?;
            return Ok(conf);
        }
        let content = std::fs::read_to_string(&path).map_err(|e| VirtError::InvalidConfig {
            reason: format!("Failed to read config: {}", e),
        })?;
        serde_json::from_str(&content).map_err(|e| VirtError::InvalidConfig {
            reason: format!("Failed to parse config: {}", e),
        })
    }

    /// Save configuration to disk.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| VirtError::io(parent, e))?;
        }
        let content = serde_json::to_string_pretty(self).map_err(|e| VirtError::InvalidConfig {
            reason: format!("Failed to serialize config: {}", e),
        })?;
        std::fs::write(&path, content).map_err(|e| VirtError::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip() {
        let conf = Config::default();
        let json = serde_json::to_string(&conf).unwrap();
        let back: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(back.mkisofs_path, conf.mkisofs_path);
        assert_eq!(back.libvirt_uri, "");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let conf: Config = serde_json::from_str(r#"{"libvirt_uri": "qemu:///system"}"#).unwrap();
        assert_eq!(conf.libvirt_uri, "qemu:///system");
        assert_eq!(conf.qemu_img_path, "/usr/bin/qemu-img");
    }

    #[test]
    fn data_dir_flows_to_store_paths() {
        let conf: Config = serde_json::from_str(r#"{"data_dir": "/srv/bigiron"}"#).unwrap();
        assert_eq!(conf.instances_dir(), PathBuf::from("/srv/bigiron/instances"));
        assert_eq!(conf.images_dir(), PathBuf::from("/srv/bigiron/images"));
    }
}
