//! Cloud-init NoCloud config drive generation.
//!
//! The config drive is an ISO9660 volume labeled `cidata` holding
//! `meta-data`, `user-data`, and optionally `network-config`. Guests with
//! cloud-init pick it up as a NoCloud datasource on first boot.

use std::path::{Path, PathBuf};
use std::process::Command;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, VirtError};

/// Build the seed ISO out of the given data files using mkisofs.
pub fn create_iso<P, Q, R, N>(
    isoprog: &str,
    output_path: P,
    user_data: Q,
    meta_data: R,
    network_data: &Option<N>,
) -> Result<()>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    R: AsRef<Path>,
    N: AsRef<Path>,
{
    let mut cmd = Command::new(isoprog);

    cmd.arg("-output")
        .arg(output_path.as_ref())
        .arg("-input-charset")
        .arg("utf-8")
        .arg("-volid")
        .arg("cidata")
        .arg("-joliet")
        .arg("-r")
        .arg(user_data.as_ref())
        .arg(meta_data.as_ref());

    if let Some(nd) = network_data {
        cmd.arg(nd.as_ref());
    }

    debug!("Running: {:?}", cmd);

    let output = cmd
        .output()
        .map_err(|e| VirtError::io(output_path.as_ref(), e))?;

    debug!("mkisofs output: {:?}", output);

    if !output.status.success() {
        return Err(VirtError::IsoBuildFailed {
            reason: format!(
                "mkisofs exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr)
            ),
        });
    }

    Ok(())
}

/// Accumulates config drive content for one instance.
pub struct Builder {
    isoprog: String,
    metadata: Metadata,
    userdata: Option<Vec<u8>>,
    network_config: Option<Vec<u8>>,
}

impl Builder {
    pub fn new(instance_name: &str, isoprog: &str) -> Self {
        Self {
            isoprog: isoprog.to_string(),
            metadata: Metadata::new(instance_name),
            userdata: None,
            network_config: None,
        }
    }

    pub fn metadata(&mut self) -> &mut Metadata {
        &mut self.metadata
    }

    pub fn add_userdata(&mut self, userdata: Vec<u8>) -> &mut Self {
        self.userdata = Some(userdata);
        self
    }

    pub fn add_network_config(&mut self, network_config: Vec<u8>) -> &mut Self {
        self.network_config = Some(network_config);
        self
    }

    /// Write the data files under `base_dir`, build the ISO, and clean the
    /// scratch files back up. Returns the path to the ISO.
    pub fn build<P: AsRef<Path>>(&mut self, base_dir: P) -> Result<PathBuf> {
        let cd_dir = base_dir.as_ref().join("cidata-dir");

        std::fs::create_dir_all(&cd_dir).map_err(|e| VirtError::io(&cd_dir, e))?;

        // create the iso outside the scratch dir, since that gets removed
        let iso_path = base_dir.as_ref().join("cidata.iso");
        let ud_path = cd_dir.join("user-data");
        let md_path = cd_dir.join("meta-data");

        let nc_path = if let Some(ref netconf) = self.network_config {
            let path = cd_dir.join("network-config");
            std::fs::write(&path, netconf).map_err(|e| VirtError::io(&path, e))?;
            Some(path)
        } else {
            None
        };

        // cloud-init expects user-data to exist even when empty
        let userdata = self.userdata.as_deref().unwrap_or(&[]);
        std::fs::write(&ud_path, userdata).map_err(|e| VirtError::io(&ud_path, e))?;

        std::fs::write(&md_path, self.metadata.to_bytes()?)
            .map_err(|e| VirtError::io(&md_path, e))?;

        create_iso(&self.isoprog, &iso_path, &ud_path, &md_path, &nc_path)?;

        std::fs::remove_file(&md_path).map_err(|e| VirtError::io(&md_path, e))?;
        std::fs::remove_file(&ud_path).map_err(|e| VirtError::io(&ud_path, e))?;

        if let Some(ref path) = nc_path {
            std::fs::remove_file(path).map_err(|e| VirtError::io(path, e))?;
        }

        std::fs::remove_dir(&cd_dir).map_err(|e| VirtError::io(&cd_dir, e))?;

        Ok(iso_path)
    }
}

/// NoCloud `meta-data` document.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "kebab-case")]
pub struct Metadata {
    instance_id: String,
    local_hostname: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    network_interfaces: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    public_keys: Vec<String>,
}

impl Metadata {
    pub fn new(instance_name: &str) -> Self {
        Self {
            instance_id: instance_name.to_string(),
            local_hostname: instance_name.to_string(),
            network_interfaces: None,
            public_keys: Vec::new(),
        }
    }

    pub fn add_public_key(&mut self, public_key: &str) {
        self.public_keys.push(public_key.to_string());
    }

    pub fn add_network_block(&mut self, network_block: String) {
        self.network_interfaces = Some(network_block);
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        serde_yaml::to_writer(&mut buf, &self)?;
        Ok(buf)
    }
}
