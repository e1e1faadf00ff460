//! Machine manifest types.
//!
//! Manifests are Kubernetes-style YAML documents: a `kind` discriminator,
//! `metadata`, and a `spec` describing the requested machine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mac::Mac;
use crate::types::size::SizeString;

/// Top-level manifest resource, tagged by `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum Resource {
    Machine(Machine),
}

/// A virtual machine manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Machine {
    pub metadata: Metadata,
    pub status: Option<String>,
    pub spec: Spec,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Metadata {
    pub name: String,
}

impl Machine {
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Requested machine shape: resources, base image, extra devices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Spec {
    pub cpu: u32,
    pub memory: SizeString,
    pub image: ImageSpec,
    pub storage: Option<Vec<StorageKind>>,
    pub nics: Option<Vec<Nic>>,
    pub userdata: Option<String>,
}

/// Base image reference: where to fetch it, the expected SHA-256 digest,
/// and an optional virtual size to grow the instance disk to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageSpec {
    pub url: String,
    pub hash: String,
    pub resize: Option<SizeString>,
}

/// Additional storage device attached to the machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum StorageKind {
    File(File),
    Block(Block),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct File {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Block {
    pub path: PathBuf,
}

/// Network interface attached to the machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Nic {
    pub kind: NicKind,
    pub parent: String,
    pub address: AddressKind,

    /// Assigned during provisioning, never read from a manifest.
    #[serde(skip)]
    pub mac: Option<Mac>,
}

/// How the interface is wired into the host network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NicKind {
    /// Attached to an existing Linux bridge.
    Bridge,
    /// Macvtap in bridge mode on a physical parent device.
    Macvtap,
}

/// Guest address configuration for a NIC.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum AddressKind {
    IPv6SLAAC,
    IPv4Static(Ipv4Static),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ipv4Static {
    pub addr: String,
    pub gateway: String,

    #[serde(skip_serializing_if = "Vec::is_empty", default = "Vec::new")]
    pub nameservers: Vec<String>,
}

/// Machine state as reported by libvirt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MachineState {
    Running,
    Blocked,
    Paused,
    ShuttingDown,
    Shutoff,
    Crashed,
    Suspended,
    Unknown,
}

impl std::fmt::Display for MachineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "running"),
            Self::Blocked => write!(f, "blocked"),
            Self::Paused => write!(f, "paused"),
            Self::ShuttingDown => write!(f, "shutting-down"),
            Self::Shutoff => write!(f, "shutoff"),
            Self::Crashed => write!(f, "crashed"),
            Self::Suspended => write!(f, "suspended"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A machine known to the instance store, with its libvirt state.
#[derive(Debug, Clone)]
pub struct MachineStatus {
    pub name: String,
    pub state: MachineState,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"kind: Machine
metadata:
  name: othervm
spec:
  cpu: 4
  memory: 512Mi
  image:
    url: "file:///srv/images/ubuntu-22.04-server-cloudimg-amd64-disk-kvm.img"
    hash: 754129c5052756ee47a0c395e518bd3413f444dff69b98f8a8fa42f2fa3acc2d
    resize: 100G
  storage:
    - kind: File
      path: "/srv/volumes/localfile01.qcow2"
  nics:
    - kind: Bridge
      parent: obsbr0
      address:
        kind: IPv6SLAAC
    - kind: Macvtap
      parent: eth0
      address:
        kind: IPv4Static
        addr: "192.168.3.160/24"
        gateway: "192.168.3.1"
  userdata: |
    #cloud-config
    ssh_pwauth: true
"#;

    #[test]
    fn serialize() {
        let m = Machine {
            status: None,
            metadata: Metadata { name: "othervm".to_string() },
            spec: Spec {
                cpu: 4,
                memory: "512Mi".to_string(),
                image: ImageSpec {
                    url: "file:///srv/images/base.qcow2".to_string(),
                    hash: "754129c5052756ee47a0c395e518bd3413f444dff69b98f8a8fa42f2fa3acc2d"
                        .to_string(),
                    resize: Some("100G".to_string()),
                },
                storage: Some(vec![StorageKind::File(File {
                    path: "/srv/volumes/localfile01.qcow2".into(),
                })]),
                nics: None,
                userdata: Some("#cloud-config\nssh_pwauth: true\n".to_string()),
            },
        };

        let out = serde_yaml::to_string(&m).unwrap();

        assert!(out.contains("resize: 100G"));
        assert!(out.contains("path: /srv/volumes/localfile01.qcow2"));
    }

    #[test]
    fn deserialize() {
        let r: Resource = serde_yaml::from_str(SAMPLE).unwrap();
        let Resource::Machine(m) = r;

        assert_eq!(m.metadata.name, "othervm");
        assert_eq!(m.spec.cpu, 4);

        let nics = m.spec.nics.unwrap();
        assert_eq!(nics[0].kind, NicKind::Bridge);
        assert_eq!(nics[1].kind, NicKind::Macvtap);
        assert!(nics[0].mac.is_none());

        match &nics[1].address {
            AddressKind::IPv4Static(v4) => {
                assert_eq!(v4.addr, "192.168.3.160/24");
                assert_eq!(v4.gateway, "192.168.3.1");
                assert!(v4.nameservers.is_empty());
            }
            other => panic!("unexpected address: {:?}", other),
        }
    }

    #[test]
    fn cycle() {
        let m: Resource = serde_yaml::from_str(SAMPLE).unwrap();
        let yam = serde_yaml::to_string(&m).unwrap();
        let m2: Resource = serde_yaml::from_str(&yam).unwrap();

        assert_eq!(m, m2);
    }
}
