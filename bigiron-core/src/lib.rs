//! bigiron-virt core library.
//!
//! Declarative VM provisioning on libvirt/KVM: YAML machine manifests in,
//! running domains out. Shared by the `bigiron-virt` CLI.

pub mod api;
pub mod config;
pub mod configdrive;
pub mod domain;
pub mod error;
pub mod host;
pub mod image;
pub mod mac;
pub mod netconf;
pub mod paths;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use config::Config;
pub use error::{Result, VirtError};
pub use host::{HostManager, MachineList};
pub use mac::Mac;
pub use types::{Machine, MachineState, MachineStatus, Resource, Spec};
