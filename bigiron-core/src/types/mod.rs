//! Domain types for machine manifests.

pub mod machine;
pub mod size;

pub use machine::{
    AddressKind, Ipv4Static, ImageSpec, Machine, MachineState, MachineStatus, Metadata, Nic,
    NicKind, Resource, Spec, StorageKind,
};
pub use size::{to_size, SizeString};
