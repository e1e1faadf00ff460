//! Library entry points for manifest-driven operations.

use crate::error::Result;
use crate::host::{HostManager, MachineList};
use crate::types::Resource;

/// Parse a multi-document YAML string into resources. Empty documents are
/// skipped.
pub fn resources_from_yaml(yaml: &str) -> Result<Vec<Resource>> {
    let mut rs = Vec::new();

    for res in yaml.split("---\n") {
        if res.trim().is_empty() {
            continue;
        }

        let r = serde_yaml::from_str(res)?;
        rs.push(r);
    }

    Ok(rs)
}

/// Create every resource described in the given YAML.
pub fn create_from_yaml(yaml: &str) -> Result<()> {
    let resources = resources_from_yaml(yaml)?;

    let mut hm = HostManager::new()?;

    for res in resources {
        match res {
            Resource::Machine(mut m) => {
                hm.create_machine(&mut m)?;
            }
        }
    }

    Ok(())
}

pub fn list_machines() -> Result<MachineList> {
    let hm = HostManager::new()?;
    hm.list_machines()
}

pub fn destroy_machine(name: &str) -> Result<()> {
    let mut hm = HostManager::new()?;
    hm.destroy_machine(name)
}
