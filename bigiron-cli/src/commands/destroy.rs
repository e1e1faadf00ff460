//! `bigiron-virt destroy` command

use anyhow::Result;

/// Destroy a machine: its libvirt domain and its instance directory.
pub fn destroy(name: &str) -> Result<()> {
    bigiron_core::api::destroy_machine(name)?;
    println!("Destroyed {}", name);
    Ok(())
}
