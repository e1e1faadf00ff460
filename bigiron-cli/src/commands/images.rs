//! `bigiron-virt images` command

use anyhow::Result;
use bigiron_core::HostManager;

/// List base images present in the local repository.
pub fn images() -> Result<()> {
    let hm = HostManager::new()?;
    let images = hm.image_repo().images()?;

    if images.is_empty() {
        println!("No images in repository");
        return Ok(());
    }

    for id in images {
        println!("{}", id);
    }

    Ok(())
}
