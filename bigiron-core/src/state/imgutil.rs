//! qcow2 image creation via `qemu-img`.

use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::error::{Result, VirtError};

/// Create a qcow2 image at `filepath`, optionally backed by `backing_file`
/// and optionally sized to `resize` bytes.
pub fn create<P: AsRef<Path>, B: AsRef<Path>>(
    qemu_img: &str,
    filepath: P,
    resize: Option<u64>,
    backing_file: Option<B>,
) -> Result<()> {
    let mut cmd = Command::new(qemu_img);
    cmd.arg("create");
    cmd.arg("-q");

    if let Some(bf) = backing_file {
        cmd.arg("-b");
        cmd.arg(bf.as_ref());
        // backing format is required by newer qemu-img when -b is given
        cmd.arg("-F");
        cmd.arg("qcow2");
    }

    cmd.arg("-f");
    cmd.arg("qcow2");
    cmd.arg(filepath.as_ref());

    if let Some(size) = resize {
        cmd.arg(size.to_string());
    }

    debug!("Running: {:?}", cmd);

    let status = cmd
        .status()
        .map_err(|e| VirtError::io(filepath.as_ref(), e))?;

    if status.success() {
        Ok(())
    } else {
        Err(VirtError::ImageCreateFailed {
            reason: format!("qemu-img exited with {}", status),
        })
    }
}
