//! Libvirt domain definition and lifecycle.
//!
//! Device fragments are composed with quick-xml; the outer domain document
//! is a fixed KVM template. Guests get virtio disks and NICs, a serial
//! console on a pty, and an SMBIOS sysinfo block.

use std::io::Cursor;
use std::path::Path;

use quick_xml::writer::Writer;
use virt::error::ErrorNumber;
use virt::sys;
use virt::{connect::Connect, domain::Domain};

use crate::error::{Result, VirtError};
use crate::types::MachineState;

/// Open a libvirt connection. An empty URI defers to libvirt's own
/// default resolution.
fn connect(uri: &str) -> Result<Connect> {
    let target = if uri.is_empty() { None } else { Some(uri) };
    Ok(Connect::open(target)?)
}

/// Incrementally assembles a libvirt domain XML definition.
pub struct DomainBuilder {
    pub name: String,
    pub cpus: u32,
    pub memory_bytes: u64,
    pub image_file: String,

    network_xml: String,
    block_device_xml: String,
}

impl DomainBuilder {
    pub fn new<P: AsRef<Path>>(name: &str, cpus: u32, memory_bytes: u64, image_file: P) -> Self {
        Self {
            name: name.to_string(),
            cpus,
            memory_bytes,
            image_file: image_file.as_ref().to_string_lossy().to_string(),
            network_xml: String::new(),
            block_device_xml: String::new(),
        }
    }

    /// Attach an ISO as a readonly IDE cdrom (`hdc`).
    pub fn add_cdrom_from_iso<P: AsRef<Path>>(&mut self, iso_file_path: P) -> Result<()> {
        let iso_path_str = iso_file_path.as_ref().to_string_lossy();

        let mut w = Writer::new(Cursor::new(Vec::new()));
        w.create_element("disk")
            .with_attribute(("type", "file"))
            .with_attribute(("device", "cdrom"))
            .write_inner_content(|w| {
                w.create_element("source")
                    .with_attribute(("file", iso_path_str.as_ref()))
                    .write_empty()?;

                w.create_element("readonly").write_empty()?;

                w.create_element("target")
                    .with_attribute(("dev", "hdc"))
                    .with_attribute(("bus", "ide"))
                    .write_empty()?;

                Ok::<(), quick_xml::Error>(())
            })?;

        let xml = String::from_utf8(w.into_inner().into_inner())?;
        self.block_device_xml.push_str(&xml);

        Ok(())
    }

    pub fn add_bridged_interface(&mut self, name: &str, macaddr: &str) {
        let xml = format!(
            r#"<interface type="bridge">
      <source bridge="{name}"/>
      <mac address="{macaddr}"/>
      <model type="virtio"/>
    </interface>"#,
            name = name,
            macaddr = macaddr
        );

        self.network_xml.push_str(&xml);
    }

    pub fn add_macvtap_interface(&mut self, name: &str, macaddr: &str) {
        let xml = format!(
            r#"<interface type="direct">
      <source dev="{name}" mode="bridge"/>
      <mac address="{macaddr}"/>
      <model type="virtio"/>
    </interface>"#,
            name = name,
            macaddr = macaddr
        );

        self.network_xml.push_str(&xml);
    }

    pub fn add_file_backed_storage<P: AsRef<Path>>(
        &mut self,
        path: P,
        target_dev: &str,
    ) -> Result<()> {
        self.add_storage(path, target_dev, "file", "file")
    }

    pub fn add_block_backed_storage<P: AsRef<Path>>(
        &mut self,
        path: P,
        target_dev: &str,
    ) -> Result<()> {
        self.add_storage(path, target_dev, "block", "dev")
    }

    fn add_storage<P: AsRef<Path>>(
        &mut self,
        path: P,
        target_dev: &str,
        disk_type: &str,
        source_type: &str,
    ) -> Result<()> {
        let path_str = path.as_ref().to_string_lossy();

        let mut w = Writer::new(Cursor::new(Vec::new()));
        w.create_element("disk")
            .with_attribute(("type", disk_type))
            .with_attribute(("device", "disk"))
            .write_inner_content(|w| {
                w.create_element("source")
                    .with_attribute((source_type, path_str.as_ref()))
                    .write_empty()?;

                w.create_element("target")
                    .with_attribute(("dev", target_dev))
                    .with_attribute(("bus", "virtio"))
                    .write_empty()?;

                Ok::<(), quick_xml::Error>(())
            })?;

        let xml = String::from_utf8(w.into_inner().into_inner())?;
        self.block_device_xml.push_str(&xml);

        Ok(())
    }

    /// Render the complete domain document.
    pub fn render(&self) -> String {
        format!(
            r#"
<domain type="kvm">
  <name>{name}</name>
  <memory unit="bytes">{memory_bytes}</memory>
  <currentMemory unit="bytes">{memory_bytes}</currentMemory>
  <vcpu>{cpus}</vcpu>
  <os>
    <smbios mode="sysinfo"/>
    <type arch="x86_64" machine="pc">hvm</type>
    <boot dev="hd"/>
  </os>
  <features>
    <acpi/>
    <apic/>
  </features>
  <clock offset="utc"/>
  <pm>
    <suspend-to-mem enabled="no"/>
    <suspend-to-disk enabled="no"/>
  </pm>
  <devices>
    <disk type="file" device="disk">
      <driver name="qemu" type="qcow2" cache="writeback"/>
      <source file="{image_file}"/>
      <target dev="vda" bus="virtio"/>
    </disk>
    {block_devices}
    <serial type="pty">
      <source path="/dev/pts/0"/>
      <target type="isa-serial" port="0"/>
    </serial>
    <input type="keyboard" bus="ps2"/>
    <input type="mouse" bus="ps2"/>
    {network_xml}
    <memballoon model="virtio"/>
  </devices>
  <sysinfo type="smbios">
    <bios>
      <entry name="vendor">BigIron</entry>
    </bios>
  </sysinfo>
</domain>
        "#,
            name = &self.name,
            memory_bytes = self.memory_bytes,
            cpus = self.cpus,
            image_file = &self.image_file,
            network_xml = self.network_xml,
            block_devices = self.block_device_xml,
        )
    }

    /// Render the definition and create the domain.
    pub fn build(self, uri: &str) -> Result<()> {
        let domxml = self.render();

        let c = connect(uri)?;
        let _dom = Domain::create_xml(&c, &domxml, 0)?;
        Ok(())
    }
}

/// Destroy a domain by name. A domain that does not exist is treated as
/// already destroyed.
pub fn destroy(uri: &str, name: &str) -> Result<()> {
    let c = connect(uri)?;

    match Domain::lookup_by_name(&c, name) {
        Ok(dom) => {
            dom.destroy()?;
            Ok(())
        }
        Err(e) if matches!(e.code(), ErrorNumber::NoDomain) => Ok(()),
        Err(e) => Err(VirtError::Libvirt(e)),
    }
}

/// Query the state of a domain by name. `None` means no live domain with
/// that name exists.
pub fn state(uri: &str, name: &str) -> Result<Option<MachineState>> {
    let c = connect(uri)?;

    let dom = match Domain::lookup_by_name(&c, name) {
        Ok(dom) => dom,
        Err(e) if matches!(e.code(), ErrorNumber::NoDomain) => return Ok(None),
        Err(e) => return Err(VirtError::Libvirt(e)),
    };

    let (code, _reason) = dom.get_state()?;

    let state = match code {
        sys::VIR_DOMAIN_RUNNING => MachineState::Running,
        sys::VIR_DOMAIN_BLOCKED => MachineState::Blocked,
        sys::VIR_DOMAIN_PAUSED => MachineState::Paused,
        sys::VIR_DOMAIN_SHUTDOWN => MachineState::ShuttingDown,
        sys::VIR_DOMAIN_SHUTOFF => MachineState::Shutoff,
        sys::VIR_DOMAIN_CRASHED => MachineState::Crashed,
        sys::VIR_DOMAIN_PMSUSPENDED => MachineState::Suspended,
        _ => MachineState::Unknown,
    };

    Ok(Some(state))
}
