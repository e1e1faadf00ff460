//! Integration tests for the provisioning pipeline.
//!
//! These exercise everything up to the libvirt boundary: manifest parsing,
//! image import, instance storage, network config, and domain XML
//! rendering. No libvirt connection or hypervisor is required.

use bigiron_core::api::resources_from_yaml;
use bigiron_core::domain::DomainBuilder;
use bigiron_core::image::Repository;
use bigiron_core::mac::Mac;
use bigiron_core::netconf::build_net_config;
use bigiron_core::state::InstanceStore;
use bigiron_core::types::{to_size, NicKind, Resource, StorageKind};
use sha2::{Digest, Sha256};
use tempfile::TempDir;
use url::Url;

fn manifest(image_url: &str, hash: &str) -> String {
    format!(
        "kind: Machine
metadata:
  name: testvm
spec:
  cpu: 2
  memory: 512Mi
  image:
    url: \"{image_url}\"
    hash: {hash}
  storage:
    - kind: File
      path: \"/srv/volumes/extra.qcow2\"
  nics:
    - kind: Bridge
      parent: br0
      address:
        kind: IPv6SLAAC
  userdata: |
    #cloud-config
    ssh_pwauth: true
"
    )
}

#[test]
fn manifest_to_domain_xml() {
    let tmp = TempDir::new().unwrap();

    // stage a fake base image and import it
    let base = tmp.path().join("base.qcow2");
    std::fs::write(&base, b"not really qcow2").unwrap();
    let hash = hex::encode(Sha256::digest(b"not really qcow2"));

    let url = Url::from_file_path(&base).unwrap();
    let yaml = manifest(url.as_str(), &hash);

    let rs = resources_from_yaml(&yaml).unwrap();
    assert_eq!(rs.len(), 1);
    let Resource::Machine(mut machine) = rs.into_iter().next().unwrap();

    let mut repo = Repository::new(tmp.path().join("images")).unwrap();
    let image_url = Url::parse(&machine.spec.image.url).unwrap();
    let id = repo.add_image(&image_url, &machine.spec.image.hash).unwrap();
    let image_path = repo.get_image(&id).unwrap();

    // instance directory (skip the qemu-img overlay; no qemu in CI)
    let mut instances =
        InstanceStore::new(tmp.path().join("instances"), "/usr/bin/qemu-img").unwrap();
    let instance_dir = instances.new_instance(&machine.metadata.name).unwrap();
    assert!(instance_dir.ends_with("testvm"));

    // NIC MAC assignment + domain definition
    let mut d = DomainBuilder::new(
        &machine.metadata.name,
        machine.spec.cpu,
        to_size(&machine.spec.memory).unwrap(),
        &image_path,
    );

    for nic in machine.spec.nics.as_mut().unwrap() {
        let mac = Mac::gen();
        nic.mac = Some(mac);
        match nic.kind {
            NicKind::Bridge => d.add_bridged_interface(&nic.parent, &mac.to_string()),
            NicKind::Macvtap => d.add_macvtap_interface(&nic.parent, &mac.to_string()),
        }
    }

    for (i, store) in machine.spec.storage.as_ref().unwrap().iter().enumerate() {
        let dev = format!("vd{}", (b'b' + i as u8) as char);
        match store {
            StorageKind::File(f) => d.add_file_backed_storage(&f.path, &dev).unwrap(),
            StorageKind::Block(b) => d.add_block_backed_storage(&b.path, &dev).unwrap(),
        }
    }

    let netconf = build_net_config(&machine.spec.nics).unwrap();
    assert!(!netconf.is_empty());
    let netconf_str = String::from_utf8(netconf).unwrap();
    assert!(netconf_str.contains("dhcp6: true"));

    let xml = d.render();
    assert!(xml.contains("<name>testvm</name>"));
    assert!(xml.contains(&format!("source file=\"{}\"", image_path.display())));
    assert!(xml.contains("source bridge=\"br0\""));
    assert!(xml.contains("dev=\"vdb\""));
    assert!(xml.contains("<memory unit=\"bytes\">536870912</memory>"));
}

#[test]
fn destroy_removes_instance_state() {
    let tmp = TempDir::new().unwrap();
    let mut instances =
        InstanceStore::new(tmp.path().join("instances"), "/usr/bin/qemu-img").unwrap();

    let dir = instances.new_instance("doomed").unwrap();
    std::fs::write(dir.join("instance.qcow2"), b"disk").unwrap();
    std::fs::write(dir.join("cidata.iso"), b"iso").unwrap();

    instances.remove_instance("doomed").unwrap();
    assert!(!dir.exists());
    assert!(instances.list_instances().unwrap().is_empty());
}
