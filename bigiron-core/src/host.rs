//! Host manager: orchestrates the provisioning pipeline.
//!
//! Create walks a machine manifest through image import, instance storage,
//! config drive generation, and domain creation. Destroy and list are the
//! inverse and read-only views over the same state.

use tracing::{info, instrument};
use url::Url;

use crate::config::Config;
use crate::configdrive;
use crate::domain::{self, DomainBuilder};
use crate::error::{Result, VirtError};
use crate::image::Repository;
use crate::mac::Mac;
use crate::netconf;
use crate::state::InstanceStore;
use crate::types::{to_size, Machine, MachineState, MachineStatus, NicKind, StorageKind};

pub struct HostManager {
    config: Config,
    instances: InstanceStore,
    images: Repository,
}

pub type MachineList = Vec<MachineStatus>;

impl HostManager {
    pub fn new() -> Result<Self> {
        Self::with_config(Config::load()?)
    }

    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self {
            instances: InstanceStore::new(config.instances_dir(), &config.qemu_img_path)?,
            images: Repository::new(config.images_dir())?,
            config,
        })
    }

    pub fn image_repo(&self) -> &Repository {
        &self.images
    }

    #[instrument(skip(self, machine), fields(name = %machine.metadata.name))]
    pub fn create_machine(&mut self, machine: &mut Machine) -> Result<()> {
        let name = machine.metadata.name.clone();

        // ensure base image imported to repo
        let image_url = Url::parse(&machine.spec.image.url)?;
        let image_base_id = self.images.add_image(&image_url, &machine.spec.image.hash)?;

        // create instance storage directory
        let instance_dir = self.instances.new_instance(&name)?;

        // create instance image from base
        let image_size = match machine.spec.image.resize {
            None => None,
            Some(ref size_string) => Some(to_size(size_string)?),
        };

        let image_path = self.instances.create_instance_image(
            &name,
            self.images.get_image(&image_base_id)?,
            image_size,
        )?;

        // base domain definition
        let mut d =
            DomainBuilder::new(&name, machine.spec.cpu, to_size(&machine.spec.memory)?, image_path);

        let mut bridged_nic_mac = None;

        // network config
        if let Some(nics) = &mut machine.spec.nics {
            for nic in nics.iter_mut() {
                let mac = Mac::gen();
                nic.mac = Some(mac);

                match nic.kind {
                    NicKind::Bridge => {
                        d.add_bridged_interface(&nic.parent, &mac.to_string());
                        bridged_nic_mac.get_or_insert(mac);
                    }
                    NicKind::Macvtap => {
                        d.add_macvtap_interface(&nic.parent, &mac.to_string());
                    }
                }
            }
        }

        let netconf = netconf::build_net_config(&machine.spec.nics)?;

        // config drive
        let mut builder = configdrive::Builder::new(&name, &self.config.mkisofs_path);

        if !netconf.is_empty() {
            builder.add_network_config(netconf);
        }

        if let Some(ref userdata) = machine.spec.userdata {
            builder.add_userdata(userdata.as_bytes().to_vec());
        }

        let cd_path = builder
            .build(&instance_dir)?
            .canonicalize()
            .map_err(|e| VirtError::io(&instance_dir, e))?;

        d.add_cdrom_from_iso(&cd_path)?;

        // extra storage devices, vdb onward
        if let Some(storages) = &machine.spec.storage {
            for (i, store) in storages.iter().enumerate() {
                let target_name = storage_target_dev(i)?;

                match store {
                    StorageKind::File(ref file) => {
                        d.add_file_backed_storage(&file.path, &target_name)?;
                    }
                    StorageKind::Block(ref block) => {
                        d.add_block_backed_storage(&block.path, &target_name)?;
                    }
                }
            }
        }

        // define/create domain
        d.build(&self.config.libvirt_uri)?;

        info!("Created machine '{}'", name);

        if let Some(mac) = bridged_nic_mac {
            info!("IPv6 SLAAC: {}", mac.to_ipv6_slaac_addr());
        }

        Ok(())
    }

    #[instrument(skip(self))]
    pub fn destroy_machine(&mut self, name: &str) -> Result<()> {
        // destroy in libvirt first; a missing domain is fine
        domain::destroy(&self.config.libvirt_uri, name)?;

        // then remove the on-disk instance state
        self.instances.remove_instance(name)?;

        Ok(())
    }

    pub fn list_machines(&self) -> Result<MachineList> {
        let names = self.instances.list_instances()?;

        let mut list = Vec::with_capacity(names.len());

        for name in names {
            let state = domain::state(&self.config.libvirt_uri, &name)?
                .unwrap_or(MachineState::Shutoff);
            list.push(MachineStatus { name, state });
        }

        Ok(list)
    }
}

/// Target device name for the i-th extra storage device: `vdb`, `vdc`, ...
/// `vda` is the instance disk.
fn storage_target_dev(index: usize) -> Result<String> {
    // "b" through "z"
    if index > 24 {
        return Err(VirtError::DriveLettersExhausted { index });
    }

    let letter = (b'b' + index as u8) as char;
    Ok(format!("vd{}", letter))
}
