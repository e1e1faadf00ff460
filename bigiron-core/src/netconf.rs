//! Cloud-init Network Config V2 generation.
//!
//! Supports the subset of the format described at
//! https://cloudinit.readthedocs.io/en/latest/reference/network-config-format-v2.html
//! needed to match a guest interface by MAC and give it either DHCPv6
//! (for SLAAC) or a static IPv4 address.

use std::collections::HashMap as Map;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VirtError};
use crate::types::{AddressKind, Nic};

/// Render the network-config document for a machine's NICs.
///
/// Returns an empty buffer when the machine has no NICs; callers skip the
/// config drive's network-config file in that case.
pub fn build_net_config(nics: &Option<Vec<Nic>>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();

    let nics = match nics {
        Some(n) => n,
        None => return Ok(buf),
    };

    let mut ethers: Map<String, Ethernet> = Map::new();

    for (i, nic) in nics.iter().enumerate() {
        let key = format!("id{}", i);
        let ether = Ethernet::try_from(nic)?;
        let _ = ethers.insert(key, ether);
    }

    let conf = NetworkConfig {
        network: NetworkConfigV2 { version: 2, ethernets: ethers },
    };

    serde_yaml::to_writer(&mut buf, &conf)?;
    Ok(buf)
}

impl TryFrom<&Nic> for Ethernet {
    type Error = VirtError;

    fn try_from(nic: &Nic) -> Result<Self> {
        let mac = nic
            .mac
            .ok_or_else(|| VirtError::Internal("NIC has no MAC assigned".to_string()))?;

        let mut s = Ethernet::new_with_mac(&mac.to_string());

        match nic.address {
            AddressKind::IPv6SLAAC => {
                s.dhcp6 = Some(true);
            }
            AddressKind::IPv4Static(ref v4static) => {
                s.addresses = Some(vec![v4static.addr.clone()]);
                s.gateway4 = Some(v4static.gateway.clone());

                if !v4static.nameservers.is_empty() {
                    s.nameservers = Some(Nameservers {
                        search: None,
                        addresses: v4static.nameservers.clone(),
                    });
                }
            }
        }

        Ok(s)
    }
}

impl Ethernet {
    fn new_with_mac(mac: &str) -> Self {
        let m = MatchBlock {
            macaddress: Some(mac.to_string()),
            name: None,
            driver: None,
        };

        Self {
            r#match: m,
            dhcp4: None,
            dhcp6: None,
            addresses: None,
            gateway4: None,
            gateway6: None,
            nameservers: None,
            routes: None,
            wakeonlan: None,
            set_name: None,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone)]
struct NetworkConfig {
    network: NetworkConfigV2,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
struct NetworkConfigV2 {
    version: u8,
    ethernets: Map<String, Ethernet>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
struct Ethernet {
    r#match: MatchBlock,

    #[serde(skip_serializing_if = "Option::is_none")]
    dhcp4: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    dhcp6: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    addresses: Option<Vec<Address>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    gateway4: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    gateway6: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    nameservers: Option<Nameservers>,

    #[serde(skip_serializing_if = "Option::is_none")]
    routes: Option<Vec<Route>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    wakeonlan: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none", rename = "set-name")]
    set_name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
struct MatchBlock {
    #[serde(skip_serializing_if = "Option::is_none")]
    macaddress: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    driver: Option<String>,
}

type Address = String;

#[derive(Deserialize, Serialize, Debug, Clone)]
struct Nameservers {
    #[serde(skip_serializing_if = "Option::is_none")]
    search: Option<Vec<String>>,
    addresses: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone)]
struct Route {
    to: String,
    via: String,
    metric: u32,
}
