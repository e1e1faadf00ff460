//! MAC address generation and parsing.

use rand::{thread_rng, Rng};
use thiserror::Error;

/// A 48-bit MAC address.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Mac {
    octets: [u8; 6],
}

impl Mac {
    /// Generate a new random MAC address in the Xen/KVM `00:16:3e` OUI.
    pub fn gen() -> Self {
        let mut rng = thread_rng();

        let mac: [u8; 6] = [
            0x00,
            0x16,
            0x3e,
            rng.gen_range(0x00..0x7f),
            rng.gen_range(0x00..0xff),
            rng.gen_range(0x00..0xff),
        ];

        Self { octets: mac }
    }

    /// Derive the IPv6 Stateless Address Autoconfiguration link-local
    /// address for this MAC (EUI-64: 7th bit flipped, `ff:fe` inserted).
    pub fn to_ipv6_slaac_addr(&self) -> String {
        let octets = &self.octets;

        let flipped = octets[0] | 0b0000_0010;
        let addr = [
            (flipped, octets[1]),
            (octets[2], 0xff),
            (0xfe, octets[3]),
            (octets[4], octets[5]),
        ];

        let s = addr
            .into_iter()
            .map(|s| hex::encode([s.0, s.1]))
            .collect::<Vec<_>>()
            .join(":");

        "fe80::".to_owned() + s.trim_start_matches('0')
    }
}

impl std::fmt::Display for Mac {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.octets.map(|o| hex::encode([o])).join(":"))
    }
}

/// Error produced when a string does not parse as a MAC address.
#[derive(Debug, PartialEq, Eq, Error)]
#[error("invalid MAC address")]
pub struct MacParseError;

impl std::str::FromStr for Mac {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(MacParseError);
        }

        let v: Vec<u8> = parts
            .into_iter()
            .map(hex::decode)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| MacParseError)?
            .into_iter()
            .flatten()
            .collect();

        let octets: [u8; 6] = v.try_into().map_err(|_| MacParseError)?;

        Ok(Mac { octets })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_within_oui() {
        let mac = Mac::gen().to_string();
        assert!(mac.starts_with("00:16:3e"));
    }

    #[test]
    fn ipv6_from_mac() {
        let ts = [
            ("00:16:3e:23:59:0f", "fe80::216:3eff:fe23:590f"),
            ("00:16:3e:5f:5d:47", "fe80::216:3eff:fe5f:5d47"),
        ];

        for t in ts {
            let res = t.0.parse::<Mac>().unwrap().to_ipv6_slaac_addr();
            assert_eq!(res, t.1);
        }
    }

    #[test]
    fn parse_round_trip() {
        let s = "00:11:22:33:44:55";
        let mac: Mac = s.parse().unwrap();
        assert_eq!(s, mac.to_string());
    }

    #[test]
    fn parse_invalid_hex() {
        assert_eq!("00:11:22:33:44:zz".parse::<Mac>(), Err(MacParseError));
    }

    #[test]
    fn parse_wrong_length() {
        assert_eq!("00:11:22:33:44:55:66".parse::<Mac>(), Err(MacParseError));
        assert_eq!("00:11:22".parse::<Mac>(), Err(MacParseError));
    }
}
