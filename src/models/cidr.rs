//! IP prefix (CIDR notation) utilities.
//!
//! Provides [`Cidr`] for IPv4 and IPv6 prefixes as used by subnet pools,
//! along with helpers for prefix-length bounds.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::error::Error;
use std::net::IpAddr;
use std::str::FromStr;

/// Maximum prefix length for an IPv4 prefix.
pub const MAX_LENGTH_V4: u8 = 32;
/// Maximum prefix length for an IPv6 prefix.
pub const MAX_LENGTH_V6: u8 = 128;

/// Return the maximum prefix length for an IP version (4 or 6).
pub fn max_prefix_len(ip_version: u8) -> Result<u8, Box<dyn Error>> {
    match ip_version {
        4 => Ok(MAX_LENGTH_V4),
        6 => Ok(MAX_LENGTH_V6),
        v => Err(format!("Unknown IP version {v}").into()),
    }
}

/// IP prefix with CIDR notation support.
#[derive(Eq, Ord, PartialOrd, PartialEq, Debug, Copy, Clone, Hash)]
pub struct Cidr {
    /// The network address as written (not masked).
    pub addr: IpAddr,
    /// The prefix length.
    pub prefix_len: u8,
}

impl Cidr {
    /// Create a new [`Cidr`] from a string such as "10.0.0.0/24" or "fd00::/64".
    pub fn new(addr_cidr: &str) -> Result<Cidr, Box<dyn Error>> {
        let addr_cidr = addr_cidr.trim();
        let (addr, len) = addr_cidr
            .split_once('/')
            .ok_or_else(|| format!("Invalid CIDR {addr_cidr}: missing prefix length"))?;
        let addr: IpAddr = addr
            .parse()
            .map_err(|_| format!("Invalid address {addr} in CIDR {addr_cidr}"))?;
        let prefix_len: u8 = len
            .parse()
            .map_err(|_| format!("Invalid prefix length {len} in CIDR {addr_cidr}"))?;
        let cidr = Cidr { addr, prefix_len };
        if prefix_len > cidr.max_len() {
            return Err(format!(
                "Prefix length {prefix_len} is too long for IPv{} CIDR {addr_cidr}",
                cidr.ip_version()
            )
            .into());
        }
        Ok(cidr)
    }

    /// IP version of the prefix, 4 or 6.
    pub fn ip_version(&self) -> u8 {
        match self.addr {
            IpAddr::V4(_) => 4,
            IpAddr::V6(_) => 6,
        }
    }

    /// Maximum prefix length for this address family.
    pub fn max_len(&self) -> u8 {
        match self.addr {
            IpAddr::V4(_) => MAX_LENGTH_V4,
            IpAddr::V6(_) => MAX_LENGTH_V6,
        }
    }

    /// True if the address has no host bits set below the prefix length.
    pub fn is_network_address(&self) -> bool {
        match self.addr {
            IpAddr::V4(v4) => {
                let host_bits = MAX_LENGTH_V4 - self.prefix_len;
                let bits = u32::from(v4) as u64;
                (bits >> host_bits) << host_bits == bits
            }
            IpAddr::V6(v6) => {
                let host_bits = (MAX_LENGTH_V6 - self.prefix_len) as u32;
                let bits = u128::from(v6);
                bits.checked_shr(host_bits)
                    .and_then(|b| b.checked_shl(host_bits))
                    .unwrap_or(0)
                    == bits
            }
        }
    }
}

impl FromStr for Cidr {
    type Err = Box<dyn Error>;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Cidr::new(s)
    }
}

impl Serialize for Cidr {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Cidr {
    fn deserialize<D>(deserializer: D) -> Result<Cidr, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Cidr::new(&s).map_err(|e| de::Error::custom(e.to_string()))
    }
}

impl std::fmt::Display for Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[test]
    fn test_cidr_new_v4() {
        let cidr = Cidr::new("10.10.0.0/16").unwrap();
        assert_eq!(cidr.addr, IpAddr::V4(Ipv4Addr::new(10, 10, 0, 0)));
        assert_eq!(cidr.prefix_len, 16);
        assert_eq!(cidr.ip_version(), 4);
        assert_eq!(cidr.to_string(), "10.10.0.0/16");
    }

    #[test]
    fn test_cidr_new_v6() {
        let cidr = Cidr::new(" fd00:1::/64 ").unwrap();
        assert_eq!(cidr.addr, IpAddr::V6(Ipv6Addr::new(0xfd00, 1, 0, 0, 0, 0, 0, 0)));
        assert_eq!(cidr.ip_version(), 6);
        assert_eq!(cidr.max_len(), 128);
    }

    #[test]
    fn test_cidr_invalid() {
        assert!(Cidr::new("10.10.0.0").is_err());
        assert!(Cidr::new("10.10.0/16").is_err());
        assert!(Cidr::new("10.10.0.0/33").is_err());
        assert!(Cidr::new("fd00::/129").is_err());
        assert!(Cidr::new("10.10.0.0/abc").is_err());
    }

    #[test]
    fn test_cidr_network_address() {
        assert!(Cidr::new("10.11.11.0/24").unwrap().is_network_address());
        assert!(!Cidr::new("10.11.11.1/24").unwrap().is_network_address());
        assert!(Cidr::new("0.0.0.0/0").unwrap().is_network_address());
        assert!(Cidr::new("fd00::/8").unwrap().is_network_address());
        assert!(!Cidr::new("fd00::1/64").unwrap().is_network_address());
        assert!(Cidr::new("::/0").unwrap().is_network_address());
    }

    #[test]
    fn test_cidr_serde() {
        let cidrs: Vec<Cidr> = serde_json::from_str(r#"["10.10.0.0/16","10.11.11.0/24"]"#).unwrap();
        assert_eq!(cidrs[1], Cidr::new("10.11.11.0/24").unwrap());
        assert!(serde_json::from_str::<Cidr>(r#""not-a-cidr""#).is_err());
        assert_eq!(
            serde_json::to_string(&cidrs[0]).unwrap(),
            r#""10.10.0.0/16""#
        );
    }

    #[test]
    fn test_max_prefix_len() {
        assert_eq!(max_prefix_len(4).unwrap(), 32);
        assert_eq!(max_prefix_len(6).unwrap(), 128);
        assert!(max_prefix_len(5).is_err());
    }
}
