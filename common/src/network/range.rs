//! # IPv4 Block Model
//!
//! Parses CIDR notation (e.g. `192.168.10.0/24`) and enumerates the usable host
//! addresses of the block in ascending order.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;
use serde::{Serialize, Serializer};

use crate::error::AuditError;

/// A continuous range of IPv4 addresses, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Range {
    pub start_addr: Ipv4Addr,
    pub end_addr: Ipv4Addr,
}

impl Ipv4Range {
    pub fn new(start_addr: Ipv4Addr, end_addr: Ipv4Addr) -> Self {
        Self {
            start_addr,
            end_addr,
        }
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = Ipv4Addr> + Clone + use<> {
        let start: u32 = u32::from(self.start_addr);
        let end: u32 = u32::from(self.end_addr);
        (start..=end).map(Ipv4Addr::from)
    }

    pub fn to_iter(&self) -> impl Iterator<Item = IpAddr> + use<> {
        self.iter().map(IpAddr::V4)
    }

    pub fn len(&self) -> u64 {
        let start: u32 = u32::from(self.start_addr);
        let end: u32 = u32::from(self.end_addr);
        if start > end {
            0
        } else {
            u64::from(end - start) + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An IPv4 network block. Host bits in the input are masked off, so
/// `192.168.10.7/30` and `192.168.10.4/30` describe the same block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CidrBlock {
    network: Ipv4Network,
}

impl CidrBlock {
    pub fn network_addr(&self) -> Ipv4Addr {
        self.network.network()
    }

    pub fn prefix(&self) -> u8 {
        self.network.prefix()
    }

    /// The addresses a host can hold.
    ///
    /// Network and broadcast addresses are excluded, except for `/31` point-to-point
    /// links where both addresses are usable and `/32` where the single address is.
    pub fn hosts(&self) -> Ipv4Range {
        let network: u32 = u32::from(self.network.network());
        let broadcast: u32 = u32::from(self.network.broadcast());

        match self.network.prefix() {
            31 | 32 => Ipv4Range::new(Ipv4Addr::from(network), Ipv4Addr::from(broadcast)),
            _ => Ipv4Range::new(
                Ipv4Addr::from(network + 1),
                Ipv4Addr::from(broadcast - 1),
            ),
        }
    }
}

impl FromStr for CidrBlock {
    type Err = AuditError;

    /// Accepts "Network/Prefix" or a bare address, which is read as a `/32`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || AuditError::InvalidNetworkSpec(s.to_string());
        let trimmed = s.trim();

        let (ip_str, prefix) = match trimmed.split_once('/') {
            Some((ip_str, prefix_str)) => {
                let prefix = prefix_str.parse::<u8>().map_err(|_| invalid())?;
                (ip_str, prefix)
            }
            None => (trimmed, 32),
        };

        let ipv4_addr = ip_str.parse::<Ipv4Addr>().map_err(|_| invalid())?;
        let masked = Ipv4Network::new(ipv4_addr, prefix).map_err(|_| invalid())?;
        let network = Ipv4Network::new(masked.network(), prefix).map_err(|_| invalid())?;

        Ok(Self { network })
    }
}

impl fmt::Display for CidrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network.network(), self.network.prefix())
    }
}

impl Serialize for CidrBlock {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ipv4range_iter() {
        let range = Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 3));

        let mut iter = range.iter();
        assert_eq!(iter.next(), Some(Ipv4Addr::new(10, 0, 0, 1)));
        assert_eq!(iter.next(), Some(Ipv4Addr::new(10, 0, 0, 2)));
        assert_eq!(iter.next(), Some(Ipv4Addr::new(10, 0, 0, 3)));
        assert_eq!(iter.next(), None);
        assert_eq!(range.len(), 3);
    }

    #[test]
    fn test_ipv4range_reversed_is_empty() {
        let range = Ipv4Range::new(Ipv4Addr::new(10, 0, 0, 5), Ipv4Addr::new(10, 0, 0, 1));
        assert!(range.is_empty());
        assert_eq!(range.iter().next(), None);
    }

    #[test]
    fn slash_30_has_two_usable_hosts() {
        let block: CidrBlock = "192.168.10.0/30".parse().unwrap();
        let hosts: Vec<Ipv4Addr> = block.hosts().iter().collect();

        assert_eq!(
            hosts,
            vec![Ipv4Addr::new(192, 168, 10, 1), Ipv4Addr::new(192, 168, 10, 2)]
        );
        assert_eq!(block.hosts().len(), 2);
    }

    #[test]
    fn slash_24_excludes_network_and_broadcast() {
        let block: CidrBlock = "10.1.2.0/24".parse().unwrap();
        let hosts = block.hosts();

        assert_eq!(hosts.start_addr, Ipv4Addr::new(10, 1, 2, 1));
        assert_eq!(hosts.end_addr, Ipv4Addr::new(10, 1, 2, 254));
        assert_eq!(block.hosts().len(), 254);
    }

    #[test]
    fn point_to_point_and_single_host_blocks() {
        let p2p: CidrBlock = "10.0.0.0/31".parse().unwrap();
        assert_eq!(p2p.hosts().len(), 2);

        let single: CidrBlock = "10.0.0.9/32".parse().unwrap();
        assert_eq!(single.hosts().iter().collect::<Vec<_>>(), vec![Ipv4Addr::new(10, 0, 0, 9)]);

        let bare: CidrBlock = "10.0.0.9".parse().unwrap();
        assert_eq!(bare, single);
    }

    #[test]
    fn host_bits_are_masked() {
        let block: CidrBlock = "192.168.10.7/30".parse().unwrap();
        assert_eq!(block.network_addr(), Ipv4Addr::new(192, 168, 10, 4));
        assert_eq!(block.to_string(), "192.168.10.4/30");
    }

    #[test]
    fn malformed_blocks_are_rejected() {
        for input in ["not-a-cidr", "10.0.0.0/33", "10.0.0.256/24", "10.0.0.0/", "::1/128", ""] {
            let result = input.parse::<CidrBlock>();
            assert!(
                matches!(result, Err(AuditError::InvalidNetworkSpec(_))),
                "expected rejection of {input:?}"
            );
        }
    }
}
