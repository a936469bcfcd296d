//! IPv4 subnet membership check for the campus-WiFi attendance path.

use std::net::Ipv4Addr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum SubnetError {
    #[error("invalid IPv4 address: {0}")]
    InvalidAddress(String),
    #[error("prefix length must be 0..=32, got {0}")]
    InvalidPrefix(u8),
}

/// Returns true if `ip` belongs to the `network`/`prefix` CIDR block.
///
/// Both addresses are interpreted as 32-bit unsigned integers in big-endian
/// octet order and compared under the prefix mask. Prefix lengths 0 and 32
/// are handled without relying on out-of-range shifts.
pub fn ip_in_subnet(ip: &str, network: &str, prefix: u8) -> Result<bool, SubnetError> {
    if prefix > 32 {
        return Err(SubnetError::InvalidPrefix(prefix));
    }

    let ip_num = parse_v4(ip)?;
    let net_num = parse_v4(network)?;

    // A shift of 32 (prefix 0) is undefined for u32; checked_shl covers it.
    let mask = u32::MAX.checked_shl(u32::from(32 - prefix)).unwrap_or(0);

    Ok((ip_num & mask) == (net_num & mask))
}

fn parse_v4(addr: &str) -> Result<u32, SubnetError> {
    addr.parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| SubnetError::InvalidAddress(addr.to_owned()))
}
