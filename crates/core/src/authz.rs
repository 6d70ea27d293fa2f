//! Origin-based authorization tiers.
//!
//! Two independent checks, never combined: "server-only" restricts an
//! operation to the machine the service itself runs on, "subnet-only" to a
//! configured network range. Both run before any selector resolution.

use std::net::IpAddr;
use std::str::FromStr;

use crate::error::ApiError;

/// Access tier required by an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthTier {
    Open,
    ServerOnly,
    SubnetOnly,
}

/// An IPv4 or IPv6 network in CIDR notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subnet {
    network: IpAddr,
    prefix_len: u8,
}

/// Failure to parse CIDR text.
#[derive(Debug, thiserror::Error)]
#[error("invalid subnet '{0}': expected CIDR notation like 10.2.0.0/16")]
pub struct SubnetParseError(String);

impl FromStr for Subnet {
    type Err = SubnetParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (addr_text, len_text) = text
            .split_once('/')
            .ok_or_else(|| SubnetParseError(text.to_string()))?;
        let network: IpAddr = addr_text
            .parse()
            .map_err(|_| SubnetParseError(text.to_string()))?;
        let prefix_len: u8 = len_text
            .parse()
            .map_err(|_| SubnetParseError(text.to_string()))?;
        let max_len = match network {
            IpAddr::V4(_) => 32,
            IpAddr::V6(_) => 128,
        };
        if prefix_len > max_len {
            return Err(SubnetParseError(text.to_string()));
        }
        Ok(Subnet {
            network,
            prefix_len,
        })
    }
}

impl Subnet {
    /// Whether `addr` falls inside this network. Mixed address families
    /// never match.
    pub fn contains(&self, addr: IpAddr) -> bool {
        match (self.network, addr) {
            (IpAddr::V4(net), IpAddr::V4(addr)) => {
                let mask = prefix_mask_v4(self.prefix_len);
                u32::from(net) & mask == u32::from(addr) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(addr)) => {
                let mask = prefix_mask_v6(self.prefix_len);
                u128::from(net) & mask == u128::from(addr) & mask
            }
            _ => false,
        }
    }
}

fn prefix_mask_v4(len: u8) -> u32 {
    if len == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(len))
    }
}

fn prefix_mask_v6(len: u8) -> u128 {
    if len == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(len))
    }
}

/// The deployment's view of "who may call restricted endpoints".
#[derive(Debug, Clone, Copy)]
pub struct OriginPolicy {
    /// Address the service itself is deployed on.
    pub server_addr: IpAddr,
    /// Network range allowed through the subnet-only tier.
    pub subnet: Subnet,
}

impl OriginPolicy {
    /// Evaluate `tier` against the caller's peer address.
    ///
    /// Loopback callers always pass the server-only tier: a request from the
    /// host itself may arrive via 127.0.0.1 rather than the deployed address.
    pub fn check(&self, tier: AuthTier, peer: IpAddr) -> Result<(), ApiError> {
        match tier {
            AuthTier::Open => Ok(()),
            AuthTier::ServerOnly => {
                if peer == self.server_addr || peer.is_loopback() {
                    Ok(())
                } else {
                    Err(ApiError::Forbidden(
                        "remote access forbidden; this resource is only available from the server itself"
                            .to_string(),
                    ))
                }
            }
            AuthTier::SubnetOnly => {
                if self.subnet.contains(peer) {
                    Ok(())
                } else {
                    Err(ApiError::Forbidden(
                        "remote access forbidden; this resource is only available from the server subnet"
                            .to_string(),
                    ))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(text: &str) -> IpAddr {
        text.parse().unwrap()
    }

    fn policy(server: &str, subnet: &str) -> OriginPolicy {
        OriginPolicy {
            server_addr: ip(server),
            subnet: subnet.parse().unwrap(),
        }
    }

    #[test]
    fn subnet_parsing_rejects_malformed_text() {
        assert!("10.2.0.0/16".parse::<Subnet>().is_ok());
        assert!("fd00::/8".parse::<Subnet>().is_ok());
        assert!("10.2.0.0".parse::<Subnet>().is_err());
        assert!("10.2.0.0/33".parse::<Subnet>().is_err());
        assert!("banana/8".parse::<Subnet>().is_err());
    }

    #[test]
    fn subnet_containment() {
        let net: Subnet = "10.2.0.0/16".parse().unwrap();
        assert!(net.contains(ip("10.2.44.9")));
        assert!(!net.contains(ip("10.3.0.1")));
        assert!(!net.contains(ip("fd00::1")));

        let all: Subnet = "0.0.0.0/0".parse().unwrap();
        assert!(all.contains(ip("203.0.113.7")));
    }

    #[test]
    fn server_only_allows_server_and_loopback() {
        let policy = policy("10.2.0.5", "10.2.0.0/16");
        assert!(policy.check(AuthTier::ServerOnly, ip("10.2.0.5")).is_ok());
        assert!(policy.check(AuthTier::ServerOnly, ip("127.0.0.1")).is_ok());

        let err = policy
            .check(AuthTier::ServerOnly, ip("10.2.0.6"))
            .unwrap_err();
        assert_eq!(err.kind(), "forbidden");
    }

    #[test]
    fn subnet_only_checks_range() {
        let policy = policy("10.2.0.5", "10.2.0.0/16");
        assert!(policy.check(AuthTier::SubnetOnly, ip("10.2.99.1")).is_ok());
        assert!(policy.check(AuthTier::SubnetOnly, ip("192.168.1.1")).is_err());
    }

    #[test]
    fn open_tier_admits_anyone() {
        let policy = policy("10.2.0.5", "10.2.0.0/16");
        assert!(policy.check(AuthTier::Open, ip("198.51.100.20")).is_ok());
    }
}
