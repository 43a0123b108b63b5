//! A subnet tree whose family is picked at runtime from its root network.

use super::subnet_tree::SubnetTree;
use crate::error::NetError;
use crate::models::{Address, Family, IpAddress, IpNetwork, Network, V4, V6};
use std::fmt;
use std::ops::RangeInclusive;

/// A tree node found by [`AnySubnetTree::find`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoundNode {
    pub network: IpNetwork,
    pub used: bool,
}

/// An IPv4 or IPv6 [`SubnetTree`].
///
/// Networks of the other family are rejected with
/// [`NetError::FamilyMismatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnySubnetTree {
    V4(SubnetTree<V4>),
    V6(SubnetTree<V6>),
}

impl Default for AnySubnetTree {
    /// The whole IPv6 space.
    fn default() -> Self {
        AnySubnetTree::V6(SubnetTree::default())
    }
}

fn to_any<F: Family>(nets: Vec<Network<F>>) -> Vec<IpNetwork>
where
    IpNetwork: From<Network<F>>,
{
    nets.into_iter().map(IpNetwork::from).collect()
}

fn narrow_range<F: Family>(
    range: &RangeInclusive<IpAddress>,
    pick: impl Fn(IpAddress) -> Option<Address<F>>,
) -> Result<RangeInclusive<Address<F>>, NetError> {
    match (pick(*range.start()), pick(*range.end())) {
        (Some(start), Some(end)) => Ok(start..=end),
        _ => Err(NetError::FamilyMismatch {
            expected: F::NAME,
            found: if range.start().is_ipv4() { V4::NAME } else { V6::NAME },
        }),
    }
}

impl AnySubnetTree {
    /// Create a tree rooted at `root`, e.g. `"10.0.0.0/8"` or `"2a02::/16"`.
    pub fn new(root: &str) -> Result<Self, NetError> {
        Ok(match root.parse::<IpNetwork>()? {
            IpNetwork::V4(n) => AnySubnetTree::V4(SubnetTree::new(n)),
            IpNetwork::V6(n) => AnySubnetTree::V6(SubnetTree::new(n)),
        })
    }

    pub fn network(&self) -> IpNetwork {
        match self {
            AnySubnetTree::V4(t) => IpNetwork::V4(*t.network()),
            AnySubnetTree::V6(t) => IpNetwork::V6(*t.network()),
        }
    }

    pub fn max_length(&self) -> u8 {
        self.network().max_length()
    }

    /// Add a network given as string or [`IpNetwork`].
    pub fn add(&mut self, net: &str) -> Result<(), NetError> {
        let net: IpNetwork = net.parse()?;
        self.add_network(net)
    }

    pub fn add_network(&mut self, net: IpNetwork) -> Result<(), NetError> {
        match self {
            AnySubnetTree::V4(t) => t.add(net),
            AnySubnetTree::V6(t) => t.add(net),
        }
    }

    /// Add networks one by one. A failure leaves the earlier ones in place.
    pub fn add_all<'a, I>(&mut self, nets: I) -> Result<(), NetError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for net in nets {
            self.add(net)?;
        }
        Ok(())
    }

    pub fn networks(&self) -> Vec<IpNetwork> {
        match self {
            AnySubnetTree::V4(t) => to_any(t.networks()),
            AnySubnetTree::V6(t) => to_any(t.networks()),
        }
    }

    pub fn free_space(&self, max_length: u8) -> Vec<IpNetwork> {
        match self {
            AnySubnetTree::V4(t) => to_any(t.free_space(max_length)),
            AnySubnetTree::V6(t) => to_any(t.free_space(max_length)),
        }
    }

    pub fn pick_free(
        &self,
        length: u8,
        range: Option<&RangeInclusive<IpAddress>>,
    ) -> Result<Option<IpNetwork>, NetError> {
        match self {
            AnySubnetTree::V4(t) => {
                let range = range
                    .map(|r| {
                        narrow_range(r, |a| match a {
                            IpAddress::V4(a) => Some(a),
                            IpAddress::V6(_) => None,
                        })
                    })
                    .transpose()?;
                Ok(t.pick_free(length, range.as_ref())?.map(IpNetwork::V4))
            }
            AnySubnetTree::V6(t) => {
                let range = range
                    .map(|r| {
                        narrow_range(r, |a| match a {
                            IpAddress::V6(a) => Some(a),
                            IpAddress::V4(_) => None,
                        })
                    })
                    .transpose()?;
                Ok(t.pick_free(length, range.as_ref())?.map(IpNetwork::V6))
            }
        }
    }

    pub fn find(&self, net: &str) -> Result<Option<FoundNode>, NetError> {
        let net: IpNetwork = net.parse()?;
        Ok(match self {
            AnySubnetTree::V4(t) => t.find(net)?.map(|n| FoundNode {
                network: IpNetwork::V4(*n.network()),
                used: n.is_used(),
            }),
            AnySubnetTree::V6(t) => t.find(net)?.map(|n| FoundNode {
                network: IpNetwork::V6(*n.network()),
                used: n.is_used(),
            }),
        })
    }

    pub fn summarize(&mut self) -> Result<(), NetError> {
        match self {
            AnySubnetTree::V4(t) => t.summarize(),
            AnySubnetTree::V6(t) => t.summarize(),
        }
    }
}

impl fmt::Display for AnySubnetTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnySubnetTree::V4(t) => write!(f, "{t}"),
            AnySubnetTree::V6(t) => write!(f, "{t}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_from_root() {
        assert!(matches!(
            AnySubnetTree::new("10.0.0.0/8"),
            Ok(AnySubnetTree::V4(_))
        ));
        assert!(matches!(
            AnySubnetTree::new("2a02::/16"),
            Ok(AnySubnetTree::V6(_))
        ));
        assert_eq!(AnySubnetTree::default().network().to_string(), "::/0");
        assert!(AnySubnetTree::new("10.0.0.0").is_err());
    }

    #[test]
    fn test_add_other_family_fails() {
        let mut t = AnySubnetTree::new("10.0.0.0/8").unwrap();
        assert_eq!(
            t.add("2a02:20::/32"),
            Err(NetError::FamilyMismatch {
                expected: "IPv4",
                found: "IPv6"
            })
        );
        t.add("10.1.0.0/16").unwrap();
        assert_eq!(t.networks(), vec!["10.1.0.0/16".parse::<IpNetwork>().unwrap()]);
    }

    #[test]
    fn test_find_v6() {
        let mut t = AnySubnetTree::default();
        t.add_all(["2a02:20::/32"]).unwrap();
        let found = t.find("2a02:20::/32").unwrap().unwrap();
        assert!(found.used);
        assert_eq!(t.find("2a02:21::/32").unwrap(), None);
        assert!(t.find("10.0.0.0/8").is_err());
    }

    #[test]
    fn test_pick_free_with_range() {
        let mut t = AnySubnetTree::new("10.0.0.0/8").unwrap();
        t.add_all(["10.0.0.0/24", "10.1.0.0/16"]).unwrap();

        let range: RangeInclusive<IpAddress> =
            "10.1.0.0".parse().unwrap()..="10.3.255.255".parse().unwrap();
        assert_eq!(
            t.pick_free(24, Some(&range)).unwrap(),
            Some("10.2.0.0/24".parse().unwrap())
        );

        let range: RangeInclusive<IpAddress> = "::".parse().unwrap()..="::ff".parse().unwrap();
        assert!(t.pick_free(24, Some(&range)).is_err());
    }

    #[test]
    fn test_free_space_and_summarize() {
        let mut t = AnySubnetTree::new("192.168.0.0/23").unwrap();
        t.add("192.168.0.0/24").unwrap();
        assert_eq!(t.free_space(32), vec!["192.168.1.0/24".parse::<IpNetwork>().unwrap()]);
        assert!(t.summarize().is_err());
        assert_eq!(t.to_string(), "192.168.0.0/24 *\n");
        assert_eq!(t.max_length(), 32);
    }
}
