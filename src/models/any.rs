//! Family-dispatching wrappers.
//!
//! [`IpAddress`], [`IpNetwork`] and [`IpInterface`] hold a value of either family.
//! Parsing tries the IPv6 grammar first and falls back to IPv4. Operations
//! between the two families fail with [`NetError::FamilyMismatch`].

use super::address::Address;
use super::family::{Family, V4, V6};
use super::interface::InterfaceAddress;
use super::network::{Network, ToNetwork};
use crate::error::NetError;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

fn mismatch<A: Family, B: Family>() -> NetError {
    NetError::FamilyMismatch {
        expected: A::NAME,
        found: B::NAME,
    }
}

/// Parse with the IPv6 grammar, then IPv4.
fn parse_either<T6, T4, R>(
    s: &str,
    v6: impl FnOnce(T6) -> R,
    v4: impl FnOnce(T4) -> R,
) -> Result<R, NetError>
where
    T6: FromStr<Err = NetError>,
    T4: FromStr<Err = NetError>,
{
    match s.parse::<T6>() {
        Ok(x) => Ok(v6(x)),
        Err(NetError::FormatNotRecognized { .. }) => s.parse::<T4>().map(v4),
        Err(e) => Err(e),
    }
}

/// An address of either family.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum IpAddress {
    V4(Address<V4>),
    V6(Address<V6>),
}

impl IpAddress {
    pub fn family_name(&self) -> &'static str {
        match self {
            IpAddress::V4(_) => V4::NAME,
            IpAddress::V6(_) => V6::NAME,
        }
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(self, IpAddress::V4(_))
    }

    pub fn is_ipv6(&self) -> bool {
        matches!(self, IpAddress::V6(_))
    }
}

impl FromStr for IpAddress {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_either(s, IpAddress::V6, IpAddress::V4)
    }
}

impl fmt::Display for IpAddress {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IpAddress::V4(a) => write!(f, "{a}"),
            IpAddress::V6(a) => write!(f, "{a}"),
        }
    }
}

impl From<Address<V4>> for IpAddress {
    fn from(a: Address<V4>) -> Self {
        IpAddress::V4(a)
    }
}

impl From<Address<V6>> for IpAddress {
    fn from(a: Address<V6>) -> Self {
        IpAddress::V6(a)
    }
}

/// A network of either family.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum IpNetwork {
    V4(Network<V4>),
    V6(Network<V6>),
}

impl IpNetwork {
    pub fn family_name(&self) -> &'static str {
        match self {
            IpNetwork::V4(_) => V4::NAME,
            IpNetwork::V6(_) => V6::NAME,
        }
    }

    pub fn is_ipv4(&self) -> bool {
        matches!(self, IpNetwork::V4(_))
    }

    pub fn is_ipv6(&self) -> bool {
        matches!(self, IpNetwork::V6(_))
    }

    pub fn is_unicast(&self) -> bool {
        match self {
            IpNetwork::V4(n) => n.is_unicast(),
            IpNetwork::V6(n) => n.is_unicast(),
        }
    }

    pub fn is_multicast(&self) -> bool {
        match self {
            IpNetwork::V4(n) => n.is_multicast(),
            IpNetwork::V6(n) => n.is_multicast(),
        }
    }

    pub fn length(&self) -> u8 {
        match self {
            IpNetwork::V4(n) => n.length(),
            IpNetwork::V6(n) => n.length(),
        }
    }

    pub fn max_length(&self) -> u8 {
        match self {
            IpNetwork::V4(n) => n.max_length(),
            IpNetwork::V6(n) => n.max_length(),
        }
    }

    /// True if `addr` is in the network; errors when families differ.
    pub fn includes(&self, addr: &IpAddress) -> Result<bool, NetError> {
        match (self, addr) {
            (IpNetwork::V4(n), IpAddress::V4(a)) => Ok(n.includes(*a)),
            (IpNetwork::V6(n), IpAddress::V6(a)) => Ok(n.includes(*a)),
            (IpNetwork::V4(_), IpAddress::V6(_)) => Err(mismatch::<V4, V6>()),
            (IpNetwork::V6(_), IpAddress::V4(_)) => Err(mismatch::<V6, V4>()),
        }
    }

    /// Apply a same-family relation, erroring when families differ.
    fn relate(
        &self,
        other: &IpNetwork,
        v4: impl FnOnce(&Network<V4>, &Network<V4>) -> bool,
        v6: impl FnOnce(&Network<V6>, &Network<V6>) -> bool,
    ) -> Result<bool, NetError> {
        match (self, other) {
            (IpNetwork::V4(a), IpNetwork::V4(b)) => Ok(v4(a, b)),
            (IpNetwork::V6(a), IpNetwork::V6(b)) => Ok(v6(a, b)),
            (IpNetwork::V4(_), IpNetwork::V6(_)) => Err(mismatch::<V4, V6>()),
            (IpNetwork::V6(_), IpNetwork::V4(_)) => Err(mismatch::<V6, V4>()),
        }
    }

    pub fn overlaps(&self, other: &IpNetwork) -> Result<bool, NetError> {
        self.relate(other, |a, b| a.overlaps(b), |a, b| a.overlaps(b))
    }

    pub fn is_subnet_of(&self, other: &IpNetwork) -> Result<bool, NetError> {
        self.relate(other, |a, b| a.is_subnet_of(b), |a, b| a.is_subnet_of(b))
    }

    pub fn is_strict_subnet_of(&self, other: &IpNetwork) -> Result<bool, NetError> {
        self.relate(
            other,
            |a, b| a.is_strict_subnet_of(b),
            |a, b| a.is_strict_subnet_of(b),
        )
    }

    pub fn is_supernet_of(&self, other: &IpNetwork) -> Result<bool, NetError> {
        self.relate(other, |a, b| a.is_supernet_of(b), |a, b| a.is_supernet_of(b))
    }
}

impl FromStr for IpNetwork {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_either(s, IpNetwork::V6, IpNetwork::V4)
    }
}

impl fmt::Display for IpNetwork {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IpNetwork::V4(n) => write!(f, "{n}"),
            IpNetwork::V6(n) => write!(f, "{n}"),
        }
    }
}

impl Serialize for IpNetwork {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for IpNetwork {
    fn deserialize<D>(deserializer: D) -> Result<IpNetwork, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<IpNetwork>().map_err(de::Error::custom)
    }
}

impl From<Network<V4>> for IpNetwork {
    fn from(n: Network<V4>) -> Self {
        IpNetwork::V4(n)
    }
}

impl From<Network<V6>> for IpNetwork {
    fn from(n: Network<V6>) -> Self {
        IpNetwork::V6(n)
    }
}

impl TryFrom<IpNetwork> for Network<V4> {
    type Error = NetError;

    fn try_from(n: IpNetwork) -> Result<Self, Self::Error> {
        match n {
            IpNetwork::V4(n) => Ok(n),
            IpNetwork::V6(_) => Err(mismatch::<V4, V6>()),
        }
    }
}

impl TryFrom<IpNetwork> for Network<V6> {
    type Error = NetError;

    fn try_from(n: IpNetwork) -> Result<Self, Self::Error> {
        match n {
            IpNetwork::V6(n) => Ok(n),
            IpNetwork::V4(_) => Err(mismatch::<V6, V4>()),
        }
    }
}

impl ToNetwork<V4> for IpNetwork {
    fn to_network(self) -> Result<Network<V4>, NetError> {
        self.try_into()
    }
}

impl ToNetwork<V6> for IpNetwork {
    fn to_network(self) -> Result<Network<V6>, NetError> {
        self.try_into()
    }
}

/// An interface address of either family.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum IpInterface {
    V4(InterfaceAddress<V4>),
    V6(InterfaceAddress<V6>),
}

impl IpInterface {
    pub fn address(&self) -> IpAddress {
        match self {
            IpInterface::V4(i) => IpAddress::V4(i.address()),
            IpInterface::V6(i) => IpAddress::V6(i.address()),
        }
    }

    pub fn network(&self) -> IpNetwork {
        match self {
            IpInterface::V4(i) => IpNetwork::V4(i.network()),
            IpInterface::V6(i) => IpNetwork::V6(i.network()),
        }
    }
}

impl FromStr for IpInterface {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_either(s, IpInterface::V6, IpInterface::V4)
    }
}

impl fmt::Display for IpInterface {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IpInterface::V4(i) => write!(f, "{i}"),
            IpInterface::V6(i) => write!(f, "{i}"),
        }
    }
}
