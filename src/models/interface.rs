//! Interface addresses: an address plus the length of the network it lives in.

use super::address::Address;
use super::family::{mask_bits, wildcard_bits, Family, V4, V6};
use super::network::{check_length, split_cidr, Network};
use crate::error::NetError;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// IPv4 interface address.
pub type Ipv4Interface = InterfaceAddress<V4>;
/// IPv6 interface address.
pub type Ipv6Interface = InterfaceAddress<V6>;

/// An address with a prefix length. Unlike [`Network`], host bits are kept.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceAddress<F: Family> {
    address: Address<F>,
    length: u8,
}

impl<F: Family> InterfaceAddress<F> {
    pub fn new(address: Address<F>, length: u8) -> Result<Self, NetError> {
        let length = check_length::<F>(u32::from(length))?;
        Ok(InterfaceAddress { address, length })
    }

    pub(crate) fn clipped(address: Address<F>, length: u8) -> Self {
        InterfaceAddress {
            address,
            length: length.min(F::MAX_LENGTH),
        }
    }

    pub fn address(&self) -> Address<F> {
        self.address
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn mask(&self) -> u128 {
        mask_bits::<F>(self.length)
    }

    pub fn wildcard(&self) -> u128 {
        wildcard_bits::<F>(self.length)
    }

    pub fn mask_hex(&self) -> String {
        self.network().mask_hex()
    }

    pub fn wildcard_hex(&self) -> String {
        self.network().wildcard_hex()
    }

    /// The network containing the interface address.
    pub fn network(&self) -> Network<F> {
        Network::clipped(self.address, self.length)
    }

    /// The host part of the address (the NIC id in IPv6 terms).
    pub fn nic_id(&self) -> u128 {
        self.address.to_bits() & self.wildcard()
    }

    /// True if `addr` is on the same network as the interface.
    pub fn includes(&self, addr: Address<F>) -> bool {
        self.network().includes(addr)
    }
}

impl<F: Family> FromStr for InterfaceAddress<F> {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (address, length) = split_cidr::<F>(s)?;
        Ok(InterfaceAddress { address, length })
    }
}

impl<F: Family> fmt::Display for InterfaceAddress<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.address, self.length)
    }
}

impl<F: Family> fmt::Debug for InterfaceAddress<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}IfAddr:{}>", F::NAME, self)
    }
}

impl<F: Family> Serialize for InterfaceAddress<F> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de, F: Family> Deserialize<'de> for InterfaceAddress<F> {
    fn deserialize<D>(deserializer: D) -> Result<InterfaceAddress<F>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<InterfaceAddress<F>>().map_err(de::Error::custom)
    }
}
