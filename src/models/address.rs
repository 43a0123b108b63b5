//! Fixed-width IP addresses.
//!
//! Provides [`Address`], an immutable address value of a given [`Family`], along
//! with the bitwise and arithmetic operations networks are built from.

use super::family::{Family, V4, V6};
use super::network::Network;
use crate::error::NetError;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::net::{Ipv4Addr, Ipv6Addr};
use std::ops::{Add, BitAnd, BitOr, Sub};
use std::str::FromStr;

/// IPv4 address.
pub type Ipv4Address = Address<V4>;
/// IPv6 address.
pub type Ipv6Address = Address<V6>;

/// An IP address of family `F`, ordered and hashed by its integer value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address<F: Family> {
    bits: u128,
    family: PhantomData<F>,
}

impl<F: Family> Address<F> {
    /// Build an address from its host byte-order integer value.
    ///
    /// Bits above the family width are dropped.
    pub fn from_bits(bits: u128) -> Self {
        Address {
            bits: bits & F::full_mask(),
            family: PhantomData,
        }
    }

    /// The integer value of the address.
    pub fn to_bits(self) -> u128 {
        self.bits
    }

    /// The next address. Wraps at the end of the address space.
    pub fn succ(self) -> Self {
        self + 1
    }

    /// Bitwise and with `mask`, e.g. a network mask.
    pub fn mask(self, mask: u128) -> Self {
        self & mask
    }

    /// True if `network` contains this address.
    pub fn included_in(self, network: &Network<F>) -> bool {
        network.includes(self)
    }
}

/// Sum `n`. No check is made that the result stays in any network.
impl<F: Family> Add<u128> for Address<F> {
    type Output = Address<F>;

    fn add(self, n: u128) -> Address<F> {
        Address::from_bits(self.bits.wrapping_add(n))
    }
}

/// Subtract `n`. No check is made that the result stays in any network.
impl<F: Family> Sub<u128> for Address<F> {
    type Output = Address<F>;

    fn sub(self, n: u128) -> Address<F> {
        Address::from_bits(self.bits.wrapping_sub(n))
    }
}

impl<F: Family> BitAnd<u128> for Address<F> {
    type Output = Address<F>;

    fn bitand(self, mask: u128) -> Address<F> {
        Address::from_bits(self.bits & mask)
    }
}

impl<F: Family> BitOr<u128> for Address<F> {
    type Output = Address<F>;

    fn bitor(self, bits: u128) -> Address<F> {
        Address::from_bits(self.bits | bits)
    }
}

impl<F: Family> FromStr for Address<F> {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        F::parse_bits(s)
            .map(Address::from_bits)
            .ok_or_else(|| NetError::format(s))
    }
}

impl<F: Family> fmt::Display for Address<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        F::fmt_bits(self.bits, f)
    }
}

impl<F: Family> fmt::Debug for Address<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}Addr:{}>", F::NAME, self)
    }
}

impl<F: Family> Serialize for Address<F> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de, F: Family> Deserialize<'de> for Address<F> {
    fn deserialize<D>(deserializer: D) -> Result<Address<F>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Address<F>>().map_err(de::Error::custom)
    }
}

impl From<u32> for Address<V4> {
    fn from(bits: u32) -> Self {
        Address::from_bits(u128::from(bits))
    }
}

impl From<Ipv4Addr> for Address<V4> {
    fn from(addr: Ipv4Addr) -> Self {
        Address::from(u32::from(addr))
    }
}

impl From<Address<V4>> for Ipv4Addr {
    fn from(addr: Address<V4>) -> Self {
        Ipv4Addr::from(addr.bits as u32)
    }
}

impl From<u128> for Address<V6> {
    fn from(bits: u128) -> Self {
        Address::from_bits(bits)
    }
}

impl From<Ipv6Addr> for Address<V6> {
    fn from(addr: Ipv6Addr) -> Self {
        Address::from(u128::from(addr))
    }
}

impl From<Address<V6>> for Ipv6Addr {
    fn from(addr: Address<V6>) -> Self {
        Ipv6Addr::from(addr.bits)
    }
}
