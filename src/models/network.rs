//! IP networks in CIDR notation.
//!
//! Provides [`Network`], a prefix and a prefix length with host bits always
//! cleared, and the containment, ordering and stepping operations the subnet
//! tree is built from.

use super::address::Address;
use super::family::{hex_fields, mask_bits, wildcard_bits, Family, V4, V6};
use super::interface::InterfaceAddress;
use crate::error::NetError;
use lazy_static::lazy_static;
use regex::Regex;
use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, RangeInclusive, Shl, Shr, Sub};
use std::str::FromStr;

/// IPv4 network.
pub type Ipv4Network = Network<V4>;
/// IPv6 network.
pub type Ipv6Network = Network<V6>;

lazy_static! {
    static ref CIDR_RE: Regex = Regex::new(r"^(.+)/(0|[1-9][0-9]*)$").expect("Invalid Regex?");
}

/// Split `address/length`, validating the length against the family width.
pub(crate) fn split_cidr<F: Family>(input: &str) -> Result<(Address<F>, u8), NetError> {
    let caps = CIDR_RE
        .captures(input)
        .ok_or_else(|| NetError::format(input))?;
    let addr: Address<F> = caps[1].parse().map_err(|_| NetError::format(input))?;
    let length: u32 = caps[2].parse().map_err(|_| NetError::format(input))?;
    Ok((addr, check_length::<F>(length)?))
}

/// Reject lengths outside `[0, F::MAX_LENGTH]`.
pub(crate) fn check_length<F: Family>(length: u32) -> Result<u8, NetError> {
    if length > u32::from(F::MAX_LENGTH) {
        Err(NetError::InvalidAddress {
            length,
            max_length: F::MAX_LENGTH,
        })
    } else {
        Ok(length as u8)
    }
}

/// Structured form of a network, `{prefix, length}` with the prefix as integer.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkDump {
    pub prefix: u128,
    pub length: u8,
}

/// An IP network of family `F`.
///
/// Ordering is by size first: a bigger network (shorter prefix length) is
/// greater than a smaller one, and equal-size networks are ordered by prefix.
/// Sorting ascending therefore lists the smallest blocks first.
///
/// The subnet relations are explicit methods, not the comparison operators:
/// `a.is_strict_subnet_of(&b)` reads as "a is inside b and smaller than b".
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Network<F: Family> {
    prefix: Address<F>,
    length: u8,
}

impl<F: Family> Network<F> {
    /// Create a network. Host bits of `prefix` are cleared.
    pub fn new(prefix: Address<F>, length: u8) -> Result<Self, NetError> {
        let length = check_length::<F>(u32::from(length))?;
        Ok(Self::clipped(prefix, length))
    }

    /// A full length (single address) network from an integer.
    pub fn from_bits(bits: u128) -> Self {
        Self::from(Address::from_bits(bits))
    }

    /// Build a network whose length is clamped to the family width.
    pub(crate) fn clipped(prefix: Address<F>, length: u8) -> Self {
        let length = length.min(F::MAX_LENGTH);
        Network {
            prefix: prefix.mask(mask_bits::<F>(length)),
            length,
        }
    }

    pub fn prefix(&self) -> Address<F> {
        self.prefix
    }

    pub fn length(&self) -> u8 {
        self.length
    }

    pub fn max_length(&self) -> u8 {
        F::MAX_LENGTH
    }

    /// The network mask as integer.
    pub fn mask(&self) -> u128 {
        mask_bits::<F>(self.length)
    }

    /// The wildcard (host bits) as integer.
    pub fn wildcard(&self) -> u128 {
        wildcard_bits::<F>(self.length)
    }

    pub fn first_ip(&self) -> Address<F> {
        self.prefix
    }

    pub fn last_ip(&self) -> Address<F> {
        self.prefix | self.wildcard()
    }

    /// All addresses of the network, network and broadcast included.
    pub fn addresses(&self) -> RangeInclusive<Address<F>> {
        self.first_ip()..=self.last_ip()
    }

    /// Number of addresses, `None` for the whole IPv6 space.
    pub fn num_addresses(&self) -> Option<u128> {
        self.wildcard().checked_add(1)
    }

    /// The mask as 16-bit hex fields, e.g. `ffff:ff00`.
    pub fn mask_hex(&self) -> String {
        hex_fields::<F>(self.mask())
    }

    pub fn wildcard_hex(&self) -> String {
        hex_fields::<F>(self.wildcard())
    }

    /// First usable host. For IPv4 the network address is skipped below /31.
    pub fn first_host(&self) -> Address<F> {
        if self.has_reserved_ends() {
            self.first_ip().succ()
        } else {
            self.first_ip()
        }
    }

    /// Last usable host. For IPv4 the broadcast address is skipped below /31.
    pub fn last_host(&self) -> Address<F> {
        if self.has_reserved_ends() {
            self.last_ip() - 1
        } else {
            self.last_ip()
        }
    }

    pub fn hosts(&self) -> RangeInclusive<Address<F>> {
        self.first_host()..=self.last_host()
    }

    fn has_reserved_ends(&self) -> bool {
        F::RESERVED_ENDS && self.length + 1 < F::MAX_LENGTH
    }

    /// True if no address of the network is multicast or reserved.
    pub fn is_unicast(&self) -> bool {
        let (prefix, length) = F::NON_UNICAST;
        !self.overlaps(&Self::clipped(Address::from_bits(prefix), length))
    }

    /// True if the whole network is in the multicast block.
    pub fn is_multicast(&self) -> bool {
        let (prefix, length) = F::MULTICAST;
        self.is_subnet_of(&Self::clipped(Address::from_bits(prefix), length))
    }

    /// Same length, new prefix. Host bits are cleared.
    pub fn with_prefix(&self, prefix: Address<F>) -> Self {
        Self::clipped(prefix, self.length)
    }

    /// Same prefix, new length. Host bits are cleared.
    pub fn with_length(&self, length: u8) -> Result<Self, NetError> {
        Self::new(self.prefix, length)
    }

    /// True if `addr` belongs to this network.
    pub fn includes(&self, addr: Address<F>) -> bool {
        (addr & self.mask()) == self.prefix
    }

    /// `self < other`: contained in `other` and not coincident with it.
    pub fn is_strict_subnet_of(&self, other: &Network<F>) -> bool {
        self.length > other.length && (self.prefix & other.mask()) == other.prefix
    }

    /// `self <= other`: contained in `other`.
    pub fn is_subnet_of(&self, other: &Network<F>) -> bool {
        self.length >= other.length && (self.prefix & other.mask()) == other.prefix
    }

    /// `self > other`: contains `other` and is not coincident with it.
    pub fn is_strict_supernet_of(&self, other: &Network<F>) -> bool {
        self.length < other.length && (other.prefix & self.mask()) == self.prefix
    }

    /// `self >= other`: contains `other`.
    pub fn is_supernet_of(&self, other: &Network<F>) -> bool {
        self.length <= other.length && (other.prefix & self.mask()) == self.prefix
    }

    /// True if `range` covers this network and neither range end coincides with
    /// the network's first or last address.
    pub fn is_strictly_within(&self, range: &RangeInclusive<Address<F>>) -> bool {
        self.is_within(range)
            && *range.start() != self.first_ip()
            && *range.end() != self.last_ip()
    }

    /// True if `range` covers this network.
    pub fn is_within(&self, range: &RangeInclusive<Address<F>>) -> bool {
        range.contains(&self.first_ip()) && range.contains(&self.last_ip())
    }

    /// True if this network covers `range` and neither range end coincides with
    /// the network's first or last address.
    pub fn strictly_contains_range(&self, range: &RangeInclusive<Address<F>>) -> bool {
        self.contains_range(range)
            && *range.start() != self.first_ip()
            && *range.end() != self.last_ip()
    }

    /// True if this network covers `range`.
    pub fn contains_range(&self, range: &RangeInclusive<Address<F>>) -> bool {
        self.includes(*range.start()) && self.includes(*range.end())
    }

    /// True if one network contains the other.
    pub fn overlaps(&self, other: &Network<F>) -> bool {
        self.is_subnet_of(other) || self.is_supernet_of(other)
    }

    /// A network `n` bits bigger with the same prefix, host bits cleared.
    pub fn enlarge(&self, n: u8) -> Self {
        Self::clipped(self.prefix, self.length.saturating_sub(n))
    }

    /// A network `n` bits smaller with the same prefix.
    pub fn shrink(&self, n: u8) -> Self {
        Self::clipped(self.prefix, self.length.saturating_add(n))
    }

    /// The next contiguous network of the same size. Wraps at the end of the
    /// address space.
    pub fn succ(&self) -> Self {
        Self::clipped(self.prefix + self.wildcard().wrapping_add(1), self.length)
    }

    /// The `{prefix, length}` form of the network.
    pub fn to_dump(&self) -> NetworkDump {
        NetworkDump {
            prefix: self.prefix.to_bits(),
            length: self.length,
        }
    }
}

impl<F: Family> TryFrom<NetworkDump> for Network<F> {
    type Error = NetError;

    fn try_from(dump: NetworkDump) -> Result<Self, Self::Error> {
        if dump.prefix & !F::full_mask() != 0 {
            return Err(NetError::format(&format!("{dump:?}")));
        }
        Network::new(Address::from_bits(dump.prefix), dump.length)
    }
}

impl<F: Family> From<Address<F>> for Network<F> {
    fn from(addr: Address<F>) -> Self {
        Network {
            prefix: addr,
            length: F::MAX_LENGTH,
        }
    }
}

impl<F: Family> Ord for Network<F> {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .length
            .cmp(&self.length)
            .then_with(|| self.prefix.cmp(&other.prefix))
    }
}

impl<F: Family> PartialOrd for Network<F> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// `net << n` is [`Network::enlarge`].
impl<F: Family> Shl<u8> for Network<F> {
    type Output = Network<F>;

    fn shl(self, n: u8) -> Network<F> {
        self.enlarge(n)
    }
}

/// `net >> n` is [`Network::shrink`].
impl<F: Family> Shr<u8> for Network<F> {
    type Output = Network<F>;

    fn shr(self, n: u8) -> Network<F> {
        self.shrink(n)
    }
}

/// `net + n` is the interface address `n` hosts into the network, keeping the
/// network length. Unlike `-`, the result carries a length.
impl<F: Family> Add<u128> for Network<F> {
    type Output = InterfaceAddress<F>;

    fn add(self, n: u128) -> InterfaceAddress<F> {
        InterfaceAddress::clipped(self.prefix + n, self.length)
    }
}

/// `net - n` is the plain address `n` below the prefix.
impl<F: Family> Sub<u128> for Network<F> {
    type Output = Address<F>;

    fn sub(self, n: u128) -> Address<F> {
        self.prefix - n
    }
}

impl<F: Family> FromStr for Network<F> {
    type Err = NetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (prefix, length) = split_cidr::<F>(s)?;
        Ok(Self::clipped(prefix, length))
    }
}

impl<F: Family> fmt::Display for Network<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.prefix, self.length)
    }
}

impl<F: Family> fmt::Debug for Network<F> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "<{}Net:{}>", F::NAME, self)
    }
}

impl<F: Family> Serialize for Network<F> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de, F: Family> Deserialize<'de> for Network<F> {
    fn deserialize<D>(deserializer: D) -> Result<Network<F>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse::<Network<F>>()
            .map_err(|e| de::Error::custom(format!("invalid CIDR format: {e}")))
    }
}

/// Conversion into a network of family `F`, failing on malformed input or on a
/// family mismatch.
pub trait ToNetwork<F: Family> {
    fn to_network(self) -> Result<Network<F>, NetError>;
}

impl<F: Family> ToNetwork<F> for Network<F> {
    fn to_network(self) -> Result<Network<F>, NetError> {
        Ok(self)
    }
}

impl<F: Family> ToNetwork<F> for &Network<F> {
    fn to_network(self) -> Result<Network<F>, NetError> {
        Ok(*self)
    }
}

impl<F: Family> ToNetwork<F> for Address<F> {
    fn to_network(self) -> Result<Network<F>, NetError> {
        Ok(Network::from(self))
    }
}

impl<F: Family> ToNetwork<F> for &str {
    fn to_network(self) -> Result<Network<F>, NetError> {
        self.parse()
    }
}

impl<F: Family> ToNetwork<F> for &String {
    fn to_network(self) -> Result<Network<F>, NetError> {
        self.parse()
    }
}
