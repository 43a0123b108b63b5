//! Address families.
//!
//! Every value type in [`crate::models`] is parameterized by a [`Family`] marker,
//! so IPv4 and IPv6 values can never be mixed by accident. Values are stored in a
//! `u128` regardless of family; the family decides the width.

use itertools::Itertools;
use std::fmt;
use std::hash::Hash;
use std::net::{Ipv4Addr, Ipv6Addr};

/// An IP address family with a fixed bit width.
pub trait Family:
    Copy + Clone + fmt::Debug + Default + Eq + Ord + Hash + Send + Sync + 'static
{
    /// Width of an address in bits (32 or 128).
    const MAX_LENGTH: u8;

    /// Human readable family name, used in error messages.
    const NAME: &'static str;

    /// The multicast block as `(prefix bits, length)`.
    const MULTICAST: (u128, u8);

    /// The block from which on addresses are no longer unicast.
    const NON_UNICAST: (u128, u8);

    /// Network and broadcast address are not usable hosts.
    const RESERVED_ENDS: bool;

    /// Parse the canonical textual form of an address.
    fn parse_bits(input: &str) -> Option<u128>;

    /// Write the canonical textual form of an address.
    fn fmt_bits(bits: u128, f: &mut fmt::Formatter<'_>) -> fmt::Result;

    /// All `MAX_LENGTH` bits set.
    fn full_mask() -> u128 {
        if Self::MAX_LENGTH >= 128 {
            u128::MAX
        } else {
            (1u128 << Self::MAX_LENGTH) - 1
        }
    }
}

/// IPv4, 32 bit addresses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct V4;

/// IPv6, 128 bit addresses.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct V6;

impl Family for V4 {
    const MAX_LENGTH: u8 = 32;
    const NAME: &'static str = "IPv4";
    // class D multicast, class E reserved above it
    const MULTICAST: (u128, u8) = (0xe000_0000, 4);
    const NON_UNICAST: (u128, u8) = (0xe000_0000, 3);
    const RESERVED_ENDS: bool = true;

    fn parse_bits(input: &str) -> Option<u128> {
        input.parse::<Ipv4Addr>().ok().map(|a| u32::from(a) as u128)
    }

    fn fmt_bits(bits: u128, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Ipv4Addr::from(bits as u32))
    }
}

impl Family for V6 {
    const MAX_LENGTH: u8 = 128;
    const NAME: &'static str = "IPv6";
    const MULTICAST: (u128, u8) = (0xff << 120, 8);
    const NON_UNICAST: (u128, u8) = (0xff << 120, 8);
    const RESERVED_ENDS: bool = false;

    fn parse_bits(input: &str) -> Option<u128> {
        input.parse::<Ipv6Addr>().ok().map(u128::from)
    }

    fn fmt_bits(bits: u128, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Ipv6Addr::from(bits))
    }
}

/// Mask with the top `length` bits of the family width set.
///
/// `length` is clamped to the family width.
pub fn mask_bits<F: Family>(length: u8) -> u128 {
    F::full_mask() ^ wildcard_bits::<F>(length)
}

/// Complement of [`mask_bits`] within the family width.
pub fn wildcard_bits<F: Family>(length: u8) -> u128 {
    F::full_mask()
        .checked_shr(u32::from(length.min(F::MAX_LENGTH)))
        .unwrap_or(0)
}

/// 16-bit hex fields, zero padded and uncompressed, e.g. `ffff:ff00`.
pub fn hex_fields<F: Family>(bits: u128) -> String {
    (0..F::MAX_LENGTH / 16)
        .rev()
        .map(|i| format!("{:04x}", (bits >> (16 * u32::from(i))) & 0xffff))
        .join(":")
}
