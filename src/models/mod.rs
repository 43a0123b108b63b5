//! Address value types.
//!
//! This module contains the immutable values the subnet tree is built from:
//! - [`Family`] with the [`V4`] and [`V6`] markers
//! - [`Address`] - a fixed width IP address
//! - [`Network`] - prefix and prefix length, host bits cleared
//! - [`InterfaceAddress`] - address and prefix length, host bits kept
//! - [`IpAddress`], [`IpNetwork`], [`IpInterface`] - either-family wrappers

mod address;
mod any;
mod family;
mod interface;
mod network;

// Re-export public types
pub use address::{Address, Ipv4Address, Ipv6Address};
pub use any::{IpAddress, IpInterface, IpNetwork};
pub use family::{mask_bits, wildcard_bits, Family, V4, V6};
pub use interface::{InterfaceAddress, Ipv4Interface, Ipv6Interface};
pub use network::{Ipv4Network, Ipv6Network, Network, NetworkDump, ToNetwork};
