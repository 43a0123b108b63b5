//! Allocation report.
//!
//! Lists used networks next to the free blocks between them, in address order.

use crate::models::{Address, Family, IpAddress, IpNetwork, Network};
use crate::tree::{AnySubnetTree, SubnetTree};
use itertools::Itertools;
use std::fmt;

/// Whether a report row is an allocated network or free space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocationState {
    Used,
    Free,
}

impl fmt::Display for AllocationState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AllocationState::Used => write!(f, "used"),
            AllocationState::Free => write!(f, "free"),
        }
    }
}

/// Represents a row of the allocation report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRow {
    /// Network in CIDR notation.
    pub network: IpNetwork,
    pub state: AllocationState,
    /// First address of the network.
    pub first: IpAddress,
    /// Last address of the network.
    pub last: IpAddress,
    /// Number of addresses, `None` when it does not fit in a u128 (`::/0`).
    pub size: Option<u128>,
}

impl AllocationRow {
    fn new<F: Family>(network: Network<F>, state: AllocationState) -> Self
    where
        IpNetwork: From<Network<F>>,
        IpAddress: From<Address<F>>,
    {
        AllocationRow {
            network: network.into(),
            state,
            first: network.first_ip().into(),
            last: network.last_ip().into(),
            size: network.num_addresses(),
        }
    }

    /// The size as text, `2^128` when it overflows.
    pub fn size_str(&self) -> String {
        match self.size {
            Some(n) => n.to_string(),
            None => "2^128".to_string(),
        }
    }
}

/// Used networks and free space of `tree`, free blocks no longer than
/// `max_length`.
///
/// Rows are sorted by first address, the bigger block first when two start
/// at the same address.
pub fn allocation_rows<F: Family>(tree: &SubnetTree<F>, max_length: u8) -> Vec<AllocationRow>
where
    IpNetwork: From<Network<F>>,
    IpAddress: From<Address<F>>,
{
    let used = tree.networks();
    let free = tree.free_space(max_length);
    log::debug!(
        "report on {}: {} used, {} free",
        tree.network(),
        used.len(),
        free.len()
    );

    used.into_iter()
        .map(|n| AllocationRow::new(n, AllocationState::Used))
        .chain(
            free.into_iter()
                .map(|n| AllocationRow::new(n, AllocationState::Free)),
        )
        .sorted_by_key(|row| (row.first, row.network.length()))
        .collect()
}

/// [`allocation_rows`] for a tree of either family.
pub fn any_allocation_rows(tree: &AnySubnetTree, max_length: u8) -> Vec<AllocationRow> {
    match tree {
        AnySubnetTree::V4(t) => allocation_rows(t, max_length),
        AnySubnetTree::V6(t) => allocation_rows(t, max_length),
    }
}
