//! Subnet allocation trees.
//!
//! - [`SubnetTree`] - binary tree of used/free networks of one family
//! - [`AnySubnetTree`] - the same, with the family picked from the root network

mod any;
mod subnet_tree;

pub use any::{AnySubnetTree, FoundNode};
pub use subnet_tree::SubnetTree;
