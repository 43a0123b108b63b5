//! Error types for address parsing, network arithmetic and subnet trees.

use thiserror::Error;

/// Error type for all library operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetError {
    /// The input string does not match the family's canonical grammar.
    #[error("{input:?}: Format not recognized")]
    FormatNotRecognized {
        /// The rejected input
        input: String,
    },

    /// Prefix length outside `[0, max_length]`.
    #[error("Length {length} greater than {max_length}")]
    InvalidAddress {
        /// The rejected length
        length: u32,
        /// Width of the address family
        max_length: u8,
    },

    /// The exact network is already marked as used in the tree.
    #[error("Network {network} already present in tree")]
    NetworkAlreadyPresent {
        /// The duplicate network
        network: String,
    },

    /// The network is not a strict subnet of the node it was added to.
    #[error("Network {network} not contained in {container}")]
    NetworkNotContained {
        /// The rejected network
        network: String,
        /// The node network it should have been below
        container: String,
    },

    /// An IPv4 value was combined with an IPv6 value.
    #[error("Address family mismatch: {expected} expected, got {found}")]
    FamilyMismatch {
        /// Family of the receiving value
        expected: &'static str,
        /// Family of the argument
        found: &'static str,
    },

    /// The operation is deliberately left unimplemented.
    #[error("{0}: to be implemented")]
    NotImplemented(&'static str),
}

impl NetError {
    pub(crate) fn format(input: &str) -> Self {
        NetError::FormatNotRecognized {
            input: input.to_string(),
        }
    }
}
