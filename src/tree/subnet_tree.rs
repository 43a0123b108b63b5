//! Binary tree of networks for subnet allocation bookkeeping.
//!
//! Every node stands for exactly one network. Its left child, when present, is
//! the lower half of that network (next prefix bit clear) and its right child
//! the upper half (next prefix bit set). A node is `used` when its exact network
//! has been added; intermediate nodes created on the way down are not.

use crate::error::NetError;
use crate::models::{Address, Family, Network, ToNetwork};
use std::fmt;
use std::ops::RangeInclusive;

/// A subnet tree rooted at one network of family `F`.
///
/// Nodes are only ever added and flipped from unused to used; nothing is
/// removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetTree<F: Family> {
    network: Network<F>,
    used: bool,
    left: Option<Box<SubnetTree<F>>>,
    right: Option<Box<SubnetTree<F>>>,
}

impl<F: Family> Default for SubnetTree<F> {
    /// A tree covering the whole address space of the family.
    fn default() -> Self {
        SubnetTree::new(Network::clipped(Address::default(), 0))
    }
}

impl<F: Family> SubnetTree<F> {
    /// Create a tree with `network` as its (unused) root.
    pub fn new(network: Network<F>) -> Self {
        SubnetTree {
            network,
            used: false,
            left: None,
            right: None,
        }
    }

    /// Create a tree rooted at the first network and add the others.
    ///
    /// Repetitions of the root are skipped. An empty list gives the default
    /// tree.
    pub fn from_networks<I, N>(networks: I) -> Result<Self, NetError>
    where
        I: IntoIterator<Item = N>,
        N: ToNetwork<F>,
    {
        let mut networks = networks.into_iter();
        let mut tree = match networks.next() {
            Some(root) => SubnetTree::new(root.to_network()?),
            None => return Ok(SubnetTree::default()),
        };
        for net in networks {
            let net = net.to_network()?;
            if net != tree.network {
                tree.insert(net)?;
            }
        }
        Ok(tree)
    }

    pub fn network(&self) -> &Network<F> {
        &self.network
    }

    pub fn is_used(&self) -> bool {
        self.used
    }

    pub fn left(&self) -> Option<&SubnetTree<F>> {
        self.left.as_deref()
    }

    pub fn right(&self) -> Option<&SubnetTree<F>> {
        self.right.as_deref()
    }

    /// Mark `net` as used, creating the intermediate nodes down to it.
    ///
    /// Fails with [`NetError::NetworkAlreadyPresent`] when `net` is already used
    /// and with [`NetError::NetworkNotContained`] when it is outside this node.
    pub fn add<N: ToNetwork<F>>(&mut self, net: N) -> Result<(), NetError> {
        self.insert(net.to_network()?)
    }

    /// Add networks one by one. A failure leaves the earlier ones in place.
    pub fn add_all<I, N>(&mut self, networks: I) -> Result<(), NetError>
    where
        I: IntoIterator<Item = N>,
        N: ToNetwork<F>,
    {
        for net in networks {
            self.add(net)?;
        }
        Ok(())
    }

    fn insert(&mut self, net: Network<F>) -> Result<(), NetError> {
        if net == self.network {
            if self.used {
                return Err(NetError::NetworkAlreadyPresent {
                    network: net.to_string(),
                });
            }
            log::debug!("mark {net} used");
            self.used = true;
            return Ok(());
        }

        if !net.is_strict_subnet_of(&self.network) {
            return Err(NetError::NetworkNotContained {
                network: net.to_string(),
                container: self.network.to_string(),
            });
        }

        let child = if self.goes_right(&net) {
            let half = self.right_half();
            self.right.get_or_insert_with(|| {
                log::trace!("create node {half}");
                Box::new(SubnetTree::new(half))
            })
        } else {
            let half = self.left_half();
            self.left.get_or_insert_with(|| {
                log::trace!("create node {half}");
                Box::new(SubnetTree::new(half))
            })
        };
        child.insert(net)
    }

    /// The bit telling the two halves of this node apart.
    ///
    /// Only meaningful below full length.
    fn split_bit(&self) -> u128 {
        1u128 << (F::MAX_LENGTH - (self.network.length() + 1))
    }

    fn goes_right(&self, net: &Network<F>) -> bool {
        net.prefix().to_bits() & self.split_bit() != 0
    }

    fn left_half(&self) -> Network<F> {
        Network::clipped(self.network.prefix(), self.network.length() + 1)
    }

    fn right_half(&self) -> Network<F> {
        Network::clipped(
            self.network.prefix() | self.split_bit(),
            self.network.length() + 1,
        )
    }

    /// All used networks, in pre-order (node, left subtree, right subtree).
    pub fn networks(&self) -> Vec<Network<F>> {
        let mut out = Vec::new();
        self.collect_used(&mut out);
        out
    }

    fn collect_used(&self, out: &mut Vec<Network<F>>) {
        if self.used {
            out.push(self.network);
        }
        if let Some(l) = &self.left {
            l.collect_used(out);
        }
        if let Some(r) = &self.right {
            r.collect_used(out);
        }
    }

    /// The biggest unused networks below this node, none longer than
    /// `max_length`.
    ///
    /// A used node reports nothing, even when networks were added below it.
    pub fn free_space(&self, max_length: u8) -> Vec<Network<F>> {
        let mut out = Vec::new();
        self.collect_free(max_length, &mut out);
        out
    }

    fn collect_free(&self, max_length: u8, out: &mut Vec<Network<F>>) {
        if self.used {
            return;
        }
        if self.left.is_none() && self.right.is_none() {
            out.push(self.network);
            return;
        }
        if self.network.length() >= max_length {
            return;
        }

        match &self.left {
            Some(l) => l.collect_free(max_length, out),
            None => out.push(self.left_half()),
        }
        match &self.right {
            Some(r) => r.collect_free(max_length, out),
            None => out.push(self.right_half()),
        }
    }

    /// Pick a free network of `length`, preferring the smallest free blocks.
    ///
    /// With a `range`, only free space touching it is considered and the
    /// returned network lies entirely inside it.
    pub fn pick_free(
        &self,
        length: u8,
        range: Option<&RangeInclusive<Address<F>>>,
    ) -> Result<Option<Network<F>>, NetError> {
        self.network.with_length(length)?;

        let mut free = self.free_space(length);
        if let Some(range) = range {
            free.retain(|n| n.first_ip() <= *range.end() && n.last_ip() >= *range.start());
        }
        free.sort();

        let Some(head) = free.first() else {
            log::debug!("no free /{length} in {}", self.network);
            return Ok(None);
        };

        let Some(range) = range else {
            return Ok(Some(Network::clipped(head.prefix(), length)));
        };

        for candidate in &free {
            let start = candidate.prefix().max(*range.start());
            let mut net = Network::clipped(start, length);
            if net.first_ip() < *range.start() {
                net = net.succ();
                // wrapped past the end of the address space
                if net.first_ip() < *range.start() {
                    continue;
                }
            }
            if net.last_ip() <= *range.end() {
                return Ok(Some(net));
            }
        }

        log::debug!(
            "no free /{length} in {} between {} and {}",
            self.network,
            range.start(),
            range.end()
        );
        Ok(None)
    }

    /// The node for exactly `net`, if the tree has one (used or not).
    pub fn find<N: ToNetwork<F>>(&self, net: N) -> Result<Option<&SubnetTree<F>>, NetError> {
        let net = net.to_network()?;
        Ok(self.lookup(&net))
    }

    fn lookup(&self, net: &Network<F>) -> Option<&SubnetTree<F>> {
        if *net == self.network {
            return Some(self);
        }
        if !net.is_strict_subnet_of(&self.network) {
            return None;
        }
        let child = if self.goes_right(net) {
            self.right.as_deref()
        } else {
            self.left.as_deref()
        };
        child.and_then(|c| c.lookup(net))
    }

    /// Merge sibling networks. Not implemented.
    pub fn summarize(&mut self) -> Result<(), NetError> {
        Err(NetError::NotImplemented("summarize"))
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let mut indent = indent;
        if self.used {
            writeln!(f, "{:indent$}{} *", "", self.network)?;
            indent += 2;
        }
        if let Some(l) = &self.left {
            l.write_indented(f, indent)?;
        }
        if let Some(r) = &self.right {
            r.write_indented(f, indent)?;
        }
        Ok(())
    }
}

/// One line per used network, indented below the used network containing it.
impl<F: Family> fmt::Display for SubnetTree<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Ipv4Network, Ipv6Network, V4, V6};

    fn net(s: &str) -> Ipv4Network {
        s.parse().unwrap()
    }

    fn addr(s: &str) -> Address<V4> {
        s.parse().unwrap()
    }

    fn tree(root: &str, nets: &[&str]) -> SubnetTree<V4> {
        let mut t = SubnetTree::new(net(root));
        t.add_all(nets.iter().copied()).unwrap();
        t
    }

    #[test]
    fn test_default_root() {
        let t: SubnetTree<V6> = SubnetTree::default();
        assert_eq!(t.network().to_string(), "::/0");
        assert!(!t.is_used());
        let t: SubnetTree<V4> = SubnetTree::default();
        assert_eq!(t.network().to_string(), "0.0.0.0/0");
    }

    #[test]
    fn test_add_root_marks_used() {
        let mut t = SubnetTree::new(net("10.0.0.0/8"));
        t.add("10.0.0.0/8").unwrap();
        assert!(t.is_used());
        assert!(t.left().is_none() && t.right().is_none());
    }

    #[test]
    fn test_add_twice_fails() {
        let mut t = tree("10.0.0.0/8", &["10.0.0.0/24"]);
        assert_eq!(
            t.add("10.0.0.0/24"),
            Err(NetError::NetworkAlreadyPresent {
                network: "10.0.0.0/24".to_string()
            })
        );
        t.add("10.0.0.0/8").unwrap();
        assert!(matches!(
            t.add("10.0.0.0/8"),
            Err(NetError::NetworkAlreadyPresent { .. })
        ));
    }

    #[test]
    fn test_add_outside_root_fails() {
        let mut t = tree("10.0.0.0/8", &[]);
        assert_eq!(
            t.add("11.0.0.0/24"),
            Err(NetError::NetworkNotContained {
                network: "11.0.0.0/24".to_string(),
                container: "10.0.0.0/8".to_string(),
            })
        );
        assert!(matches!(
            t.add("0.0.0.0/0"),
            Err(NetError::NetworkNotContained { .. })
        ));
        assert!(matches!(
            t.add("10.0.0"),
            Err(NetError::FormatNotRecognized { .. })
        ));
    }

    #[test]
    fn test_add_builds_halves() {
        let t = tree("10.0.0.0/8", &["10.128.0.0/9", "10.0.0.0/10"]);
        let r = t.right().unwrap();
        assert_eq!(r.network(), &net("10.128.0.0/9"));
        assert!(r.is_used());
        let l = t.left().unwrap();
        assert_eq!(l.network(), &net("10.0.0.0/9"));
        assert!(!l.is_used());
        let ll = l.left().unwrap();
        assert_eq!(ll.network(), &net("10.0.0.0/10"));
        assert!(ll.is_used());
        assert!(l.right().is_none());
    }

    #[test]
    fn test_add_batch_is_not_transactional() {
        let mut t = tree("10.0.0.0/8", &[]);
        let res = t.add_all(["10.0.0.0/24", "10.0.1.0/24", "11.0.0.0/24", "10.0.2.0/24"]);
        assert!(res.is_err());
        assert_eq!(t.networks(), vec![net("10.0.0.0/24"), net("10.0.1.0/24")]);
    }

    #[test]
    fn test_from_networks() {
        let t = SubnetTree::<V4>::from_networks([
            "10.0.0.0/8",
            "10.0.0.0/8",
            "10.1.0.0/16",
        ])
        .unwrap();
        assert_eq!(t.network(), &net("10.0.0.0/8"));
        assert!(!t.is_used());
        assert_eq!(t.networks(), vec![net("10.1.0.0/16")]);

        let empty = SubnetTree::<V4>::from_networks(Vec::<Ipv4Network>::new()).unwrap();
        assert_eq!(empty, SubnetTree::default());
    }

    #[test]
    fn test_networks_preorder() {
        let t = tree(
            "10.0.0.0/8",
            &["10.128.0.0/9", "10.0.1.0/24", "10.0.0.0/16", "10.0.0.0/8"],
        );
        assert_eq!(
            t.networks(),
            vec![
                net("10.0.0.0/8"),
                net("10.0.0.0/16"),
                net("10.0.1.0/24"),
                net("10.128.0.0/9"),
            ]
        );
    }

    #[test]
    fn test_free_space_empty_tree() {
        let t = tree("10.0.0.0/8", &[]);
        assert_eq!(t.free_space(32), vec![net("10.0.0.0/8")]);
    }

    #[test]
    fn test_free_space_used_root() {
        let t = tree("10.0.0.0/8", &["10.0.0.0/8", "10.1.0.0/16"]);
        assert!(t.free_space(32).is_empty());
    }

    #[test]
    fn test_free_space_halves() {
        let t = tree("10.0.0.0/8", &["10.0.0.0/10"]);
        assert_eq!(
            t.free_space(32),
            vec![net("10.64.0.0/10"), net("10.128.0.0/9")]
        );
        // depth limit stops at the root's children
        assert_eq!(t.free_space(9), vec![net("10.128.0.0/9")]);
        assert!(t.free_space(8).is_empty());
    }

    /// Every address of the root is covered by exactly one used or free network.
    fn assert_partition(t: &SubnetTree<V4>, max_length: u8) {
        let mut blocks: Vec<Ipv4Network> = t.networks();
        blocks.extend(t.free_space(max_length));
        blocks.sort_by_key(|n| n.first_ip());
        let mut next = t.network().first_ip().to_bits();
        for b in &blocks {
            assert_eq!(b.first_ip().to_bits(), next, "gap or overlap at {b}");
            next = b.last_ip().to_bits() + 1;
        }
        assert_eq!(next, t.network().last_ip().to_bits() + 1);
    }

    #[test]
    fn test_free_space_partitions_root() {
        let t = tree(
            "10.0.0.0/8",
            &[
                "10.0.0.0/24",
                "10.1.0.0/16",
                "10.200.3.128/25",
                "10.255.255.255/32",
            ],
        );
        assert_partition(&t, 32);
        let t = tree("192.168.0.0/16", &["192.168.77.0/24"]);
        assert_partition(&t, 32);
    }

    #[test]
    fn test_pick_free_scenario() {
        let t = tree("10.0.0.0/8", &["10.0.0.0/24", "10.1.0.0/16"]);
        let picked = t.pick_free(24, None).unwrap().unwrap();
        assert_eq!(picked.length(), 24);
        assert_ne!(picked, net("10.0.0.0/24"));
        assert!(!picked.overlaps(&net("10.1.0.0/16")));
        assert!(!picked.overlaps(&net("10.0.0.0/24")));
        // smallest free block first
        assert_eq!(picked, net("10.0.1.0/24"));
    }

    #[test]
    fn test_pick_free_takes_head_of_bigger_block() {
        let t = tree("10.0.0.0/8", &["10.0.0.0/9"]);
        assert_eq!(t.pick_free(24, None).unwrap(), Some(net("10.128.0.0/24")));
    }

    #[test]
    fn test_pick_free_full_tree() {
        let t = tree("10.0.0.0/24", &["10.0.0.0/25", "10.0.0.128/25"]);
        assert_eq!(t.pick_free(28, None).unwrap(), None);
    }

    #[test]
    fn test_pick_free_invalid_length() {
        let t = tree("10.0.0.0/8", &[]);
        assert!(matches!(
            t.pick_free(33, None),
            Err(NetError::InvalidAddress { .. })
        ));
    }

    #[test]
    fn test_pick_free_in_range() {
        let t = tree("10.0.0.0/8", &["10.0.0.0/24", "10.1.0.0/16"]);
        let range = addr("10.1.0.0")..=addr("10.3.255.255");
        let picked = t.pick_free(24, Some(&range)).unwrap().unwrap();
        assert_eq!(picked, net("10.2.0.0/24"));

        let range = addr("10.0.0.10")..=addr("10.0.5.255");
        let picked = t.pick_free(24, Some(&range)).unwrap().unwrap();
        assert_eq!(picked, net("10.0.1.0/24"));
    }

    #[test]
    fn test_pick_free_range_misaligned_start() {
        let t = tree("10.0.0.0/8", &[]);
        let range = addr("10.0.0.10")..=addr("10.0.1.255");
        let picked = t.pick_free(24, Some(&range)).unwrap().unwrap();
        assert_eq!(picked, net("10.0.1.0/24"));

        let range = addr("10.0.0.10")..=addr("10.0.1.200");
        assert_eq!(t.pick_free(24, Some(&range)).unwrap(), None);
    }

    #[test]
    fn test_pick_free_range_in_last_block_wraps() {
        let t = tree("255.255.255.0/24", &[]);
        let range = addr("255.255.255.10")..=addr("255.255.255.255");
        assert_eq!(t.pick_free(24, Some(&range)).unwrap(), None);

        let range = addr("255.255.255.0")..=addr("255.255.255.255");
        assert_eq!(
            t.pick_free(24, Some(&range)).unwrap(),
            Some(net("255.255.255.0/24"))
        );
    }

    #[test]
    fn test_pick_free_range_outside_free_space() {
        let t = tree("10.0.0.0/8", &["10.1.0.0/16"]);
        let range = addr("10.1.0.0")..=addr("10.1.255.255");
        assert_eq!(t.pick_free(24, Some(&range)).unwrap(), None);
    }

    #[test]
    fn test_find() {
        let mut t: SubnetTree<V6> = SubnetTree::default();
        t.add("2a02:20::/32").unwrap();
        let found = t.find("2a02:20::/32").unwrap().unwrap();
        assert!(found.is_used());
        assert_eq!(found.network(), &"2a02:20::/32".parse::<Ipv6Network>().unwrap());
        assert!(t.find("2a02:21::/32").unwrap().is_none());

        // intermediate nodes are found too, unused
        let mid = t.find("2a02::/16").unwrap().unwrap();
        assert!(!mid.is_used());
        assert!(t.find("::/0").unwrap().is_some());
    }

    #[test]
    fn test_find_outside_root() {
        let t = tree("10.0.0.0/8", &["10.0.0.0/24"]);
        assert!(t.find("11.0.0.0/24").unwrap().is_none());
        assert!(t.find("0.0.0.0/0").unwrap().is_none());
        assert!(t.find("10.0.0.1/32").unwrap().is_none());
    }

    #[test]
    fn test_full_length_leaf() {
        let mut t = tree("10.0.0.0/31", &[]);
        t.add("10.0.0.1/32").unwrap();
        assert_eq!(t.free_space(32), vec![net("10.0.0.0/32")]);
        assert!(t.find("10.0.0.1/32").unwrap().unwrap().is_used());
        assert_eq!(t.pick_free(32, None).unwrap(), Some(net("10.0.0.0/32")));
    }

    #[test]
    fn test_summarize_not_implemented() {
        let mut t = tree("10.0.0.0/8", &[]);
        assert_eq!(t.summarize(), Err(NetError::NotImplemented("summarize")));
    }

    #[test]
    fn test_display() {
        let t = tree(
            "10.0.0.0/8",
            &["10.0.0.0/16", "10.0.1.0/24", "10.128.0.0/9"],
        );
        assert_eq!(
            t.to_string(),
            "10.0.0.0/16 *\n  10.0.1.0/24 *\n10.128.0.0/9 *\n"
        );
    }
}
