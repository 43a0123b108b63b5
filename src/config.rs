//! CLI argument parsing using clap.
//!
//! The root network and allocation file may also come from the environment
//! (`NETBLOCK_ROOT`, `NETBLOCK_FILE`), which `main` fills from `.env`.

use crate::input::{read_allocation_file, AllocationFile};
use crate::tree::AnySubnetTree;
use clap::{Parser, Subcommand};
use std::error::Error;

/// netblock: keep track of used and free networks inside a root block.
#[derive(Debug, Parser)]
#[command(name = "netblock")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Allocation file (JSON with "root" and "networks")
    #[arg(short, long, env = "NETBLOCK_FILE", global = true)]
    pub file: Option<String>,

    /// Root network, overrides the file's root
    #[arg(short, long, env = "NETBLOCK_ROOT", global = true)]
    pub root: Option<String>,

    /// Used network (can be specified multiple times)
    #[arg(short, long = "net", value_name = "NET", global = true)]
    pub nets: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// List used networks
    List,
    /// List free space
    Free {
        /// Do not split free space into networks longer than this
        #[arg(short, long)]
        max_length: Option<u8>,
    },
    /// CSV report of used and free networks
    Report {
        /// Do not split free space into networks longer than this
        #[arg(short, long)]
        max_length: Option<u8>,
    },
    /// Pick a free network
    Pick {
        /// Prefix length of the network to pick
        #[arg(short, long)]
        length: u8,
        /// Lowest usable address
        #[arg(long, requires = "to")]
        from: Option<String>,
        /// Highest usable address
        #[arg(long, requires = "from")]
        to: Option<String>,
        /// Add the picked network to the allocation file
        #[arg(long)]
        save: bool,
    },
    /// Show the tree node holding a network
    Find {
        /// Network to look up
        net: String,
    },
    /// Print used networks as an indented tree
    Tree,
}

impl Cli {
    /// The allocation to work on: the file (if any), its root replaced by
    /// `--root`, with `--net` networks appended.
    ///
    /// Without file and root the whole IPv6 space is used.
    pub fn allocation(&self) -> Result<Option<AllocationFile>, Box<dyn Error>> {
        let mut data = match &self.file {
            Some(file) => Some(read_allocation_file(file)?),
            None => None,
        };
        if let Some(root) = &self.root {
            let data = data.get_or_insert_with(AllocationFile::default);
            log::debug!("root {root} overrides {:?}", data.root);
            data.root = root.clone();
        }
        if !self.nets.is_empty() {
            let data = data.get_or_insert_with(|| AllocationFile {
                root: AnySubnetTree::default().network().to_string(),
                networks: Vec::new(),
            });
            data.networks.extend(self.nets.iter().cloned());
        }
        Ok(data)
    }

    /// Build the tree from [`Cli::allocation`].
    pub fn load_tree(&self) -> Result<AnySubnetTree, Box<dyn Error>> {
        match self.allocation()? {
            Some(data) => data.to_tree(),
            None => {
                log::warn!("No root network given, using the whole IPv6 space");
                Ok(AnySubnetTree::default())
            }
        }
    }
}
