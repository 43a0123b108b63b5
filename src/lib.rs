// cargo watch -x 'fmt' -x 'test'

pub mod config;
pub mod error;
pub mod input;
pub mod models;
pub mod output;
pub mod processing;
pub mod tree;

use config::{Cli, Command};
use input::{read_allocation_file, write_allocation_file};
use std::error::Error;

// Re-export commonly used types at crate root
pub use error::NetError;
pub use models::{
    Address, Family, InterfaceAddress, IpAddress, IpInterface, IpNetwork, Ipv4Address,
    Ipv4Interface, Ipv4Network, Ipv6Address, Ipv6Interface, Ipv6Network, Network, ToNetwork, V4,
    V6,
};
pub use tree::{AnySubnetTree, FoundNode, SubnetTree};

/// Run a parsed command line and return what should go to stdout.
pub fn run(cli: &Cli) -> Result<String, Box<dyn Error>> {
    let tree = cli.load_tree()?;
    let out = match &cli.command {
        Command::List => output::format_networks(&tree.networks()),
        Command::Free { max_length } => {
            let max_length = max_length.unwrap_or(tree.max_length());
            output::format_networks(&tree.free_space(max_length))
        }
        Command::Report { max_length } => {
            let max_length = max_length.unwrap_or(tree.max_length());
            output::format_report(&processing::any_allocation_rows(&tree, max_length))
        }
        Command::Pick {
            length,
            from,
            to,
            save,
        } => {
            let range = match (from, to) {
                (Some(from), Some(to)) => {
                    Some(from.parse::<IpAddress>()?..=to.parse::<IpAddress>()?)
                }
                _ => None,
            };
            let picked = tree
                .pick_free(*length, range.as_ref())?
                .ok_or_else(|| format!("No free /{length} network in {}", tree.network()))?;
            log::info!("Picked {picked}");
            if *save {
                save_picked(cli, picked)?;
            }
            format!("{picked}\n")
        }
        Command::Find { net } => match tree.find(net)? {
            Some(node) if node.used => format!("{} used\n", node.network),
            Some(node) => format!("{} free\n", node.network),
            None => return Err(format!("{net} not found in {}", tree.network()).into()),
        },
        Command::Tree => tree.to_string(),
    };
    Ok(out)
}

/// Append `picked` to the allocation file as it is on disk.
///
/// `--net` networks are not saved, and a `--root` other than the file's is refused.
fn save_picked(cli: &Cli, picked: IpNetwork) -> Result<(), Box<dyn Error>> {
    let file = cli
        .file
        .as_deref()
        .ok_or("--save needs an allocation file (--file or NETBLOCK_FILE)")?;
    let mut data = read_allocation_file(file)?;
    if let Some(root) = &cli.root {
        if root.parse::<IpNetwork>()? != data.root.parse::<IpNetwork>()? {
            return Err(format!("--root {root} differs from {} in {file}", data.root).into());
        }
    }
    data.networks.push(picked.to_string());
    write_allocation_file(file, &data)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli(root: &str, nets: &[&str], command: Command) -> Cli {
        Cli {
            file: None,
            root: Some(root.to_string()),
            nets: nets.iter().map(|n| n.to_string()).collect(),
            command,
        }
    }

    #[test]
    fn test_run_list_and_tree() {
        let nets = ["10.0.0.0/16", "10.0.1.0/24", "10.2.0.0/16"];
        let out = run(&cli("10.0.0.0/8", &nets, Command::List)).unwrap();
        assert_eq!(out, "10.0.0.0/16\n10.0.1.0/24\n10.2.0.0/16\n");

        let out = run(&cli("10.0.0.0/8", &nets, Command::Tree)).unwrap();
        assert_eq!(out, "10.0.0.0/16 *\n  10.0.1.0/24 *\n10.2.0.0/16 *\n");
    }

    #[test]
    fn test_run_free() {
        let command = Command::Free {
            max_length: Some(10),
        };
        let out = run(&cli("10.0.0.0/8", &["10.0.0.0/10"], command)).unwrap();
        assert_eq!(out, "10.64.0.0/10\n10.128.0.0/9\n");
    }

    #[test]
    fn test_run_pick() {
        let command = Command::Pick {
            length: 24,
            from: None,
            to: None,
            save: false,
        };
        let nets = ["10.0.0.0/24", "10.1.0.0/16"];
        assert_eq!(run(&cli("10.0.0.0/8", &nets, command)).unwrap(), "10.0.1.0/24\n");

        let command = Command::Pick {
            length: 24,
            from: Some("10.1.0.0".to_string()),
            to: Some("10.3.255.255".to_string()),
            save: false,
        };
        assert_eq!(run(&cli("10.0.0.0/8", &nets, command)).unwrap(), "10.2.0.0/24\n");
    }

    #[test]
    fn test_run_pick_full_and_save_without_file() {
        let command = Command::Pick {
            length: 24,
            from: None,
            to: None,
            save: false,
        };
        assert!(run(&cli("10.0.0.0/24", &["10.0.0.0/24"], command)).is_err());

        let command = Command::Pick {
            length: 25,
            from: None,
            to: None,
            save: true,
        };
        assert!(run(&cli("10.0.0.0/24", &[], command)).is_err());
    }

    fn save_cli(file: &str, root: &str, nets: &[&str]) -> Cli {
        Cli {
            file: Some(file.to_string()),
            root: Some(root.to_string()),
            nets: nets.iter().map(|n| n.to_string()).collect(),
            command: Command::Pick {
                length: 24,
                from: None,
                to: None,
                save: true,
            },
        }
    }

    #[test]
    fn test_run_pick_save_keeps_file_root_and_skips_cli_nets() {
        let path = std::env::temp_dir().join("netblock_test_pick_save.json");
        let file = path.to_str().unwrap();
        let start = input::AllocationFile {
            root: "10.0.0.0/8".to_string(),
            networks: vec!["10.0.0.0/24".to_string()],
        };
        write_allocation_file(file, &start).unwrap();

        let out = run(&save_cli(file, "10.0.0.0/8", &["10.0.1.0/24"])).unwrap();
        assert_eq!(out, "10.0.2.0/24\n");
        let saved = read_allocation_file(file).unwrap();
        assert_eq!(saved.root, "10.0.0.0/8");
        assert_eq!(saved.networks, vec!["10.0.0.0/24", "10.0.2.0/24"]);

        // another root than the file's is refused and the file is left alone
        assert!(run(&save_cli(file, "10.0.0.0/16", &[])).is_err());
        assert_eq!(read_allocation_file(file).unwrap(), saved);

        std::fs::remove_file(file).unwrap();
    }

    #[test]
    fn test_run_find() {
        let nets = ["10.0.0.0/24"];
        let find = |net: &str| Command::Find {
            net: net.to_string(),
        };
        assert_eq!(
            run(&cli("10.0.0.0/8", &nets, find("10.0.0.0/24"))).unwrap(),
            "10.0.0.0/24 used\n"
        );
        assert!(run(&cli("10.0.0.0/8", &nets, find("10.0.1.0/24"))).is_err());
        assert!(run(&cli("10.0.0.0/8", &nets, find("::/64"))).is_err());
    }
}
