//! Allocation file loading.
//!
//! An allocation file is JSON: `{ "root": "10.0.0.0/8", "networks": ["10.0.0.0/24"] }`.

use crate::tree::AnySubnetTree;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;

/// The root network and the networks allocated in it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationFile {
    pub root: String,
    #[serde(default)]
    pub networks: Vec<String>,
}

impl AllocationFile {
    /// Build the tree, adding networks in file order.
    pub fn to_tree(&self) -> Result<AnySubnetTree, Box<dyn Error>> {
        let mut tree = AnySubnetTree::new(&self.root)?;
        for net in &self.networks {
            tree.add(net).map_err(|e| {
                log::warn!("Rejected network {net}: {e}");
                e
            })?;
        }
        log::info!(
            "Loaded {} networks into {}",
            self.networks.len(),
            tree.network()
        );
        Ok(tree)
    }
}

/// Read an allocation file.
///
/// # Returns
/// * `Ok(AllocationFile)` - The parsed file
/// * `Err` - If the file does not exist or is not valid JSON
pub fn read_allocation_file(file: &str) -> Result<AllocationFile, Box<dyn Error>> {
    if !Path::new(file).exists() {
        return Err(format!("Allocation file does not exist: {file}").into());
    }
    log::info!("Reading allocation file: {file}");
    let json = std::fs::read_to_string(file)
        .map_err(|e| format!("Error reading allocation file {file}: {e}"))?;
    let data: AllocationFile = serde_json::from_str(&json)
        .map_err(|e| format!("Error parsing allocation JSON {file}: {e}"))?;
    if data.networks.is_empty() {
        log::warn!("No networks in allocation file: {file}");
    }
    Ok(data)
}

/// Write an allocation file, e.g. after picking a new network.
pub fn write_allocation_file(file: &str, data: &AllocationFile) -> Result<(), Box<dyn Error>> {
    let json =
        serde_json::to_string_pretty(data).map_err(|e| format!("Error serializing JSON: {e}"))?;
    log::warn!("Writing allocation file: {file}");
    std::fs::write(file, json).map_err(|e| format!("Error writing allocation file {file}: {e}"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_allocation_file_v4() {
        let data = read_allocation_file("src/tests/test_data/allocations_v4.json")
            .expect("Error reading allocation file");
        assert_eq!(data.root, "10.0.0.0/8");
        assert_eq!(data.networks.len(), 5, "Wrong network count in test sample.");

        let tree = data.to_tree().expect("Error building tree");
        assert_eq!(tree.networks().len(), 5);
    }

    #[test]
    fn test_read_allocation_file_v6() {
        let data = read_allocation_file("src/tests/test_data/allocations_v6.json")
            .expect("Error reading allocation file");
        let tree = data.to_tree().expect("Error building tree");
        assert_eq!(tree.max_length(), 128);
        assert_eq!(tree.networks().len(), 3);
    }

    #[test]
    fn test_read_missing_file() {
        assert!(read_allocation_file("src/tests/test_data/does_not_exist.json").is_err());
    }

    #[test]
    fn test_to_tree_rejects_outside_network() {
        let data = AllocationFile {
            root: "10.0.0.0/8".to_string(),
            networks: vec!["10.0.0.0/24".to_string(), "192.168.0.0/24".to_string()],
        };
        assert!(data.to_tree().is_err());
    }

    #[test]
    fn test_write_then_read() {
        let file = std::env::temp_dir().join("netblock_test_write_then_read.json");
        let file = file.to_str().unwrap();
        let data = AllocationFile {
            root: "2a02::/16".to_string(),
            networks: vec!["2a02:20::/32".to_string()],
        };
        write_allocation_file(file, &data).unwrap();
        assert_eq!(read_allocation_file(file).unwrap(), data);
        std::fs::remove_file(file).unwrap();
    }
}
