//! Allocation processing logic.
//!
//! - [`report`] - used networks and free space in address order

mod report;

// Re-export public functions
pub use report::{allocation_rows, any_allocation_rows, AllocationRow, AllocationState};
