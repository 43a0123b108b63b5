//! Output formatting for allocation data.
//!
//! This module handles formatting and outputting allocations:
//! - [`csv`] - CSV report formatting
//! - [`terminal`] - Terminal output with colors

mod csv;
mod terminal;

pub use csv::format_report;
pub use terminal::{format_field, format_networks, state_marker};
