//! Terminal output utilities.
//!
//! Provides formatting helpers for terminal output.

use crate::models::IpNetwork;
use crate::processing::AllocationState;
use colored::{ColoredString, Colorize};
use itertools::Itertools;

/// Format a value as a quoted, right-aligned field.
///
/// # Arguments
/// * `value` - The value to format
/// * `width` - The minimum width of the field
///
/// # Returns
/// A quoted, right-aligned string
pub fn format_field<T: ToString>(value: T, width: usize) -> String {
    let value_str = value.to_string();
    let quoted = format!("\"{value_str}\"");
    let quoted_len = quoted.len();

    if quoted_len >= width {
        quoted
    } else {
        format!("{quoted:>width$}")
    }
}

/// The state as a [`format_field`], red for used and green for free.
///
/// Padding is applied before coloring so escape codes do not count as width
/// and stay outside the quotes.
pub fn state_marker(state: AllocationState, width: usize) -> ColoredString {
    let field = format_field(state, width);
    match state {
        AllocationState::Used => field.red(),
        AllocationState::Free => field.green(),
    }
}

/// One network per line.
pub fn format_networks(networks: &[IpNetwork]) -> String {
    networks.iter().map(|n| format!("{n}\n")).join("")
}
