//! CSV output of the allocation report.

use crate::processing::{AllocationRow, AllocationState};
use itertools::Itertools;

use super::terminal::{format_field, state_marker};

const HEADER: &str =
    r#"   "cnt",  "state",          "network",            "first",             "last",       "size""#;

/// Format the report rows as CSV, header first.
///
/// Free rows are not counted in the `cnt` column.
pub fn format_report(rows: &[AllocationRow]) -> String {
    log::info!("#Start format_report() rows = {}", rows.len());
    let mut cnt = 0;
    let body = rows
        .iter()
        .map(|row| {
            if row.state == AllocationState::Used {
                cnt += 1;
                format_csv_row(cnt, row)
            } else {
                format_csv_row(0, row)
            }
        })
        .join("\n");
    if body.is_empty() {
        format!("{HEADER}\n")
    } else {
        format!("{HEADER}\n{body}\n")
    }
}

/// Format a single CSV row.
fn format_csv_row(cnt: usize, row: &AllocationRow) -> String {
    format!(
        r#"{cnt},{state},{network},{first},{last},{size}"#,
        cnt = format_field(cnt, 6),
        state = state_marker(row.state, 8),
        network = format_field(row.network, 18),
        first = format_field(row.first, 17),
        last = format_field(row.last, 17),
        size = format_field(row.size_str(), 12),
    )
}
