// Copyright 2025 Loglens Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Aggregate statistics over parsed entries.

use crate::entry::{LogEntry, LogSummary, UNKNOWN_LEVEL};

/// Summarize a batch of parsed entries.
///
/// Total over any input: empty input yields zero counts, an empty level
/// map, and `has_timestamps == false`.
pub fn summarize(entries: &[LogEntry]) -> LogSummary {
    let mut summary = LogSummary {
        total_lines: entries.len(),
        ..LogSummary::default()
    };

    for entry in entries {
        let level = entry.level.as_deref().unwrap_or(UNKNOWN_LEVEL);
        *summary.levels.entry(level.to_string()).or_insert(0) += 1;
        if entry.timestamp.is_some() {
            summary.has_timestamps = true;
        }
    }

    summary
}
