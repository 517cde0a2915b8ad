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

//! File parsing: a raw log file into an ordered sequence of entries.

use crate::classifier::LineClassifier;
use crate::entry::LogEntry;
use std::path::Path;
use tracing::warn;

/// Parse a log file into structured entries.
///
/// Fail-soft by contract: an unreadable file yields an empty vector, never
/// an error, and undecodable byte sequences are replaced rather than
/// failing the read. Callers render "0 entries" as a normal outcome.
pub fn parse_log_file(path: &Path) -> Vec<LogEntry> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read log file");
            return Vec::new();
        }
    };
    parse_text(&String::from_utf8_lossy(&bytes))
}

/// Parse already-decoded log text.
///
/// Blank lines produce no entry but still advance the line counter, so
/// `line_number` always reflects the 1-based position in the original
/// file rather than the filtered output.
pub fn parse_text(text: &str) -> Vec<LogEntry> {
    let classifier = LineClassifier::new();
    text.lines()
        .enumerate()
        .filter_map(|(idx, line)| {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(classifier.classify(trimmed, idx + 1))
            }
        })
        .collect()
}
