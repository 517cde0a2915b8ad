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

//! Canonical text projection used as embedding input.

use crate::entry::LogEntry;

/// Separator between projected segments.
const SEGMENT_SEPARATOR: &str = " | ";

/// Project an entry to its canonical embedding text.
///
/// Concatenates the present-and-non-empty fields as `Time: ..`,
/// `Level: ..`, `Message: ..` in that fixed order; absent fields are
/// omitted entirely. The projection, not `raw_text`, is what gets
/// embedded, so entries that differ only in original formatting embed
/// alike.
pub fn project(entry: &LogEntry) -> String {
    let mut segments = Vec::with_capacity(3);

    if let Some(timestamp) = entry.timestamp.as_deref().filter(|t| !t.is_empty()) {
        segments.push(format!("Time: {timestamp}"));
    }
    if let Some(level) = entry.level.as_deref().filter(|l| !l.is_empty()) {
        segments.push(format!("Level: {level}"));
    }
    if !entry.message.is_empty() {
        segments.push(format!("Message: {}", entry.message));
    }

    segments.join(SEGMENT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::LineClassifier;

    fn classify(line: &str) -> LogEntry {
        LineClassifier::new().classify(line, 1)
    }

    #[test]
    fn full_entry_projects_all_segments_in_order() {
        let entry = classify("2024-01-01T10:00:00Z [ERROR] disk full");
        assert_eq!(
            project(&entry),
            "Time: 2024-01-01T10:00:00Z | Level: ERROR | Message: disk full"
        );
    }

    #[test]
    fn absent_fields_are_omitted_not_blanked() {
        let entry = classify("WARNING: retrying connection");
        assert_eq!(project(&entry), "Level: WARNING | Message: retrying connection");

        let entry = classify("just some text");
        assert_eq!(project(&entry), "Message: just some text");
    }

    #[test]
    fn timestamp_only_entry_projects_time_segment() {
        let entry = classify("2024-01-01T10:00:00Z");
        assert_eq!(project(&entry), "Time: 2024-01-01T10:00:00Z");
    }

    #[test]
    fn differently_formatted_lines_project_identically() {
        let bracketed = classify("2024-01-01 10:00:00 [error]: cache miss");
        let plain = classify("2024-01-01 10:00:00 ERROR cache miss");
        assert_eq!(project(&bracketed), project(&plain));
    }
}
