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

//! Line classification: one raw text line into one structured [`LogEntry`].

use crate::entry::LogEntry;
use regex::Regex;

/// Severity tokens accepted for lines that carry a level but no timestamp.
///
/// A leading timestamp lifts this restriction: any word following it is
/// taken as the level.
pub const LEVEL_VOCABULARY: [&str; 7] = [
    "INFO", "ERROR", "WARN", "WARNING", "DEBUG", "TRACE", "FATAL",
];

/// Stateless line classifier.
///
/// Holds the compiled patterns for the ordered, first-match-wins
/// extraction: leading timestamp, then severity token, then message.
pub struct LineClassifier {
    /// `2024-01-01 10:00:00` or `2024-01-01T10:00:00Z`
    timestamp_re: Regex,
    /// Level following a timestamp: optionally bracketed, optional colon.
    bracketed_level_re: Regex,
    /// Level opening the line: bare word, colon required.
    bare_level_re: Regex,
}

impl Default for LineClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl LineClassifier {
    /// Create a classifier with its patterns compiled.
    pub fn new() -> Self {
        Self {
            timestamp_re: Regex::new(r"^(\d{4}-\d{2}-\d{2}[T\s]\d{2}:\d{2}:\d{2}[Z\s]?)").unwrap(),
            bracketed_level_re: Regex::new(r"^\[?(\w+)\]?:?\s*").unwrap(),
            bare_level_re: Regex::new(r"^(\w+):\s*").unwrap(),
        }
    }

    /// Classify one raw line.
    ///
    /// Never fails: the worst case is an entry with no timestamp or level
    /// and `message` equal to the trimmed line itself.
    pub fn classify(&self, raw_line: &str, line_number: usize) -> LogEntry {
        let raw = raw_line.trim();
        let mut entry = LogEntry {
            line_number,
            raw_text: raw.to_string(),
            timestamp: None,
            level: None,
            message: raw.to_string(),
        };

        if let Some(matched) = self.timestamp_re.find(raw) {
            entry.timestamp = Some(matched.as_str().trim().to_string());
            let remaining = raw[matched.end()..].trim();

            // With a timestamp in front, any leading word counts as the
            // level, bracketed and colon-suffixed forms included.
            if let Some(caps) = self.bracketed_level_re.captures(remaining) {
                let consumed = caps.get(0).map_or(0, |m| m.end());
                entry.level = Some(caps[1].to_uppercase());
                entry.message = remaining[consumed..].trim().to_string();
            } else {
                entry.message = remaining.to_string();
            }
        } else if let Some(caps) = self.bare_level_re.captures(raw) {
            // Without a timestamp the token must be colon-qualified and in
            // the known vocabulary, otherwise the line stays unclassified.
            let token = caps[1].to_uppercase();
            if LEVEL_VOCABULARY.contains(&token.as_str()) {
                let consumed = caps.get(0).map_or(0, |m| m.end());
                entry.level = Some(token);
                entry.message = raw[consumed..].trim().to_string();
            }
        }

        entry
    }
}
