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

//! Structured log entry and summary types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Sentinel level key for entries with no detected severity.
pub const UNKNOWN_LEVEL: &str = "UNKNOWN";

/// One parsed log line.
///
/// Immutable once constructed: `raw_text` always holds the trimmed original
/// line, and `message` plus any stripped timestamp/level prefix reconstructs
/// it modulo whitespace normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// 1-based position in the source file. Blank lines consume a slot even
    /// though they produce no entry.
    pub line_number: usize,

    /// Original line, trimmed of surrounding whitespace.
    pub raw_text: String,

    /// Lexical timestamp (`YYYY-MM-DD[T| ]HH:MM:SS[Z]`), if detected.
    /// Kept as matched text, never parsed into a date type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Upper-cased severity token, if detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,

    /// Remaining text after timestamp/level extraction; falls back to the
    /// whole line when neither is present.
    pub message: String,
}

/// Aggregate statistics over one parse run. Derived, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogSummary {
    /// Number of parsed entries.
    pub total_lines: usize,

    /// Occurrences per severity token, with [`UNKNOWN_LEVEL`] standing in
    /// for entries that carry none.
    pub levels: BTreeMap<String, usize>,

    /// True iff at least one entry has a timestamp.
    pub has_timestamps: bool,
}
